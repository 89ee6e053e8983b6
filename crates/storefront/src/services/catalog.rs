//! Catalog service.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use thiserror::Error;

use pearl_treasure_core::{PearlCategory, PearlId, Price};

use crate::db::{PearlRepository, RepositoryError};
use crate::models::{NewPearl, Pearl, PearlQuery, PearlUpdate};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No pearl with this ID.
    #[error("pearl not found: {0}")]
    NotFound(PearlId),

    /// Submitted pearl data is invalid.
    #[error("invalid pearl: {0}")]
    Invalid(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read and manage the pearl catalog.
pub struct CatalogService<'a> {
    pearls: &'a dyn PearlRepository,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pearls: &'a dyn PearlRepository) -> Self {
        Self { pearls }
    }

    /// List in-stock pearls.
    ///
    /// `category` of `"all"` (or blank) means every category; a category
    /// name that does not exist matches nothing. A blank `search` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if storage fails.
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Pearl>, CatalogError> {
        let category = match category.map(str::trim) {
            None | Some("" | "all") => None,
            Some(name) => match name.parse::<PearlCategory>() {
                Ok(category) => Some(category),
                Err(_) => return Ok(Vec::new()),
            },
        };
        let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);

        Ok(self.pearls.list(&PearlQuery { category, search }).await?)
    }

    /// Get a pearl by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no pearl has this ID.
    pub async fn get(&self, id: &PearlId) -> Result<Pearl, CatalogError> {
        self.pearls
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Add a pearl to the catalog. New pearls are in stock.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if the name is blank.
    pub async fn create(&self, new_pearl: NewPearl) -> Result<Pearl, CatalogError> {
        validate_name(&new_pearl.name)?;
        let pearl = self.pearls.create(&new_pearl.into_pearl(Utc::now())).await?;
        tracing::info!(pearl_id = %pearl.id, "Pearl created");
        Ok(pearl)
    }

    /// Apply a partial update to a pearl.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no pearl has this ID and
    /// `CatalogError::Invalid` if a new name is blank.
    pub async fn update(&self, id: &PearlId, update: PearlUpdate) -> Result<Pearl, CatalogError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        let pearl = self
            .pearls
            .update(id, update)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        tracing::info!(pearl_id = %pearl.id, "Pearl updated");
        Ok(pearl)
    }

    /// Remove a pearl from the catalog. Cart lines pointing at it are kept
    /// and drop out of cart views.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no pearl has this ID.
    pub async fn delete(&self, id: &PearlId) -> Result<(), CatalogError> {
        if !self.pearls.delete(id).await? {
            return Err(CatalogError::NotFound(id.clone()));
        }
        tracing::info!(pearl_id = %id, "Pearl deleted");
        Ok(())
    }

    /// Insert the sample pearls if the catalog is empty.
    ///
    /// Returns the number of pearls inserted (zero when the catalog already
    /// had entries).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if storage fails.
    pub async fn seed_sample_catalog(&self) -> Result<usize, CatalogError> {
        if self.pearls.count().await? > 0 {
            return Ok(0);
        }

        let samples = sample_pearls(Utc::now());
        for pearl in &samples {
            self.pearls.create(pearl).await?;
        }
        tracing::info!(count = samples.len(), "Sample pearl catalog initialized");
        Ok(samples.len())
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Invalid("name cannot be empty".to_owned()));
    }
    Ok(())
}

/// Placeholder artwork: a flat colour swatch with a caption, as a base64
/// SVG data URI.
fn swatch(fill: &str, ink: &str, caption: &str) -> String {
    let svg = format!(
        "<svg width=\"200\" height=\"200\" xmlns=\"http://www.w3.org/2000/svg\">\
         <rect width=\"100%\" height=\"100%\" fill=\"{fill}\"/>\
         <text x=\"50%\" y=\"50%\" font-family=\"Arial, sans-serif\" font-size=\"16\" \
         fill=\"{ink}\" text-anchor=\"middle\" dy=\".3em\">{caption}</text></svg>"
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

struct Sample {
    id: &'static str,
    name: &'static str,
    price: u32,
    category: PearlCategory,
    swatch: (&'static str, &'static str, &'static str),
    description: &'static str,
    size: &'static str,
    origin: &'static str,
}

const SAMPLES: [Sample; 4] = [
    Sample {
        id: "akoya-1",
        name: "Classic Akoya Pearl Necklace",
        price: 299,
        category: PearlCategory::Akoya,
        swatch: ("#FFE4E6", "#8B5A3C", "Akoya Pearl"),
        description: "Elegant 18-inch strand of lustrous Akoya pearls",
        size: "7-7.5mm",
        origin: "Japan",
    },
    Sample {
        id: "tahitian-1",
        name: "Tahitian Black Pearl Earrings",
        price: 599,
        category: PearlCategory::Tahitian,
        swatch: ("#2F2F2F", "#FFFFFF", "Black Pearl"),
        description: "Sophisticated black Tahitian pearl stud earrings",
        size: "9-10mm",
        origin: "French Polynesia",
    },
    Sample {
        id: "south-sea-1",
        name: "South Sea Golden Pearl Ring",
        price: 899,
        category: PearlCategory::SouthSea,
        swatch: ("#FFD700", "#000000", "Gold Pearl"),
        description: "Luxurious golden South Sea pearl cocktail ring",
        size: "11-12mm",
        origin: "Australia",
    },
    Sample {
        id: "freshwater-1",
        name: "Freshwater Pearl Bracelet",
        price: 149,
        category: PearlCategory::Freshwater,
        swatch: ("#87CEEB", "#000000", "Fresh Pearl"),
        description: "Delicate freshwater pearl tennis bracelet",
        size: "6-7mm",
        origin: "China",
    },
];

/// The four pearls a fresh store starts with.
///
/// Creation times are a millisecond apart so listings keep this order.
#[must_use]
pub fn sample_pearls(now: DateTime<Utc>) -> Vec<Pearl> {
    SAMPLES
        .iter()
        .zip(0_i64..)
        .map(|(sample, offset)| {
            let (fill, ink, caption) = sample.swatch;
            Pearl {
                id: PearlId::new(sample.id),
                name: sample.name.to_owned(),
                price: Price::from_units(sample.price),
                category: sample.category,
                image: swatch(fill, ink, caption),
                description: sample.description.to_owned(),
                size: sample.size.to_owned(),
                origin: sample.origin.to_owned(),
                in_stock: true,
                created_at: now + chrono::Duration::milliseconds(offset),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        CatalogService::new(&store).seed_sample_catalog().await.unwrap();
        store
    }

    fn ids(pearls: &[Pearl]) -> Vec<&str> {
        pearls.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_seed_only_fills_an_empty_catalog() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);

        assert_eq!(catalog.seed_sample_catalog().await.unwrap(), 4);
        assert_eq!(catalog.seed_sample_catalog().await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[test]
    fn test_sample_images_are_base64_svg() {
        for pearl in sample_pearls(Utc::now()) {
            let encoded = pearl.image.strip_prefix("data:image/svg+xml;base64,").unwrap();
            let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
            assert!(svg.starts_with("<svg"));
        }
    }

    #[tokio::test]
    async fn test_list_all_in_creation_order() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        let all = catalog.list(Some("all"), None).await.unwrap();
        assert_eq!(ids(&all), ["akoya-1", "tahitian-1", "south-sea-1", "freshwater-1"]);
        assert_eq!(catalog.list(None, None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        let south_sea = catalog.list(Some("south-sea"), None).await.unwrap();
        assert_eq!(ids(&south_sea), ["south-sea-1"]);
        assert!(south_sea.iter().all(|p| p.category == PearlCategory::SouthSea));
    }

    #[tokio::test]
    async fn test_unknown_category_matches_nothing() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        assert!(catalog.list(Some("baroque"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_literal_and_case_insensitive() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        let found = catalog.list(None, Some("BLACK")).await.unwrap();
        assert_eq!(ids(&found), ["tahitian-1"]);

        let by_description = catalog.list(None, Some("tennis")).await.unwrap();
        assert_eq!(ids(&by_description), ["freshwater-1"]);

        assert!(catalog.list(None, Some(".*")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_stock_pearls_are_hidden() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);
        catalog
            .update(
                &PearlId::new("akoya-1"),
                PearlUpdate {
                    in_stock: Some(false),
                    ..PearlUpdate::default()
                },
            )
            .await
            .unwrap();

        let all = catalog.list(None, None).await.unwrap();
        assert!(!ids(&all).contains(&"akoya-1"));
        assert!(catalog.list(Some("akoya"), Some("akoya")).await.unwrap().is_empty());
        assert!(catalog.get(&PearlId::new("akoya-1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_pearl() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        let err = catalog.get(&PearlId::new("nope")).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);
        let new_pearl = |name: &str| NewPearl {
            name: name.to_owned(),
            price: Price::from_units(450),
            category: PearlCategory::Tahitian,
            image: String::new(),
            description: "Peacock overtone".to_owned(),
            size: "10mm".to_owned(),
            origin: "French Polynesia".to_owned(),
        };

        assert!(matches!(
            catalog.create(new_pearl("   ")).await,
            Err(CatalogError::Invalid(_))
        ));

        let created = catalog.create(new_pearl("Peacock Pendant")).await.unwrap();
        assert!(created.in_stock);
        assert_eq!(catalog.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_delete_missing_pearl() {
        let store = seeded().await;
        let catalog = CatalogService::new(&store);

        catalog.delete(&PearlId::new("akoya-1")).await.unwrap();
        assert!(matches!(
            catalog.delete(&PearlId::new("akoya-1")).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
