//! Catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pearl_treasure_core::{PearlCategory, PearlId, Price};

/// Maximum number of pearls returned by a catalog listing.
pub const LIST_LIMIT: usize = 100;

/// A product in the catalog.
///
/// The cart only reads pearls: to check they exist when added and to price
/// cart lines whenever the cart is viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pearl {
    pub id: PearlId,
    pub name: String,
    pub price: Price,
    pub category: PearlCategory,
    /// Opaque image payload (usually a base64 data URI). Never inspected.
    pub image: String,
    pub description: String,
    pub size: String,
    pub origin: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a pearl.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPearl {
    pub name: String,
    pub price: Price,
    pub category: PearlCategory,
    pub image: String,
    pub description: String,
    pub size: String,
    pub origin: String,
}

impl NewPearl {
    /// Materialize the record: fresh id, in stock, created now.
    #[must_use]
    pub fn into_pearl(self, now: DateTime<Utc>) -> Pearl {
        Pearl {
            id: PearlId::generate(),
            name: self.name,
            price: self.price,
            category: self.category,
            image: self.image,
            description: self.description,
            size: self.size,
            origin: self.origin,
            in_stock: true,
            created_at: now,
        }
    }
}

/// Partial update of a pearl; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PearlUpdate {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub category: Option<PearlCategory>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub size: Option<String>,
    pub origin: Option<String>,
    pub in_stock: Option<bool>,
}

impl PearlUpdate {
    /// Apply the present fields to `pearl`.
    pub fn apply_to(self, pearl: &mut Pearl) {
        if let Some(name) = self.name {
            pearl.name = name;
        }
        if let Some(price) = self.price {
            pearl.price = price;
        }
        if let Some(category) = self.category {
            pearl.category = category;
        }
        if let Some(image) = self.image {
            pearl.image = image;
        }
        if let Some(description) = self.description {
            pearl.description = description;
        }
        if let Some(size) = self.size {
            pearl.size = size;
        }
        if let Some(origin) = self.origin {
            pearl.origin = origin;
        }
        if let Some(in_stock) = self.in_stock {
            pearl.in_stock = in_stock;
        }
    }
}

/// Filter for listing the catalog. Only in-stock pearls are ever listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PearlQuery {
    /// Exact category match; `None` lists every category.
    pub category: Option<PearlCategory>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

impl PearlQuery {
    /// Whether `pearl` belongs in the result set of this query.
    #[must_use]
    pub fn matches(&self, pearl: &Pearl) -> bool {
        if !pearl.in_stock {
            return false;
        }
        if self.category.is_some_and(|c| c != pearl.category) {
            return false;
        }
        self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            pearl.name.to_lowercase().contains(&needle)
                || pearl.description.to_lowercase().contains(&needle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pearl(name: &str, description: &str, category: PearlCategory, in_stock: bool) -> Pearl {
        Pearl {
            id: PearlId::generate(),
            name: name.to_owned(),
            price: Price::from_units(100),
            category,
            image: String::new(),
            description: description.to_owned(),
            size: "7mm".to_owned(),
            origin: "Japan".to_owned(),
            in_stock,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_out_of_stock_never_matches() {
        let p = pearl("Akoya Strand", "", PearlCategory::Akoya, false);
        assert!(!PearlQuery::default().matches(&p));
    }

    #[test]
    fn test_category_filter_is_exact() {
        let p = pearl("Black Studs", "", PearlCategory::Tahitian, true);
        let tahitian = PearlQuery {
            category: Some(PearlCategory::Tahitian),
            search: None,
        };
        let akoya = PearlQuery {
            category: Some(PearlCategory::Akoya),
            search: None,
        };
        assert!(tahitian.matches(&p));
        assert!(!akoya.matches(&p));
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let p = pearl("Golden Ring", "Luxurious SOUTH SEA cocktail ring", PearlCategory::SouthSea, true);
        let by_name = PearlQuery {
            category: None,
            search: Some("golden".to_owned()),
        };
        let by_description = PearlQuery {
            category: None,
            search: Some("south sea".to_owned()),
        };
        let miss = PearlQuery {
            category: None,
            search: Some("bracelet".to_owned()),
        };
        assert!(by_name.matches(&p));
        assert!(by_description.matches(&p));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut p = pearl("Bracelet", "Delicate", PearlCategory::Freshwater, true);
        PearlUpdate {
            price: Some(Price::from_units(129)),
            in_stock: Some(false),
            ..PearlUpdate::default()
        }
        .apply_to(&mut p);

        assert_eq!(p.price, Price::from_units(129));
        assert!(!p.in_stock);
        assert_eq!(p.name, "Bracelet");
    }
}
