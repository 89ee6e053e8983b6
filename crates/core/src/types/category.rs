//! Pearl categories.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pearl category: {0}")]
pub struct CategoryError(pub String);

/// The kind of pearl a catalog entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PearlCategory {
    /// Japanese saltwater pearls.
    Akoya,
    /// Black pearls from French Polynesia.
    Tahitian,
    /// Large white and golden pearls from Australia and Indonesia.
    SouthSea,
    /// Freshwater mussel pearls.
    Freshwater,
}

impl PearlCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::Akoya, Self::Tahitian, Self::SouthSea, Self::Freshwater];

    /// The wire/storage tag for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Akoya => "akoya",
            Self::Tahitian => "tahitian",
            Self::SouthSea => "south-sea",
            Self::Freshwater => "freshwater",
        }
    }
}

impl std::fmt::Display for PearlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PearlCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
