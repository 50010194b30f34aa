//! Status enums for catalog and customer records.
//!
//! Each status serializes to the exact label shown to users, which is also the
//! persisted form (`"Out of Stock"`, not `"OUT_OF_STOCK"`).

use serde::{Deserialize, Serialize};

/// Product availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    #[default]
    Available,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl ProductStatus {
    /// All accepted values, in display order.
    pub const ALL: [Self; 2] = [Self::Available, Self::OutOfStock];

    /// The persisted / displayed label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OutOfStock => "Out of Stock",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "Out of Stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Customer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

impl CustomerStatus {
    /// All accepted values, in display order.
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    /// The persisted / displayed label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid customer status: {s}")),
        }
    }
}
