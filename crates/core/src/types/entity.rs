//! Entity kinds - the unit of synchronization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A kind of Shopify entity mirrored into the local store.
///
/// Each run processes kinds strictly in the order it is given; a full run
/// uses [`EntityKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.entity_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Collection,
    Customer,
    Order,
    Promotion,
}

/// Error returned when parsing an unknown entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

impl EntityKind {
    /// Every kind, in full-sync processing order.
    pub const ALL: [Self; 5] = [
        Self::Product,
        Self::Collection,
        Self::Customer,
        Self::Order,
        Self::Promotion,
    ];

    /// Stable snake_case name (used in actions, URLs and the database enum).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Collection => "collection",
            Self::Customer => "customer",
            Self::Order => "order",
            Self::Promotion => "promotion",
        }
    }

    /// Plural label for human-readable messages.
    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Collection => "collections",
            Self::Customer => "customers",
            Self::Order => "orders",
            Self::Promotion => "promotions",
        }
    }

    /// Activity-log action for a per-kind sync entry (e.g. `sync.product`).
    #[must_use]
    pub fn sync_action(&self) -> String {
        format!("sync.{}", self.as_str())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(Self::Product),
            "collection" | "collections" => Ok(Self::Collection),
            "customer" | "customers" => Ok(Self::Customer),
            "order" | "orders" => Ok(Self::Order),
            "promotion" | "promotions" | "discount" | "discounts" => Ok(Self::Promotion),
            _ => Err(ParseEntityKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_order() {
        assert_eq!(
            EntityKind::ALL,
            [
                EntityKind::Product,
                EntityKind::Collection,
                EntityKind::Customer,
                EntityKind::Order,
                EntityKind::Promotion,
            ]
        );
    }

    #[test]
    fn test_parse_accepts_singular_and_plural() {
        assert_eq!("product".parse::<EntityKind>().unwrap(), EntityKind::Product);
        assert_eq!("Orders".parse::<EntityKind>().unwrap(), EntityKind::Order);
        assert_eq!(
            "discounts".parse::<EntityKind>().unwrap(),
            EntityKind::Promotion
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "variant".parse::<EntityKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid entity kind: variant");
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_sync_action() {
        assert_eq!(EntityKind::Customer.sync_action(), "sync.customer");
    }
}
