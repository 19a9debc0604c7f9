//! Entity kinds and the type tags custom-field rows are keyed by.
//!
//! A tag is resolved in two tiers. The enumerated kinds map through a fixed
//! override table; anything else is [`EntityKind::Other`] and falls back to the
//! lowercased unqualified kind name.
//!
//! ```
//! use tonerdesk_models::entity::EntityKind;
//!
//! assert_eq!(EntityKind::Printer.tag(), "printer");
//! assert_eq!(EntityKind::named("inventory::StockMovement").tag(), "stockmovement");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::EntityId;

/// The kind of an entity that can carry custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Printer,
    Consumable,
    Order,
    /// Any other kind, identified by its (possibly path-qualified) name.
    Other(String),
}

impl EntityKind {
    /// Kinds an administrator may define custom fields for.
    pub const DEFINABLE: [EntityKind; 3] = [
        EntityKind::Printer,
        EntityKind::Consumable,
        EntityKind::Order,
    ];

    pub fn named(name: impl Into<String>) -> Self {
        EntityKind::Other(name.into())
    }

    /// The canonical tag stored in `entity_type` columns.
    pub fn tag(&self) -> String {
        match self {
            EntityKind::Printer => "printer".to_string(),
            EntityKind::Consumable => "consumable".to_string(),
            EntityKind::Order => "order".to_string(),
            EntityKind::Other(name) => unqualified(name).to_lowercase(),
        }
    }

    /// Parses a stored tag. Known tags come back as their variant.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "printer" => EntityKind::Printer,
            "consumable" => EntityKind::Consumable,
            "order" => EntityKind::Order,
            other => EntityKind::Other(other.to_string()),
        }
    }

    pub fn is_definable(&self) -> bool {
        !matches!(self, EntityKind::Other(_))
    }
}

/// Strips any module/namespace qualification from a kind name.
fn unqualified(name: &str) -> &str {
    name.rsplit(|c: char| c == ':' || c == '\\' || c == '.' || c == '/')
        .next()
        .unwrap_or(name)
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(EntityKind::from_tag(&tag))
    }
}

/// Anything that can own custom-field values.
pub trait HasCustomFields {
    fn entity_kind(&self) -> EntityKind;

    fn entity_id(&self) -> EntityId;

    fn entity_type(&self) -> String {
        self.entity_kind().tag()
    }
}

/// A bare `(kind, id)` handle for an entity instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl HasCustomFields for EntityRef {
    fn entity_kind(&self) -> EntityKind {
        self.kind.clone()
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityRefError(pub String);

impl std::error::Error for ParseEntityRefError {}

impl fmt::Display for ParseEntityRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid entity reference '{}', expected <type>:<id>", self.0)
    }
}

/// Parses `printer:7` style references.
impl FromStr for EntityRef {
    type Err = ParseEntityRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseEntityRefError(s.to_string()))?;
        if kind.trim().is_empty() {
            return Err(ParseEntityRefError(s.to_string()));
        }
        let id: EntityId = id.parse().map_err(|_| ParseEntityRefError(s.to_string()))?;
        Ok(EntityRef::new(EntityKind::from_tag(kind), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_table() {
        assert_eq!(EntityKind::Printer.tag(), "printer");
        assert_eq!(EntityKind::Consumable.tag(), "consumable");
        assert_eq!(EntityKind::Order.tag(), "order");
    }

    #[test]
    fn test_fallback_lowercases_unqualified_name() {
        assert_eq!(EntityKind::named("Site").tag(), "site");
        assert_eq!(EntityKind::named("App\\Models\\OrderEntry").tag(), "orderentry");
        assert_eq!(EntityKind::named("inventory::StockMovement").tag(), "stockmovement");
        assert_eq!(EntityKind::named("crate.models.Logo").tag(), "logo");
    }

    #[test]
    fn test_from_tag_round_trips_known_kinds() {
        for kind in EntityKind::DEFINABLE {
            assert_eq!(EntityKind::from_tag(&kind.tag()), kind);
        }
        assert_eq!(EntityKind::from_tag("PRINTER"), EntityKind::Printer);
        assert_eq!(EntityKind::from_tag("stock"), EntityKind::named("stock"));
    }

    #[test]
    fn test_is_definable() {
        assert!(EntityKind::Order.is_definable());
        assert!(!EntityKind::named("Department").is_definable());
    }

    #[test]
    fn test_serde_uses_tag() {
        let json = serde_json::to_string(&EntityKind::Consumable).unwrap();
        assert_eq!(json, r#""consumable""#);

        let kind: EntityKind = serde_json::from_str(r#""order""#).unwrap();
        assert_eq!(kind, EntityKind::Order);
    }

    #[test]
    fn test_entity_ref_parse() {
        let entity: EntityRef = "printer:7".parse().unwrap();
        assert_eq!(entity, EntityRef::new(EntityKind::Printer, EntityId::new(7)));
        assert_eq!(entity.entity_type(), "printer");
        assert_eq!(entity.to_string(), "printer:7");

        assert!("printer".parse::<EntityRef>().is_err());
        assert!(":7".parse::<EntityRef>().is_err());
        assert!("printer:seven".parse::<EntityRef>().is_err());
    }

    #[test]
    fn test_custom_entity_implements_trait() {
        struct Stock {
            id: i64,
        }

        impl HasCustomFields for Stock {
            fn entity_kind(&self) -> EntityKind {
                EntityKind::named("Stock")
            }

            fn entity_id(&self) -> EntityId {
                EntityId::new(self.id)
            }
        }

        let stock = Stock { id: 3 };
        assert_eq!(stock.entity_type(), "stock");
        assert_eq!(stock.entity_id(), EntityId::new(3));
    }
}
