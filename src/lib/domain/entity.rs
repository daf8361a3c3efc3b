use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Business-object kind a query is about.
///
/// The set is open: keys that are not known at compile time are carried as
/// [`EntityKey::Other`] so configuration can register new entities without
/// touching the dispatcher or the loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Appointment,
    Invoice,
    Lead,
    Review,
    Business,
    Analytics,
    LiveOps,
    DailySummary,
    Campaign,
    Other(String),
}

impl EntityKey {
    pub const BUILTIN: [EntityKey; 9] = [
        EntityKey::Appointment,
        EntityKey::Invoice,
        EntityKey::Lead,
        EntityKey::Review,
        EntityKey::Business,
        EntityKey::Analytics,
        EntityKey::LiveOps,
        EntityKey::DailySummary,
        EntityKey::Campaign,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntityKey::Appointment => "appointment",
            EntityKey::Invoice => "invoice",
            EntityKey::Lead => "lead",
            EntityKey::Review => "review",
            EntityKey::Business => "business",
            EntityKey::Analytics => "analytics",
            EntityKey::LiveOps => "live_ops",
            EntityKey::DailySummary => "daily_summary",
            EntityKey::Campaign => "campaign",
            EntityKey::Other(key) => key.as_str(),
        }
    }
}

impl FromStr for EntityKey {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        let key = match normalized.as_str() {
            "appointment" | "appointments" => EntityKey::Appointment,
            "invoice" | "invoices" => EntityKey::Invoice,
            "lead" | "leads" => EntityKey::Lead,
            "review" | "reviews" => EntityKey::Review,
            "business" | "businesses" => EntityKey::Business,
            "analytics" => EntityKey::Analytics,
            "live_ops" | "liveops" => EntityKey::LiveOps,
            "daily_summary" => EntityKey::DailySummary,
            "campaign" | "campaigns" => EntityKey::Campaign,
            _ => EntityKey::Other(normalized),
        };
        Ok(key)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EntityKey::from(raw.as_str()))
    }
}
