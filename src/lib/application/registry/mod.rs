//! Entity → remote operation table.

pub mod builtin;
mod descriptor;

pub use descriptor::{ArgumentBuilder, ArgumentContext, ToolDescriptor};

use crate::config::EntityConfig;
use crate::domain::EntityKey;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no tool is registered for entity '{0}'")]
    UnknownEntity(EntityKey),
}

/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    descriptors: HashMap<EntityKey, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(
            EntityKey::Appointment,
            ToolDescriptor::new("appointments.list", builtin::appointments)
                .with_fallback("appointments_list"),
        );
        registry.register(
            EntityKey::Invoice,
            ToolDescriptor::new("invoice.list", builtin::invoices),
        );
        registry.register(EntityKey::Lead, ToolDescriptor::new("leads.list", builtin::leads));
        registry.register(
            EntityKey::Review,
            ToolDescriptor::new("reviews.list", builtin::reviews)
                .with_fallback_using("live_ops.events", builtin::live_ops),
        );
        registry.register(
            EntityKey::Business,
            ToolDescriptor::new("business.search", builtin::business_search),
        );
        registry.register(
            EntityKey::Analytics,
            ToolDescriptor::new("analytics.report", builtin::analytics)
                .with_fallback("analytics_report"),
        );
        registry.register(
            EntityKey::LiveOps,
            ToolDescriptor::new("live_ops.events", builtin::live_ops),
        );
        registry.register(
            EntityKey::DailySummary,
            ToolDescriptor::new("daily_summary.generate", builtin::daily_summary)
                .with_fallback_using("analytics.report", builtin::analytics),
        );
        registry.register(
            EntityKey::Campaign,
            ToolDescriptor::new("campaign.list", builtin::campaigns),
        );
        registry
    }

    /// Builtin table with configured overrides and additions applied.
    ///
    /// Entries are expected to be validated already: a new key always
    /// carries an operation.
    pub fn from_config(entities: &[EntityConfig]) -> Self {
        let mut registry = Self::builtin();
        for entry in entities {
            let descriptor = match registry.descriptors.get(&entry.key) {
                Some(existing) => {
                    let mut updated = existing.clone();
                    if let Some(operation) = &entry.operation {
                        updated.operation = operation.clone();
                    }
                    if let Some(fallback) = &entry.fallback {
                        updated = updated.with_fallback(fallback.clone());
                    }
                    updated
                }
                None => {
                    let operation = entry.operation.clone().unwrap_or_default();
                    let descriptor = ToolDescriptor::new(operation, builtin::passthrough);
                    match &entry.fallback {
                        Some(fallback) => descriptor.with_fallback(fallback.clone()),
                        None => descriptor,
                    }
                }
            };
            info!(
                entity = %entry.key,
                operation = descriptor.operation.as_str(),
                fallback = ?descriptor.fallback,
                "registered entity from configuration"
            );
            registry.register(entry.key.clone(), descriptor);
        }
        registry
    }

    /// Adds or replaces the descriptor for `key`.
    pub fn register(&mut self, key: EntityKey, descriptor: ToolDescriptor) {
        self.descriptors.insert(key, descriptor);
    }

    pub fn resolve(&self, key: &EntityKey) -> Result<&ToolDescriptor, RegistryError> {
        self.descriptors
            .get(key)
            .ok_or_else(|| RegistryError::UnknownEntity(key.clone()))
    }

    /// Registered keys in stable order.
    pub fn entities(&self) -> Vec<&EntityKey> {
        let mut keys: Vec<&EntityKey> = self.descriptors.keys().collect();
        keys.sort();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &ToolDescriptor)> {
        let mut entries: Vec<_> = self.descriptors.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Filters;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
    }

    #[test]
    fn every_builder_carries_the_tenant() {
        let registry = ToolRegistry::builtin();
        let filters = Filters::new();
        for key in EntityKey::BUILTIN.iter() {
            let descriptor = registry.resolve(key).expect("builtin entity");
            let args = descriptor.build_arguments(&ArgumentContext::new("biz-42", &filters, day()));
            assert_eq!(args["business_id"], json!("biz-42"), "entity {key}");
        }
    }

    #[test]
    fn tenant_cannot_be_overridden_by_filters() {
        let mut filters = Filters::new();
        filters.insert("business_id".into(), json!("someone-else"));
        let ctx = ArgumentContext::new("biz-1", &filters, day());
        assert_eq!(builtin::passthrough(&ctx)["business_id"], json!("biz-1"));
        assert_eq!(builtin::leads(&ctx)["business_id"], json!("biz-1"));
    }

    #[test]
    fn appointment_defaults() {
        let filters = Filters::new();
        let args = builtin::appointments(&ArgumentContext::new("7", &filters, day()));
        assert_eq!(args["date_from"], json!("2024-05-01"));
        assert_eq!(args["date_to"], json!("2024-05-01"));
        assert_eq!(args["page"], json!(1));
        assert_eq!(args["page_size"], json!(20));
        assert!(!args.contains_key("status"));
    }

    #[test]
    fn appointment_limit_becomes_page_size() {
        let mut filters = Filters::new();
        filters.insert("limit".into(), json!(5));
        filters.insert("status".into(), json!("cancelled"));
        let args = builtin::appointments(&ArgumentContext::new("7", &filters, day()));
        assert_eq!(args["page_size"], json!(5));
        assert_eq!(args["status"], json!("cancelled"));
    }

    #[test]
    fn analytics_defaults_metrics_and_period() {
        let filters = Filters::new();
        let args = builtin::analytics(&ArgumentContext::new("7", &filters, day()));
        assert_eq!(args["metrics"], json!(["footfall", "revenue", "leads"]));
        assert_eq!(args["period"], json!("2024-05-01..2024-05-01"));
    }

    #[test]
    fn fallbacks_get_arguments_in_their_own_shape() {
        let registry = ToolRegistry::builtin();
        let mut filters = Filters::new();
        filters.insert("date_from".into(), json!("2024-04-29"));
        let ctx = ArgumentContext::new("7", &filters, day());

        let summary = registry.resolve(&EntityKey::DailySummary).expect("summary");
        let args = summary.build_fallback_arguments(&ctx);
        assert_eq!(args["period"], json!("2024-04-29..2024-04-29"));
        assert_eq!(args["metrics"], json!(["footfall", "revenue", "leads"]));
        assert!(args.get("date").is_none());

        let review = registry.resolve(&EntityKey::Review).expect("review");
        let args = review.build_fallback_arguments(&ctx);
        assert_eq!(args, json!({"business_id": "7", "date": "2024-04-29"}));
    }

    #[test]
    fn same_shape_fallback_reuses_native_arguments() {
        let registry = ToolRegistry::builtin();
        let filters = Filters::new();
        let ctx = ArgumentContext::new("7", &filters, day());
        let appointment = registry.resolve(&EntityKey::Appointment).expect("appointment");
        assert_eq!(
            appointment.build_fallback_arguments(&ctx),
            appointment.build_arguments(&ctx)
        );
    }

    #[test]
    fn configured_fallback_drops_builtin_fallback_shape() {
        let registry = ToolRegistry::from_config(&[EntityConfig {
            key: EntityKey::DailySummary,
            operation: None,
            fallback: Some("summary_v1".into()),
        }]);
        let summary = registry.resolve(&EntityKey::DailySummary).expect("summary");
        let filters = Filters::new();
        let ctx = ArgumentContext::new("7", &filters, day());
        assert_eq!(summary.fallback.as_deref(), Some("summary_v1"));
        assert_eq!(
            summary.build_fallback_arguments(&ctx),
            summary.build_arguments(&ctx)
        );
    }

    #[test]
    fn business_search_falls_back_to_tenant_query() {
        let filters = Filters::new();
        let args = builtin::business_search(&ArgumentContext::new("salon-9", &filters, day()));
        assert_eq!(args["query"], json!("salon-9"));
        assert_eq!(args["limit"], json!(10));
    }

    #[test]
    fn unknown_entity_is_reported() {
        let registry = ToolRegistry::builtin();
        let missing = EntityKey::from("loyalty");
        assert_eq!(
            registry.resolve(&missing).unwrap_err(),
            RegistryError::UnknownEntity(missing.clone())
        );
    }

    #[test]
    fn configuration_overrides_and_extends() {
        let registry = ToolRegistry::from_config(&[
            EntityConfig {
                key: EntityKey::Lead,
                operation: Some("crm.leads".into()),
                fallback: Some("leads_list".into()),
            },
            EntityConfig {
                key: EntityKey::from("loyalty"),
                operation: Some("loyalty.points".into()),
                fallback: None,
            },
        ]);
        let lead = registry.resolve(&EntityKey::Lead).expect("lead");
        assert_eq!(lead.operation, "crm.leads");
        assert_eq!(lead.fallback.as_deref(), Some("leads_list"));

        let loyalty = registry.resolve(&EntityKey::from("loyalty")).expect("loyalty");
        let mut filters = Filters::new();
        filters.insert("tier".into(), Value::String("gold".into()));
        let args = loyalty.build_arguments(&ArgumentContext::new("3", &filters, day()));
        assert_eq!(args, json!({"business_id": "3", "tier": "gold"}));
    }

    #[test]
    fn register_replaces_existing_descriptor() {
        let mut registry = ToolRegistry::builtin();
        registry.register(
            EntityKey::Campaign,
            ToolDescriptor::new("campaigns.v2", builtin::campaigns),
        );
        assert_eq!(
            registry.resolve(&EntityKey::Campaign).expect("campaign").operation,
            "campaigns.v2"
        );
        assert_eq!(registry.entities().len(), EntityKey::BUILTIN.len());
    }
}
