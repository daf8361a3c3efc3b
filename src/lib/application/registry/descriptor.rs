use crate::domain::Filters;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

/// Everything an argument builder may look at.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentContext<'a> {
    pub tenant_id: &'a str,
    pub filters: &'a Filters,
    pub today: NaiveDate,
}

impl<'a> ArgumentContext<'a> {
    pub fn new(tenant_id: &'a str, filters: &'a Filters, today: NaiveDate) -> Self {
        Self {
            tenant_id,
            filters,
            today,
        }
    }

    pub fn filter(&self, name: &str) -> Option<&'a Value> {
        self.filters.get(name).filter(|value| !value.is_null())
    }

    pub fn filter_u64(&self, name: &str) -> Option<u64> {
        self.filter(name).and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn today_iso(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }
}

pub type ArgumentBuilder = fn(&ArgumentContext<'_>) -> Map<String, Value>;

/// Binds an entity to its remote operations.
///
/// The fallback is called with `fallback_builder`'s arguments when set,
/// otherwise with the native builder's.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub operation: String,
    pub fallback: Option<String>,
    pub builder: ArgumentBuilder,
    pub fallback_builder: Option<ArgumentBuilder>,
}

impl ToolDescriptor {
    pub fn new(operation: impl Into<String>, builder: ArgumentBuilder) -> Self {
        Self {
            operation: operation.into(),
            fallback: None,
            builder,
            fallback_builder: None,
        }
    }

    /// Fallback operation that accepts the native operation's arguments.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self.fallback_builder = None;
        self
    }

    /// Fallback operation with its own argument shape.
    pub fn with_fallback_using(
        mut self,
        fallback: impl Into<String>,
        builder: ArgumentBuilder,
    ) -> Self {
        self.fallback = Some(fallback.into());
        self.fallback_builder = Some(builder);
        self
    }

    pub fn build_arguments(&self, ctx: &ArgumentContext<'_>) -> Value {
        Value::Object((self.builder)(ctx))
    }

    pub fn build_fallback_arguments(&self, ctx: &ArgumentContext<'_>) -> Value {
        let builder = self.fallback_builder.unwrap_or(self.builder);
        Value::Object(builder(ctx))
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("operation", &self.operation)
            .field("fallback", &self.fallback)
            .field("fallback_builder", &self.fallback_builder.is_some())
            .finish_non_exhaustive()
    }
}
