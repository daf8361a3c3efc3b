//! Argument builders for the entities known out of the box.

use super::descriptor::ArgumentContext;
use serde_json::{Map, Value, json};

pub const DEFAULT_METRICS: [&str; 3] = ["footfall", "revenue", "leads"];
const DEFAULT_PAGE_SIZE: u64 = 20;
const DEFAULT_SEARCH_LIMIT: u64 = 10;

fn base(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("business_id".into(), Value::String(ctx.tenant_id.to_string()));
    args
}

fn copy(ctx: &ArgumentContext<'_>, args: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = ctx.filter(key) {
            args.insert((*key).to_string(), value.clone());
        }
    }
}

fn date_range_or_today(ctx: &ArgumentContext<'_>, args: &mut Map<String, Value>) {
    let today = Value::String(ctx.today_iso());
    let from = ctx.filter("date_from").cloned().unwrap_or_else(|| today.clone());
    let to = ctx.filter("date_to").cloned().unwrap_or_else(|| from.clone());
    args.insert("date_from".into(), from);
    args.insert("date_to".into(), to);
}

fn metrics(ctx: &ArgumentContext<'_>) -> Value {
    match ctx.filter("metrics") {
        Some(Value::Array(items)) if !items.is_empty() => Value::Array(items.clone()),
        Some(Value::String(list)) if !list.trim().is_empty() => Value::Array(
            list.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| Value::String(m.to_string()))
                .collect(),
        ),
        _ => json!(DEFAULT_METRICS),
    }
}

pub fn appointments(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    date_range_or_today(ctx, &mut args);
    copy(ctx, &mut args, &["status"]);
    let page = ctx.filter_u64("page").unwrap_or(1);
    let page_size = ctx
        .filter_u64("page_size")
        .or_else(|| ctx.filter_u64("limit"))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    args.insert("page".into(), json!(page));
    args.insert("page_size".into(), json!(page_size));
    args
}

pub fn invoices(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    copy(
        ctx,
        &mut args,
        &["status", "date_from", "date_to", "min_value", "max_value", "limit"],
    );
    args
}

pub fn leads(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    copy(
        ctx,
        &mut args,
        &["status", "source", "date_from", "date_to", "limit"],
    );
    args
}

pub fn reviews(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    date_range_or_today(ctx, &mut args);
    copy(ctx, &mut args, &["min_value", "max_value", "limit"]);
    args
}

pub fn business_search(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    let query = ctx
        .filter("query")
        .cloned()
        .unwrap_or_else(|| Value::String(ctx.tenant_id.to_string()));
    args.insert("query".into(), query);
    let limit = ctx.filter_u64("limit").unwrap_or(DEFAULT_SEARCH_LIMIT);
    args.insert("limit".into(), json!(limit));
    args
}

pub fn analytics(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    let today = ctx.today_iso();
    let from = ctx
        .filter("date_from")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| today.clone());
    let to = ctx
        .filter("date_to")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| from.clone());
    args.insert("metrics".into(), metrics(ctx));
    args.insert("period".into(), Value::String(format!("{from}..{to}")));
    args
}

/// The feed covers one day: the start of any requested range.
pub fn live_ops(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    let date = ctx
        .filter("date_from")
        .cloned()
        .unwrap_or_else(|| Value::String(ctx.today_iso()));
    args.insert("date".into(), date);
    copy(ctx, &mut args, &["limit"]);
    args
}

pub fn daily_summary(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    let date = ctx
        .filter("date_from")
        .cloned()
        .unwrap_or_else(|| Value::String(ctx.today_iso()));
    args.insert("date".into(), date);
    args.insert("metrics".into(), metrics(ctx));
    args
}

pub fn campaigns(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args = base(ctx);
    copy(ctx, &mut args, &["status", "limit"]);
    args
}

/// Used for entities declared only in configuration.
pub fn passthrough(ctx: &ArgumentContext<'_>) -> Map<String, Value> {
    let mut args: Map<String, Value> = ctx
        .filters
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    args.insert("business_id".into(), Value::String(ctx.tenant_id.to_string()));
    args
}
