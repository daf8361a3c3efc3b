//! Deterministic reductions over normalized rows.
//!
//! The instruction is scanned for a handful of shapes ("group by X",
//! "top N by X", "count"/"how many", "total X"/"sum of X"). The result is
//! sent to the completion engine next to the rows and is also what a
//! partial answer is built from when the loop runs out of rounds.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

const STOP_WORDS: &[&str] = &[
    "for", "from", "in", "on", "this", "last", "with", "and", "today", "yesterday", "per",
    "please", "where", "during", "over", "between", "of",
];

const MAX_FIELD_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reduction {
    Grouped {
        field: String,
        counts: BTreeMap<String, u64>,
    },
    Top {
        limit: usize,
        by: Option<String>,
        rows: Vec<Value>,
    },
    Count {
        count: usize,
    },
    Total {
        field: String,
        total: f64,
    },
    Rows {
        count: usize,
    },
}

impl Reduction {
    /// Compact JSON form; for groupings this is the bare count map.
    pub fn to_value(&self) -> Value {
        match self {
            Reduction::Grouped { counts, .. } => json!(counts),
            Reduction::Top { rows, .. } => Value::Array(rows.clone()),
            Reduction::Count { count } | Reduction::Rows { count } => json!(count),
            Reduction::Total { total, .. } => json!(total),
        }
    }

    /// One-line human summary.
    pub fn digest(&self) -> String {
        match self {
            Reduction::Grouped { field, counts } => {
                let parts: Vec<String> = counts.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                format!("grouped by {field}: {}", parts.join(", "))
            }
            Reduction::Top { limit, by, rows } => match by {
                Some(field) => format!("top {} of {limit} requested by {field}", rows.len()),
                None => format!("first {} of {limit} requested", rows.len()),
            },
            Reduction::Count { count } => format!("{count} matching records"),
            Reduction::Total { field, total } => format!("total {field}: {total}"),
            Reduction::Rows { count } => format!("{count} records"),
        }
    }
}

pub fn reduce_rows(instruction: &str, rows: &[&Value]) -> Reduction {
    let words: Vec<String> = instruction
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(pos) = find_pair(&words, "group", "by").or_else(|| find_pair(&words, "grouped", "by")) {
        if let Some(field) = resolve_field(&words[pos + 2..], rows) {
            return group(field, rows);
        }
    }
    if let Some(pos) = find_pair(&words, "breakdown", "by") {
        if let Some(field) = resolve_field(&words[pos + 2..], rows) {
            return group(field, rows);
        }
    }

    if let Some(pos) = words.iter().position(|w| w == "top") {
        if let Some(limit) = words.get(pos + 1).and_then(|w| w.parse::<usize>().ok()) {
            let by = words
                .iter()
                .skip(pos + 2)
                .position(|w| w == "by")
                .and_then(|offset| resolve_field(&words[pos + 3 + offset..], rows));
            return top(limit, by, rows);
        }
    }

    for (i, word) in words.iter().enumerate() {
        let field_start = match word.as_str() {
            "total" | "sum" => {
                if words.get(i + 1).is_some_and(|w| w == "of") {
                    i + 2
                } else {
                    i + 1
                }
            }
            _ => continue,
        };
        if let Some(field) = resolve_field(&words[field_start.min(words.len())..], rows) {
            return total(field, rows);
        }
    }

    if words.iter().any(|w| w == "count")
        || find_pair(&words, "how", "many").is_some()
        || find_pair(&words, "number", "of").is_some()
    {
        return Reduction::Count { count: rows.len() };
    }

    Reduction::Rows { count: rows.len() }
}

fn find_pair(words: &[String], first: &str, second: &str) -> Option<usize> {
    words
        .windows(2)
        .position(|pair| pair[0] == first && pair[1] == second)
}

/// Picks the longest candidate built from the leading words that names a
/// field present in at least one row; single words are tried last-first so
/// "lead source" resolves to `source` when only that key exists.
fn resolve_field(words: &[String], rows: &[&Value]) -> Option<String> {
    let phrase: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .take_while(|w| !STOP_WORDS.contains(w))
        .take(MAX_FIELD_WORDS)
        .collect();
    if phrase.is_empty() {
        return None;
    }

    let mut candidates = Vec::new();
    for len in (1..=phrase.len()).rev() {
        for start in (0..=phrase.len() - len).rev() {
            candidates.push(phrase[start..start + len].join("_"));
        }
    }
    for candidate in &candidates {
        let singular = candidate.strip_suffix('s').unwrap_or(candidate);
        for name in [candidate.as_str(), singular] {
            if rows.iter().any(|row| row.get(name).is_some()) {
                return Some(name.to_string());
            }
        }
    }
    None
}

fn group(field: String, rows: &[&Value]) -> Reduction {
    let mut counts = BTreeMap::new();
    for row in rows {
        let key = match row.get(&field) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        };
        *counts.entry(key).or_insert(0) += 1;
    }
    Reduction::Grouped { field, counts }
}

fn top(limit: usize, by: Option<String>, rows: &[&Value]) -> Reduction {
    let mut ordered: Vec<&Value> = rows.to_vec();
    if let Some(field) = &by {
        ordered.sort_by(|a, b| {
            let a = numeric(a.get(field)).unwrap_or(f64::MIN);
            let b = numeric(b.get(field)).unwrap_or(f64::MIN);
            b.total_cmp(&a)
        });
    }
    Reduction::Top {
        limit,
        by,
        rows: ordered.into_iter().take(limit).cloned().collect(),
    }
}

fn total(field: String, rows: &[&Value]) -> Reduction {
    let total = rows.iter().filter_map(|row| numeric(row.get(&field))).sum();
    Reduction::Total { field, total }
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
}
