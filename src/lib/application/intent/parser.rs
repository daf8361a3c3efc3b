use super::clock::Clock;
use crate::domain::{EntityKey, Filters, Intent};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde_json::{Number, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("could not tell which business data \"{utterance}\" is about")]
    Unresolved { utterance: String },
}

const ALIASES: &[(&str, EntityKey)] = &[
    ("appointment", EntityKey::Appointment),
    ("appointments", EntityKey::Appointment),
    ("booking", EntityKey::Appointment),
    ("bookings", EntityKey::Appointment),
    ("invoice", EntityKey::Invoice),
    ("invoices", EntityKey::Invoice),
    ("bill", EntityKey::Invoice),
    ("bills", EntityKey::Invoice),
    ("billing", EntityKey::Invoice),
    ("lead", EntityKey::Lead),
    ("leads", EntityKey::Lead),
    ("prospect", EntityKey::Lead),
    ("prospects", EntityKey::Lead),
    ("review", EntityKey::Review),
    ("reviews", EntityKey::Review),
    ("rating", EntityKey::Review),
    ("ratings", EntityKey::Review),
    ("feedback", EntityKey::Review),
    ("analytics", EntityKey::Analytics),
    ("footfall", EntityKey::Analytics),
    ("revenue", EntityKey::Analytics),
    ("metrics", EntityKey::Analytics),
    ("daily summary", EntityKey::DailySummary),
    ("daily report", EntityKey::DailySummary),
    ("live ops", EntityKey::LiveOps),
    ("liveops", EntityKey::LiveOps),
    ("activity feed", EntityKey::LiveOps),
    ("campaign", EntityKey::Campaign),
    ("campaigns", EntityKey::Campaign),
    ("whatsapp", EntityKey::Campaign),
    ("whatsapp campaign", EntityKey::Campaign),
    ("business", EntityKey::Business),
    ("businesses", EntityKey::Business),
];

const STATUSES: &[(&str, &str)] = &[
    ("open", "open"),
    ("confirmed", "confirmed"),
    ("completed", "completed"),
    ("cancelled", "cancelled"),
    ("canceled", "cancelled"),
    ("no_show", "no_show"),
    ("noshow", "no_show"),
    ("pending", "pending"),
    ("paid", "paid"),
    ("unpaid", "unpaid"),
    ("overdue", "overdue"),
    ("new", "new"),
    ("contacted", "contacted"),
    ("won", "won"),
    ("lost", "lost"),
];

const SOURCES: &[(&str, &str)] = &[
    ("web", "web"),
    ("website", "web"),
    ("referral", "referral"),
    ("referrals", "referral"),
    ("whatsapp", "whatsapp"),
    ("walk_in", "walk_in"),
    ("walkin", "walk_in"),
    ("instagram", "instagram"),
    ("facebook", "facebook"),
    ("google", "google"),
    ("ads", "ads"),
    ("phone", "phone"),
    ("email", "email"),
];

/// Turns free text into an [`Intent`].
#[derive(Clone)]
pub struct IntentParser {
    aliases: Vec<(Vec<String>, EntityKey)>,
    clock: Arc<dyn Clock>,
}

impl IntentParser {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let aliases = ALIASES
            .iter()
            .map(|(phrase, key)| (split_phrase(phrase), key.clone()))
            .collect();
        Self { aliases, clock }
    }

    /// Adds an alias; multi-word phrases are allowed.
    pub fn with_alias(mut self, phrase: &str, entity: EntityKey) -> Self {
        self.aliases.push((split_phrase(phrase), entity));
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn parse(&self, utterance: &str) -> Result<Intent, IntentError> {
        let instruction = utterance.trim();
        let words = tokenize(instruction);
        let entity = self
            .detect_entity(&words)
            .ok_or_else(|| IntentError::Unresolved {
                utterance: instruction.to_string(),
            })?;
        let filters = self.filters_from_words(&words, instruction);
        debug!(entity = %entity, filters = filters.len(), "parsed intent");
        Ok(Intent::new(entity, instruction).with_filters(filters))
    }

    /// Filter extraction on its own, for utterances whose entity is known.
    pub fn extract_filters(&self, utterance: &str) -> Filters {
        let words = tokenize(utterance);
        self.filters_from_words(&words, utterance)
    }

    fn detect_entity(&self, words: &[String]) -> Option<EntityKey> {
        for start in 0..words.len() {
            let best = self
                .aliases
                .iter()
                .filter(|(phrase, _)| words[start..].starts_with(phrase))
                .max_by_key(|(phrase, _)| phrase.len());
            if let Some((_, key)) = best {
                return Some(key.clone());
            }
        }
        None
    }

    fn filters_from_words(&self, words: &[String], raw: &str) -> Filters {
        let mut filters = Filters::new();
        if let Some((from, to)) = date_range(words, self.clock.today()) {
            filters.insert("date_from".into(), Value::String(iso(from)));
            filters.insert("date_to".into(), Value::String(iso(to)));
        }
        if let Some(status) = lookup(words, STATUSES) {
            filters.insert("status".into(), Value::String(status.into()));
        }
        if let Some(source) = source(words) {
            filters.insert("source".into(), Value::String(source.into()));
        }
        thresholds(words, &mut filters);
        if let Some(query) = quoted(raw) {
            filters.insert("query".into(), Value::String(query));
        }
        filters
    }
}

fn split_phrase(phrase: &str) -> Vec<String> {
    phrase
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Lowercased words with surrounding punctuation removed; `-` inside a word
/// is kept so ISO dates survive, while `no-show` style words are joined with `_`.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !(c.is_alphanumeric() || c == '$' || c == '.' || c == '-'))
                .trim_end_matches('.')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .map(|w| {
            if parse_date(&w).is_some() || w.chars().any(|c| c.is_ascii_digit()) {
                w
            } else {
                w.replace('-', "_")
            }
        })
        .collect()
}

fn parse_date(word: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(word, "%Y-%m-%d").ok()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_count(word: &str) -> Option<u64> {
    word.replace(',', "").parse().ok()
}

fn parse_amount(word: &str) -> Option<Number> {
    let cleaned = word.trim_start_matches('$').replace(',', "");
    if let Ok(int) = cleaned.parse::<u64>() {
        return Some(Number::from(int));
    }
    cleaned.parse::<f64>().ok().and_then(Number::from_f64)
}

fn date_range(words: &[String], today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let explicit: Vec<NaiveDate> = words.iter().filter_map(|w| parse_date(w)).collect();
    match explicit.as_slice() {
        [one] => return Some((*one, *one)),
        [a, b, ..] => return Some(((*a).min(*b), (*a).max(*b))),
        [] => {}
    }

    for window in words.windows(3) {
        if matches!(window[0].as_str(), "last" | "past" | "previous")
            && matches!(window[2].as_str(), "days" | "day")
        {
            if let Some(n) = parse_count(&window[1]).filter(|n| *n > 0) {
                let from = today.checked_sub_days(Days::new(n - 1))?;
                return Some((from, today));
            }
        }
    }

    for pair in words.windows(2) {
        let range = match (pair[0].as_str(), pair[1].as_str()) {
            ("this", "week") => week_of(today),
            ("last", "week") | ("previous", "week") => {
                week_of(today.checked_sub_days(Days::new(7))?)
            }
            ("this", "month") => month_of(today),
            ("last", "month") | ("previous", "month") => {
                month_of(today.checked_sub_months(Months::new(1))?)
            }
            _ => continue,
        };
        return range;
    }

    for word in words {
        let day = match word.as_str() {
            "today" | "tonight" => today,
            "yesterday" => today.checked_sub_days(Days::new(1))?,
            "tomorrow" => today.checked_add_days(Days::new(1))?,
            _ => continue,
        };
        return Some((day, day));
    }
    None
}

fn week_of(day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let monday = day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))?;
    Some((monday, monday.checked_add_days(Days::new(6))?))
}

fn month_of(day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = day.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

fn lookup(words: &[String], table: &[(&str, &'static str)]) -> Option<&'static str> {
    let joined: Vec<String> = words
        .windows(2)
        .map(|pair| format!("{}_{}", pair[0], pair[1]))
        .collect();
    words
        .iter()
        .chain(joined.iter())
        .find_map(|word| {
            table
                .iter()
                .find(|(alias, _)| *alias == word.as_str())
                .map(|(_, canonical)| *canonical)
        })
}

fn source(words: &[String]) -> Option<&'static str> {
    words.windows(2).find_map(|pair| {
        if !matches!(pair[0].as_str(), "from" | "via" | "source" | "through") {
            return None;
        }
        SOURCES
            .iter()
            .find(|(alias, _)| *alias == pair[1])
            .map(|(_, canonical)| *canonical)
    })
}

fn thresholds(words: &[String], filters: &mut Filters) {
    let mut i = 0;
    while i < words.len() {
        let rest = &words[i..];
        let (key, skip) = match rest {
            [a, ..] if matches!(a.as_str(), "top" | "first" | "limit") => ("limit", 1),
            [a, b, ..] if a == "page" && b == "size" => ("page_size", 2),
            [a, b, ..] if a == "at" && b == "least" => ("min_value", 2),
            [a, b, ..] if a == "more" && b == "than" => ("min_value", 2),
            [a, b, ..] if a == "less" && b == "than" => ("max_value", 2),
            [a, ..] if matches!(a.as_str(), "over" | "above") => ("min_value", 1),
            [a, ..] if matches!(a.as_str(), "under" | "below") => ("max_value", 1),
            _ => {
                i += 1;
                continue;
            }
        };
        if let Some(word) = rest.get(skip) {
            let value = match key {
                "limit" | "page_size" => parse_count(word).map(Number::from),
                _ => parse_amount(word),
            };
            if let Some(number) = value {
                filters
                    .entry(key.to_string())
                    .or_insert(Value::Number(number));
            }
        }
        i += skip;
    }
}

fn quoted(raw: &str) -> Option<String> {
    let start = raw.find('"')?;
    let rest = &raw[start + 1..];
    let end = rest.find('"')?;
    let inner = rest[..end].trim();
    (!inner.is_empty()).then(|| inner.to_string())
}
