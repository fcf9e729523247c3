use crate::error::PipelineError;
use crate::models::{CleanProduct, ProductCandidate, RawProduct};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info};

use super::parsers::{NOT_RATED, NO_COLOR_INFO, NO_GENDER_INFO, NO_SIZE_INFO, PRICE_UNAVAILABLE};

pub const DEFAULT_EXCHANGE_RATE: f64 = 16_000.0;

// ── Dirty sentinels ───────────────────────────────────────────────────────────

const DIRTY_TITLES: &[&str] = &["Unknown Product"];
const DIRTY_RATINGS: &[&str] = &["Invalid Rating / 5", NOT_RATED];
const DIRTY_PRICES: &[&str] = &[PRICE_UNAVAILABLE];
const DIRTY_COLORS: &[&str] = &[NO_COLOR_INFO];
const DIRTY_SIZES: &[&str] = &[NO_SIZE_INFO];
const DIRTY_GENDERS: &[&str] = &[NO_GENDER_INFO];

/// `None` for blank cells and known placeholder values. The star glyph the
/// catalog puts in front of ratings is ignored when matching.
fn scrub(value: &str, dirty: &[&str]) -> Option<String> {
    let core = value.trim_matches(|c: char| c.is_whitespace() || c == '⭐');
    if core.is_empty() || dirty.contains(&core) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Remove a `"{label}:"` prefix (anywhere in the text) and trim.
/// "Size: Small" with label "Size" → "Small"
pub fn strip_label(value: Option<&str>, label: &str) -> Option<String> {
    let marker = format!("{label}:");
    value.map(|v| v.replace(&marker, "").trim().to_string())
}

/// Strip the label first so that a bare label or a labelled placeholder
/// ("Size:", "Size: No Size Info") scrubs to `None` as well.
fn scrub_labeled(value: &str, label: &str, dirty: &[&str]) -> Option<String> {
    scrub(&strip_label(Some(value), label)?, dirty)
}

// ── Cleaner ───────────────────────────────────────────────────────────────────

/// Turns scraped text into typed, de-duplicated, null-free rows.
pub struct Cleaner {
    exchange_rate: f64,
    decimal: Regex,
    integer: Regex,
}

impl Cleaner {
    pub fn new(exchange_rate: f64) -> Result<Self, PipelineError> {
        if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
            return Err(PipelineError::Transform(format!(
                "exchange rate must be a positive number, got {exchange_rate}"
            )));
        }
        let decimal = Regex::new(r"[\d.]+")
            .map_err(|e| PipelineError::Transform(format!("decimal pattern: {e}")))?;
        let integer = Regex::new(r"\d+")
            .map_err(|e| PipelineError::Transform(format!("integer pattern: {e}")))?;
        Ok(Self {
            exchange_rate,
            decimal,
            integer,
        })
    }

    fn first_decimal(&self, s: &str) -> Option<f64> {
        let value: f64 = self.decimal.find(s)?.as_str().parse().ok()?;
        value.is_finite().then_some(value)
    }

    /// "$1,200.50" → 1200.5 × rate. Anything unparseable → `None`.
    pub fn parse_price(&self, s: Option<&str>) -> Option<f64> {
        let s = scrub(s?, DIRTY_PRICES)?;
        let cleaned = s.replace(['$', ','], "");
        let converted = self.first_decimal(&cleaned)? * self.exchange_rate;
        converted.is_finite().then_some(converted)
    }

    /// "⭐ 4.8 / 5" → 4.8 | "4.5 out of 5" → 4.5
    pub fn parse_rating(&self, s: Option<&str>) -> Option<f64> {
        let s = scrub(s?, DIRTY_RATINGS)?;
        self.first_decimal(&s)
    }

    /// "8 colors" → 8. Counts beyond `u32::MAX` are treated as unparseable.
    pub fn parse_colors(&self, s: Option<&str>) -> Option<u32> {
        self.integer.find(s?)?.as_str().parse().ok()
    }

    /// Normalize a batch: convert fields, drop exact duplicates (first one
    /// wins), then drop rows with a missing field. Input order is kept.
    pub fn clean<T: IntoCandidate>(&self, rows: Vec<T>) -> Vec<CleanProduct> {
        let total = rows.len();
        let candidates: Vec<ProductCandidate> =
            rows.into_iter().map(|r| r.into_candidate(self)).collect();

        let mut seen = HashSet::new();
        let unique: Vec<ProductCandidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.key()))
            .collect();
        debug!("{} duplicate rows removed", total - unique.len());

        let after_dedup = unique.len();
        let clean: Vec<CleanProduct> = unique
            .into_iter()
            .filter_map(ProductCandidate::complete)
            .collect();
        debug!("{} incomplete rows removed", after_dedup - clean.len());

        info!("Transform done: {} of {} rows valid", clean.len(), total);
        clean
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Anything the cleaner can normalize. Clean rows are accepted too, so the
/// cleaner can be re-applied to its own output without changing it.
pub trait IntoCandidate {
    fn into_candidate(self, cleaner: &Cleaner) -> ProductCandidate;
}

impl IntoCandidate for RawProduct {
    fn into_candidate(self, cleaner: &Cleaner) -> ProductCandidate {
        let title = scrub(&self.title, DIRTY_TITLES);
        let price = scrub(&self.price, DIRTY_PRICES);
        let rating = scrub(&self.rating, DIRTY_RATINGS);
        let colors = scrub(&self.colors, DIRTY_COLORS);
        let size = scrub_labeled(&self.size, "Size", DIRTY_SIZES);
        let gender = scrub_labeled(&self.gender, "Gender", DIRTY_GENDERS);

        ProductCandidate {
            title: title.map(|t| t.to_lowercase()),
            price: cleaner.parse_price(price.as_deref()),
            rating: cleaner.parse_rating(rating.as_deref()),
            colors: cleaner.parse_colors(colors.as_deref()),
            size,
            gender: gender.map(|g| g.to_lowercase()),
        }
    }
}

impl IntoCandidate for CleanProduct {
    fn into_candidate(self, _cleaner: &Cleaner) -> ProductCandidate {
        ProductCandidate {
            title: scrub(&self.title, DIRTY_TITLES).map(|t| t.to_lowercase()),
            price: Some(self.price),
            rating: Some(self.rating),
            colors: Some(self.colors),
            size: scrub_labeled(&self.size, "Size", DIRTY_SIZES),
            gender: scrub_labeled(&self.gender, "Gender", DIRTY_GENDERS)
                .map(|g| g.to_lowercase()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
