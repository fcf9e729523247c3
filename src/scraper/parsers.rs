use crate::config::SelectorConfig;
use crate::error::PipelineError;
use crate::models::RawProduct;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

pub const PRICE_UNAVAILABLE: &str = "Price Unavailable";
pub const NOT_RATED: &str = "Not Rated";
pub const NO_COLOR_INFO: &str = "No Color Info";
pub const NO_SIZE_INFO: &str = "No Size Info";
pub const NO_GENDER_INFO: &str = "No Gender Info";

const RATING_MARKER: &str = "Rating:";
const COLORS_MARKER: &str = "Colors";
const SIZE_MARKER: &str = "Size:";
const GENDER_MARKER: &str = "Gender:";

/// A single card could not be turned into a record. Never leaves the card loop.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("failed to extract {field}: {message}")]
    Field { field: &'static str, message: String },
}

fn selector(field: &'static str, css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Field {
        field,
        message: format!("selector {css:?}: {e:?}"),
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// ── Listing page ──────────────────────────────────────────────────────────────

/// Parse one listing page into raw records.
///
/// Card and detail selectors are compiled up front: if either is broken the
/// whole page fails. Everything after that is per card, and a bad card is
/// logged and dropped.
pub fn parse_listing_page(
    html: &str,
    selectors: &SelectorConfig,
    page: u32,
) -> Result<Vec<RawProduct>, PipelineError> {
    let card_sel = Selector::parse(&selectors.card)
        .map_err(|e| PipelineError::page(page, format!("card selector: {e:?}")))?;
    let details_sel = Selector::parse(&selectors.details)
        .map_err(|e| PipelineError::page(page, format!("details selector: {e:?}")))?;

    let doc = Html::parse_document(html);

    let products = doc
        .select(&card_sel)
        .enumerate()
        .filter_map(|(i, card)| match card.select(&details_sel).next() {
            Some(details) => Some((i, details)),
            None => {
                debug!("Page {} card {}: no detail block, skipping", page, i);
                None
            }
        })
        .filter_map(|(i, details)| match parse_product(details, selectors) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!("Page {} card {}: {}", page, i, e);
                None
            }
        })
        .collect();

    Ok(products)
}

// ── Single card ───────────────────────────────────────────────────────────────

pub fn parse_product(
    details: ElementRef<'_>,
    selectors: &SelectorConfig,
) -> Result<RawProduct, ParseError> {
    Ok(RawProduct {
        title: extract_title(details, &selectors.title)?,
        price: extract_price(details, &selectors.price, &selectors.price_fallback)?,
        rating: extract_rating(details, &selectors.text)?,
        colors: extract_marked(details, &selectors.text, COLORS_MARKER, false)
            .unwrap_or_else(|| NO_COLOR_INFO.to_string()),
        size: extract_marked(details, &selectors.text, SIZE_MARKER, true)
            .unwrap_or_else(|| NO_SIZE_INFO.to_string()),
        gender: extract_marked(details, &selectors.text, GENDER_MARKER, true)
            .unwrap_or_else(|| NO_GENDER_INFO.to_string()),
        timestamp: extraction_timestamp(),
    })
}

pub fn extract_title(details: ElementRef<'_>, css: &str) -> Result<String, ParseError> {
    let sel = selector("title", css)?;
    details
        .select(&sel)
        .next()
        .map(text_of)
        .ok_or(ParseError::MissingField("title"))
}

/// Primary price marker, then the fallback, then the sentinel.
pub fn extract_price(
    details: ElementRef<'_>,
    primary: &str,
    fallback: &str,
) -> Result<String, ParseError> {
    for css in [primary, fallback] {
        let sel = selector("price", css)?;
        if let Some(el) = details.select(&sel).next() {
            return Ok(text_of(el));
        }
    }
    Ok(PRICE_UNAVAILABLE.to_string())
}

pub fn extract_rating(details: ElementRef<'_>, text_css: &str) -> Result<String, ParseError> {
    let sel = selector("rating", text_css)?;
    let rating = details
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .find(|t| t.contains(RATING_MARKER))
        .map(|t| t.replace(RATING_MARKER, "").trim().to_string());
    Ok(rating.unwrap_or_else(|| NOT_RATED.to_string()))
}

/// First text fragment containing `marker`. Lookup problems read as "absent".
pub fn extract_marked(
    details: ElementRef<'_>,
    text_css: &str,
    marker: &str,
    strip_marker: bool,
) -> Option<String> {
    let sel = Selector::parse(text_css).ok()?;
    details
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .find(|t| t.contains(marker))
        .map(|t| {
            if strip_marker {
                t.replace(marker, "").trim().to_string()
            } else {
                t.trim().to_string()
            }
        })
}

/// Sortable extraction instant, e.g. `2025-01-31T08:15:42.123456`.
pub fn extraction_timestamp() -> String {
    Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
