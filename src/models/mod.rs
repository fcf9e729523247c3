use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ── Raw product ───────────────────────────────────────────────────────────────

/// One scraped card, every field still text as it appeared on the page.
/// Column order is the raw CSV layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawProduct {
    pub title: String,
    pub price: String,      // "$102.15" or "Price Unavailable"
    pub rating: String,     // "⭐ 3.9 / 5" or "Not Rated"
    pub colors: String,     // "3 Colors"
    pub size: String,
    pub gender: String,
    pub timestamp: String,  // extraction instant, ISO-8601
}

// ── Clean product ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanProduct {
    pub title: String,
    pub price: f64,         // target currency
    pub rating: f64,
    pub colors: u32,
    pub size: String,
    pub gender: String,
}

impl CleanProduct {
    pub const COLUMNS: [&'static str; 6] = ["title", "price", "rating", "colors", "size", "gender"];

    /// Row as spreadsheet cells, in `COLUMNS` order.
    pub fn to_cells(&self) -> Vec<serde_json::Value> {
        vec![
            self.title.clone().into(),
            self.price.into(),
            self.rating.into(),
            self.colors.into(),
            self.size.clone().into(),
            self.gender.clone().into(),
        ]
    }
}

// ── Candidate (normalizer intermediate) ──────────────────────────────────────

/// A row mid-normalization: any field may have been nulled out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCandidate {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub colors: Option<u32>,
    pub size: Option<String>,
    pub gender: Option<String>,
}

/// Full-row identity. Floats compare by bit pattern.
pub type CandidateKey = (
    Option<String>,
    Option<u64>,
    Option<u64>,
    Option<u32>,
    Option<String>,
    Option<String>,
);

impl ProductCandidate {
    pub fn key(&self) -> CandidateKey {
        (
            self.title.clone(),
            self.price.map(f64::to_bits),
            self.rating.map(f64::to_bits),
            self.colors,
            self.size.clone(),
            self.gender.clone(),
        )
    }

    /// `None` if any field is missing.
    pub fn complete(self) -> Option<CleanProduct> {
        Some(CleanProduct {
            title: self.title?,
            price: self.price?,
            rating: self.rating?,
            colors: self.colors?,
            size: self.size?,
            gender: self.gender?,
        })
    }
}

// ── Page range ────────────────────────────────────────────────────────────────

/// Validated crawl request: `1 <= start <= end`, `max_products >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
    max_products: usize,
}

impl PageRange {
    pub fn new(start: u32, end: u32, max_products: usize) -> Result<Self, PipelineError> {
        if start < 1 {
            return Err(PipelineError::invalid(format!("start page must be >= 1, got {start}")));
        }
        if end < start {
            return Err(PipelineError::invalid(format!(
                "end page {end} is before start page {start}"
            )));
        }
        if max_products < 1 {
            return Err(PipelineError::invalid("max products must be >= 1"));
        }
        Ok(Self { start, end, max_products })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn max_products(&self) -> usize {
        self.max_products
    }
}

// ── Load result ───────────────────────────────────────────────────────────────

/// Outcome of writing the clean batch; each sink succeeds or fails on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    pub csv_saved: bool,
    pub sheets_url: Option<String>,
    pub db_saved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_range_validation() {
        assert!(PageRange::new(1, 50, 1000).is_ok());
        assert!(PageRange::new(3, 3, 1).is_ok());
        assert!(matches!(PageRange::new(0, 5, 10), Err(PipelineError::InvalidArgument(_))));
        assert!(matches!(PageRange::new(5, 4, 10), Err(PipelineError::InvalidArgument(_))));
        assert!(matches!(PageRange::new(1, 4, 0), Err(PipelineError::InvalidArgument(_))));
    }

    #[test]
    fn test_candidate_complete() {
        let full = ProductCandidate {
            title: Some("hoodie 3".into()),
            price: Some(7_950_080.0),
            rating: Some(4.8),
            colors: Some(3),
            size: Some("L".into()),
            gender: Some("unisex".into()),
        };
        let clean = full.clone().complete().unwrap();
        assert_eq!(clean.title, "hoodie 3");
        assert_eq!(clean.colors, 3);

        let missing_rating = ProductCandidate { rating: None, ..full };
        assert!(missing_rating.complete().is_none());
    }

    #[test]
    fn test_cells_follow_columns() {
        let p = CleanProduct {
            title: "pants 4".into(),
            price: 1.5,
            rating: 3.3,
            colors: 2,
            size: "XL".into(),
            gender: "men".into(),
        };
        let cells = p.to_cells();
        assert_eq!(cells.len(), CleanProduct::COLUMNS.len());
        assert_eq!(cells[0], serde_json::json!("pants 4"));
        assert_eq!(cells[3], serde_json::json!(2));
    }
}
