pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::SelectorConfig;
use crate::error::PipelineError;
use crate::models::{PageRange, RawProduct};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use self::http_client::FetchOutcome;
use self::parsers::parse_listing_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where listing pages come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Errors only if the page locator itself cannot be built.
    async fn fetch_page(&self, page: u32) -> Result<FetchOutcome, PipelineError>;
}

/// What one page produced. "Could not fetch" and "fetched, but nothing on it"
/// are kept apart because only the former ends a crawl.
#[derive(Debug, Clone, PartialEq)]
pub enum PageYield {
    Products(Vec<RawProduct>),
    Empty,
    Unavailable,
}

// ── Catalog scraper ───────────────────────────────────────────────────────────

pub struct FashionScraper<S> {
    source: S,
    selectors: SelectorConfig,
    delay: Duration,
}

impl<S: PageSource> FashionScraper<S> {
    pub fn new(source: S, selectors: SelectorConfig, delay: Duration) -> Self {
        Self {
            source,
            selectors,
            delay,
        }
    }

    pub async fn extract_page(&self, page: u32) -> Result<PageYield, PipelineError> {
        let html = match self.source.fetch_page(page).await? {
            FetchOutcome::Content(html) => html,
            FetchOutcome::Unavailable(reason) => {
                warn!("Page {} unavailable: {}", page, reason);
                return Ok(PageYield::Unavailable);
            }
        };

        let products = parse_listing_page(&html, &self.selectors, page)?;
        if products.is_empty() {
            Ok(PageYield::Empty)
        } else {
            Ok(PageYield::Products(products))
        }
    }

    /// Walk the page range until it ends, the cap is hit, or the site stops
    /// answering. A failing page is logged and skipped.
    pub async fn crawl(&self, range: PageRange) -> Result<Vec<RawProduct>, PipelineError> {
        let cap = range.max_products();
        let mut all_products: Vec<RawProduct> = Vec::new();
        let mut page = range.start();

        loop {
            info!("Extracting page {}", page);

            let mut polite = true;
            match self.extract_page(page).await {
                Ok(PageYield::Unavailable) => {
                    info!("Page {} unreachable, stopping pagination", page);
                    break;
                }
                Ok(PageYield::Empty) => {
                    debug!("Page {}: no product cards", page);
                }
                Ok(PageYield::Products(products)) => {
                    info!("  Page {}: {} products", page, products.len());
                    all_products.extend(products);
                    if all_products.len() >= cap {
                        all_products.truncate(cap);
                        info!("Reached product cap ({}), stopping", cap);
                        break;
                    }
                }
                Err(e) => {
                    error!("Error on page {}: {}", page, e);
                    polite = false;
                }
            }

            if page >= range.end() {
                break;
            }
            page += 1;

            if polite && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        if all_products.is_empty() {
            return Err(PipelineError::Exhausted {
                start: range.start(),
                end: range.end(),
            });
        }

        info!("Total products extracted: {}", all_products.len());
        Ok(all_products)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// In-memory catalog; pages not listed are unavailable.
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<u32, Result<FetchOutcome, String>>,
        calls: Arc<Mutex<Vec<u32>>>,
        fetched_at: Arc<Mutex<Vec<Instant>>>,
    }

    impl FakeSource {
        fn with_page(mut self, page: u32, html: String) -> Self {
            self.pages.insert(page, Ok(FetchOutcome::Content(html)));
            self
        }

        fn with_broken_page(mut self, page: u32) -> Self {
            self.pages.insert(page, Err("locator exploded".to_string()));
            self
        }

        fn call_log(&self) -> Arc<Mutex<Vec<u32>>> {
            Arc::clone(&self.calls)
        }

        fn fetch_times(&self) -> Arc<Mutex<Vec<Instant>>> {
            Arc::clone(&self.fetched_at)
        }
    }

    fn calls(log: &Arc<Mutex<Vec<u32>>>) -> Vec<u32> {
        log.lock().unwrap().clone()
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> Result<FetchOutcome, PipelineError> {
            self.calls.lock().unwrap().push(page);
            self.fetched_at.lock().unwrap().push(Instant::now());
            match self.pages.get(&page) {
                Some(Ok(outcome)) => Ok(outcome.clone()),
                Some(Err(reason)) => Err(PipelineError::page(page, reason.clone())),
                None => Ok(FetchOutcome::Unavailable("HTTP 404 Not Found".to_string())),
            }
        }
    }

    fn listing(titles: &[&str]) -> String {
        let cards: String = titles
            .iter()
            .map(|t| {
                format!(
                    r#"<div class="collection-card"><div class="product-details">
                        <h3 class="product-title">{t}</h3>
                        <span class="price">$10.00</span>
                        <p>Rating: ⭐ 4.0 / 5</p><p>2 Colors</p><p>Size: M</p><p>Gender: Men</p>
                    </div></div>"#
                )
            })
            .collect();
        format!("<html><body>{cards}</body></html>")
    }

    fn scraper(source: FakeSource) -> FashionScraper<FakeSource> {
        FashionScraper::new(source, SelectorConfig::default(), Duration::ZERO)
    }

    #[test]
    fn test_extract_page_outcomes() {
        let s = scraper(
            FakeSource::default()
                .with_page(1, listing(&["A", "B"]))
                .with_page(2, listing(&[])),
        );

        let first = tokio_test::block_on(s.extract_page(1)).unwrap();
        assert!(matches!(first, PageYield::Products(ref p) if p.len() == 2));
        assert_eq!(tokio_test::block_on(s.extract_page(2)).unwrap(), PageYield::Empty);
        assert_eq!(tokio_test::block_on(s.extract_page(3)).unwrap(), PageYield::Unavailable);
    }

    #[test]
    fn test_crawl_stops_at_unavailable_page() {
        let source = FakeSource::default()
            .with_page(1, listing(&["A", "B"]))
            .with_page(2, listing(&["C"]));
        let log = source.call_log();
        let range = PageRange::new(1, 10, 100).unwrap();
        let products = tokio_test::block_on(scraper(source).crawl(range)).unwrap();

        assert_eq!(products.len(), 3);
        assert_eq!(calls(&log), vec![1, 2, 3]);
    }

    #[test]
    fn test_crawl_truncates_to_cap() {
        let source = FakeSource::default()
            .with_page(1, listing(&["A", "B"]))
            .with_page(2, listing(&["C", "D"]))
            .with_page(3, listing(&["E"]));
        let log = source.call_log();
        let range = PageRange::new(1, 3, 3).unwrap();
        let products = tokio_test::block_on(scraper(source).crawl(range)).unwrap();

        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(calls(&log), vec![1, 2]);
    }

    #[test]
    fn test_crawl_continues_past_failed_page() {
        let source = FakeSource::default()
            .with_page(1, listing(&["A"]))
            .with_broken_page(2)
            .with_page(3, listing(&["C"]));
        let log = source.call_log();
        let range = PageRange::new(1, 3, 100).unwrap();
        let products = tokio_test::block_on(scraper(source).crawl(range)).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(calls(&log), vec![1, 2, 3]);
    }

    #[test]
    fn test_crawl_continues_past_empty_page() {
        let source = FakeSource::default()
            .with_page(1, listing(&[]))
            .with_page(2, listing(&["B"]));
        let range = PageRange::new(1, 2, 100).unwrap();
        let products = tokio_test::block_on(scraper(source).crawl(range)).unwrap();
        assert_eq!(products.len(), 1);
    }

    #[test]
    fn test_crawl_without_cards_is_exhausted() {
        let source = FakeSource::default().with_page(1, listing(&[]));
        let range = PageRange::new(1, 1, 100).unwrap();
        let err = tokio_test::block_on(scraper(source).crawl(range)).unwrap_err();
        assert!(matches!(err, PipelineError::Exhausted { start: 1, end: 1 }));
    }

    #[test]
    fn test_crawl_unreachable_site_is_exhausted() {
        let source = FakeSource::default();
        let log = source.call_log();
        let range = PageRange::new(1, 5, 100).unwrap();
        let err = tokio_test::block_on(scraper(source).crawl(range)).unwrap_err();
        assert!(matches!(err, PipelineError::Exhausted { .. }));
        assert_eq!(calls(&log), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_crawl_waits_only_after_fetched_pages() {
        let delay = Duration::from_secs(1);
        let source = FakeSource::default()
            .with_page(1, listing(&["A"]))
            .with_broken_page(2)
            .with_page(3, listing(&["C"]))
            .with_page(4, listing(&["D"]));
        let times = source.fetch_times();
        let s = FashionScraper::new(source, SelectorConfig::default(), delay);

        let products = s.crawl(PageRange::new(1, 4, 100).unwrap()).await.unwrap();
        let finished = Instant::now();
        assert_eq!(products.len(), 3);

        let t = times.lock().unwrap().clone();
        assert_eq!(t.len(), 4);
        let waited = |a: Instant, b: Instant| b.duration_since(a);

        // page 1 ok → wait; page 2 failed → no wait; page 3 ok → wait
        assert!(waited(t[0], t[1]) >= delay && waited(t[0], t[1]) < delay * 2);
        assert!(waited(t[1], t[2]) < delay);
        assert!(waited(t[2], t[3]) >= delay && waited(t[2], t[3]) < delay * 2);
        // nothing after the last page
        assert!(waited(t[3], finished) < delay);
    }

    #[test]
    fn test_inverted_range_rejected_before_fetch() {
        let source = FakeSource::default().with_page(5, listing(&["A"]));
        let log = source.call_log();
        let result = ScraperConfig::default()
            .page_range(Some(5), Some(4), None)
            .map(|range| tokio_test::block_on(scraper(source).crawl(range)));
        assert!(matches!(result, Err(PipelineError::InvalidArgument(_))));
        assert!(calls(&log).is_empty());
    }
}
