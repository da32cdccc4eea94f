use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorConfig;
use crate::errors::{ExtractionError, Result, ScraperError};
use crate::models::stock::StockQuote;
use crate::util;

/// Reads the price and its timestamp out of a stock page.
///
/// All lookups are scoped to the ticker container, so a price-like element
/// elsewhere on the page is never picked up.
pub struct FieldExtractor {
    scope: Selector,
    price: Selector,
    timestamp_ancestor: Selector,
    timestamp: Selector,
    scope_css: String,
    price_css: String,
    timestamp_ancestor_css: String,
    timestamp_css: String,
}

fn parse_selector(css: String) -> Result<(Selector, String)> {
    let selector = Selector::parse(&css).map_err(|e| ScraperError::SelectorError {
        selector: css.clone(),
        reason: e.to_string(),
    })?;
    Ok((selector, css))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl FieldExtractor {
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        let (scope, scope_css) = parse_selector(selectors.scope_selector())?;
        let (price, price_css) = parse_selector(selectors.price_selector())?;
        let (timestamp_ancestor, timestamp_ancestor_css) =
            parse_selector(selectors.timestamp_ancestor_selector())?;
        let (timestamp, _) = parse_selector(selectors.timestamp_tag.clone())?;

        Ok(Self {
            scope,
            price,
            timestamp_ancestor,
            timestamp,
            scope_css,
            price_css,
            timestamp_ancestor_css,
            timestamp_css: selectors.timestamp_selector(),
        })
    }

    /// Extracts the quote from a full page source.
    pub fn extract(&self, html: &str) -> std::result::Result<StockQuote, ExtractionError> {
        let document = Html::parse_document(html);
        self.extract_from(&document)
    }

    pub fn extract_from(&self, document: &Html) -> std::result::Result<StockQuote, ExtractionError> {
        let scope = document
            .select(&self.scope)
            .next()
            .ok_or_else(|| self.not_found(&self.scope_css))?;

        let price_el = scope
            .select(&self.price)
            .next()
            .ok_or_else(|| self.not_found(&self.price_css))?;
        let value = util::parse_price(&element_text(price_el))?;

        // 先在容器内定位 delay 元素，再取其下的 span
        let delay_el = scope
            .select(&self.timestamp_ancestor)
            .next()
            .ok_or_else(|| self.not_found(&self.timestamp_ancestor_css))?;
        let timestamp_el = delay_el
            .select(&self.timestamp)
            .next()
            .ok_or_else(|| self.not_found(&self.timestamp_css))?;
        let timestamp = element_text(timestamp_el);

        Ok(StockQuote { value, timestamp })
    }

    fn not_found(&self, css: &str) -> ExtractionError {
        ExtractionError::ElementNotFound {
            selector: css.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const TIMESTAMP: &str = "14.09.25 13:03:33 BST";

    fn page(ticker_id: &str, price_tag: &str) -> String {
        format!(
            r#"<html><body>
            <div id="{ticker_id}">
                {price_tag}
                <div class="ticker-item delay">
                    <div>
                    As at
                    <span>{TIMESTAMP}</span>
                    - All data delayed at least 15 minutes
                    </div>
                </div>
            </div>
            </body></html>"#
        )
    }

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&Config::new().selectors).unwrap()
    }

    #[test]
    fn extracts_price_and_timestamp() {
        let html = page("ticker", r#"<span class="price-tag"> 160.35 </span>"#);
        let quote = extractor().extract(&html).unwrap();
        assert_eq!(quote.value, 160.35);
        assert_eq!(quote.timestamp, TIMESTAMP);
    }

    #[test]
    fn handles_thousands_separator() {
        let html = page("ticker", r#"<span class="price-tag"> 1,234.50 </span>"#);
        let quote = extractor().extract(&html).unwrap();
        assert_eq!(quote.value, 1234.50);
    }

    #[test]
    fn missing_price_tag_is_element_not_found() {
        let html = page("ticker", "");
        assert_eq!(
            extractor().extract(&html),
            Err(ExtractionError::ElementNotFound {
                selector: ".price-tag".to_string()
            })
        );
    }

    #[test]
    fn empty_price_tag_is_invalid_price() {
        let html = page("ticker", r#"<span class="price-tag">  </span>"#);
        assert!(matches!(
            extractor().extract(&html),
            Err(ExtractionError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn missing_scope_is_element_not_found() {
        let html = page("not-ticker-id", r#"<span class="price-tag">160.35</span>"#);
        assert_eq!(
            extractor().extract(&html),
            Err(ExtractionError::ElementNotFound {
                selector: "#ticker".to_string()
            })
        );
    }

    #[test]
    fn price_outside_scope_is_ignored() {
        let html = r#"<html><body>
            <span class="price-tag">99.00</span>
            <div id="ticker"><div class="delay"><span>now</span></div></div>
        </body></html>"#;
        assert!(matches!(
            extractor().extract(html),
            Err(ExtractionError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn missing_timestamp_is_element_not_found() {
        let html = r#"<div id="ticker"><span class="price-tag">1.5</span></div>"#;
        assert_eq!(
            extractor().extract(html),
            Err(ExtractionError::ElementNotFound {
                selector: ".delay".to_string()
            })
        );

        let html = r#"<div id="ticker"><span class="price-tag">1.5</span><div class="delay">As at</div></div>"#;
        assert_eq!(
            extractor().extract(html),
            Err(ExtractionError::ElementNotFound {
                selector: ".delay span".to_string()
            })
        );
    }

    #[test]
    fn delay_wrapper_outside_scope_is_ignored() {
        let html = r#"<html><body>
            <div class="delay">
                <div id="ticker"><span class="price-tag">160.35</span></div>
            </div>
        </body></html>"#;
        assert_eq!(
            extractor().extract(html),
            Err(ExtractionError::ElementNotFound {
                selector: ".delay".to_string()
            })
        );
    }

    #[test]
    fn rejects_invalid_selector_config() {
        let mut selectors = Config::new().selectors;
        selectors.price_class = "[[".to_string();
        assert!(matches!(
            FieldExtractor::new(&selectors),
            Err(ScraperError::SelectorError { .. })
        ));
    }
}
