//! Candidate element discovery

use ab_hal::PageHal;
use ab_ipc::TargetElement;

use crate::selector::describe_element;
use crate::PageConfig;

/// Collect animatable elements for the popup's element list.
///
/// Runs the configured selectors in order, skipping any the backend rejects.
/// An element is kept once, and only if it is rendered and has non-blank
/// text. At most `scan_limit` elements are returned.
pub fn scan_page<H: PageHal>(hal: &H, config: &PageConfig) -> Vec<TargetElement> {
    let mut seen: Vec<H::Element> = Vec::new();

    'selectors: for selector in &config.scan_selectors {
        let matches = match hal.query_selector_all(selector) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(selector = %selector, error = %e, "scan selector skipped");
                continue;
            }
        };

        for element in matches {
            if seen.len() >= config.scan_limit {
                break 'selectors;
            }
            if seen.contains(&element) {
                continue;
            }
            if !hal.has_layout_box(&element) || hal.text_content(&element).trim().is_empty() {
                continue;
            }
            seen.push(element);
        }
    }

    tracing::debug!(count = seen.len(), "page scan complete");
    seen.iter()
        .map(|element| describe_element(hal, element, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_hal_mock::{ElementSpec, MockPage};

    #[test]
    fn test_skips_hidden_and_blank_elements() {
        let page = MockPage::new();
        page.append_to_body_spec(ElementSpec::new("h1").text("Welcome"));
        page.append_to_body_spec(ElementSpec::new("p").text("   "));
        page.append_to_body_spec(ElementSpec::new("p").text("Hidden").hidden());

        let elements = scan_page(&page, &PageConfig::default());
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].tag_name, "H1");
    }

    #[test]
    fn test_element_matched_twice_is_listed_once() {
        let page = MockPage::new();
        page.append_to_body_spec(ElementSpec::new("div").class("hero-title").text("Hi"));

        let elements = scan_page(&page, &PageConfig::default());
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_respects_limit() {
        let page = MockPage::new();
        for i in 0..80 {
            page.append_to_body_spec(ElementSpec::new("p").text(&format!("Paragraph {}", i)));
        }
        let config = PageConfig {
            scan_limit: 50,
            ..PageConfig::default()
        };
        assert_eq!(scan_page(&page, &config).len(), 50);
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let page = MockPage::new();
        page.append_to_body_spec(ElementSpec::new("h2").text("Features"));
        let config = PageConfig {
            scan_selectors: vec!["h2 > span".to_string(), "h2".to_string()],
            ..PageConfig::default()
        };
        let elements = scan_page(&page, &config);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].selector, "h2");
    }
}
