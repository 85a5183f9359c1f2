//! Selector and identity generation.
//!
//! One rule serves both click-time and scan-time generation:
//!
//! 1. A non-empty native id yields `#id`.
//! 2. Otherwise `tag.class1.class2...`.
//! 3. When the parent has more than one child with the same tag,
//!    `:nth-of-type(k)` is appended, `k` being the 1-based position among
//!    those same-tag siblings.
//!
//! Ids and class tokens go through [`escape_ident`]. The highlight class
//! added during selection is never part of a selector.

use std::fmt::Write;

use ab_hal::PageHal;
use ab_ipc::TargetElement;

use crate::PageConfig;

/// Escape an identifier for use after `.` or `#` in a query.
///
/// Follows `CSS.escape`: punctuation gets a backslash (`md:px-4` ->
/// `md\:px-4`); a leading digit, or a digit after a leading `-`, and
/// control characters become a hex escape (`2xl` -> `\32 xl`).
pub fn escape_ident(ident: &str) -> String {
    let mut escaped = String::with_capacity(ident.len());
    let mut chars = ident.chars().peekable();
    let mut index = 0;
    let mut leading_dash = false;
    while let Some(c) = chars.next() {
        let hex = c.is_control()
            || (c.is_ascii_digit() && (index == 0 || (index == 1 && leading_dash)));
        if c == '\0' {
            escaped.push('\u{FFFD}');
        } else if hex {
            let _ = write!(escaped, "\\{:x} ", c as u32);
        } else if index == 0 && c == '-' && chars.peek().is_none() {
            escaped.push_str("\\-");
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
        leading_dash = index == 0 && c == '-';
        index += 1;
    }
    escaped
}

/// Generate a selector that resolves back to `element`
pub fn generate_selector<H: PageHal>(hal: &H, element: &H::Element, config: &PageConfig) -> String {
    let id = hal.id_attribute(element);
    if !id.is_empty() {
        return format!("#{}", escape_ident(&id));
    }

    let mut selector = hal.tag_name(element).to_ascii_lowercase();
    for class in visible_classes(hal, element, config) {
        selector.push('.');
        selector.push_str(&escape_ident(&class));
    }
    if let Some(k) = nth_of_type(hal, element) {
        let _ = write!(selector, ":nth-of-type({})", k);
    }
    selector
}

/// Stable identifier for an element.
///
/// Native id when present; otherwise `tag.classes-text-slug`, suffixed with
/// the `:nth-of-type` index when siblings share the tag. Deterministic, so
/// selecting the same element twice yields the same id.
pub fn element_identity<H: PageHal>(hal: &H, element: &H::Element, config: &PageConfig) -> String {
    let id = hal.id_attribute(element);
    if !id.is_empty() {
        return id;
    }

    let mut identity = hal.tag_name(element).to_ascii_lowercase();
    for class in visible_classes(hal, element, config) {
        identity.push('.');
        identity.push_str(&class);
    }
    identity.push('-');
    identity.push_str(&slug(&hal.text_content(element), 20));
    if let Some(k) = nth_of_type(hal, element) {
        let _ = write!(identity, "-{}", k);
    }
    identity
}

/// Trimmed text cut to `max_chars`, with `...` when something was cut
pub fn text_snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut snippet: String = trimmed.chars().take(max_chars).collect();
    snippet.push_str("...");
    snippet
}

/// Build the cross-realm descriptor for `element`
pub fn describe_element<H: PageHal>(hal: &H, element: &H::Element, config: &PageConfig) -> TargetElement {
    TargetElement {
        id: element_identity(hal, element, config),
        tag_name: hal.tag_name(element),
        class_name: visible_classes(hal, element, config).join(" "),
        text_content: text_snippet(&hal.text_content(element), config.text_snippet_chars),
        selector: generate_selector(hal, element, config),
    }
}

fn visible_classes<H: PageHal>(hal: &H, element: &H::Element, config: &PageConfig) -> Vec<String> {
    hal.class_list(element)
        .into_iter()
        .filter(|c| *c != config.highlight_class)
        .collect()
}

/// 1-based position among same-tag siblings, if there is more than one
fn nth_of_type<H: PageHal>(hal: &H, element: &H::Element) -> Option<usize> {
    let parent = hal.parent(element)?;
    let tag = hal.tag_name(element);
    let siblings: Vec<H::Element> = hal
        .children(&parent)
        .into_iter()
        .filter(|sibling| hal.tag_name(sibling).eq_ignore_ascii_case(&tag))
        .collect();
    if siblings.len() < 2 {
        return None;
    }
    siblings.iter().position(|s| s == element).map(|p| p + 1)
}

fn slug(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    let mut slug = String::with_capacity(head.len());
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_hal_mock::{ElementSpec, MockPage};

    #[test]
    fn test_native_id_wins() {
        let page = MockPage::new();
        let el = page.append_to_body_spec(ElementSpec::new("button").id("cta-button").class("btn"));
        let config = PageConfig::default();
        assert_eq!(generate_selector(&page, &el, &config), "#cta-button");
        assert_eq!(element_identity(&page, &el, &config), "cta-button");
    }

    #[test]
    fn test_identical_siblings_are_disambiguated() {
        let page = MockPage::new();
        let list = page.append_to_body_spec(ElementSpec::new("ul"));
        let a = page.append(&list, ElementSpec::new("li").class("item"));
        let b = page.append(&list, ElementSpec::new("li").class("item"));
        let config = PageConfig::default();

        let sel_a = generate_selector(&page, &a, &config);
        let sel_b = generate_selector(&page, &b, &config);
        assert_eq!(sel_a, "li.item:nth-of-type(1)");
        assert_eq!(sel_b, "li.item:nth-of-type(2)");
        assert_eq!(page.query_selector(&sel_b).unwrap(), Some(b));
    }

    #[test]
    fn test_nth_counts_same_tag_siblings_only() {
        let page = MockPage::new();
        let parent = page.append_to_body_spec(ElementSpec::new("div"));
        page.append(&parent, ElementSpec::new("h2"));
        page.append(&parent, ElementSpec::new("p").class("lead"));
        let second = page.append(&parent, ElementSpec::new("p").class("body"));
        let config = PageConfig::default();

        let selector = generate_selector(&page, &second, &config);
        assert_eq!(selector, "p.body:nth-of-type(2)");
        assert_eq!(page.query_selector(&selector).unwrap(), Some(second));
    }

    #[test]
    fn test_only_child_has_no_suffix() {
        let page = MockPage::new();
        let section = page.append_to_body_spec(ElementSpec::new("section"));
        let h1 = page.append(&section, ElementSpec::new("h1").class("title big"));
        assert_eq!(generate_selector(&page, &h1, &PageConfig::default()), "h1.title.big");
    }

    #[test]
    fn test_escaped_classes_round_trip() {
        let page = MockPage::new();
        let el = page.append_to_body_spec(ElementSpec::new("div").class("md:px-4 w-[10px] hover:#fff"));
        let selector = generate_selector(&page, &el, &PageConfig::default());
        assert_eq!(selector, r"div.md\:px-4.w-\[10px\].hover\:\#fff");
        assert_eq!(page.query_selector(&selector).unwrap(), Some(el));
    }

    #[test]
    fn test_digit_leading_classes_round_trip() {
        let page = MockPage::new();
        let el = page.append_to_body_spec(ElementSpec::new("div").class("2xl:text-lg -3d card"));
        let selector = generate_selector(&page, &el, &PageConfig::default());
        assert_eq!(selector, r"div.\32 xl\:text-lg.-\33 d.card");
        assert_eq!(page.query_selector(&selector).unwrap(), Some(el));
    }

    #[test]
    fn test_digit_leading_id_round_trip() {
        let page = MockPage::new();
        let el = page.append_to_body_spec(ElementSpec::new("section").id("3-columns"));
        let selector = generate_selector(&page, &el, &PageConfig::default());
        assert_eq!(selector, r"#\33 -columns");
        assert_eq!(page.query_selector(&selector).unwrap(), Some(el));
        assert_eq!(element_identity(&page, &el, &PageConfig::default()), "3-columns");
    }

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("btn-primary"), "btn-primary");
        assert_eq!(escape_ident("--var"), "--var");
        assert_eq!(escape_ident("-"), r"\-");
        assert_eq!(escape_ident("w-1/2"), r"w-1\/2");
        assert_eq!(escape_ident("a\u{1}b"), r"a\1 b");
    }

    #[test]
    fn test_highlight_class_is_ignored() {
        let page = MockPage::new();
        let config = PageConfig::default();
        let el = page.append_to_body_spec(ElementSpec::new("p").class("intro").text("Hi"));
        page.add_class(&el, &config.highlight_class);
        let described = describe_element(&page, &el, &config);
        assert_eq!(described.selector, "p.intro");
        assert_eq!(described.class_name, "intro");
    }

    #[test]
    fn test_identity_slug() {
        let page = MockPage::new();
        let el = page.append_to_body_spec(ElementSpec::new("p").class("lead").text("Build  Faster\nToday, really fast"));
        assert_eq!(
            element_identity(&page, &el, &PageConfig::default()),
            "p.lead-build-faster-today,"
        );
    }

    #[test]
    fn test_text_snippet() {
        assert_eq!(text_snippet("  short  ", 50), "short");
        let long = "x".repeat(60);
        let snippet = text_snippet(&long, 50);
        assert_eq!(snippet.len(), 53);
        assert!(snippet.ends_with("..."));
        assert_eq!(text_snippet("héllo wörld", 5), "héllo...");
    }
}
