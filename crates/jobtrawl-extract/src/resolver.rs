//! Ordered selector fallback.
//!
//! A field is read by trying its candidates front to back and keeping the
//! first non-empty value. A candidate that matches nothing, matches an empty
//! element, or does not parse as CSS is skipped silently. Nothing here mutates
//! the context.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is hardcoded and valid"));

/// Something selectors can be evaluated against: a page root or one card.
pub trait Locatable: Sized {
    /// First descendant matching `selector`.
    fn find(&self, selector: &str) -> Option<Self>;

    /// All descendants matching `selector`, in document order.
    fn find_all(&self, selector: &str) -> Vec<Self>;

    /// Rendered text of this node, untrimmed.
    fn inner_text(&self) -> String;

    /// Value of an attribute on this node.
    fn attribute(&self, name: &str) -> Option<String>;
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::trace!("Skipping unparseable selector '{}': {}", selector, e);
            None
        }
    }
}

impl<'a> Locatable for ElementRef<'a> {
    fn find(&self, selector: &str) -> Option<Self> {
        let parsed = parse_selector(selector)?;
        self.select(&parsed).next()
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        parse_selector(selector)
            .map(|parsed| self.select(&parsed).collect())
            .unwrap_or_default()
    }

    fn inner_text(&self) -> String {
        // Text nodes from sibling tags would otherwise run together.
        self.text().collect::<Vec<_>>().join(" ")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }
}

/// Trim and collapse internal whitespace to single spaces.
#[must_use]
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Text of the first candidate that resolves to non-empty text, else `default`.
pub fn resolve_text<L: Locatable>(context: &L, candidates: &[String], default: &str) -> String {
    for candidate in candidates {
        let Some(node) = context.find(candidate) else {
            tracing::trace!("Candidate '{}' matched nothing", candidate);
            continue;
        };
        let text = clean_text(&node.inner_text());
        if !text.is_empty() {
            return text;
        }
        tracing::trace!("Candidate '{}' matched an empty element", candidate);
    }
    default.to_string()
}

/// Attribute value of the first candidate that carries it non-empty, else `default`.
pub fn resolve_attribute<L: Locatable>(
    context: &L,
    candidates: &[String],
    attribute: &str,
    default: &str,
) -> String {
    candidates
        .iter()
        .filter_map(|candidate| context.find(candidate))
        .filter_map(|node| node.attribute(attribute))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Elements of the first candidate that matches at least one element.
///
/// Later candidates are not tried once one yields a match.
pub fn resolve_all<L: Locatable>(context: &L, candidates: &[String]) -> Vec<L> {
    for candidate in candidates {
        let found = context.find_all(candidate);
        if !found.is_empty() {
            tracing::debug!("Selector '{}' matched {} elements", candidate, found.len());
            return found;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;
    use std::cell::Cell;

    fn candidates(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    /// Flat map of selector to text, counting lookups.
    struct FakeNode<'a> {
        entries: &'a [(&'a str, &'a str)],
        text: String,
        lookups: &'a Cell<usize>,
    }

    impl<'a> Locatable for FakeNode<'a> {
        fn find(&self, selector: &str) -> Option<Self> {
            self.lookups.set(self.lookups.get() + 1);
            self.entries
                .iter()
                .find(|(sel, _)| *sel == selector)
                .map(|(_, text)| FakeNode {
                    entries: &[],
                    text: (*text).to_string(),
                    lookups: self.lookups,
                })
        }

        fn find_all(&self, selector: &str) -> Vec<Self> {
            self.find(selector).into_iter().collect()
        }

        fn inner_text(&self) -> String {
            self.text.clone()
        }

        fn attribute(&self, _name: &str) -> Option<String> {
            Some(self.text.clone())
        }
    }

    #[test]
    fn test_first_candidate_wins() {
        let lookups = Cell::new(0);
        let root = FakeNode {
            entries: &[(".a", "first"), (".b", "second")],
            text: String::new(),
            lookups: &lookups,
        };
        assert_eq!(resolve_text(&root, &candidates(&[".a", ".b"]), "x"), "first");
        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn test_falls_through_missing_and_empty() {
        let lookups = Cell::new(0);
        let root = FakeNode {
            entries: &[(".empty", "  \n "), (".c", " third ")],
            text: String::new(),
            lookups: &lookups,
        };
        let list = candidates(&[".missing", ".empty", ".c"]);
        assert_eq!(resolve_text(&root, &list, "x"), "third");
        assert_eq!(lookups.get(), 3);
    }

    #[test]
    fn test_default_when_nothing_resolves() {
        let lookups = Cell::new(0);
        let root = FakeNode {
            entries: &[(".empty", "")],
            text: String::new(),
            lookups: &lookups,
        };
        let list = candidates(&[".missing", ".empty"]);
        assert_eq!(resolve_text(&root, &list, "未知职位"), "未知职位");
        assert_eq!(resolve_attribute(&root, &list, "href", ""), "");
        assert_eq!(resolve_text(&root, &[], "fallback"), "fallback");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Senior\n\t Rust   Engineer "), "Senior Rust Engineer");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_resolve_on_html() {
        let html = Html::parse_fragment(
            r#"<div class="card">
                 <span class="job-name"> </span>
                 <a class="job-title" href="/job/1">Backend
                    Developer</a>
                 <span class="salary">15-25K</span>
               </div>"#,
        );
        let root = html.root_element();

        let title = resolve_text(&root, &candidates(&[".job-name", ".job-title"]), "none");
        assert_eq!(title, "Backend Developer");

        let href = resolve_attribute(&root, &candidates(&[".salary", "a"]), "href", "");
        assert_eq!(href, "/job/1");
    }

    #[test]
    fn test_invalid_selector_is_a_miss() {
        let html = Html::parse_fragment(r#"<p class="ok">fine</p>"#);
        let root = html.root_element();
        let text = resolve_text(&root, &candidates(&["p[[", ".ok"]), "none");
        assert_eq!(text, "fine");
    }

    #[test]
    fn test_resolve_all_stops_at_first_match() {
        let html = Html::parse_fragment(
            r#"<ul>
                 <li class="job-card">a</li>
                 <li class="job-card">b</li>
                 <li class="job-primary">c</li>
               </ul>"#,
        );
        let root = html.root_element();

        let found = resolve_all(&root, &candidates(&[".job-card-wrapper", ".job-card", "li"]));
        assert_eq!(found.len(), 2);

        let none = resolve_all(&root, &candidates(&[".absent"]));
        assert!(none.is_empty());
    }
}
