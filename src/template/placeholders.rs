//! Placeholder discovery for `{{variable}}` markers in template bodies

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// `{{name}}` with word characters only; no whitespace or nested braces.
    static ref PLACEHOLDER_PATTERN: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap();
}

/// Ordered, de-duplicated placeholder names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlaceholderSet(Vec<String>);

impl PlaceholderSet {
    fn insert(&mut self, name: &str) {
        if !self.contains(name) {
            self.0.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Collect placeholder names from the HTML body, then the text body, in
/// first-seen order.
pub fn extract_placeholders(html: &str, text: &str) -> PlaceholderSet {
    let mut set = PlaceholderSet::default();

    for body in [html, text] {
        for captures in PLACEHOLDER_PATTERN.captures_iter(body) {
            set.insert(&captures[1]);
        }
    }

    set
}
