//! Custom message headers.

use std::fmt;

/// A single custom header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name as supplied by the caller.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered collection of custom headers.
///
/// Names are compared case-insensitively on lookup but stored verbatim.
/// Duplicate names are kept, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Gets all values for a header, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Removes all values for a header and returns them.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|h| {
            if h.name.eq_ignore_ascii_case(name) {
                removed.push(h.value.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| Header::new(name, value))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for header in &self.entries {
            writeln!(f, "{}: {}", header.name, header.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("X-Header-Test-1", "This is a header value");
        assert_eq!(headers.get("X-Header-Test-1"), Some("This is a header value"));
        assert_eq!(headers.get("x-header-test-1"), Some("This is a header value"));
        assert_eq!(headers.get("X-Missing"), None);
    }

    #[test]
    fn test_headers_keep_duplicates_in_order() {
        let mut headers = Headers::new();
        headers.add("X-Trace", "first");
        headers.add("X-Other", "middle");
        headers.add("X-Trace", "second");

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("X-Trace"), Some("first"));
        assert_eq!(headers.get_all("x-trace"), vec!["first", "second"]);

        let names: Vec<&str> = headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["X-Trace", "X-Other", "X-Trace"]);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.add("X-PostmarkTag", "mytag");
        headers.add("X-Keep", "yes");

        let removed = headers.remove("x-postmarktag");
        assert_eq!(removed, vec!["mytag".to_string()]);
        assert!(headers.get("X-PostmarkTag").is_none());
        assert_eq!(headers.get("X-Keep"), Some("yes"));
    }

    #[test]
    fn test_headers_from_iter_and_display() {
        let headers: Headers = [("X-A", "1"), ("X-B", "2")].into_iter().collect();
        assert_eq!(headers.to_string(), "X-A: 1\nX-B: 2\n");
    }
}
