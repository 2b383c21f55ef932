//! Send status and the HTTP status table that derives it.

use std::fmt;
use std::ops::RangeInclusive;

/// Outcome of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// The provider could not be classified.
    #[default]
    Unknown,
    /// Message accepted.
    Success,
    /// Request rejected because of caller input (token, sender, recipient).
    UserError,
    /// Provider-side failure.
    ServerError,
}

impl Status {
    /// Returns true for [`Status::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true for [`Status::UserError`] and [`Status::ServerError`].
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::UserError | Self::ServerError)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Success => write!(f, "success"),
            Self::UserError => write!(f, "user error"),
            Self::ServerError => write!(f, "server error"),
        }
    }
}

/// Maps HTTP status codes to [`Status`].
///
/// Rules are checked in order and the first match wins. Codes no rule
/// covers map to [`Status::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    rules: Vec<(RangeInclusive<u16>, Status)>,
}

impl StatusTable {
    /// Creates a table with no rules.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule that takes priority over every existing rule.
    #[must_use]
    pub fn with_rule(mut self, codes: RangeInclusive<u16>, status: Status) -> Self {
        self.rules.insert(0, (codes, status));
        self
    }

    /// Adds a single-code rule that takes priority over every existing rule.
    #[must_use]
    pub fn with_code(self, code: u16, status: Status) -> Self {
        self.with_rule(code..=code, status)
    }

    /// Classifies an HTTP status code.
    #[must_use]
    pub fn classify(&self, code: u16) -> Status {
        self.rules
            .iter()
            .find(|(codes, _)| codes.contains(&code))
            .map_or(Status::Unknown, |(_, status)| *status)
    }
}

impl Default for StatusTable {
    /// 200 is success, 401, 422 and other 4xx are user errors, 5xx are
    /// server errors.
    fn default() -> Self {
        Self::empty()
            .with_rule(500..=599, Status::ServerError)
            .with_rule(400..=499, Status::UserError)
            .with_code(422, Status::UserError)
            .with_code(401, Status::UserError)
            .with_code(200, Status::Success)
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
    use proptest::prelude::*;

    #[test]
    fn test_default_table() {
        let table = StatusTable::default();
        assert_eq!(table.classify(200), Status::Success);
        assert_eq!(table.classify(401), Status::UserError);
        assert_eq!(table.classify(422), Status::UserError);
        assert_eq!(table.classify(404), Status::UserError);
        assert_eq!(table.classify(500), Status::ServerError);
        assert_eq!(table.classify(503), Status::ServerError);
        assert_eq!(table.classify(302), Status::Unknown);
        assert_eq!(table.classify(204), Status::Unknown);
    }

    #[test]
    fn test_with_rule_takes_priority() {
        let table = StatusTable::default().with_code(429, Status::ServerError);
        assert_eq!(table.classify(429), Status::ServerError);
        assert_eq!(table.classify(428), Status::UserError);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(StatusTable::empty().classify(200), Status::Unknown);
    }

    #[test]
    fn test_status_predicates() {
        assert!(Status::Success.is_success());
        assert!(!Status::Success.is_error());
        assert!(Status::UserError.is_error());
        assert!(Status::ServerError.is_error());
        assert!(!Status::Unknown.is_error());
        assert_eq!(Status::UserError.to_string(), "user error");
    }

    proptest! {
        #[test]
        fn prop_client_errors_are_user_errors(code in 400u16..500) {
            prop_assert_eq!(StatusTable::default().classify(code), Status::UserError);
        }

        #[test]
        fn prop_server_errors(code in 500u16..600) {
            prop_assert_eq!(StatusTable::default().classify(code), Status::ServerError);
        }
    }
}
