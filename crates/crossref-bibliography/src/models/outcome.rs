//! Per-element result of a batch operation.

use serde::{Deserialize, Serialize};

/// Either a successful value or a human-readable diagnostic.
///
/// Batch operations return one `Outcome` per element so a failure on one
/// element never hides the others. Serialized as
/// `{"kind": "item", "value": ...}` or `{"kind": "diagnostic", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Item(T),
    Diagnostic(String),
}

impl<T> Outcome<T> {
    /// Create a diagnostic outcome.
    #[must_use]
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self::Diagnostic(message.into())
    }

    #[must_use]
    pub const fn is_item(&self) -> bool {
        matches!(self, Self::Item(_))
    }

    #[must_use]
    pub const fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Diagnostic(_))
    }

    /// Borrow the item, if any.
    #[must_use]
    pub const fn as_item(&self) -> Option<&T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Diagnostic(_) => None,
        }
    }

    /// The diagnostic message, if any.
    #[must_use]
    pub fn as_diagnostic(&self) -> Option<&str> {
        match self {
            Self::Item(_) => None,
            Self::Diagnostic(message) => Some(message),
        }
    }

    /// Transform the item, passing diagnostics through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Item(item) => Outcome::Item(f(item)),
            Self::Diagnostic(message) => Outcome::Diagnostic(message),
        }
    }
}

impl<T> From<Result<T, String>> for Outcome<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(item) => Self::Item(item),
            Err(message) => Self::Diagnostic(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_serialization() {
        let item: Outcome<u32> = Outcome::Item(7);
        assert_eq!(serde_json::to_value(&item).unwrap(), json!({"kind": "item", "value": 7}));

        let diag: Outcome<u32> = Outcome::diagnostic("boom");
        assert_eq!(
            serde_json::to_value(&diag).unwrap(),
            json!({"kind": "diagnostic", "value": "boom"})
        );
    }

    #[test]
    fn test_map_passes_diagnostics() {
        let diag: Outcome<u32> = Outcome::diagnostic("nope");
        assert_eq!(diag.map(|n| n + 1), Outcome::diagnostic("nope"));
        assert_eq!(Outcome::Item(1).map(|n| n + 1), Outcome::Item(2));
    }
}
