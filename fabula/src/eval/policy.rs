//! Missing-reference policy.
//!
//! Reference documents are partially annotated: a blank reference field means
//! "nobody annotated this", not "nothing here". Every scorer classifies a
//! (candidate, reference) value pair through [`classify`] so that partial
//! credit is assigned the same way in every dimension:
//!
//! | candidate | reference | outcome     | effect                         |
//! |-----------|-----------|-------------|--------------------------------|
//! | empty     | empty     | `Matched`   | true negative, no penalty      |
//! | present   | empty     | `Extra`     | tracked, never penalized       |
//! | empty     | present   | `Missing`   | false negative, always penalized |
//! | present   | present   | `Mismatch`  | caller compares values         |

use fabula_core::ActionLayer;
use serde::{Deserialize, Serialize};

/// Outcome of comparing a candidate value with a possibly-blank reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOutcome {
    /// Both empty.
    Matched,
    /// Reference empty, candidate present. Reference is incomplete here.
    Extra,
    /// Reference present, candidate empty.
    Missing,
    /// Both present; the caller decides equality.
    Mismatch,
}

impl PolicyOutcome {
    /// Whether this outcome is a penalty regardless of values.
    #[must_use]
    pub fn is_penalized(self) -> bool {
        matches!(self, PolicyOutcome::Missing)
    }

    /// Whether both values are present and should be compared.
    #[must_use]
    pub fn is_comparable(self) -> bool {
        matches!(self, PolicyOutcome::Mismatch)
    }

    /// Whether the reference side carries data.
    #[must_use]
    pub fn reference_present(self) -> bool {
        matches!(self, PolicyOutcome::Missing | PolicyOutcome::Mismatch)
    }
}

/// Uniform emptiness predicate.
///
/// `None`, blank strings and empty collections are empty.
pub trait IsEmpty {
    /// True when the value carries no annotation.
    fn is_empty_value(&self) -> bool;
}

impl IsEmpty for str {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}

impl IsEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.as_str().is_empty_value()
    }
}

impl<T: IsEmpty + ?Sized> IsEmpty for &T {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().map_or(true, |v| v.is_empty_value())
    }
}

impl<T> IsEmpty for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for serde_json::Value {
    fn is_empty_value(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.is_empty_value(),
            serde_json::Value::Array(a) => a.is_empty(),
            serde_json::Value::Object(o) => o.is_empty(),
            _ => false,
        }
    }
}

impl IsEmpty for ActionLayer {
    fn is_empty_value(&self) -> bool {
        self.is_blank()
    }
}

/// Classify a (candidate, reference) pair.
///
/// ```rust
/// use fabula::eval::policy::{classify, PolicyOutcome};
///
/// assert_eq!(classify(&Some("joy"), &None::<&str>), PolicyOutcome::Extra);
/// assert_eq!(classify(&"", &"joy"), PolicyOutcome::Missing);
/// assert_eq!(classify(&Vec::<u8>::new(), &Vec::<u8>::new()), PolicyOutcome::Matched);
/// ```
#[must_use]
pub fn classify<C, R>(candidate: &C, reference: &R) -> PolicyOutcome
where
    C: IsEmpty + ?Sized,
    R: IsEmpty + ?Sized,
{
    match (candidate.is_empty_value(), reference.is_empty_value()) {
        (true, true) => PolicyOutcome::Matched,
        (false, true) => PolicyOutcome::Extra,
        (true, false) => PolicyOutcome::Missing,
        (false, false) => PolicyOutcome::Mismatch,
    }
}

/// [`classify`] with the field name recorded at trace level.
#[must_use]
pub fn classify_field<C, R>(candidate: &C, reference: &R, field: &str) -> PolicyOutcome
where
    C: IsEmpty + ?Sized,
    R: IsEmpty + ?Sized,
{
    let outcome = classify(candidate, reference);
    log::trace!("missing-reference policy: {} -> {:?}", field, outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_outcomes() {
        assert_eq!(classify(&None::<String>, &None::<String>), PolicyOutcome::Matched);
        assert_eq!(classify(&"a", &""), PolicyOutcome::Extra);
        assert_eq!(classify(&"   ", &"a"), PolicyOutcome::Missing);
        assert_eq!(classify(&"a", &"b"), PolicyOutcome::Mismatch);
    }

    #[test]
    fn test_collections_and_json() {
        let empty: Vec<u32> = vec![];
        assert_eq!(classify(&vec![1], &empty), PolicyOutcome::Extra);
        assert_eq!(
            classify(&serde_json::json!({}), &serde_json::json!(null)),
            PolicyOutcome::Matched
        );
        assert_eq!(
            classify(&serde_json::json!(0), &serde_json::json!([1])),
            PolicyOutcome::Mismatch
        );
    }

    #[test]
    fn test_action_layer_emptiness() {
        let blank = ActionLayer::default();
        let set = ActionLayer::default().with(fabula_core::ActionField::Status, "success");
        assert_eq!(classify(&Some(set.clone()), &Some(blank)), PolicyOutcome::Extra);
        assert_eq!(classify(&None::<ActionLayer>, &Some(set)), PolicyOutcome::Missing);
    }

    #[test]
    fn test_only_missing_is_penalized() {
        assert!(PolicyOutcome::Missing.is_penalized());
        for o in [PolicyOutcome::Matched, PolicyOutcome::Extra, PolicyOutcome::Mismatch] {
            assert!(!o.is_penalized());
        }
    }
}
