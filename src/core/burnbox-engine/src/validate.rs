//! Creation validator.
//!
//! A pure function from a candidate plus the current time to the list of
//! field violations. Every rule is evaluated; nothing short-circuits, so the
//! caller sees all problems at once.

use crate::domain::NewSecret;

/// One violated creation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending input field.
    pub field: &'static str,
    /// Human-readable rule description.
    pub message: &'static str,
}

type Predicate = fn(&NewSecret, u64) -> bool;

/// Ordered rule list: (field path, message, passes?).
const RULES: &[(&str, &str, Predicate)] = &[
    ("encrypted_value", "must not be empty", |c, _| {
        !c.encrypted_value.is_empty()
    }),
    ("encrypted_value", "must be 1000 characters or fewer", |c, _| {
        c.encrypted_value.chars().count() <= 1000
    }),
    ("client_iv", "must not be empty", |c, _| !c.client_iv.is_empty()),
    ("policy.expiration", "Expiration must be in the future.", |c, now| {
        c.expiration > now
    }),
    (
        "policy.max_access_count",
        "Max access count must be greater than 0.",
        |c, _| c.max_access_count.map_or(true, |count| count > 0),
    ),
];

/// Evaluates every rule against the candidate at `now`.
///
/// An empty result means the candidate is valid.
pub fn validate(candidate: &NewSecret, now: u64) -> Vec<Violation> {
    RULES
        .iter()
        .filter(|(_, _, passes)| !passes(candidate, now))
        .map(|(field, message, _)| Violation { field, message })
        .collect()
}

/// Renders violations as `'field': 'message'` pairs, comma separated.
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("'{}': '{}'", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}
