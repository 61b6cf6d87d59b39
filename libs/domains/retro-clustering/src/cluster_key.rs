//! Pure cluster key derivation. No `&self`, no service state, no clock —
//! the same `(route, kind, hint, label)` always derives the same key.

use domain_retro_core::{ClusterKey, MarkerKind};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});
static NUMERIC_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static HEX_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{12,}$").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}").unwrap()
});
static LONG_DIGITS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4,}").unwrap());
static HEX_RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9a-fA-F]{12,}\b").unwrap());
static SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Canonicalizes a route by replacing identifier-shaped path segments
/// (UUIDs, pure-digit ids, long hex ids) with `:id`, so `/orders/42/items`
/// and `/orders/97/items` collapse to the same shape.
fn normalize_route(route: &str) -> String {
    route
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                segment.to_string()
            } else if UUID_SEGMENT.is_match(segment) || NUMERIC_SEGMENT.is_match(segment) || HEX_SEGMENT.is_match(segment) {
                ":id".to_string()
            } else {
                segment.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lowercases, strips anything identifier-shaped (emails, UUIDs, long digit
/// runs, long hex runs), and collapses whatever separators remain into
/// single spaces.
fn normalize_text(text: &str) -> String {
    let text = text.to_lowercase();
    let text = EMAIL_PATTERN.replace_all(&text, " ");
    let text = UUID_PATTERN.replace_all(&text, " ");
    let text = HEX_RUN_PATTERN.replace_all(&text, " ");
    let text = LONG_DIGITS_PATTERN.replace_all(&text, " ");
    SEPARATOR_PATTERN.replace_all(&text, " ").trim().to_string()
}

/// Derives the opaque key two sessions share iff they represent the same
/// recurring failure shape. `kind` is already a validated [`MarkerKind`] in
/// this codebase — there is no "unknown kind" case to normalize away, unlike
/// a stringly-typed source format, because the type itself rules it out.
pub fn derive_cluster_key(route: &str, kind: MarkerKind, cluster_hint: Option<&str>, label: Option<&str>) -> ClusterKey {
    let route_part = normalize_route(route);
    let hint_part = cluster_hint.map(normalize_text).unwrap_or_default();
    let label_part = label.map(normalize_text).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(route_part.as_bytes());
    hasher.update(b"\0");
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(hint_part.as_bytes());
    hasher.update(b"\0");
    hasher.update(label_part.as_bytes());

    ClusterKey(format!("{}:{:x}", kind, hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_derive_the_same_key() {
        let a = derive_cluster_key("/orders/42/items", MarkerKind::ApiError, Some("Timeout"), None);
        let b = derive_cluster_key("/orders/42/items", MarkerKind::ApiError, Some("timeout"), None);
        assert_eq!(a, b);
    }

    #[test]
    fn route_identifiers_collapse_to_the_same_key() {
        let a = derive_cluster_key("/orders/42/items", MarkerKind::ApiError, None, None);
        let b = derive_cluster_key("/orders/97/items", MarkerKind::ApiError, None, None);
        assert_eq!(a, b);
    }

    #[test]
    fn different_routes_derive_different_keys() {
        let a = derive_cluster_key("/checkout", MarkerKind::JsException, None, None);
        let b = derive_cluster_key("/cart", MarkerKind::JsException, None, None);
        assert_ne!(a, b);
    }

    #[test]
    fn hint_identifiers_are_stripped_before_hashing() {
        let a = derive_cluster_key("/checkout", MarkerKind::JsException, Some("user 550e8400-e29b-41d4-a716-446655440000 failed"), None);
        let b = derive_cluster_key("/checkout", MarkerKind::JsException, Some("user failed"), None);
        assert_eq!(a, b);
    }
}
