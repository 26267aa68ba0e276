//! Platform-overlap decisions used to gate name-based matches

use crate::library::PlatformProperty;

/// Whether two platform sets denote at least one shared platform.
///
/// Spec ids must match exactly; free-text names match case-insensitively.
/// The two forms never cross-match. Empty sets overlap with nothing, so
/// missing platform data can never produce a match on its own.
pub fn platforms_overlap(a: &[PlatformProperty], b: &[PlatformProperty]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    for left in a {
        for right in b {
            match (left, right) {
                (PlatformProperty::Spec(x), PlatformProperty::Spec(y)) => {
                    if x == y {
                        return true;
                    }
                }
                (PlatformProperty::Name(x), PlatformProperty::Name(y)) => {
                    if x.trim().to_lowercase() == y.trim().to_lowercase() {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }
    false
}
