//! Literal text comparison helpers.

use similar::TextDiff;

/// Unified line diff for display, with three lines of context.
pub fn unified_diff(left: &str, right: &str) -> String {
    TextDiff::from_lines(left, right)
        .unified_diff()
        .context_radius(3)
        .header("left", "right")
        .to_string()
}
