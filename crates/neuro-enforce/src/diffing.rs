//! Unified diff rendering shared by the patch-plan and local-patch engines.

use similar::TextDiff;

pub fn unified_diff(file_label: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(file_label, file_label)
        .to_string()
}
