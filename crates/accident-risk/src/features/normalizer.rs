/// Canonical form used when templating one-hot feature names.
pub(crate) fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase().replace(' ', "_")
}
