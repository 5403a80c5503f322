//! Host normalization for user-supplied provider hosts.

/// Canonicalize a user-supplied host against a provider default.
///
/// Strips one leading `http://` or `https://` and any trailing slashes.
/// Absent or empty input (after cleaning) yields `provider_default`.
pub fn normalize_host(host: Option<&str>, provider_default: &str) -> String {
    let Some(host) = host else {
        return provider_default.to_string();
    };

    let without_scheme = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    let cleaned = without_scheme.trim_end_matches('/');

    if cleaned.is_empty() {
        provider_default.to_string()
    } else {
        cleaned.to_string()
    }
}
