/// Get environment variable with MAILDISPATCH_ prefix, falling back to unprefixed version
///
/// Checks `MAILDISPATCH_{key}` first, then `{key}`, so a deployment can keep the
/// conventional names (`SMTP_HOST`, `EMAIL_METHOD`) or namespace them per process.
///
/// # Examples
///
/// ```rust,ignore
/// use maildispatch::utils::get_env_with_prefix;
///
/// // Checks MAILDISPATCH_SMTP_HOST first, then SMTP_HOST
/// let host = get_env_with_prefix("SMTP_HOST");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("MAILDISPATCH_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
