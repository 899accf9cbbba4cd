/// Reduce a URL or bare domain to the form used for rank matching:
/// scheme and leading `www.` removed, trailing slashes dropped, lower-cased.
///
/// "HTTPS://www.Example.com/" → "example.com"
pub fn normalize_domain(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}
