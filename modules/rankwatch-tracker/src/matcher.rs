// Find where a tracked domain ranks in an ordered result list.

use rankwatch_common::{normalize_domain, MatchPolicy, SearchResult};

/// 1-based position of the first result matching `domain`, or `None`.
///
/// Both sides go through [`normalize_domain`]. Under [`MatchPolicy::Prefix`]
/// a result matches when its normalized URL starts with the normalized
/// domain, so `example.com/page` matches `example.com`.
pub fn match_position(results: &[SearchResult], domain: &str, policy: MatchPolicy) -> Option<u32> {
    let wanted = normalize_domain(domain);
    if wanted.is_empty() {
        return None;
    }

    results
        .iter()
        .position(|result| {
            result
                .url
                .as_deref()
                .map(|url| matches(&normalize_domain(url), &wanted, policy))
                .unwrap_or(false)
        })
        .map(|idx| idx as u32 + 1)
}

fn matches(candidate: &str, wanted: &str, policy: MatchPolicy) -> bool {
    let Some(rest) = candidate.strip_prefix(wanted) else {
        return false;
    };
    match policy {
        MatchPolicy::Prefix => true,
        // The match must end where a host or path segment ends.
        MatchPolicy::Host => rest.is_empty() || rest.starts_with(['/', '?', '#', ':']),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(urls: &[&str]) -> Vec<SearchResult> {
        urls.iter().map(|u| SearchResult::new(u)).collect()
    }

    #[test]
    fn empty_list_is_not_found() {
        assert_eq!(match_position(&[], "example.com", MatchPolicy::Prefix), None);
    }

    #[test]
    fn first_qualifying_entry_wins() {
        let list = results(&["other.com", "example.com/page", "example.com"]);
        assert_eq!(match_position(&list, "example.com", MatchPolicy::Prefix), Some(2));
    }

    #[test]
    fn scheme_and_www_are_ignored_on_both_sides() {
        let list = results(&["https://www.Example.com/pricing"]);
        assert_eq!(match_position(&list, "http://example.com/", MatchPolicy::Prefix), Some(1));
    }

    #[test]
    fn entries_without_url_are_skipped_but_counted() {
        let list = vec![
            SearchResult::default(),
            SearchResult::new("https://example.com"),
        ];
        assert_eq!(match_position(&list, "example.com", MatchPolicy::Prefix), Some(2));
    }

    #[test]
    fn no_match_is_not_found() {
        let list = results(&["a.com", "b.com"]);
        assert_eq!(match_position(&list, "example.com", MatchPolicy::Prefix), None);
    }

    #[test]
    fn blank_domain_never_matches() {
        let list = results(&["a.com"]);
        assert_eq!(match_position(&list, "https://", MatchPolicy::Prefix), None);
    }

    #[test]
    fn prefix_policy_matches_lookalike_hosts() {
        let list = results(&["https://example.com.evil.com/login"]);
        assert_eq!(match_position(&list, "example.com", MatchPolicy::Prefix), Some(1));
    }

    #[test]
    fn host_policy_rejects_lookalike_hosts() {
        let list = results(&[
            "https://example.com.evil.com/login",
            "https://example.community",
            "https://example.com:8443/app",
        ]);
        assert_eq!(match_position(&list, "example.com", MatchPolicy::Host), Some(3));
    }

    #[test]
    fn host_policy_accepts_path_targets() {
        let list = results(&["https://example.com/blog/rust-tips"]);
        assert_eq!(match_position(&list, "example.com/blog", MatchPolicy::Host), Some(1));
    }

    #[test]
    fn host_policy_path_targets_end_at_segment() {
        let list = results(&["https://example.com/blogger", "https://example.com/blog?page=2"]);
        assert_eq!(match_position(&list, "example.com/blog", MatchPolicy::Host), Some(2));
        assert_eq!(match_position(&list, "example.com/blog", MatchPolicy::Prefix), Some(1));
    }

    #[test]
    fn single_entry_matches_iff_normalized_prefix() {
        let cases = [
            ("example.com/page", "example.com", true),
            ("example.com", "example.com/page", false),
            ("www.example.com", "https://example.com", true),
            ("shop.example.com", "example.com", false),
        ];
        for (entry, domain, expected) in cases {
            let found = match_position(&results(&[entry]), domain, MatchPolicy::Prefix);
            assert_eq!(
                found == Some(1),
                normalize_domain(entry).starts_with(&normalize_domain(domain)),
                "{entry} vs {domain}"
            );
            assert_eq!(found == Some(1), expected, "{entry} vs {domain}");
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let list = results(&["other.com", "example.com/page"]);
        let first = match_position(&list, "example.com", MatchPolicy::Prefix);
        let second = match_position(&list, "example.com", MatchPolicy::Prefix);
        assert_eq!(first, second);
    }
}
