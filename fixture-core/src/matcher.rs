//! URL pattern matching for the route table.
//!
//! Three forms are understood:
//! - exact: `https://server.lan/test`
//! - prefix: `https://server.lan/*` (anything after the literal prefix)
//! - host: `server.lan` (the host itself or any subdomain)

/// A parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    Exact(String),
    Prefix(String),
    Host(String),
}

impl UrlPattern {
    pub fn parse(pattern: &str) -> Self {
        if let Some(prefix) = pattern.strip_suffix('*') {
            UrlPattern::Prefix(prefix.to_string())
        } else if !pattern.contains("://") {
            UrlPattern::Host(pattern.to_ascii_lowercase())
        } else {
            UrlPattern::Exact(pattern.to_string())
        }
    }

    /// Check `url` against this pattern.
    ///
    /// `host` is the request's host when already known; otherwise it is parsed
    /// from `url` for host patterns.
    pub fn matches(&self, url: &str, host: Option<&str>) -> bool {
        match self {
            UrlPattern::Exact(exact) => url == exact,
            UrlPattern::Prefix(prefix) => url.starts_with(prefix.as_str()),
            UrlPattern::Host(pattern) => {
                let parsed;
                let host = match host {
                    Some(h) => h,
                    None => match host_of(url) {
                        Some(h) => {
                            parsed = h;
                            parsed.as_str()
                        }
                        None => return false,
                    },
                };
                host_matches(host, pattern)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UrlPattern::Exact(s) | UrlPattern::Prefix(s) | UrlPattern::Host(s) => s,
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlPattern::Prefix(p) => write!(f, "{}*", p),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Match a concrete URL against a pattern string
pub fn url_matches(url: &str, pattern: &str) -> bool {
    if url == pattern {
        return true;
    }
    UrlPattern::parse(pattern).matches(url, None)
}

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// Host equals the pattern or is a subdomain of it.
/// `notserver.lan` is not a subdomain of `server.lan`.
fn host_matches(host: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    if host == pattern {
        return true;
    }
    host.len() > pattern.len()
        && host.ends_with(pattern)
        && host.as_bytes()[host.len() - pattern.len() - 1] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_match() {
        assert!(url_matches("https://server.lan/test", "https://server.lan/test"));
        assert!(!url_matches("https://server.lan/test2", "https://server.lan/test"));
        assert!(!url_matches("https://server.lan/test?x=1", "https://server.lan/test"));
    }

    #[test]
    fn test_prefix_match() {
        let pattern = "https://server.lan/*";
        assert!(url_matches("https://server.lan/", pattern));
        assert!(url_matches("https://server.lan/api/v1/users", pattern));
        assert!(!url_matches("https://other.lan/api", pattern));
        assert!(!url_matches("http://server.lan/api", pattern));
    }

    #[test]
    fn test_host_match() {
        assert!(url_matches("https://server.lan/anything", "server.lan"));
        assert!(url_matches("http://api.server.lan:8080/x", "server.lan"));
        assert!(url_matches("https://a.b.server.lan/", "server.lan"));
        assert!(!url_matches("https://notserver.lan/", "server.lan"));
        assert!(!url_matches("https://server.lan.evil/", "server.lan"));
    }

    #[test]
    fn test_host_match_is_case_insensitive() {
        assert!(url_matches("https://API.Server.LAN/", "server.lan"));
        assert!(url_matches("https://server.lan/", "Server.Lan"));
    }

    #[test]
    fn test_host_pattern_never_matches_unparseable_url() {
        assert!(!url_matches("not a url", "server.lan"));
        assert!(!url_matches("", "server.lan"));
    }

    #[test]
    fn test_known_host_skips_parsing() {
        let pattern = UrlPattern::parse("server.lan");
        assert!(pattern.matches("/relative", Some("api.server.lan")));
        assert!(!pattern.matches("/relative", Some("notserver.lan")));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            UrlPattern::parse("https://server.lan/*"),
            UrlPattern::Prefix("https://server.lan/".to_string())
        );
        assert_eq!(
            UrlPattern::parse("Server.LAN"),
            UrlPattern::Host("server.lan".to_string())
        );
        assert_eq!(
            UrlPattern::parse("https://server.lan/test"),
            UrlPattern::Exact("https://server.lan/test".to_string())
        );
        assert_eq!(UrlPattern::parse("https://server.lan/*").to_string(), "https://server.lan/*");
    }

    proptest! {
        #[test]
        fn prop_subdomains_match_parent(label in "[a-z][a-z0-9]{0,10}", path in "[a-z0-9/]{0,20}") {
            let url = format!("https://{}.server.lan/{}", label, path);
            prop_assert!(url_matches(&url, "server.lan"));
        }

        #[test]
        fn prop_glued_prefix_never_matches(label in "[a-z][a-z0-9]{0,10}") {
            let url = format!("https://{}server.lan/", label);
            prop_assert!(!url_matches(&url, "server.lan"));
        }

        #[test]
        fn prop_prefix_matches_any_suffix(suffix in "[a-zA-Z0-9/?=&._-]{0,40}") {
            let url = format!("https://server.lan/{}", suffix);
            prop_assert!(url_matches(&url, "https://server.lan/*"));
        }
    }
}
