// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie capture support
//!
//! The watcher itself never talks to a cookie backend directly; it asks a
//! [`CookieSource`] for the cookies visible to a hostname. The bundled
//! [`DomainCookieJar`] implements that source from observed `Set-Cookie`
//! headers for hosts without a browser-provided jar.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// A captured cookie, in the shape the host cookie query returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag (not accessible from page scripts)
    pub http_only: bool,
}

impl CookieRecord {
    /// Create a new cookie record
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the http_only flag
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Parse a `Set-Cookie` header value into a record scoped to the
    /// request URL
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();
        let (name, value) = first.split_once('=')?;

        let mut cookie = CookieRecord::new(name.trim(), value.trim())
            .domain(url.host_str().unwrap_or(""));

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                match attr.trim().to_lowercase().as_str() {
                    "domain" => cookie.domain = val.trim().trim_start_matches('.').to_string(),
                    "path" => cookie.path = val.trim().to_string(),
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Check whether this cookie is visible to a hostname
    fn visible_to(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return false;
        }
        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }
}

/// Cookie lookup by hostname — the collaborator contract the host browser
/// fulfills in a real deployment
pub trait CookieSource: Send + Sync {
    /// All cookies visible to the given hostname
    fn cookies_for_host(&self, host: &str) -> Vec<CookieRecord>;
}

/// Thread-safe cookie storage keyed by domain
#[derive(Debug, Clone, Default)]
pub struct DomainCookieJar {
    cookies: Arc<DashMap<String, Vec<CookieRecord>>>,
}

impl DomainCookieJar {
    /// Create a new empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing any existing cookie with the same name
    /// and path on its domain
    pub fn add(&self, cookie: CookieRecord) {
        let domain = cookie.domain.trim_start_matches('.').to_string();
        let mut entry = self.cookies.entry(domain).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Add a cookie from a `Set-Cookie` header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = CookieRecord::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if the jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieSource for DomainCookieJar {
    fn cookies_for_host(&self, host: &str) -> Vec<CookieRecord> {
        let mut result = Vec::new();
        for entry in self.cookies.iter() {
            for cookie in entry.value() {
                if cookie.visible_to(host) {
                    result.push(cookie.clone());
                }
            }
        }
        result
    }
}

/// Render the by-domain cookie map for export: a comment line per domain
/// followed by `name=value;` pairs. Domains are sorted for stable output.
pub fn format_cookies(cookies: &HashMap<String, Vec<CookieRecord>>) -> String {
    let mut domains: Vec<_> = cookies.keys().collect();
    domains.sort();

    let mut formatted = String::new();
    for domain in domains {
        formatted.push_str(&format!("// {}\n", domain));
        for cookie in &cookies[domain] {
            formatted.push_str(&format!("{}={}; ", cookie.name, cookie.value));
        }
        formatted.push_str("\n\n");
    }
    formatted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let url = Url::parse("https://media.example.com/path").unwrap();
        let header = "session=abc123; Domain=example.com; Path=/; Secure; HttpOnly";
        let cookie = CookieRecord::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_cookie_defaults_to_request_host() {
        let url = Url::parse("https://media.example.com/path").unwrap();
        let cookie = CookieRecord::parse("token=x", &url).unwrap();
        assert_eq!(cookie.domain, "media.example.com");
    }

    #[test]
    fn test_jar_host_scoping() {
        let jar = DomainCookieJar::new();
        jar.add(CookieRecord::new("a", "1").domain("example.com"));
        jar.add(CookieRecord::new("b", "2").domain("media.example.com"));
        jar.add(CookieRecord::new("c", "3").domain("other.net"));

        let cookies = jar.cookies_for_host("media.example.com");
        let names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"a")); // parent-domain cookie is visible
        assert!(names.contains(&"b"));
        assert!(!names.contains(&"c"));

        // the apex host does not see the subdomain cookie
        let apex = jar.cookies_for_host("example.com");
        assert_eq!(apex.len(), 1);
        assert_eq!(apex[0].name, "a");
    }

    #[test]
    fn test_jar_replaces_same_name_and_path() {
        let jar = DomainCookieJar::new();
        jar.add(CookieRecord::new("session", "old").domain("example.com"));
        jar.add(CookieRecord::new("session", "new").domain("example.com"));

        let cookies = jar.cookies_for_host("example.com");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "new");
    }

    #[test]
    fn test_format_cookies() {
        let mut map = HashMap::new();
        map.insert(
            "example.com".to_string(),
            vec![
                CookieRecord::new("a", "1").domain("example.com"),
                CookieRecord::new("b", "2").domain("example.com"),
            ],
        );

        let formatted = format_cookies(&map);
        assert_eq!(formatted, "// example.com\na=1; b=2;");
    }

    #[test]
    fn test_format_cookies_empty() {
        assert_eq!(format_cookies(&HashMap::new()), "");
    }

    #[test]
    fn test_record_serde_shape() {
        let cookie = CookieRecord::new("id", "42")
            .domain("example.com")
            .http_only(true);
        let json = serde_json::to_value(&cookie).unwrap();
        assert_eq!(json["httpOnly"].as_bool(), Some(true));
        assert_eq!(json["name"].as_str(), Some("id"));
    }
}
