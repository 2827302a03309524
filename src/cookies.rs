//! Netscape-format cookie jar.
//!
//! Parses the tab-separated `cookies.txt` format and answers, per request,
//! which cookies apply. The jar is read-only after load; matching is pure.

use chrono::Utc;
use tracing::warn;
use url::Url;

use crate::error::ConfigError;

/// One cookie from a Netscape-format file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie domain, stored without a leading dot.
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Expiry in seconds since the epoch; 0 means a session cookie that
    /// never expires for our purposes.
    pub expires: i64,
    pub name: String,
    pub value: String,
}

/// An in-memory cookie jar matched against outgoing requests.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Parse Netscape cookie-file text.
    ///
    /// Blank lines and lines starting with `#` are ignored; lines with
    /// fewer than seven tab-separated fields are skipped with a warning.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut cookies = Vec::new();

        for (lineno, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                warn!(
                    target: "website_fetch::cookies",
                    line = lineno + 1,
                    "skipping cookie line with {} fields",
                    fields.len()
                );
                continue;
            }

            let expires = match fields[4].trim().parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    warn!(
                        target: "website_fetch::cookies",
                        line = lineno + 1,
                        "skipping cookie line with unparseable expiry `{}`",
                        fields[4]
                    );
                    continue;
                }
            };

            cookies.push(Cookie {
                domain: fields[0].trim_start_matches('.').to_string(),
                include_subdomains: fields[1].trim().eq_ignore_ascii_case("true"),
                path: fields[2].to_string(),
                secure: fields[3].trim().eq_ignore_ascii_case("true"),
                expires,
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            });
        }

        Self { cookies }
    }

    /// Load and parse a cookie file from disk.
    pub async fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::CookieFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::parse(&text))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Build the `Cookie` header value for a request, or `None` when no
    /// cookie applies.
    #[must_use]
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let now = Utc::now().timestamp();
        let matching: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| cookie_matches(cookie, url, now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();

        if matching.is_empty() {
            None
        } else {
            Some(matching.join("; "))
        }
    }
}

fn cookie_matches(cookie: &Cookie, url: &Url, now: i64) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    let domain_ok = host.eq_ignore_ascii_case(&cookie.domain)
        || (cookie.include_subdomains
            && host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", cookie.domain.to_ascii_lowercase())));
    if !domain_ok {
        return false;
    }

    if !url.path().starts_with(&cookie.path) {
        return false;
    }

    if cookie.secure && url.scheme() != "https" {
        return false;
    }

    // expires == 0 marks a session cookie, always valid.
    cookie.expires == 0 || cookie.expires > now
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAR: &str = "\
# Netscape HTTP Cookie File
example.com\tFALSE\t/\tFALSE\t0\tsession\tabc
.example.com\tTRUE\t/docs\tFALSE\t0\tscoped\tdef
secure.example.com\tFALSE\t/\tTRUE\t0\tlocked\tghi
stale.example.com\tFALSE\t/\tFALSE\t1\texpired\tjkl
short line without tabs
";

    #[test]
    fn parses_and_skips_malformed_lines() {
        let jar = CookieJar::parse(JAR);
        assert_eq!(jar.len(), 4);
    }

    #[test]
    fn matches_exact_domain_and_path() {
        let jar = CookieJar::parse(JAR);
        let url = Url::parse("http://example.com/docs/intro").unwrap();
        let header = jar.header_for(&url).unwrap();
        assert!(header.contains("session=abc"));
        assert!(header.contains("scoped=def"));
    }

    #[test]
    fn subdomain_needs_flag() {
        let jar = CookieJar::parse(JAR);
        let url = Url::parse("http://api.example.com/docs").unwrap();
        let header = jar.header_for(&url).unwrap();
        // `session` is bound to example.com exactly; `scoped` allows subdomains.
        assert!(!header.contains("session=abc"));
        assert!(header.contains("scoped=def"));
    }

    #[test]
    fn secure_cookie_requires_https() {
        let jar = CookieJar::parse(JAR);
        let http = Url::parse("http://secure.example.com/").unwrap();
        let https = Url::parse("https://secure.example.com/").unwrap();
        assert!(jar.header_for(&http).is_none());
        assert_eq!(jar.header_for(&https).unwrap(), "locked=ghi");
    }

    #[test]
    fn expired_cookie_never_matches() {
        let jar = CookieJar::parse(JAR);
        let url = Url::parse("http://stale.example.com/").unwrap();
        assert!(jar.header_for(&url).is_none());
    }
}
