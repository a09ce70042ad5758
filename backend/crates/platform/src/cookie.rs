//! Cookies
//!
//! Set-Cookie rendering and Cookie header parsing for the login, OAuth state,
//! session settings and encryption key cookies.

use axum::http::{HeaderMap, HeaderValue, header};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Attributes of a server-set cookie; always HttpOnly
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    /// Session cookie when `None`
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "pastemyst".to_string(),
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn max_age_secs(mut self, secs: i64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }

    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}; HttpOnly", self.name, value);

        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }

        cookie
    }

    /// Expired copy of the cookie; browsers drop it on receipt
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; HttpOnly; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie
    }
}

/// First cookie named `name` across all Cookie headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    cookie_pairs(headers).find_map(|(key, value)| (key == name).then_some(value))
}

/// All cookies whose name starts with `prefix`, as `(suffix, value)` pairs
pub fn cookies_with_prefix(headers: &HeaderMap, prefix: &str) -> Vec<(String, String)> {
    cookie_pairs(headers)
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .map(|suffix| (suffix.to_string(), value))
        })
        .collect()
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (String, String)> + '_ {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            Some((key.to_string(), decode_value(value)))
        })
}

/// Percent-decode a cookie value; malformed escapes are kept verbatim
fn decode_value(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Create a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> HeaderValue {
    HeaderValue::from_str(&config.build_set_cookie(value))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Create a Set-Cookie header value that clears the cookie
pub fn delete_cookie_header(config: &CookieConfig) -> HeaderValue {
    HeaderValue::from_str(&config.build_delete_cookie())
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_config_build() {
        let config = CookieConfig {
            name: "pastemyst-oauth-state".to_string(),
            path: "/api".to_string(),
            max_age_secs: Some(3600),
            ..Default::default()
        };

        let cookie = config.build_set_cookie("value123");
        assert!(cookie.starts_with("pastemyst-oauth-state=value123; HttpOnly"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/api"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_builder_and_delete_cookie() {
        let config = CookieConfig::new("pastemyst")
            .secure(false)
            .same_site(SameSite::Strict)
            .max_age_secs(60);

        let set = config.build_set_cookie("tok");
        assert!(set.starts_with("pastemyst=tok"));
        assert!(!set.contains("Secure"));
        assert!(set.contains("SameSite=Strict"));

        let del = config.build_delete_cookie();
        assert!(del.starts_with("pastemyst=;"));
        assert!(del.contains("Max-Age=0"));
        assert!(del.contains("SameSite=Strict"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; pastemyst=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "pastemyst"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_values_are_percent_decoded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("key-abc=my%20secret%21; plain=a.b-c; bad=%zz"),
        );

        assert_eq!(
            cookies_with_prefix(&headers, "key-"),
            vec![("abc".to_string(), "my secret!".to_string())]
        );
        assert_eq!(extract_cookie(&headers, "plain"), Some("a.b-c".to_string()));
        assert_eq!(extract_cookie(&headers, "bad"), Some("%zz".to_string()));
    }

    #[test]
    fn test_cookies_with_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("key-abc=k1; other=x; key-def=k2"),
        );

        let found = cookies_with_prefix(&headers, "key-");
        assert_eq!(
            found,
            vec![
                ("abc".to_string(), "k1".to_string()),
                ("def".to_string(), "k2".to_string())
            ]
        );
    }
}
