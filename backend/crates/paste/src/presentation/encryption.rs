//! Encryption key lookup for incoming requests

use axum::http::HeaderMap;
use platform::cookie::cookies_with_prefix;

use crate::application::config::PasteConfig;
use crate::application::encryption::EncryptionKeys;

/// Keys from the `Encryption-Key` header and the per-paste key cookies
pub fn encryption_keys(headers: &HeaderMap, config: &PasteConfig) -> EncryptionKeys {
    let header = headers
        .get(config.encryption_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|k| !k.is_empty());

    EncryptionKeys {
        header,
        cookies: cookies_with_prefix(headers, &config.encryption_cookie_prefix)
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use kernel::id::PasteId;

    #[test]
    fn test_header_and_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert("Encryption-Key", HeaderValue::from_static("hunter2"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static(
                "pastemyst=tok; pastemyst-encryption-key-abc=one; pastemyst-encryption-key-def=two",
            ),
        );

        let keys = encryption_keys(&headers, &PasteConfig::default());
        assert_eq!(keys.header.as_deref(), Some("hunter2"));
        assert_eq!(keys.cookies.len(), 2);
        assert_eq!(keys.cookies.get("def").map(String::as_str), Some("two"));
        // Header wins over the cookie
        assert_eq!(keys.key_for(&PasteId::from_string("abc")), Some("hunter2"));
    }

    #[test]
    fn test_cookie_only() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("pastemyst-encryption-key-abc=one"),
        );

        let keys = encryption_keys(&headers, &PasteConfig::default());
        assert_eq!(keys.header, None);
        assert_eq!(keys.key_for(&PasteId::from_string("abc")), Some("one"));
        assert_eq!(keys.key_for(&PasteId::from_string("zzz")), None);
    }

    #[test]
    fn test_cookie_key_is_url_decoded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("pastemyst-encryption-key-abc=my%20secret%21"),
        );

        let keys = encryption_keys(&headers, &PasteConfig::default());
        assert_eq!(
            keys.key_for(&PasteId::from_string("abc")),
            Some("my secret!")
        );
    }
}
