//! Share token codec
//!
//! A share token is the JSON form of a configuration, base64-encoded with the
//! URL-safe alphabet and no padding, carried in the `config` query parameter.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Query parameter that carries the share token.
pub const CONFIG_PARAM: &str = "config";

/// Standard-alphabet decoder that accepts non-zero trailing bits, so tokens
/// produced by lenient encoders still decode.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode config: {0}")]
    Encoding(String),
    #[error("Failed to decode config: {0}")]
    Decoding(String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Encode a value into a URL-safe share token.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_vec(value).map_err(|e| CodecError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a share token.
///
/// Accepts URL-safe tokens with or without padding, and plain standard
/// base64 as well.
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<T, CodecError> {
    let mut base64: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while base64.len() % 4 != 0 {
        base64.push('=');
    }

    let bytes = STANDARD_LENIENT
        .decode(&base64)
        .map_err(|e| CodecError::Decoding(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| CodecError::Decoding(e.to_string()))
}

/// Build a share URL: `base_url` with its `config` parameter set to the
/// encoded value. Other query parameters are kept in place.
pub fn build_share_url<T: Serialize + ?Sized>(
    value: &T,
    base_url: &str,
) -> Result<String, CodecError> {
    let token = encode(value)?;
    let mut url =
        Url::parse(base_url).map_err(|e| CodecError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in url.query_pairs() {
        if key == CONFIG_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), token.clone()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((CONFIG_PARAM.to_string(), token));
    }

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    Ok(url.to_string())
}

/// Read and decode the `config` parameter from a full URL or a bare query
/// string.
///
/// Returns `Ok(None)` when no token is present. Input that is not an absolute
/// URL is read as a query string instead; a token that fails to decode from
/// the URL is retried from the query-string reading before the error is
/// returned.
pub fn extract_from_url<T: DeserializeOwned>(input: &str) -> Result<Option<T>, CodecError> {
    let url_attempt = match Url::parse(input) {
        Ok(url) => {
            let token = url
                .query_pairs()
                .find(|(key, _)| key == CONFIG_PARAM)
                .map(|(_, value)| value.into_owned());
            match token.filter(|t| !t.is_empty()) {
                None => return Ok(None),
                Some(token) => match decode(&token) {
                    Ok(value) => return Ok(Some(value)),
                    Err(e) => Some(e),
                },
            }
        }
        Err(_) => None,
    };

    match query_string_token(input)? {
        Some(token) => decode(&token).map(Some),
        None => match url_attempt {
            Some(e) => Err(e),
            None => Ok(None),
        },
    }
}

fn query_string_token(input: &str) -> Result<Option<String>, CodecError> {
    let query = input.strip_prefix('?').unwrap_or(input);
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query).map_err(|e| CodecError::Decoding(e.to_string()))?;
    Ok(pairs
        .into_iter()
        .find(|(key, _)| key == CONFIG_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn sample() -> Value {
        json!({
            "style": "arcgis/navigation",
            "parameters": {"language": "en", "worldview": "", "places": "none"},
            "viewport": {"center": [0, 30], "zoom": 2},
        })
    }

    #[test]
    fn encode_is_url_safe() {
        let token = encode(&sample()).unwrap();
        assert!(!token.is_empty());
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
    }

    #[test]
    fn roundtrip() {
        let value = json!({
            "style": "arcgis/streets",
            "parameters": {"language": "zh-CN", "worldview": "china", "places": "attributed"},
            "viewport": {"center": [116.4074, 39.9042], "zoom": 12},
        });
        let decoded: Value = decode(&encode(&value).unwrap()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn roundtrip_non_ascii() {
        let value = json!({"style": "café/ñandú", "parameters": {"language": "日本語"}});
        let decoded: Value = decode(&encode(&value).unwrap()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_accepts_padded_standard_base64() {
        let padded = STANDARD.encode(serde_json::to_vec(&sample()).unwrap());
        let decoded: Value = decode(&padded).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn decode_invalid_base64() {
        let err = decode::<Value>("invalid!!!").unwrap_err();
        assert!(matches!(err, CodecError::Decoding(_)));
        assert!(err.to_string().starts_with("Failed to decode config"));
    }

    #[test]
    fn decode_invalid_json() {
        let token = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(matches!(
            decode::<Value>(&token),
            Err(CodecError::Decoding(_))
        ));
    }

    #[test]
    fn encode_rejects_non_json_value() {
        let mut map: HashMap<Vec<u8>, u8> = HashMap::new();
        map.insert(vec![1, 2], 3);
        let err = encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
        assert!(err.to_string().starts_with("Failed to encode config: "));
    }

    #[test]
    fn share_url_with_custom_base() {
        let url = build_share_url(&sample(), "https://example.com/playground").unwrap();
        assert!(url.starts_with("https://example.com/playground?config="));
    }

    #[test]
    fn share_url_preserves_existing_params() {
        let url = build_share_url(&sample(), "https://example.com/app?foo=bar").unwrap();
        assert!(url.contains("foo=bar"));
        assert!(url.contains("config="));
    }

    #[test]
    fn share_url_overwrites_existing_config() {
        let url =
            build_share_url(&sample(), "https://example.com/app?config=old&x=1&config=older")
                .unwrap();
        assert_eq!(url.matches("config=").count(), 1);
        assert!(!url.contains("config=old"));
        let parsed: Value = extract_from_url(&url).unwrap().unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn share_url_rejects_relative_base() {
        assert!(matches!(
            build_share_url(&sample(), "/playground"),
            Err(CodecError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn extract_from_full_url() {
        let url = build_share_url(&sample(), "https://example.com/playground").unwrap();
        let parsed: Option<Value> = extract_from_url(&url).unwrap();
        assert_eq!(parsed, Some(sample()));
    }

    #[test]
    fn extract_returns_none_without_config() {
        let parsed: Option<Value> = extract_from_url("https://example.com/playground").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn extract_from_query_string() {
        let token = encode(&sample()).unwrap();
        let parsed: Option<Value> = extract_from_url(&format!("?config={token}")).unwrap();
        assert_eq!(parsed, Some(sample()));

        let parsed: Option<Value> = extract_from_url(&format!("a=1&config={token}")).unwrap();
        assert_eq!(parsed, Some(sample()));
    }

    #[test]
    fn extract_non_url_input_is_not_an_error() {
        let parsed: Option<Value> = extract_from_url("not-a-url").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn extract_retries_failed_url_token_as_query_string() {
        let token = encode(&json!({"style": "a/b"})).unwrap();
        let value: Value = extract_from_url(&format!("x:y?config=bad&config={token}"))
            .unwrap()
            .unwrap();
        assert_eq!(value, json!({"style": "a/b"}));
    }

    #[test]
    fn extract_propagates_decode_failure() {
        assert!(matches!(
            extract_from_url::<Value>("https://example.com/?config=not-base64"),
            Err(CodecError::Decoding(_))
        ));
        assert!(matches!(
            extract_from_url::<Value>("?config=not-base64"),
            Err(CodecError::Decoding(_))
        ));
    }
}
