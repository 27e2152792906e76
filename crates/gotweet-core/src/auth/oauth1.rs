//! ============================================================================
//! Twitter OAuth 1.0a Signing
//! ============================================================================
//! Builds the `Authorization: OAuth ...` header for user-context requests.
//! Signature method is HMAC-SHA1 keyed with `consumer_secret&token_secret`.
//! JSON request bodies are not part of the signature; only query or form
//! parameters passed in explicitly are.
//! ============================================================================

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;

use crate::tokens::TokenBundle;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is, everything else is escaped
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LEN: usize = 32;

/// Percent-encode a string the way OAuth 1.0a requires
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Signs requests on behalf of one Twitter user
#[derive(Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl OAuth1Signer {
    pub fn new(tokens: &TokenBundle) -> Self {
        Self {
            consumer_key: tokens.consumer_key.clone(),
            consumer_secret: tokens.consumer_secret.clone(),
            token: tokens.access_token.clone(),
            token_secret: tokens.access_token_secret.clone(),
        }
    }

    /// Authorization header with a fresh nonce and the current timestamp
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();

        self.authorization_header_with(method, url, params, &nonce, timestamp)
    }

    /// Authorization header for a fixed nonce and timestamp
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let timestamp = timestamp.to_string();
        let oauth_params = self.oauth_params(nonce, &timestamp);

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.extend_from_slice(&oauth_params);
        let signature = self.sign(method, url, &all_params)?;

        let mut header_params: Vec<(&str, &str)> = oauth_params.to_vec();
        header_params.push(("oauth_signature", &signature));
        header_params.sort();

        let fields = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", fields))
    }

    fn oauth_params<'a>(&'a self, nonce: &'a str, timestamp: &'a str) -> [(&'a str, &'a str); 6] {
        [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ]
    }

    /// Base64 HMAC-SHA1 of the signature base string
    pub fn sign(&self, method: &str, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let base = signature_base_string(method, url, params);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| anyhow!("HMAC init failed: {}", e))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&encoded(url)&encoded(sorted, encoded params)`
pub(crate) fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from Twitter's "Creating a signature" docs
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: &str = "1318622958";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

    fn doc_signer() -> OAuth1Signer {
        OAuth1Signer::new(&TokenBundle::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        ))
    }

    fn doc_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("status", STATUS),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", TIMESTAMP),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ]
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(percent_encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_signature_base_string() {
        let base = signature_base_string("post", URL, &doc_params());
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen\
             %252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn test_signature_matches_docs() {
        let signature = doc_signer().sign("POST", URL, &doc_params()).unwrap();
        assert_eq!(signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_header_matches_docs() {
        let header = doc_signer()
            .authorization_header_with(
                "POST",
                URL,
                &[("status", STATUS), ("include_entities", "true")],
                NONCE,
                1318622958,
            )
            .unwrap();

        assert_eq!(
            header,
            "OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", \
             oauth_nonce=\"kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg\", \
             oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", \
             oauth_timestamp=\"1318622958\", \
             oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\", \
             oauth_version=\"1.0\""
        );
    }

    #[test]
    fn test_fresh_nonce_per_header() {
        let signer = doc_signer();
        let a = signer.authorization_header("POST", URL, &[]).unwrap();
        let b = signer.authorization_header("POST", URL, &[]).unwrap();
        assert!(a.starts_with("OAuth "));
        assert_ne!(a, b);
    }
}
