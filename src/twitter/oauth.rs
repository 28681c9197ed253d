//! OAuth 1.0a request signing.
//!
//! Every Twitter endpoint this crate talks to requires a user-context
//! OAuth 1.0a signature. The signer also covers the token-acquisition
//! handshake, where no access token exists yet and extra parameters
//! (`oauth_callback`, `oauth_verifier`) join the signed set.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::RngCore;
use sha1::Sha1;

use crate::error::{TweeterError, TweeterResult};

/// Characters that must be percent-encoded in OAuth signatures.
/// RFC 3986 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~"
const OAUTH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// OAuth 1.0a signer.
///
/// With an access token attached it signs normal API calls; without one it
/// signs the request-token and access-token exchange of the PIN flow.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    access_token: Option<String>,
    access_secret: Option<String>,
}

impl OAuthSigner {
    /// Signer carrying only consumer credentials, for the PIN handshake.
    pub fn consumer_only(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            access_token: None,
            access_secret: None,
        }
    }

    /// Signer carrying full user-context credentials.
    pub fn with_access(
        consumer_key: &str,
        consumer_secret: &str,
        access_token: &str,
        access_secret: &str,
    ) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            access_token: Some(access_token.to_string()),
            access_secret: Some(access_secret.to_string()),
        }
    }

    /// Generate the OAuth 1.0a Authorization header value.
    ///
    /// `params` are the request's query/form parameters; they join the
    /// signature base string but not the header. `extra_oauth` parameters
    /// (e.g. `oauth_verifier`) join both.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra_oauth: &[(String, String)],
    ) -> TweeterResult<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| TweeterError::OAuth(format!("failed to get timestamp: {e}")))?
            .as_secs()
            .to_string();

        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), generate_nonce()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];
        if let Some(token) = &self.access_token {
            oauth_params.push(("oauth_token".to_string(), token.clone()));
        }
        oauth_params.extend(extra_oauth.iter().cloned());

        let mut all_params = oauth_params.clone();
        all_params.extend(params.iter().cloned());
        all_params.sort_by(|a, b| {
            if a.0 == b.0 {
                a.1.cmp(&b.1)
            } else {
                a.0.cmp(&b.0)
            }
        });

        let param_string = all_params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );

        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(self.access_secret.as_deref().unwrap_or(""))
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }
}

/// Percent-encode a string according to RFC 3986.
fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Generate a random nonce for OAuth.
fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compute HMAC-SHA1 and return base64-encoded result.
fn hmac_sha1(key: &str, data: &str) -> TweeterResult<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| TweeterError::OAuth(e.to_string()))?;

    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
