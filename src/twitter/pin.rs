//! Out-of-band (PIN based) OAuth token acquisition.
//!
//! The handshake has three legs: fetch a request token with callback `oob`,
//! send the operator to the authorization page where the vendor displays a
//! PIN, then trade request token plus PIN for a permanent access token pair.

use reqwest::Client;
use tracing::debug;
use url::form_urlencoded;

use crate::error::{TweeterError, TweeterResult};

use super::build_http_client;
use super::oauth::OAuthSigner;

/// A short-lived request token and where the operator must go to approve it.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
    pub authorization_url: String,
}

/// Drives the PIN exchange against the vendor's oauth endpoints.
pub struct TokenGenerator {
    http: Client,
    consumer_key: String,
    consumer_secret: String,
    api_url: String,
}

impl TokenGenerator {
    pub fn new(
        consumer_key: &str,
        consumer_secret: &str,
        api_url: &str,
    ) -> TweeterResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// First leg: obtain a request token bound to the out-of-band flow.
    pub async fn request_token(&self) -> TweeterResult<RequestToken> {
        let url = format!("{}/oauth/request_token", self.api_url);
        let signer = OAuthSigner::consumer_only(&self.consumer_key, &self.consumer_secret);
        let auth = signer.sign(
            "POST",
            &url,
            &[],
            &[("oauth_callback".to_string(), "oob".to_string())],
        )?;

        let response = self.http.post(&url).header("Authorization", auth).send().await?;
        let body = require_success(response).await?;
        let (token, secret) = parse_token_body(&body)?;

        debug!(%token, "obtained oauth request token");
        Ok(RequestToken {
            authorization_url: format!(
                "{}/oauth/authorize?oauth_token={token}",
                self.api_url
            ),
            token,
            secret,
        })
    }

    /// Final leg: trade the approved request token and PIN for access keys.
    pub async fn exchange_pin(
        &self,
        request: &RequestToken,
        pin: &str,
    ) -> TweeterResult<(String, String)> {
        let url = format!("{}/oauth/access_token", self.api_url);
        let signer = OAuthSigner::with_access(
            &self.consumer_key,
            &self.consumer_secret,
            &request.token,
            &request.secret,
        );
        let auth = signer.sign(
            "POST",
            &url,
            &[],
            &[("oauth_verifier".to_string(), pin.to_string())],
        )?;

        let response = self.http.post(&url).header("Authorization", auth).send().await?;
        let body = require_success(response).await?;
        parse_token_body(&body)
    }
}

async fn require_success(response: reqwest::Response) -> TweeterResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(TweeterError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(body)
}

/// The oauth endpoints answer with form-encoded bodies, not JSON.
fn parse_token_body(body: &str) -> TweeterResult<(String, String)> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }
    match (token, secret) {
        (Some(token), Some(secret)) => Ok((token, secret)),
        _ => Err(TweeterError::OAuth(format!(
            "token response missing oauth_token fields: {body:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_token_body() {
        let (token, secret) =
            parse_token_body("oauth_token=abc&oauth_token_secret=def&oauth_callback_confirmed=true")
                .unwrap();
        assert_eq!(token, "abc");
        assert_eq!(secret, "def");
    }

    #[test]
    fn test_parse_token_body_missing_fields() {
        let err = parse_token_body("oauth_token=abc").unwrap_err();
        assert!(matches!(err, TweeterError::OAuth(_)));
    }

    #[tokio::test]
    async fn test_full_pin_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/request_token"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/access_token"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "oauth_token=acc-token&oauth_token_secret=acc-secret",
            ))
            .mount(&server)
            .await;

        let generator = TokenGenerator::new("ck", "cs", &server.uri()).unwrap();
        let request = generator.request_token().await.unwrap();
        assert_eq!(request.token, "req-token");
        assert_eq!(
            request.authorization_url,
            format!("{}/oauth/authorize?oauth_token=req-token", server.uri())
        );

        let (token, secret) = generator.exchange_pin(&request, "1234567").await.unwrap();
        assert_eq!(token, "acc-token");
        assert_eq!(secret, "acc-secret");
    }

    #[tokio::test]
    async fn test_request_token_denied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/request_token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Failed to validate oauth signature"))
            .mount(&server)
            .await;

        let generator = TokenGenerator::new("ck", "cs", &server.uri()).unwrap();
        let err = generator.request_token().await.unwrap_err();
        assert!(matches!(err, TweeterError::Api { status: 401, .. }));
    }
}
