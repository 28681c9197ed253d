//! Versioned Twitter posting client.
//!
//! Two backends speak the two vendor API generations (1.1 and v2) and
//! normalize their responses into a shared shape, so nothing above this
//! module cares which generation is configured. The version is fixed when a
//! client is built and never switches mid-session.

pub mod oauth;
pub mod pin;
pub mod v1;
pub mod v2;

use std::io::BufRead;
use std::path::PathBuf;

use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::credentials::{confirm_overwrite, prompt_pin, CredentialStore, Credentials};
use crate::error::{TweeterError, TweeterResult};
use oauth::OAuthSigner;
use pin::TokenGenerator;

/// Production vendor endpoint. Overridable for tests.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Which generation of the vendor API to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("v1"),
            ApiVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Opaque vendor identifier for a sent post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sent post, normalized across both vendor response shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: PostId,
    pub text: String,
}

/// The authenticated account, as reported by the vendor on connect.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// The operations a vendor API generation must provide.
#[async_trait]
pub trait PostingBackend: Send + Sync {
    /// Confirm the credentials work and report who they belong to.
    async fn verify_identity(&self) -> TweeterResult<UserIdentity>;

    /// Publish a post and return its id.
    async fn post(&self, text: &str) -> TweeterResult<PostId>;

    /// Most recent posts by the authenticated account, newest first.
    async fn list_recent(
        &self,
        identity: &UserIdentity,
        count: u32,
    ) -> TweeterResult<Vec<PostRecord>>;

    /// Delete a post. Fails with `DeleteFailed` unless the vendor confirms
    /// the deletion.
    async fn delete(&self, id: &PostId) -> TweeterResult<()>;
}

/// How a [`PostingClient`] should connect and behave.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Directory holding the credential files.
    pub key_path: PathBuf,
    pub api_version: ApiVersion,
    /// Connect and verify, but never actually publish.
    pub suppress_tweeting: bool,
    /// Never touch the network at all.
    pub suppress_connection: bool,
    /// Run the interactive PIN flow to mint a new access token.
    pub generate_access: bool,
    /// Vendor endpoint; tests point this at a mock server.
    pub api_url: String,
}

impl ConnectionSettings {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            api_version: ApiVersion::default(),
            suppress_tweeting: false,
            suppress_connection: false,
            generate_access: false,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Client over one vendor API generation.
///
/// Starts disconnected; `connect` resolves credentials, verifies them with
/// the vendor, and builds the backend for the configured version. All posting
/// operations require a prior connect unless suppression says otherwise.
pub struct PostingClient {
    settings: ConnectionSettings,
    backend: Option<Box<dyn PostingBackend>>,
    identity: Option<UserIdentity>,
}

impl PostingClient {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            backend: None,
            identity: None,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// The identity verified on connect, if connected.
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// Resolve credentials and establish a verified session.
    ///
    /// With `suppress_connection` set this is a logged no-op and the client
    /// stays disconnected.
    pub async fn connect(&mut self) -> TweeterResult<()> {
        if self.settings.suppress_connection {
            warn!("connection suppressed, not talking to twitter");
            return Ok(());
        }

        let store = CredentialStore::new(&self.settings.key_path);
        let mut credentials = store.resolve(self.settings.generate_access)?;
        if credentials.access_token.is_none() {
            let stdin = std::io::stdin();
            self.generate_access_token(
                &store,
                &mut credentials,
                &mut stdin.lock(),
                &mut std::io::stdout(),
            )
            .await?;
        }

        let backend = build_backend(&self.settings, &credentials)?;
        let identity = backend.verify_identity().await?;
        info!(
            username = %identity.username,
            "connected to twitter as {}", identity.name
        );

        self.backend = Some(backend);
        self.identity = Some(identity);
        Ok(())
    }

    /// Drop the session. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        if self.backend.take().is_some() {
            info!("disconnected from twitter");
        }
        self.identity = None;
    }

    /// Publish a post, honouring the suppression settings.
    ///
    /// Returns `None` when a suppression flag swallowed the post, the id of
    /// the new post otherwise.
    pub async fn post(&self, text: &str) -> TweeterResult<Option<PostId>> {
        if self.settings.suppress_connection {
            warn!("connection suppressed, not sending tweet");
            return Ok(None);
        }
        let backend = self.backend.as_ref().ok_or(TweeterError::NotConnected)?;
        if self.settings.suppress_tweeting {
            warn!(text, "tweeting suppressed, not sending tweet");
            return Ok(None);
        }

        let id = backend.post(text).await?;
        info!(%id, "tweet sent");
        Ok(Some(id))
    }

    /// Most recent posts by the connected account.
    pub async fn list_recent(&self, count: u32) -> TweeterResult<Vec<PostRecord>> {
        let backend = self.backend.as_ref().ok_or(TweeterError::NotConnected)?;
        let identity = self.identity.as_ref().ok_or(TweeterError::NotConnected)?;
        backend.list_recent(identity, count).await
    }

    /// Delete a post by id.
    pub async fn delete(&self, id: &PostId) -> TweeterResult<()> {
        let backend = self.backend.as_ref().ok_or(TweeterError::NotConnected)?;
        backend.delete(id).await?;
        info!(%id, "tweet deleted");
        Ok(())
    }

    /// Interactive PIN flow to mint an access token.
    ///
    /// The token is written to disk only when an access file already exists
    /// and the operator answers `Y` to the overwrite prompt; otherwise it
    /// lives in memory for this session only.
    async fn generate_access_token(
        &self,
        store: &CredentialStore,
        credentials: &mut Credentials,
        input: &mut impl BufRead,
        output: &mut impl std::io::Write,
    ) -> TweeterResult<()> {
        let generator = TokenGenerator::new(
            &credentials.consumer_key,
            &credentials.consumer_secret,
            &self.settings.api_url,
        )?;

        let request = generator.request_token().await?;
        writeln!(output, "authorize at: {}", request.authorization_url)?;
        let pin = prompt_pin(input, output)?;
        let (token, secret) = generator.exchange_pin(&request, &pin).await?;

        if store.access_file_exists() && confirm_overwrite(input, output)? {
            store.store_access(&token, &secret)?;
        }

        credentials.access_token = Some(token);
        credentials.access_secret = Some(secret);
        Ok(())
    }
}

fn build_backend(
    settings: &ConnectionSettings,
    credentials: &Credentials,
) -> TweeterResult<Box<dyn PostingBackend>> {
    let (token, secret) = match (&credentials.access_token, &credentials.access_secret) {
        (Some(token), Some(secret)) => (token.as_str(), secret.as_str()),
        _ => return Err(TweeterError::NotConnected),
    };
    let signer = OAuthSigner::with_access(
        &credentials.consumer_key,
        &credentials.consumer_secret,
        token,
        secret,
    );
    let http = build_http_client()?;
    let api_url = settings.api_url.trim_end_matches('/').to_string();

    debug!(version = ?settings.api_version, %api_url, "building twitter backend");
    Ok(match settings.api_version {
        ApiVersion::V1 => Box::new(v1::V1Backend::new(http, signer, api_url)),
        ApiVersion::V2 => Box::new(v2::V2Backend::new(http, signer, api_url)),
    })
}

pub(crate) fn build_http_client() -> TweeterResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("cheerlights-tweeter/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Deserialize a vendor response, turning non-2xx statuses into `Api` errors.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> TweeterResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        serde_json::from_slice(&bytes).map_err(|e| TweeterError::Api {
            status: status.as_u16(),
            message: format!("unparseable response body: {e}"),
        })
    } else {
        Err(TweeterError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
