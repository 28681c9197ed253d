//! Twitter API credential resolution.
//!
//! Credentials come from one of two places, decided by whether a consumer
//! credentials file exists under the configured key path:
//!
//! - file mode: `consumer_twitter_credentials.json` plus (unless a new access
//!   token is being generated interactively) `access_twitter_credentials.json`
//! - environment mode: the four `TWITTER_*` variables, all required together
//!
//! Credentials are resolved fresh on every connect and never cached. The one
//! write this module performs is persisting a newly generated access token,
//! and only after the operator explicitly confirms the overwrite.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TweeterError, TweeterResult};

pub const CONSUMER_KEY_ENV: &str = "TWITTER_API_KEY";
pub const CONSUMER_SECRET_ENV: &str = "TWITTER_API_SECRET";
pub const ACCESS_TOKEN_ENV: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_SECRET_ENV: &str = "TWITTER_ACCESS_SECRET";

const CONSUMER_FILE_NAME: &str = "consumer_twitter_credentials.json";
const ACCESS_FILE_NAME: &str = "access_twitter_credentials.json";

/// A resolved set of Twitter API keys.
///
/// The access pair is absent only while an interactive token-generation flow
/// is in progress.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

#[derive(Deserialize)]
struct ConsumerFile {
    #[serde(rename = "CONSUMER_KEY")]
    consumer_key: String,
    #[serde(rename = "CONSUMER_SECRET")]
    consumer_secret: String,
}

#[derive(Serialize, Deserialize)]
struct AccessFile {
    #[serde(rename = "ACCESS_TOKEN")]
    access_token: String,
    #[serde(rename = "ACCESS_SECRET")]
    access_secret: String,
}

/// Locates and reads the credential files under a key path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    key_path: PathBuf,
}

impl CredentialStore {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }

    /// Path of the consumer key/secret file.
    pub fn consumer_path(&self) -> PathBuf {
        self.key_path.join(CONSUMER_FILE_NAME)
    }

    /// Path of the access token/secret file.
    pub fn access_path(&self) -> PathBuf {
        self.key_path.join(ACCESS_FILE_NAME)
    }

    pub fn access_file_exists(&self) -> bool {
        self.access_path().exists()
    }

    /// Resolve credentials from files or, failing that, the environment.
    ///
    /// With `generate_access` set the access pair is left unset for the
    /// interactive PIN flow to fill in; that mode only works with file
    /// credentials.
    pub fn resolve(&self, generate_access: bool) -> TweeterResult<Credentials> {
        self.resolve_with_env(generate_access, |name| std::env::var(name).ok())
    }

    /// Same as [`resolve`](Self::resolve) with the environment lookup
    /// injected, which keeps tests hermetic.
    pub fn resolve_with_env(
        &self,
        generate_access: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> TweeterResult<Credentials> {
        if self.consumer_path().exists() {
            info!("connecting to twitter with file credentials");
            self.resolve_from_files(generate_access)
        } else {
            if generate_access {
                return Err(TweeterError::UnsupportedConfiguration(
                    "generation of access tokens is not supported with \
                     environment variable mode"
                        .to_string(),
                ));
            }
            info!("connecting to twitter with environment variable credentials");
            resolve_from_env(env)
        }
    }

    fn resolve_from_files(&self, generate_access: bool) -> TweeterResult<Credentials> {
        let consumer: ConsumerFile = read_json_file(&self.consumer_path())?;

        if generate_access {
            return Ok(Credentials {
                consumer_key: consumer.consumer_key,
                consumer_secret: consumer.consumer_secret,
                access_token: None,
                access_secret: None,
            });
        }

        // Without token generation the access pair must be read from its file.
        let access_path = self.access_path();
        if !access_path.exists() {
            return Err(TweeterError::MissingAccessFile(access_path));
        }
        let access: AccessFile = read_json_file(&access_path)?;

        Ok(Credentials {
            consumer_key: consumer.consumer_key,
            consumer_secret: consumer.consumer_secret,
            access_token: Some(access.access_token),
            access_secret: Some(access.access_secret),
        })
    }

    /// Persist a newly generated access token pair. This is the single file
    /// write in the credential lifecycle.
    pub fn store_access(&self, token: &str, secret: &str) -> TweeterResult<()> {
        let contents = serde_json::to_string(&AccessFile {
            access_token: token.to_string(),
            access_secret: secret.to_string(),
        })
        .map_err(|e| TweeterError::MalformedCredentialsFile {
            path: self.access_path(),
            detail: e.to_string(),
        })?;
        std::fs::write(self.access_path(), contents)?;
        info!("access credentials written to {}", self.access_path().display());
        Ok(())
    }
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> TweeterResult<T> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| TweeterError::MalformedCredentialsFile {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn resolve_from_env(env: impl Fn(&str) -> Option<String>) -> TweeterResult<Credentials> {
    let require = |name: &'static str| {
        env(name).ok_or(TweeterError::MissingEnvironmentVariable(name))
    };

    Ok(Credentials {
        consumer_key: require(CONSUMER_KEY_ENV)?,
        consumer_secret: require(CONSUMER_SECRET_ENV)?,
        access_token: Some(require(ACCESS_TOKEN_ENV)?),
        access_secret: Some(require(ACCESS_SECRET_ENV)?),
    })
}

/// Ask the operator whether an existing access credentials file should be
/// overwritten. `Y` overwrites, `N` keeps the new token in memory only, and
/// anything else is an error.
pub fn confirm_overwrite(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> TweeterResult<bool> {
    write!(output, "overwrite {ACCESS_FILE_NAME} file [Y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    match answer.trim().to_uppercase().as_str() {
        "Y" => Ok(true),
        "N" => Ok(false),
        other => Err(TweeterError::InvalidUserChoice(other.to_string())),
    }
}

/// Prompt for the PIN shown by the vendor's authorization page.
pub fn prompt_pin(input: &mut impl BufRead, output: &mut impl Write) -> TweeterResult<String> {
    write!(output, "PIN: ")?;
    output.flush()?;

    let mut pin = String::new();
    input.read_line(&mut pin)?;
    Ok(pin.trim().to_string())
}
