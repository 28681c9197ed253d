//! Backend for the v2 generation of the vendor API.
//!
//! v2 wraps everything in a `data` envelope and confirms deletions with an
//! explicit flag rather than echoing the deleted object.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{TweeterError, TweeterResult};

use super::oauth::OAuthSigner;
use super::{read_json, PostId, PostRecord, PostingBackend, UserIdentity};

pub struct V2Backend {
    http: Client,
    signer: OAuthSigner,
    api_url: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Tweet {
    id: String,
    text: String,
}

#[derive(Deserialize)]
struct Me {
    id: String,
    name: String,
    username: String,
}

#[derive(Deserialize)]
struct Deleted {
    deleted: bool,
}

impl V2Backend {
    pub fn new(http: Client, signer: OAuthSigner, api_url: String) -> Self {
        Self {
            http,
            signer,
            api_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/2/{path}", self.api_url)
    }
}

#[async_trait]
impl PostingBackend for V2Backend {
    async fn verify_identity(&self) -> TweeterResult<UserIdentity> {
        let url = self.endpoint("users/me");
        let auth = self.signer.sign("GET", &url, &[], &[])?;
        let response = self.http.get(&url).header("Authorization", auth).send().await?;

        let me: Envelope<Me> = read_json(response).await?;
        Ok(UserIdentity {
            id: me.data.id,
            name: me.data.name,
            username: me.data.username,
        })
    }

    async fn post(&self, text: &str) -> TweeterResult<PostId> {
        let url = self.endpoint("tweets");
        // JSON bodies stay out of the OAuth signature base string.
        let auth = self.signer.sign("POST", &url, &[], &[])?;

        debug!(text, "posting tweet via v2");
        let response = self
            .http
            .post(&url)
            .header("Authorization", auth)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let tweet: Envelope<Tweet> = read_json(response).await?;
        Ok(PostId(tweet.data.id))
    }

    async fn list_recent(
        &self,
        identity: &UserIdentity,
        count: u32,
    ) -> TweeterResult<Vec<PostRecord>> {
        let url = self.endpoint(&format!("users/{}/tweets", identity.id));
        let params = [("max_results".to_string(), count.to_string())];
        let auth = self.signer.sign("GET", &url, &params, &[])?;

        let response = self
            .http
            .get(format!("{url}?max_results={count}"))
            .header("Authorization", auth)
            .send()
            .await?;

        let tweets: Envelope<Vec<Tweet>> = read_json(response).await?;
        Ok(tweets
            .data
            .into_iter()
            .map(|tweet| PostRecord {
                id: PostId(tweet.id),
                text: tweet.text,
            })
            .collect())
    }

    async fn delete(&self, id: &PostId) -> TweeterResult<()> {
        let url = self.endpoint(&format!("tweets/{id}"));
        let auth = self.signer.sign("DELETE", &url, &[], &[])?;
        let response = self
            .http
            .delete(&url)
            .header("Authorization", auth)
            .send()
            .await?;

        let confirmation: Envelope<Deleted> = read_json(response).await?;
        if !confirmation.data.deleted {
            return Err(TweeterError::DeleteFailed(format!(
                "vendor did not confirm deletion of {id}"
            )));
        }
        Ok(())
    }
}
