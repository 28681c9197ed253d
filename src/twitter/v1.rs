//! Backend for the 1.1 generation of the vendor API.
//!
//! 1.1 speaks form-encoded writes and flat JSON statuses. Form and query
//! parameters join the OAuth signature base string.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{TweeterError, TweeterResult};

use super::oauth::OAuthSigner;
use super::{read_json, PostId, PostRecord, PostingBackend, UserIdentity};

pub struct V1Backend {
    http: Client,
    signer: OAuthSigner,
    api_url: String,
}

#[derive(Deserialize)]
struct Status {
    id_str: String,
    text: String,
}

#[derive(Deserialize)]
struct Account {
    id_str: String,
    name: String,
    screen_name: String,
}

impl V1Backend {
    pub fn new(http: Client, signer: OAuthSigner, api_url: String) -> Self {
        Self {
            http,
            signer,
            api_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/1.1/{path}", self.api_url)
    }
}

#[async_trait]
impl PostingBackend for V1Backend {
    async fn verify_identity(&self) -> TweeterResult<UserIdentity> {
        let url = self.endpoint("account/verify_credentials.json");
        let auth = self.signer.sign("GET", &url, &[], &[])?;
        let response = self.http.get(&url).header("Authorization", auth).send().await?;

        let account: Account = read_json(response).await?;
        Ok(UserIdentity {
            id: account.id_str,
            name: account.name,
            username: account.screen_name,
        })
    }

    async fn post(&self, text: &str) -> TweeterResult<PostId> {
        let url = self.endpoint("statuses/update.json");
        let form = [("status".to_string(), text.to_string())];
        let auth = self.signer.sign("POST", &url, &form, &[])?;

        debug!(text, "posting status via 1.1");
        let response = self
            .http
            .post(&url)
            .header("Authorization", auth)
            .form(&[("status", text)])
            .send()
            .await?;

        let status: Status = read_json(response).await?;
        Ok(PostId(status.id_str))
    }

    async fn list_recent(
        &self,
        _identity: &UserIdentity,
        count: u32,
    ) -> TweeterResult<Vec<PostRecord>> {
        let url = self.endpoint("statuses/user_timeline.json");
        let params = [("count".to_string(), count.to_string())];
        let auth = self.signer.sign("GET", &url, &params, &[])?;

        let response = self
            .http
            .get(format!("{url}?count={count}"))
            .header("Authorization", auth)
            .send()
            .await?;

        let statuses: Vec<Status> = read_json(response).await?;
        Ok(statuses
            .into_iter()
            .map(|status| PostRecord {
                id: PostId(status.id_str),
                text: status.text,
            })
            .collect())
    }

    async fn delete(&self, id: &PostId) -> TweeterResult<()> {
        let url = self.endpoint(&format!("statuses/destroy/{id}.json"));
        let auth = self.signer.sign("POST", &url, &[], &[])?;
        let response = self.http.post(&url).header("Authorization", auth).send().await?;

        // 1.1 echoes the destroyed status back instead of a confirmation flag.
        let status: Status = read_json(response).await?;
        if status.id_str != id.0 {
            return Err(TweeterError::DeleteFailed(format!(
                "asked to delete {id} but vendor reported {}",
                status.id_str
            )));
        }
        Ok(())
    }
}
