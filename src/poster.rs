//! Composition of the posting client and the template renderer.
//!
//! A `Poster` turns a validated colour (or any named template) into a
//! rendered payload and hands it to the posting client. Colour validation
//! happens before any network activity, so a bad colour never consumes a
//! connection.

use serde_json::{Map, Value};

use crate::colour::Colour;
use crate::error::TweeterResult;
use crate::template::{TemplateRenderer, TWEET_TEMPLATE};
use crate::twitter::{PostId, PostingClient};

pub struct Poster {
    client: PostingClient,
    renderer: TemplateRenderer,
}

impl Poster {
    pub fn new(client: PostingClient, renderer: TemplateRenderer) -> Self {
        Self { client, renderer }
    }

    pub fn client(&self) -> &PostingClient {
        &self.client
    }

    pub async fn connect(&mut self) -> TweeterResult<()> {
        self.client.connect().await
    }

    pub fn disconnect(&mut self) {
        self.client.disconnect();
    }

    /// Validate a colour value and render the tweet payload for it.
    pub fn colour_payload(
        &self,
        colour_value: &Value,
        dynamic_context: Option<&Map<String, Value>>,
    ) -> TweeterResult<String> {
        let colour = Colour::verify(colour_value)?;
        let mut builtin = Map::new();
        builtin.insert("colour".to_string(), Value::String(colour.name().to_string()));
        self.renderer.render(TWEET_TEMPLATE, &builtin, dynamic_context)
    }

    /// Validate, render, and post a colour tweet.
    pub async fn post_colour(
        &self,
        colour_value: &Value,
        dynamic_context: Option<&Map<String, Value>>,
    ) -> TweeterResult<Option<PostId>> {
        let payload = self.colour_payload(colour_value, dynamic_context)?;
        self.client.post(&payload).await
    }

    /// Render an arbitrary template and post the result.
    pub async fn post_template(
        &self,
        template_name: &str,
        dynamic_context: Option<&Map<String, Value>>,
    ) -> TweeterResult<Option<PostId>> {
        let payload = self
            .renderer
            .render(template_name, &Map::new(), dynamic_context)?;
        self.client.post(&payload).await
    }

    /// Delete a previously sent post.
    pub async fn delete(&self, id: &PostId) -> TweeterResult<()> {
        self.client.delete(id).await
    }
}
