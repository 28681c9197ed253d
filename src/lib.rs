//! CheerLights tweeter
//!
//! A Twitter client for the CheerLights project: tweet one of the eleven
//! CheerLights colours and the lights of everyone listening change with you.
//!
//! # Overview
//!
//! The crate provides:
//! - Colour validation against the closed CheerLights set
//! - Credential resolution from JSON key files or environment variables,
//!   including an interactive PIN flow to mint new access tokens
//! - A posting client spanning both vendor API generations behind one trait
//! - Jinja template rendering for tweet payloads, with user overrides
//! - An MQTT subscriber that tweets scoring plays from an instrumented
//!   cornhole board
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cheerlights_tweeter::poster::Poster;
//! use cheerlights_tweeter::template::TemplateRenderer;
//! use cheerlights_tweeter::twitter::{ConnectionSettings, PostingClient};
//! use serde_json::{json, Map};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConnectionSettings::new("/home/pi/keys");
//! let client = PostingClient::new(settings);
//! let renderer = TemplateRenderer::new(None, Map::new())?;
//!
//! let mut poster = Poster::new(client, renderer);
//! poster.connect().await?;
//! poster.post_colour(&json!("red"), None).await?;
//! # Ok(())
//! # }
//! ```

pub mod colour;
pub mod cornhole;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod poster;
pub mod template;
pub mod twitter;

pub use colour::Colour;
pub use error::{TweeterError, TweeterResult};
pub use poster::Poster;
