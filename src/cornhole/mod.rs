//! Cornhole game integration.
//!
//! An instrumented cornhole board publishes hole and score events over MQTT;
//! this module folds them into game state and tweets on scoring plays. The
//! tweet templates ship embedded so the binary needs no template directory.

pub mod mqtt;
pub mod reducer;

use serde_json::Map;

use crate::template::TemplateRenderer;

/// Template overrides used for cornhole tweets.
pub const CORNHOLE_TEMPLATES: &[(&str, &str)] = &[
    (
        crate::template::TWEET_TEMPLATE,
        include_str!("../../cornhole_templates/tweet.jinja"),
    ),
    (
        crate::template::END_GAME_TEMPLATE,
        include_str!("../../cornhole_templates/end_game.jinja"),
    ),
];

/// Renderer preloaded with the cornhole template set.
pub fn cornhole_renderer() -> TemplateRenderer {
    TemplateRenderer::with_overrides(CORNHOLE_TEMPLATES, Map::new())
}
