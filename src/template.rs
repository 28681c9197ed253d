//! Tweet payload rendering via jinja templates.
//!
//! Templates resolve against two sets: user overrides (a directory supplied by
//! the caller, or a set baked into a binary) and the built-in defaults shipped
//! with the crate. A plain name checks the user set first and falls back to
//! the built-ins; the `user:` and `base:` prefixes pin the lookup to one set.
//!
//! Rendering is strict: a template referencing a key absent from the merged
//! context fails with `UndefinedVariable` instead of silently substituting an
//! empty string.

use std::collections::HashMap;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};

use crate::error::TweeterResult;

/// Template used for colour tweets.
pub const TWEET_TEMPLATE: &str = "tweet.jinja";
/// Template used for end-of-game tweets.
pub const END_GAME_TEMPLATE: &str = "end_game.jinja";

/// Prefix pinning a lookup to the user override set.
const USER_PREFIX: &str = "user:";
/// Prefix pinning a lookup to the built-in set.
const BASE_PREFIX: &str = "base:";

const BASE_TEMPLATES: &[(&str, &str)] = &[
    (TWEET_TEMPLATE, include_str!("../templates/tweet.jinja")),
    (END_GAME_TEMPLATE, include_str!("../templates/end_game.jinja")),
];

/// Renders tweet payloads from jinja templates with layered context.
///
/// The merged context is built in three layers, later layers winning on key
/// collision: per-render built-ins (e.g. the colour), the static context fixed
/// at construction, then the per-call dynamic context.
pub struct TemplateRenderer {
    env: Environment<'static>,
    static_context: Map<String, Value>,
}

impl TemplateRenderer {
    /// Build a renderer, optionally loading `*.jinja` overrides from a user
    /// template directory.
    pub fn new(
        user_template_dir: Option<&Path>,
        static_context: Map<String, Value>,
    ) -> TweeterResult<Self> {
        let user_templates = match user_template_dir {
            Some(dir) => load_template_dir(dir)?,
            None => HashMap::new(),
        };
        Ok(Self::from_parts(user_templates, static_context))
    }

    /// Build a renderer whose user override set is supplied in memory, for
    /// binaries that ship their own template set.
    pub fn with_overrides(
        overrides: &[(&str, &str)],
        static_context: Map<String, Value>,
    ) -> Self {
        let user_templates = overrides
            .iter()
            .map(|(name, source)| (name.to_string(), source.to_string()))
            .collect();
        Self::from_parts(user_templates, static_context)
    }

    fn from_parts(
        user_templates: HashMap<String, String>,
        static_context: Map<String, Value>,
    ) -> Self {
        let base_templates: HashMap<String, String> = BASE_TEMPLATES
            .iter()
            .map(|(name, source)| (name.to_string(), source.to_string()))
            .collect();

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_loader(move |name| {
            if let Some(rest) = name.strip_prefix(USER_PREFIX) {
                return Ok(user_templates.get(rest).cloned());
            }
            if let Some(rest) = name.strip_prefix(BASE_PREFIX) {
                return Ok(base_templates.get(rest).cloned());
            }
            Ok(user_templates
                .get(name)
                .or_else(|| base_templates.get(name))
                .cloned())
        });

        Self {
            env,
            static_context,
        }
    }

    /// Render a template against the merged context.
    pub fn render(
        &self,
        template_name: &str,
        builtin_context: &Map<String, Value>,
        dynamic_context: Option<&Map<String, Value>>,
    ) -> TweeterResult<String> {
        let mut context = builtin_context.clone();
        for (key, value) in &self.static_context {
            context.insert(key.clone(), value.clone());
        }
        if let Some(dynamic) = dynamic_context {
            for (key, value) in dynamic {
                context.insert(key.clone(), value.clone());
            }
        }

        let template = self.env.get_template(template_name)?;
        Ok(template.render(&context)?)
    }
}

fn load_template_dir(dir: &Path) -> TweeterResult<HashMap<String, String>> {
    let mut templates = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "jinja") {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                templates.insert(name.to_string(), std::fs::read_to_string(&path)?);
            }
        }
    }
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::error::TweeterError;
    use serde_json::json;
    use tempfile::TempDir;

    fn colour_context(colour: Colour) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert("colour".to_string(), json!(colour.name()));
        context
    }

    #[test]
    fn test_default_template_every_colour() {
        let renderer = TemplateRenderer::new(None, Map::new()).unwrap();
        for colour in Colour::ALL {
            let payload = renderer
                .render(TWEET_TEMPLATE, &colour_context(colour), None)
                .unwrap();
            assert_eq!(payload, format!("@cheerlights {}", colour.name()));
            assert_eq!(payload.matches(colour.name()).count(), 1);
        }
    }

    #[test]
    fn test_missing_context_key_is_strict() {
        let renderer = TemplateRenderer::new(None, Map::new()).unwrap();
        let err = renderer
            .render(END_GAME_TEMPLATE, &Map::new(), None)
            .unwrap_err();
        assert!(matches!(err, TweeterError::UndefinedVariable(_)));
    }

    #[test]
    fn test_user_dir_overrides_base() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tweet.jinja"),
            "@cheerlights {{ colour }} from {{ user }}",
        )
        .unwrap();

        let mut static_context = Map::new();
        static_context.insert("user".to_string(), json!("Bob"));

        let renderer = TemplateRenderer::new(Some(dir.path()), static_context).unwrap();
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Orange), None)
            .unwrap();
        assert_eq!(payload, "@cheerlights orange from Bob");
    }

    #[test]
    fn test_dynamic_context_per_call() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tweet.jinja"),
            "@cheerlights {{ colour }} to {{ other_user }}",
        )
        .unwrap();

        let renderer = TemplateRenderer::new(Some(dir.path()), Map::new()).unwrap();

        let mut dynamic = Map::new();
        dynamic.insert("other_user".to_string(), json!("Alice"));
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Orange), Some(&dynamic))
            .unwrap();
        assert_eq!(payload, "@cheerlights orange to Alice");

        dynamic.insert("other_user".to_string(), json!("Jennie"));
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Orange), Some(&dynamic))
            .unwrap();
        assert_eq!(payload, "@cheerlights orange to Jennie");
    }

    #[test]
    fn test_static_and_dynamic_context_compose() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tweet.jinja"),
            "@cheerlights {{ colour }} from {{ user }} to {{ other_user }}",
        )
        .unwrap();

        let mut static_context = Map::new();
        static_context.insert("user".to_string(), json!("Bob"));
        let renderer = TemplateRenderer::new(Some(dir.path()), static_context).unwrap();

        let mut dynamic = Map::new();
        dynamic.insert("other_user".to_string(), json!("Alice"));
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Orange), Some(&dynamic))
            .unwrap();
        assert_eq!(payload, "@cheerlights orange from Bob to Alice");

        // Non-string values render too.
        dynamic.insert("other_user".to_string(), json!(99));
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Orange), Some(&dynamic))
            .unwrap();
        assert_eq!(payload, "@cheerlights orange from Bob to 99");
    }

    #[test]
    fn test_dynamic_overrides_static_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tweet.jinja"), "{{ colour }}").unwrap();

        let mut static_context = Map::new();
        static_context.insert("colour".to_string(), json!("static-wins"));
        let renderer = TemplateRenderer::new(Some(dir.path()), static_context).unwrap();

        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Red), None)
            .unwrap();
        assert_eq!(payload, "static-wins");

        let mut dynamic = Map::new();
        dynamic.insert("colour".to_string(), json!("dynamic-wins"));
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Red), Some(&dynamic))
            .unwrap();
        assert_eq!(payload, "dynamic-wins");
    }

    #[test]
    fn test_namespace_prefixes_select_template_set() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tweet.jinja"), "override {{ colour }}").unwrap();

        let renderer = TemplateRenderer::new(Some(dir.path()), Map::new()).unwrap();
        let context = colour_context(Colour::Blue);

        let via_user = renderer.render("user:tweet.jinja", &context, None).unwrap();
        assert_eq!(via_user, "override blue");

        let via_base = renderer.render("base:tweet.jinja", &context, None).unwrap();
        assert_eq!(via_base, "@cheerlights blue");
    }

    #[test]
    fn test_embedded_overrides() {
        let renderer = TemplateRenderer::with_overrides(
            &[("tweet.jinja", "hit {{ colour }}")],
            Map::new(),
        );
        let payload = renderer
            .render(TWEET_TEMPLATE, &colour_context(Colour::Pink), None)
            .unwrap();
        assert_eq!(payload, "hit pink");
    }

    #[test]
    fn test_unknown_template_name() {
        let renderer = TemplateRenderer::new(None, Map::new()).unwrap();
        let err = renderer
            .render("missing.jinja", &Map::new(), None)
            .unwrap_err();
        assert!(matches!(err, TweeterError::Template(_)));
    }
}
