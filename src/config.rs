//! Startup configuration resolved from ordered, named providers.
//!
//! Each setting is looked up in a fixed order and the first provider holding a
//! non-empty (trimmed) value wins. Build-time values come from `option_env!`,
//! so they are baked in by `cargo build`; runtime values come from the process
//! environment.

use std::collections::HashMap;

use crate::params::LaunchParams;

pub const ASSET_URL_VAR: &str = "SHOWCASE_3D_ASSET_URL";
pub const NEWSLETTER_API_URL_VAR: &str = "SHOWCASE_NEWSLETTER_API_URL";
pub const GOOGLE_SCRIPT_URL_VAR: &str = "SHOWCASE_GOOGLE_SCRIPT_URL";

/// Hosted geometry-compression decoder that Draco-compressed meshes expect
pub const DRACO_DECODER_PATH: &str = "https://www.gstatic.com/draco/versioned/decoders/1.5.7/";

/// Model shown when nothing else is configured; resolves to `BUNDLED_MODEL`
pub const DEFAULT_ASSET: &str = "bundled:lemon.gltf";

/// Name and bytes of the model compiled into the binary. Buffers are data
/// URIs, so decoding it needs no filesystem or network access.
pub const BUNDLED_MODEL_NAME: &str = "lemon.gltf";
pub const BUNDLED_MODEL: &[u8] = include_bytes!("../assets/lemon.gltf");

const BUILD_ASSET_URL: Option<&str> = option_env!("SHOWCASE_3D_ASSET_URL");
const BUILD_NEWSLETTER_API_URL: Option<&str> = option_env!("SHOWCASE_NEWSLETTER_API_URL");
const BUILD_GOOGLE_SCRIPT_URL: Option<&str> = option_env!("SHOWCASE_GOOGLE_SCRIPT_URL");

/// Source of runtime variables
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A value together with the provider that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub source: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    providers: Vec<(String, Option<String>)>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier providers take precedence
    pub fn provider(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.providers.push((name.into(), value));
        self
    }

    /// Provider names in lookup order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(name, _)| name.as_str())
    }

    /// First provider with a non-empty value, trimmed
    pub fn resolve(&self) -> Option<Resolved> {
        self.providers.iter().find_map(|(name, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| Resolved {
                source: name.clone(),
                value: value.to_string(),
            })
        })
    }
}

/// Asset lookup: build-time, runtime env, `model`, `asset`, bundled default
pub fn asset_resolver(params: &LaunchParams, env: &dyn Environment) -> Resolver {
    Resolver::new()
        .provider(format!("build:{ASSET_URL_VAR}"), BUILD_ASSET_URL.map(str::to_string))
        .provider(format!("env:{ASSET_URL_VAR}"), env.var(ASSET_URL_VAR))
        .provider("param:model", params.model.clone())
        .provider("param:asset", params.asset.clone())
        .provider("bundled", Some(DEFAULT_ASSET.to_string()))
}

/// Newsletter endpoint lookup: the API URL first, then the script URL
pub fn endpoint_resolver(env: &dyn Environment) -> Resolver {
    Resolver::new()
        .provider(
            format!("build:{NEWSLETTER_API_URL_VAR}"),
            BUILD_NEWSLETTER_API_URL.map(str::to_string),
        )
        .provider(format!("env:{NEWSLETTER_API_URL_VAR}"), env.var(NEWSLETTER_API_URL_VAR))
        .provider(
            format!("build:{GOOGLE_SCRIPT_URL_VAR}"),
            BUILD_GOOGLE_SCRIPT_URL.map(str::to_string),
        )
        .provider(format!("env:{GOOGLE_SCRIPT_URL_VAR}"), env.var(GOOGLE_SCRIPT_URL_VAR))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseConfig {
    pub asset: Resolved,
    pub newsletter_endpoint: Option<Resolved>,
}

impl ShowcaseConfig {
    pub fn resolve(params: &LaunchParams, env: &dyn Environment) -> Self {
        let asset = asset_resolver(params, env).resolve().unwrap_or_else(|| Resolved {
            source: "bundled".to_string(),
            value: DEFAULT_ASSET.to_string(),
        });
        let newsletter_endpoint = endpoint_resolver(env).resolve();

        log::info!("Model asset from {}: {}", asset.source, asset.value);
        match &newsletter_endpoint {
            Some(endpoint) => log::info!("Newsletter endpoint from {}", endpoint.source),
            None => log::warn!("Newsletter endpoint not configured"),
        }

        Self {
            asset,
            newsletter_endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_wins() {
        let resolver = Resolver::new()
            .provider("a", None)
            .provider("b", Some("   ".to_string()))
            .provider("c", Some(" value ".to_string()))
            .provider("d", Some("later".to_string()));

        assert_eq!(
            resolver.resolve(),
            Some(Resolved {
                source: "c".to_string(),
                value: "value".to_string()
            })
        );
    }

    #[test]
    fn nothing_resolves_to_none() {
        let resolver = Resolver::new().provider("a", None).provider("b", Some(String::new()));
        assert_eq!(resolver.resolve(), None);
    }

    #[test]
    fn sources_keep_order() {
        let env = HashMap::new();
        let resolver = asset_resolver(&LaunchParams::default(), &env);
        let sources: Vec<&str> = resolver.sources().collect();
        assert_eq!(
            sources,
            vec![
                "build:SHOWCASE_3D_ASSET_URL",
                "env:SHOWCASE_3D_ASSET_URL",
                "param:model",
                "param:asset",
                "bundled"
            ]
        );
    }
}
