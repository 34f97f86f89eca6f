use std::env;
use crate::error::{AppError, Result};
use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: String,
    /// Text-to-image model.
    pub image_model: String,
    /// Model used for single-image edits and two-image composition.
    pub edit_model: String,
    pub base_url: Url,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the configuration against an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::config("GEMINI_API_KEY must be set in environment or .env file"))?;

        let image_model = lookup("GEMINI_IMAGE_MODEL")
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        let edit_model = lookup("GEMINI_EDIT_MODEL")
            .unwrap_or_else(|| DEFAULT_EDIT_MODEL.to_string());

        let base_url = parse_base_url(
            &lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;

        Ok(Self {
            gemini_api_key: api_key,
            image_model,
            edit_model,
            base_url,
        })
    }

    /// Builds a configuration with default models against the public endpoint.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        Self::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| api_key.clone()))
    }
}

/// Parses a base URL, making sure relative joins keep its last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| AppError::Config(format!("Invalid base URL: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.gemini_api_key, "k");
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.edit_model, DEFAULT_EDIT_MODEL);
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn overrides_and_trailing_slash() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_IMAGE_MODEL", "imagen-3.0-generate-002"),
            ("GEMINI_EDIT_MODEL", "gemini-2.5-flash-image"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta"),
        ]))
        .unwrap();
        assert_eq!(config.image_model, "imagen-3.0-generate-002");
        assert_eq!(config.edit_model, "gemini-2.5-flash-image");
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/v1beta/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
