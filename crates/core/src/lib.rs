//! AI Studio Core Library
//!
//! This library turns a user's choice of mode, function, prompt and images
//! into exactly one request against Google's Gemini image models, and
//! normalizes the answer into a single image.
//!
//! # Overview
//!
//! - **Image Codec**: Lossless base64 encoding of uploaded images via [`codec`]
//! - **Prompt Builder**: Per-function instruction templates via [`prompt`]
//! - **Generation Client**: Text-to-image, single-image edit and two-image
//!   composition calls via [`gemini`]
//! - **Session Controller**: Input validation and the Idle/Pending/Succeeded/Failed
//!   lifecycle via [`session`]
//!
//! # Quick Start
//!
//! ```ignore
//! use ai_studio_core::{AiStudio, CreateFunction};
//!
//! let studio = AiStudio::new()?;
//! let mut session = studio.new_session();
//! session.select_function(CreateFunction::Sticker)?;
//! session.set_prompt("a red fox");
//!
//! let image = session.generate(studio.client()).await?;
//! image.save_to(".").await?;
//! ```
//!
//! # Module Structure
//!
//! - [`codec`]: Image payloads, sources and encoding
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`functions`]: Modes, functions and aspect ratios
//! - [`gemini`]: Gemini client and the [`ImageService`] seam
//! - [`prompt`]: Instruction templates
//! - [`session`]: Session state machine

pub mod codec;
pub mod config;
pub mod error;
pub mod functions;
pub mod gemini;
pub mod prompt;
pub mod session;

// Re-export primary types for convenience
pub use codec::{ImageCodec, ImagePayload, ImageSource};
pub use config::Config;
pub use error::{AppError, Result};
pub use functions::{AspectRatio, CreateFunction, EditFunction, Function, Mode};
pub use gemini::{GeminiClient, GenerationRequest, ImageService};
pub use session::{Phase, Session, Slot};

/// Main entry point for the AI Studio application.
///
/// Bundles the configuration with a ready Gemini client, so a caller only
/// has to drive a [`Session`].
pub struct AiStudio {
    config: Config,
    client: GeminiClient,
}

impl AiStudio {
    /// Creates a new instance with configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is missing or the client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    /// Creates an instance with custom configuration.
    ///
    /// Use this when you need to override environment-based configuration,
    /// such as specifying different models or an API key.
    pub fn with_config(config: Config) -> Result<Self> {
        let client = GeminiClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Starts an empty session in Create/Free mode.
    pub fn new_session(&self) -> Session {
        Session::new()
    }

    /// The image service backing this instance.
    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
pub fn init() {
    let _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_keeps_config_and_starts_idle_sessions() {
        let mut config = Config::with_api_key("test-key").unwrap();
        config.edit_model = "custom-edit".to_string();

        let studio = AiStudio::with_config(config).unwrap();
        assert_eq!(studio.config().edit_model, "custom-edit");
        assert_eq!(studio.new_session().phase(), Phase::Idle);
    }
}
