use crate::codec::ImagePayload;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::functions::AspectRatio;
use async_trait::async_trait;
use gemini_rust::{Blob, Content, Gemini, GenerationConfig, Message, Part, Role};
use serde::{Deserialize, Serialize};

/// Output media type requested from the text-to-image model.
pub const OUTPUT_MEDIA_TYPE: &str = "image/jpeg";

/// Modalities the edit model may answer with; images must be allowed explicitly.
pub const RESPONSE_MODALITIES: [&str; 2] = ["IMAGE", "TEXT"];

/// The three calls made against the remote image service.
///
/// Each call is fire-once: no retries, no timeout, no caching.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Generates exactly one image from instruction text.
    async fn generate_from_text(&self, instruction: &str, aspect_ratio: AspectRatio) -> Result<ImagePayload>;

    /// Edits one image according to the instruction text.
    async fn edit_single_image(&self, instruction: &str, image: &ImagePayload) -> Result<ImagePayload>;

    /// Combines two images, sent in the given order.
    async fn compose_two_images(
        &self,
        instruction: &str,
        first: &ImagePayload,
        second: &ImagePayload,
    ) -> Result<ImagePayload>;
}

/// A fully prepared outbound request. Built fresh per action and sent whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationRequest {
    FromText {
        instruction: String,
        aspect_ratio: AspectRatio,
    },
    EditSingle {
        instruction: String,
        image: ImagePayload,
    },
    Compose {
        instruction: String,
        first: ImagePayload,
        second: ImagePayload,
    },
}

impl GenerationRequest {
    pub fn instruction(&self) -> &str {
        match self {
            GenerationRequest::FromText { instruction, .. }
            | GenerationRequest::EditSingle { instruction, .. }
            | GenerationRequest::Compose { instruction, .. } => instruction,
        }
    }

    pub fn image_count(&self) -> usize {
        match self {
            GenerationRequest::FromText { .. } => 0,
            GenerationRequest::EditSingle { .. } => 1,
            GenerationRequest::Compose { .. } => 2,
        }
    }

    /// Issues the one call matching this request's shape.
    pub async fn dispatch<S>(&self, service: &S) -> Result<ImagePayload>
    where
        S: ImageService + ?Sized,
    {
        match self {
            GenerationRequest::FromText { instruction, aspect_ratio } => {
                service.generate_from_text(instruction, *aspect_ratio).await
            }
            GenerationRequest::EditSingle { instruction, image } => {
                service.edit_single_image(instruction, image).await
            }
            GenerationRequest::Compose { instruction, first, second } => {
                service.compose_two_images(instruction, first, second).await
            }
        }
    }
}

/// Gemini-backed [`ImageService`].
///
/// Image-conditioned calls go through `generateContent` on the edit model;
/// text-to-image goes through the Imagen `predict` endpoint.
pub struct GeminiClient {
    client: Gemini,
    http: reqwest::Client,
    predict_url: url::Url,
    api_key: String,
    image_model: String,
    edit_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let edit_model = qualified_model(&config.edit_model);
        // A full model URL keeps the configured base even when it carries a path
        let model_url = config
            .base_url
            .join(&edit_model)
            .map_err(|e| AppError::Config(format!("Invalid edit model URL: {}", e)))?;

        let client = Gemini::with_model_and_base_url(
            &config.gemini_api_key,
            model_url.to_string(),
            config.base_url.clone(),
        )
        .map_err(|e| AppError::Config(format!("Failed to create Gemini client: {}", e)))?;

        let image_model = qualified_model(&config.image_model);
        let predict_url = config
            .base_url
            .join(&format!("{}:predict", image_model))
            .map_err(|e| AppError::Config(format!("Invalid image model URL: {}", e)))?;

        Ok(Self {
            client,
            http: reqwest::Client::new(),
            predict_url,
            api_key: config.gemini_api_key.clone(),
            image_model,
            edit_model,
        })
    }

    /// Sends images followed by the instruction and returns the first inline image.
    ///
    /// `missing` is the empty-result message for this call.
    async fn generate_with_images(
        &self,
        instruction: &str,
        images: &[&ImagePayload],
        missing: &'static str,
    ) -> Result<ImagePayload> {
        tracing::info!(model = %self.edit_model, images = images.len(), "sending image request");

        let message = Message {
            role: Role::User,
            content: image_content(instruction, images),
        };

        let response = self.client
            .generate_content()
            .with_messages(vec![message])
            .with_generation_config(image_generation_config())
            .execute()
            .await
            .map_err(|e| AppError::Transport(format!("API request failed: {:?}", e)))?;

        let parts = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.as_deref())
            .unwrap_or_default();

        first_inline_image(parts).ok_or_else(|| {
            tracing::warn!(model = %self.edit_model, parts = parts.len(), "response carried no inline image");
            AppError::empty_result(missing)
        })
    }
}

#[async_trait]
impl ImageService for GeminiClient {
    async fn generate_from_text(&self, instruction: &str, aspect_ratio: AspectRatio) -> Result<ImagePayload> {
        tracing::info!(model = %self.image_model, aspect_ratio = %aspect_ratio, "sending text-to-image request");

        let body = PredictRequest::new(instruction, aspect_ratio);
        let response = self.http
            .post(self.predict_url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Transport(format!("HTTP {}: {}", status, detail.trim())));
        }

        let predictions: PredictResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Invalid response body: {}", e)))?;

        predictions.into_image().ok_or_else(|| {
            tracing::warn!(model = %self.image_model, "prediction list carried no image");
            AppError::empty_result("API did not return any images")
        })
    }

    async fn edit_single_image(&self, instruction: &str, image: &ImagePayload) -> Result<ImagePayload> {
        self.generate_with_images(instruction, &[image], "API did not return an edited image")
            .await
    }

    async fn compose_two_images(
        &self,
        instruction: &str,
        first: &ImagePayload,
        second: &ImagePayload,
    ) -> Result<ImagePayload> {
        self.generate_with_images(instruction, &[first, second], "API did not return a composed image")
            .await
    }
}

fn qualified_model(name: &str) -> String {
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{}", name)
    }
}

/// Generation config asking the edit model for image output.
pub fn image_generation_config() -> GenerationConfig {
    GenerationConfig {
        response_modalities: Some(RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect()),
        ..Default::default()
    }
}

/// Builds the user content: every image in order, then the instruction text.
pub fn image_content(instruction: &str, images: &[&ImagePayload]) -> Content {
    let mut parts: Vec<Part> = images
        .iter()
        .map(|image| Part::InlineData {
            inline_data: Blob {
                mime_type: image.media_type().to_string(),
                data: image.data().to_string(),
            },
        })
        .collect();

    parts.push(Part::Text {
        text: instruction.to_string(),
        thought: None,
        thought_signature: None,
    });

    Content {
        role: Some(Role::User),
        parts: Some(parts),
    }
}

/// Returns the first response part carrying inline image data.
pub fn first_inline_image(parts: &[Part]) -> Option<ImagePayload> {
    parts.iter().find_map(|part| match part {
        Part::InlineData { inline_data, .. } => Some(ImagePayload::new(
            inline_data.mime_type.clone(),
            inline_data.data.clone(),
        )),
        _ => None,
    })
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters,
}

#[derive(Serialize, Debug)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_options: OutputOptions,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

impl<'a> PredictRequest<'a> {
    fn new(prompt: &'a str, aspect_ratio: AspectRatio) -> Self {
        Self {
            instances: [PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.as_str(),
                output_options: OutputOptions {
                    mime_type: OUTPUT_MEDIA_TYPE,
                },
            },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

impl PredictResponse {
    /// Filtered predictions come back without bytes and are skipped.
    fn into_image(self) -> Option<ImagePayload> {
        self.predictions.into_iter().find_map(|p| {
            let data = p.bytes_base64_encoded.filter(|d| !d.is_empty())?;
            let media_type = p.mime_type.unwrap_or_else(|| OUTPUT_MEDIA_TYPE.to_string());
            Some(ImagePayload::new(media_type, data))
        })
    }
}
