//! Session controller.
//!
//! Holds everything the presentation layer shows (selected mode and function,
//! prompt, uploaded images, last result or error) and runs at most one
//! generation action at a time.
//!
//! # Example
//!
//! ```ignore
//! use ai_studio_core::{session::Session, CreateFunction, GeminiClient, Config};
//!
//! let client = GeminiClient::new(&Config::load()?)?;
//! let mut session = Session::new();
//! session.select_function(CreateFunction::Sticker)?;
//! session.set_prompt("a red fox");
//! let image = session.generate(&client).await?;
//! ```

mod state;

pub use state::{Inputs, Phase, Slot};
pub use state::{
    MSG_MISSING_EDIT, MSG_MISSING_IDEA, MSG_MISSING_IMAGE, MSG_MISSING_TWO_IMAGES,
    MSG_NO_IMAGES_IN_CREATE, MSG_SECOND_SLOT_UNUSED,
};

use crate::codec::{ImageCodec, ImagePayload, ImageSource};
use crate::error::{AppError, Result};
use crate::functions::{AspectRatio, CreateFunction, EditFunction, Function, Mode};
use crate::gemini::{GenerationRequest, ImageService};
use crate::prompt;

/// UI-visible state plus the busy flag guarding the single in-flight request.
#[derive(Debug, Default)]
pub struct Session {
    mode: Mode,
    create_function: CreateFunction,
    edit_function: EditFunction,
    prompt: String,
    aspect_ratio: AspectRatio,
    images: [Option<ImageSource>; 2],
    phase: Phase,
    result: Option<ImagePayload>,
    error: Option<String>,
}

/// A validated action that has moved the session into [`Phase::Pending`].
///
/// Owns copies of everything the outbound request needs, so the session can
/// be inspected while the request runs.
#[derive(Clone, Debug)]
pub struct PendingGeneration {
    function: Function,
    instruction: String,
    aspect_ratio: AspectRatio,
    inputs: Inputs,
}

impl PendingGeneration {
    pub fn function(&self) -> Function {
        self.function
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Encodes the captured sources and builds the outbound request.
    ///
    /// Both sources of a composition are encoded concurrently; the request is
    /// built only once both are done.
    pub async fn prepare(&self) -> Result<GenerationRequest> {
        let instruction = self.instruction.clone();
        let request = match &self.inputs {
            Inputs::None => GenerationRequest::FromText {
                instruction,
                aspect_ratio: self.aspect_ratio,
            },
            Inputs::One(source) => GenerationRequest::EditSingle {
                instruction,
                image: ImageCodec::encode_source(source).await?,
            },
            Inputs::Two(a, b) => {
                let (first, second) = futures::try_join!(
                    ImageCodec::encode_source(a),
                    ImageCodec::encode_source(b)
                )?;
                GenerationRequest::Compose { instruction, first, second }
            }
        };
        Ok(request)
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The function currently selected for the active mode.
    pub fn function(&self) -> Function {
        match self.mode {
            Mode::Create => Function::Create(self.create_function),
            Mode::Edit => Function::Edit(self.edit_function),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn image(&self, slot: Slot) -> Option<&ImageSource> {
        self.images[slot.index()].as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Pending
    }

    /// The last generated image, if any.
    pub fn result(&self) -> Option<&ImagePayload> {
        self.result.as_ref()
    }

    /// The user-visible message of the last failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switches mode. Uploaded images are discarded.
    pub fn select_mode(&mut self, mode: Mode) -> Result<()> {
        self.start_action()?;
        self.mode = mode;
        self.error = None;
        self.clear_images();
        Ok(())
    }

    /// Selects a function, switching to its mode. Uploaded images are
    /// discarded whenever the mode or function changes.
    pub fn select_function(&mut self, function: impl Into<Function>) -> Result<()> {
        self.start_action()?;
        let function = function.into();
        if function == self.function() {
            return Ok(());
        }

        match function {
            Function::Create(f) => self.create_function = f,
            Function::Edit(f) => self.edit_function = f,
        }
        self.mode = function.mode();
        self.clear_images();
        Ok(())
    }

    /// Places an image into a slot, replacing whatever was there.
    pub fn upload(&mut self, slot: Slot, source: ImageSource) -> Result<()> {
        self.start_action()?;
        match self.function() {
            Function::Create(_) => return Err(AppError::validation(MSG_NO_IMAGES_IN_CREATE)),
            Function::Edit(f) if slot == Slot::Second && !f.requires_two() => {
                return Err(AppError::validation(MSG_SECOND_SLOT_UNUSED));
            }
            Function::Edit(_) => {}
        }
        tracing::debug!(slot = ?slot, source = %source.describe(), "image uploaded");
        self.images[slot.index()] = Some(source);
        Ok(())
    }

    pub fn clear_images(&mut self) {
        self.images = [None, None];
    }

    /// Checks the input preconditions for the current mode and function.
    pub fn validate(&self) -> Result<Inputs> {
        let function = self.function();
        let [first, second] = &self.images;

        let inputs = match function {
            Function::Create(_) => {
                if first.is_some() || second.is_some() {
                    return Err(AppError::validation(MSG_NO_IMAGES_IN_CREATE));
                }
                Inputs::None
            }
            Function::Edit(EditFunction::Compose) => match (first, second) {
                (Some(a), Some(b)) => Inputs::Two(a.clone(), b.clone()),
                _ => return Err(AppError::validation(MSG_MISSING_TWO_IMAGES)),
            },
            Function::Edit(_) => match (first, second) {
                (Some(a), None) => Inputs::One(a.clone()),
                (Some(_), Some(_)) => return Err(AppError::validation(MSG_SECOND_SLOT_UNUSED)),
                (None, _) => return Err(AppError::validation(MSG_MISSING_IMAGE)),
            },
        };

        if self.prompt.is_empty() && !function.allows_empty_prompt() {
            let msg = match function {
                Function::Create(_) => MSG_MISSING_IDEA,
                Function::Edit(_) => MSG_MISSING_EDIT,
            };
            return Err(AppError::validation(msg));
        }

        Ok(inputs)
    }

    /// Validates the inputs and moves Idle -> Pending.
    ///
    /// # Errors
    ///
    /// [`AppError::Busy`] while another action is pending, leaving the session
    /// untouched. [`AppError::Validation`] when a precondition fails; the
    /// message is stored and the session stays Idle.
    pub fn begin(&mut self) -> Result<PendingGeneration> {
        self.start_action()?;

        let inputs = match self.validate() {
            Ok(inputs) => inputs,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        let function = self.function();
        let pending = PendingGeneration {
            function,
            instruction: prompt::build(function, &self.prompt),
            aspect_ratio: self.aspect_ratio,
            inputs,
        };

        self.phase = Phase::Pending;
        self.result = None;
        self.error = None;
        tracing::debug!(function = function.id(), images = function.image_count(), "generation started");
        Ok(pending)
    }

    /// Ends the pending action with its outcome.
    ///
    /// Success stores the image and clears the error; failure stores the
    /// user-visible message and clears the result.
    pub fn complete(&mut self, outcome: Result<ImagePayload>) -> Result<&ImagePayload> {
        if self.phase != Phase::Pending {
            return Err(AppError::NotPending);
        }

        match outcome {
            Ok(image) => {
                self.phase = Phase::Succeeded;
                self.error = None;
                Ok(&*self.result.insert(image))
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                self.phase = Phase::Failed;
                self.result = None;
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Runs one full generation action against `service`.
    pub async fn generate<S>(&mut self, service: &S) -> Result<&ImagePayload>
    where
        S: ImageService + ?Sized,
    {
        let pending = self.begin()?;
        let outcome = match pending.prepare().await {
            Ok(request) => {
                tracing::debug!(images = request.image_count(), chars = request.instruction().len(), "dispatching");
                request.dispatch(service).await
            }
            Err(e) => Err(e),
        };
        self.complete(outcome)
    }

    /// Moves the current result into the first edit slot.
    ///
    /// The session switches to Edit/AddRemove, owns the decoded image as its
    /// only input and no longer holds a result.
    pub fn send_result_to_edit(&mut self) -> Result<()> {
        self.start_action()?;
        let result = self.result.take().ok_or(AppError::NoResult)?;
        let bytes = match result.decode() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.result = Some(result);
                return Err(e);
            }
        };

        self.mode = Mode::Edit;
        self.edit_function = EditFunction::AddRemove;
        self.error = None;
        self.images = [
            Some(ImageSource::Memory {
                bytes,
                media_type: Some(result.media_type().to_string()),
            }),
            None,
        ];
        Ok(())
    }

    /// Discards the current result.
    pub fn new_image(&mut self) -> Result<()> {
        self.start_action()?;
        self.result = None;
        Ok(())
    }

    /// Rejects actions while pending and returns terminal states to Idle.
    fn start_action(&mut self) -> Result<()> {
        if self.phase == Phase::Pending {
            return Err(AppError::Busy);
        }
        if self.phase.is_terminal() {
            self.phase = Phase::Idle;
        }
        Ok(())
    }
}
