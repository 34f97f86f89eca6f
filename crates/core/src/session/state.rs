//! Session state types and validation messages.
//!
//! The session follows a four-state machine:
//! `Idle` -> `Pending` -> `Succeeded` | `Failed` -> `Idle` (on the next action)

use crate::codec::ImageSource;

pub const MSG_MISSING_IDEA: &str = "Please describe your idea.";
pub const MSG_MISSING_EDIT: &str = "Please describe the edit.";
pub const MSG_MISSING_TWO_IMAGES: &str = "Please upload two images to combine.";
pub const MSG_MISSING_IMAGE: &str = "Please upload an image to edit.";
pub const MSG_NO_IMAGES_IN_CREATE: &str = "Images are only used when editing.";
pub const MSG_SECOND_SLOT_UNUSED: &str = "Only the compose function takes a second image.";

/// Lifecycle of the current generation action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for user input.
    #[default]
    Idle,
    /// One request is in flight; no other action is accepted.
    Pending,
    /// The last action produced an image.
    Succeeded,
    /// The last action failed; the error message is stored.
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Input slot for an uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub(crate) fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

/// Sources captured for one action, matched to the function's cardinality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inputs {
    None,
    One(ImageSource),
    Two(ImageSource, ImageSource),
}
