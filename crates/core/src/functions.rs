//! Modes, functions and aspect ratios offered to the user.
//!
//! A [`Mode`] picks between generating a new image and editing existing ones;
//! within each mode a function selects the prompt template and how many source
//! images the request carries.

use crate::error::{AppError, Result};
use std::fmt;
use std::str::FromStr;

/// Top-level selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Generate a new image from text.
    #[default]
    Create,
    /// Edit or compose uploaded images.
    Edit,
}

/// Text-to-image functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CreateFunction {
    #[default]
    Free,
    Sticker,
    /// Logo built around the prompt text.
    Text,
    Comic,
}

/// Image-conditioned functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditFunction {
    #[default]
    AddRemove,
    Retouch,
    Style,
    /// Combines two source images.
    Compose,
}

/// A function together with the mode it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Create(CreateFunction),
    Edit(EditFunction),
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Create, Mode::Edit];

    pub fn id(self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Edit => "edit",
        }
    }
}

impl CreateFunction {
    pub const ALL: [CreateFunction; 4] = [
        CreateFunction::Free,
        CreateFunction::Sticker,
        CreateFunction::Text,
        CreateFunction::Comic,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CreateFunction::Free => "free",
            CreateFunction::Sticker => "sticker",
            CreateFunction::Text => "text",
            CreateFunction::Comic => "comic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreateFunction::Free => "Prompt",
            CreateFunction::Sticker => "Stickers",
            CreateFunction::Text => "Logo",
            CreateFunction::Comic => "Comic",
        }
    }
}

impl EditFunction {
    pub const ALL: [EditFunction; 4] = [
        EditFunction::AddRemove,
        EditFunction::Retouch,
        EditFunction::Style,
        EditFunction::Compose,
    ];

    pub fn id(self) -> &'static str {
        match self {
            EditFunction::AddRemove => "add-remove",
            EditFunction::Retouch => "retouch",
            EditFunction::Style => "style",
            EditFunction::Compose => "compose",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditFunction::AddRemove => "Add/Remove",
            EditFunction::Retouch => "Retouch",
            EditFunction::Style => "Style",
            EditFunction::Compose => "Compose",
        }
    }

    /// Whether the function takes two source images instead of one.
    pub fn requires_two(self) -> bool {
        matches!(self, EditFunction::Compose)
    }

    /// Number of source images the request must carry.
    pub fn image_count(self) -> usize {
        if self.requires_two() { 2 } else { 1 }
    }
}

impl Function {
    pub fn mode(self) -> Mode {
        match self {
            Function::Create(_) => Mode::Create,
            Function::Edit(_) => Mode::Edit,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Function::Create(f) => f.id(),
            Function::Edit(f) => f.id(),
        }
    }

    /// Number of source images the request must carry.
    pub fn image_count(self) -> usize {
        match self {
            Function::Create(_) => 0,
            Function::Edit(f) => f.image_count(),
        }
    }

    /// Whether an empty prompt is accepted for this function.
    pub fn allows_empty_prompt(self) -> bool {
        matches!(
            self,
            Function::Edit(EditFunction::AddRemove) | Function::Edit(EditFunction::Compose)
        )
    }
}

impl From<CreateFunction> for Function {
    fn from(f: CreateFunction) -> Self {
        Function::Create(f)
    }
}

impl From<EditFunction> for Function {
    fn from(f: EditFunction) -> Self {
        Function::Edit(f)
    }
}

/// Output aspect ratio for text-to-image generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    #[default]
    Square,
    Landscape,
    Portrait,
    Standard,
    StandardPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Standard,
        AspectRatio::StandardPortrait,
    ];

    /// The ratio string accepted by the remote service.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::StandardPortrait => "3:4",
        }
    }
}

macro_rules! id_parsing {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                $ty::ALL
                    .into_iter()
                    .find(|v| v.id().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| AppError::config(format!("Unknown {}: {}", $what, s)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

id_parsing!(Mode, "mode");
id_parsing!(CreateFunction, "create function");
id_parsing!(EditFunction, "edit function");

impl FromStr for AspectRatio {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| {
                AppError::config(format!(
                    "Unsupported aspect ratio: {} (expected one of 1:1, 16:9, 9:16, 4:3, 3:4)",
                    s
                ))
            })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
