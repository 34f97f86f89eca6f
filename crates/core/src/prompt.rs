//! Instruction text sent to the model for each function.
//!
//! Every function maps to a fixed template: the user's text is inserted
//! verbatim between a prefix and a suffix. No escaping is applied.

use crate::functions::{CreateFunction, EditFunction, Function};

/// Prefix and suffix wrapped around the user's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

const VERBATIM: Template = Template { prefix: "", suffix: "" };

impl Template {
    pub fn render(&self, free_text: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + free_text.len() + self.suffix.len());
        out.push_str(self.prefix);
        out.push_str(free_text);
        out.push_str(self.suffix);
        out
    }
}

impl Function {
    /// The template used to build the instruction text for this function.
    pub fn template(self) -> Template {
        match self {
            Function::Create(CreateFunction::Free) => VERBATIM,
            Function::Create(CreateFunction::Sticker) => Template {
                prefix: "design a high-quality, vibrant, die-cut sticker of: ",
                suffix: ". a clean white background.",
            },
            Function::Create(CreateFunction::Text) => Template {
                prefix: "design a modern, minimalist logo with the text \"",
                suffix: "\". vector style, high contrast, on a plain white background.",
            },
            Function::Create(CreateFunction::Comic) => Template {
                prefix: "a single comic book panel illustration of: ",
                suffix: ". in a dynamic, american comic book style with bold lines and vibrant colors.",
            },
            Function::Edit(EditFunction::AddRemove) => VERBATIM,
            Function::Edit(EditFunction::Retouch) => Template {
                prefix: "Retouch this image: ",
                suffix: "",
            },
            Function::Edit(EditFunction::Style) => Template {
                prefix: "Apply a new style to this image based on the following description: ",
                suffix: "",
            },
            Function::Edit(EditFunction::Compose) => Template {
                prefix: "Combine these two images. ",
                suffix: "",
            },
        }
    }
}

/// Renders the final instruction text for a function and the user's text.
pub fn build(function: impl Into<Function>, free_text: &str) -> String {
    let function = function.into();
    let instruction = function.template().render(free_text);
    tracing::debug!(function = function.id(), len = instruction.len(), "rendered instruction");
    instruction
}
