//! Research prompt domain - built-in prompts with a company name placeholder

mod catalog;
mod template;

pub use catalog::*;
pub use template::{PromptTemplate, TemplateError};
