pub mod gemini;
pub mod traits;
pub mod util;

pub use gemini::{Gemini, GeminiPromptBuilder};
pub use traits::{Agent, PromptBuilder};
