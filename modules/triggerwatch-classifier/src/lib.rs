pub mod classifier;
pub mod error;
pub mod prompt;
pub mod reference;
pub mod response;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::{GenerativeBackend, TriggerClassifier};
pub use error::{ClassifyError, ReferenceError};
pub use prompt::{PromptAssembler, PromptLimits};
pub use reference::{ReferenceSet, WorkedExample};
pub use response::{extract_json_object, parse_trigger_response};
