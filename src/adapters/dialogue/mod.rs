//! Dialogue oracle adapters.
//!
//! Each oracle port is implemented by prompting an [`AIProvider`]. The
//! provider is shared, so wrapping it in a pacing policy spaces out every
//! call the dialogue makes.
//!
//! [`AIProvider`]: crate::ports::AIProvider

mod classifier;
mod extractor;
mod intent;
mod questions;

pub use classifier::LlmDeviceClassifier;
pub use extractor::LlmFactExtractor;
pub use intent::LlmIntentClassifier;
pub use questions::LlmQuestionGenerator;
