//! Conversation domain module.
//!
//! The conversation aggregate, message kinds, conditional field
//! resolution, section scheduling and routing, and extraction of typed
//! facts from model output.

mod extractor;
mod message;
mod report;
mod resolver;
mod router;
mod schedule;
mod state;

pub use extractor::{
    DataExtractor, ExtractedFacts, ExtractionError, ResponseSanitizer, SanitizationError,
    MAX_FIELD_LENGTH, MAX_RESPONSE_LENGTH,
};
pub use message::{Message, MessageKind, Role};
pub use report::{ClassificationReport, DeviceClass};
pub use resolver::{askability, is_askable, next_missing_field, Askability};
pub use router::{route, Route};
pub use schedule::plan_sections;
pub use state::{ConversationState, SectionDelta, SectionOutcome};
