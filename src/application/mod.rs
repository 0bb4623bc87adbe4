//! Application layer - orchestrates the dialogue over the ports.
//!
//! - [`SectionEngine`] runs one section for one turn
//! - [`ClassificationSession`] loops routing and sections until the turn ends

mod error;
mod section_engine;
mod session;

pub use error::TurnError;
pub use section_engine::SectionEngine;
pub use session::{ClassificationSession, GREETING};
