//! Domain layer containing the classification dialogue's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `schema` - Declarative fact schema: fields, sections and the MDR catalog
//! - `conversation` - Conversation aggregate, field resolution, routing, extraction

pub mod conversation;
pub mod foundation;
pub mod schema;
