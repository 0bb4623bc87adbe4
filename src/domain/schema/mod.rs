//! Fact schema - declarative descriptions of every fact the dialogue collects.
//!
//! - `field` - field descriptors, types and prerequisite gates
//! - `section` - topic sections and their lifecycle
//! - `catalog` - the concrete MDR field tables
//! - `facts` - the accumulated fact store

pub mod catalog;
mod facts;
mod field;
mod section;
mod value;

pub use catalog::FieldEntry;
pub use facts::FactSet;
pub use field::{Dependency, FieldDefinition, FieldType, Requirement};
pub use section::{SectionId, SectionStatus};
pub use value::FactValue;
