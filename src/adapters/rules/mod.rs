//! Rules source adapters.

mod file_rules_source;

pub use file_rules_source::FileRulesSource;
