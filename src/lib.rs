//! MDR Classifier - conversational medical device classification
//!
//! This crate collects the facts EU MDR Annex VIII classification depends
//! on through a slot-filling dialogue, one question at a time, and then
//! asks a language model for the device class and the applicable rules.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
