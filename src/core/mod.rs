//! Core packaging pipeline: schema types, manifest parsing, version
//! resolution, requirement parsing, metadata assembly.

pub mod metadata;
pub mod parser;
pub mod requirement;
pub mod types;
pub mod version;
