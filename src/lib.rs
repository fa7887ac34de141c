//! Empacar — script packaging for Rust workflows.
//!
//! Declarative manifests. First-match version resolution from the packaged
//! script itself. BLAKE3 digests and deterministic source archives.

pub mod cli;
pub mod core;
pub mod dist;
