//! Distribution outputs: BLAKE3 digests and the sdist archive.

pub mod archive;
pub mod hasher;
