// file: src/mirror/mod.rs
// description: Filesystem mirroring module exports
// reference: Internal module structure

pub mod copier;

pub use copier::{MirrorStats, TreeMirror};
