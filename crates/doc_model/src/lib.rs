//! Document Model - Position-addressed document tree and core types
//!
//! This crate provides the document model consumed by the edit engine: typed
//! value nodes addressed by integer positions, the note/reference identifier,
//! the selection model, and fragment (de)serialization for cached note-body
//! snapshots.

mod error;
mod fragment;
mod node;
mod note_id;
mod selection;

pub use error::*;
pub use fragment::*;
pub use node::*;
pub use note_id::*;
pub use selection::*;
