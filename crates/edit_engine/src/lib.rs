//! Edit Engine - Edit pipeline and footnote consistency maintenance
//!
//! This crate implements the edit pipeline (steps, position maps, filter and
//! follow-up hooks) and the footnote core that keeps inline references and
//! their note bodies consistent after every edit.

mod edit;
mod error;
mod footnote_commands;
mod footnote_fixup;
mod footnote_scan;
mod pipeline;
mod step;

pub use edit::*;
pub use error::*;
pub use footnote_commands::*;
pub use footnote_fixup::*;
pub use footnote_scan::*;
pub use pipeline::*;
pub use step::*;
