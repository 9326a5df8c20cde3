#![deny(missing_docs)]

//! # Render Module
//!
//! - **backend**: the collaborator trait the layout engine drives.
//! - **text**: the deterministic plain-text reference backend.

pub mod backend;
pub mod text;

pub use backend::RenderBackend;
pub use text::TextRenderer;
