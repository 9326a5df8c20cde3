#![deny(missing_docs)]

//! # Layout Module
//!
//! - **blocks**: atomic content units and cross-reference spans.
//! - **engine**: pagination state machine and two-pass anchor resolution.

pub mod blocks;
pub mod engine;

pub use blocks::{Block, Span};
pub use engine::{AnchorPos, LayoutEngine, LayoutOptions, LayoutResult, Page};
