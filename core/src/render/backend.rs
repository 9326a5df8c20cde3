#![deny(missing_docs)]

//! # Render Backend Boundary
//!
//! The collaborator interface the layout engine drives. The core never
//! encodes final document bytes itself; it hands fully paginated blocks and
//! resolved anchors to an implementation of this trait.

use crate::error::AppResult;
use crate::layout::Block;

/// A rendering backend consuming the laid-out document.
///
/// Calls arrive in a fixed order: `add_title_page` once, then every
/// `register_anchor`, then for each page a `begin_page` followed by one
/// `emit` per block, then a single `finish` that yields the artifact bytes.
pub trait RenderBackend {
    /// Receives document metadata before any page content.
    fn add_title_page(&mut self, title: &str, subtitle: Option<&str>) -> AppResult<()>;

    /// Announces an anchor's final position, so backends with native link
    /// support can create targets ahead of page emission.
    fn register_anchor(&mut self, id: &str, page: usize, line: usize) -> AppResult<()>;

    /// Opens page `number` (1-based). Pages arrive strictly in order.
    fn begin_page(&mut self, number: usize) -> AppResult<()>;

    /// Emits one block onto the current page.
    fn emit(&mut self, block: &Block) -> AppResult<()>;

    /// Closes the document and returns the artifact bytes.
    fn finish(&mut self) -> AppResult<Vec<u8>>;
}
