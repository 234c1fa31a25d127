//! # lv-view: Viewer core for lessvim
//!
//! The pieces that turn a file into frames:
//!
//! - **[`document`]** - `Document`, the immutable list of byte lines
//! - **[`viewport`]** - cursor and scroll offset, with clamping and
//!   edge-triggered scrolling
//! - **[`render`]** - row layout, welcome banner, and frame encoding
//! - **[`error`]** - `ViewError`, the viewer's failure type

pub mod document;
pub mod error;
pub mod render;
pub mod viewport;

pub use error::ViewError;
