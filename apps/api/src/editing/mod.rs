//! Resume editing: typed leaf paths, list growth/shrink, whole-field
//! transforms, and the live session that applies them.
//!
//! Every operation takes the current `Resume` by reference and returns a new
//! one. The session swaps the result in wholesale.

pub mod handlers;
pub mod lists;
pub mod path;
pub mod session;
pub mod transforms;

use thiserror::Error;

pub use session::ResumeSession;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The path does not name an existing leaf. Well-formed editors never
    /// produce one.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("unsupported photo: {0}")]
    UnsupportedPhoto(String),
}
