//! Error types for scene-level windowpane operations.

use thiserror::Error;

use crate::window::WindowId;

/// Result type for windowpane scene operations.
pub type Result<T> = std::result::Result<T, PaneError>;

/// Errors surfaced to the host. Everything inside a frame phase self-heals
/// instead of failing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaneError {
    /// The id was never issued by this scene, or the window was already removed.
    #[error("unknown windowpane {0:?}")]
    UnknownWindow(WindowId),
}
