//! # Errors
//!
//! The per-frame pipeline never fails. Errors only surface at the edges of the
//! library: loading configuration and mutating the scene.

use thiserror::Error;

use crate::model::ElementId;

/// Errors returned by the scene mutation and configuration APIs.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Two nodes (or two edges) were given the same id.
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: ElementId },

    /// An edge refers to a node that is not in the scene.
    #[error("edge `{edge}` references unknown node `{node}`")]
    UnknownNode { edge: ElementId, node: ElementId },

    /// The configuration could not be parsed.
    #[error("failed to parse canvas config: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration parsed but holds values the canvas cannot work with.
    #[error("invalid canvas config: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = CanvasError> = std::result::Result<T, E>;
