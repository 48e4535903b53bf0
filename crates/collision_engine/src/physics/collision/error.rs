//! Collision errors

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from creating, registering and driving collision parts
#[derive(Debug, Error)]
pub enum CollisionError {
    /// A required resource is not in the actor's archive
    #[error("Collision resource not found: {0}")]
    MissingResource(String),

    /// The mesh decoder rejected the resource data
    #[error("Failed to decode collision resource {name}: {reason}")]
    Decode {
        /// Resource name, without extension
        name: String,
        /// Decoder message
        reason: String,
    },

    /// The part handle is stale or was never issued by this director
    #[error("Unknown collision parts handle")]
    UnknownParts,

    /// A host-matrix operation was used on a part without a host matrix
    #[error("Collision parts has no host matrix")]
    NoHostMtx,

    /// Loading or saving the collision config failed
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
