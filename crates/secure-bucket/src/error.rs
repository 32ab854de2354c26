use crate::region::RegionError;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Structural errors raised while assembling a stack.
///
/// Grant inputs are never validated semantically; a misspelled action or
/// group name is not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("logical id {0:?} is already used in this stack")]
    DuplicateLogicalId(String),

    #[error("output {0:?} is already defined in this stack")]
    DuplicateOutput(String),

    #[error("no resource with logical id {0:?}")]
    UnknownResource(String),

    #[error("resource {logical_id:?} is not a {expected}")]
    WrongResourceKind { logical_id: String, expected: &'static str },

    #[error("bucket {0:?}: auto-deleting objects requires the Destroy removal policy")]
    AutoDeleteRequiresDestroy(String),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("failed to encode template: {0}")]
    Json(#[from] serde_json::Error),
}
