//! Error types for the blue carbon registry

use thiserror::Error;

use crate::types::{CreditId, ListingId, OrderId, ProjectId, SubmissionId};

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RegistryError::Config(_) => 2,
            RegistryError::InvalidInput(_) => 3,
            RegistryError::Action(_) => 1,
            RegistryError::Io(_) => 1,
            RegistryError::Serialization(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Reasons a dispatched action left the state unchanged
///
/// The reducer itself never fails; these are reported by the store so callers
/// don't have to pre-validate against the state they hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("MRV submission #{0} does not exist")]
    UnknownSubmission(SubmissionId),

    #[error("MRV submission #{0} has already been reviewed")]
    SubmissionNotPending(SubmissionId),

    #[error("carbon credit #{0} does not exist")]
    UnknownCredit(CreditId),

    #[error("carbon credit #{0} is not active")]
    CreditNotActive(CreditId),

    #[error("listing #{0} does not exist")]
    UnknownListing(ListingId),

    #[error("only {available} credits available, {requested} requested")]
    InsufficientQuantity { available: u64, requested: u64 },

    #[error("order quantity must be greater than zero")]
    ZeroQuantity,

    #[error("order #{0} does not exist")]
    UnknownOrder(OrderId),

    #[error("order #{0} is already completed")]
    OrderAlreadyCompleted(OrderId),

    #[error("project #{0} has no geographic data")]
    UnknownGeoProject(ProjectId),
}
