use thiserror::Error;

use crate::core::types::ParticipantId;

#[derive(Error, Debug)]
pub enum DirectorError {
    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Participant already registered: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error("Participant {0} is not a squad")]
    NotASquad(ParticipantId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Condition error: {0}")]
    Condition(String),

    #[error("Lifecycle violation on squad {squad}: {detail}")]
    LifecycleViolation { squad: ParticipantId, detail: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DirectorError>;
