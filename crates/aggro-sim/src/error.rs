//! Engine API errors.

use thiserror::Error;

use aggro_core::types::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("entity {0:?} is not a monster")]
    NotAMonster(EntityId),
    #[error("entity {0:?} has no stealth state")]
    NotAPlayer(EntityId),
}

pub type Result<T> = std::result::Result<T, SimError>;
