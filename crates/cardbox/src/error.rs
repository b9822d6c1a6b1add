use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::card::Face;

#[derive(Error, Debug)]
pub enum CardboxError {
    #[error("Modification date {modified} can't be before creation date {created}")]
    ModifiedBeforeCreated {
        modified: DateTime<Utc>,
        created: DateTime<Utc>,
    },

    #[error("The {0} side of a card can't be empty")]
    EmptySide(Face),

    #[error("Passed tests ({passed}) can't exceed total tests ({total})")]
    InvalidStats { passed: u32, total: u32 },

    #[error("Adding {passed} passed of {total} tests would overflow the counters")]
    StatsOverflow { passed: u32, total: u32 },

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Card {0} already belongs to a category")]
    AlreadyOwned(Uuid),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, CardboxError>;
