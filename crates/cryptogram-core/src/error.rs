use crate::CellId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptogramError {
    #[error("no cell with id {0}")]
    UnknownCell(CellId),

    #[error("cell {0} does not take a guess")]
    NotSolvable(CellId),

    #[error("unknown cipher mode: {0}")]
    UnknownMode(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("could not decode saved data: {0}")]
    Decode(String),

    #[error("text service failed: {0}")]
    TextService(String),
}

pub type Result<T> = std::result::Result<T, CryptogramError>;
