//! Error types.
//!
//! `MapError` is the only condition that stops a parse. `EntryError` is
//! raised per line and only ever logged; `WorkspaceError` comes back from a
//! host that refused a definition.

use thiserror::Error;

use crate::symbol::Section;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("`{section}` at offset {offset} is not followed by a `Symbol Name` header")]
    HeaderNotFound { section: Section, offset: usize },
}

/// Why a single entry line was dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid hex address `{0}`")]
    InvalidAddress(String),
    #[error("invalid decimal size `{0}`")]
    InvalidSize(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("address 0x{0:x} is outside the workspace image")]
    OutOfRange(u64),
    #[error("workspace rejected symbol `{name}`: {reason}")]
    Rejected { name: String, reason: String },
}
