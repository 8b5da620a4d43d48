//! Linker map symbol importer.
//!
//! This library reads the symbol tables of a Keil linker map file and defines
//! the symbols in a binary-analysis workspace. It is organized into several
//! modules:
//! - `config`: CLI configuration.
//! - `mapfile`: Map file parsing.
//! - `symbol`: Parsed and resolved symbol types.
//! - `resolver`: Classification and application to a workspace.
//! - `workspace`: The workspace capability trait and an in-memory implementation.
//! - `image`: Seeding a workspace from an ELF image.

pub mod config;
pub mod error;
pub mod image;
pub mod mapfile;
pub mod resolver;
pub mod symbol;
pub mod utils;
pub mod workspace;
