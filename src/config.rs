//! Configuration module.
//!
//! This module defines the command-line interface (CLI) using `clap` and
//! converts it into the library's `ImportOptions`.

use clap::Parser;
use std::path::PathBuf;

use crate::resolver::{ImportOptions, DEFAULT_NAMESPACE, DEFAULT_PREFIX};

/// Import symbols from a Keil linker map file into a firmware workspace.
///
/// Reads the Local/Global symbol tables of the map file, and defines each
/// function and data symbol in a workspace seeded from the firmware image.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Linker map file
    pub map: PathBuf,

    /// ELF image whose symbols and functions seed the workspace
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Also treat the image's own symbol names as existing analysis, never overridden
    #[arg(long, requires = "image")]
    pub image_names: bool,

    /// Prefix for every imported symbol name
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Namespace tag for imported symbols
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Keep map-file addresses for functions instead of moving them to the owning function start
    #[arg(long)]
    pub no_align: bool,

    /// Print parsed map records and exit
    #[arg(long)]
    pub parse_only: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: String,
}

impl Config {
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            name_prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            align_functions_to_basic_block: !self.no_align,
        }
    }
}
