//! Entry point for the mapsym importer.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Read the map file and parse its symbol tables.
//! 3. Seed a workspace from the firmware image, if one is given.
//! 4. Apply the parsed symbols and report what was defined and deferred.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use mapsym::config::Config;
use mapsym::image::load_workspace;
use mapsym::mapfile::parse_map;
use mapsym::resolver::apply;
use mapsym::workspace::MemoryWorkspace;

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !config.map.exists() {
        anyhow::bail!("map file {} does not exist", config.map.display());
    }

    let map = map_file(&config.map)?;
    let text = String::from_utf8_lossy(&map);
    let symbols = parse_map(&text)
        .with_context(|| format!("failed to parse {}", config.map.display()))?;

    if config.parse_only {
        for sym in &symbols {
            let scope = if sym.is_local { "local" } else { "global" };
            println!("{scope:<6} {sym}");
        }
        return Ok(());
    }

    let mut workspace = match &config.image {
        Some(path) => {
            let image = map_file(path)?;
            load_workspace(&image, config.image_names).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => MemoryWorkspace::new(),
    };

    let report = apply(&mut workspace, &symbols, &config.import_options());

    for sym in &report.applied {
        println!("defined  0x{:08x} {} ({})", sym.address, sym.display_name, sym.target_kind);
    }
    for sym in &report.deferred {
        println!("deferred 0x{:08x} {} (basic block not found)", sym.map_address, sym.display_name);
    }
    println!(
        "Imported {} of {} symbols from {} ({} deferred, {} already named, {} dropped, {} failed)",
        report.applied.len(),
        symbols.len(),
        config.map.display(),
        report.deferred.len(),
        report.skipped_existing,
        report.dropped,
        report.failed,
    );
    Ok(())
}
