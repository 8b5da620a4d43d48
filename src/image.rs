//! Firmware image loading.
//!
//! Seeds a `MemoryWorkspace` from an ELF image. Every sized function symbol
//! becomes a basic block spanning the whole function, which is the coverage
//! prologue realignment looks up. Every loaded section becomes an addressable
//! region, so definitions outside the image are refused. Symbol names are only
//! seeded on request: a seeded name at a function entry blocks the import of
//! that function.

use anyhow::{Context, Result};
use object::{Architecture, Object, ObjectSection, ObjectSymbol, SectionKind, SymbolKind};
use tracing::{debug, warn};

use crate::symbol::TargetKind;
use crate::workspace::{BasicBlock, MemoryWorkspace};

fn is_loaded(kind: SectionKind) -> bool {
    matches!(
        kind,
        SectionKind::Text
            | SectionKind::Data
            | SectionKind::ReadOnlyData
            | SectionKind::ReadOnlyString
            | SectionKind::UninitializedData
    )
}

/// Build a workspace from the raw bytes of an ELF image.
///
/// With `seed_names`, the image's own code and data symbols are recorded as
/// existing names, and the import never overrides them.
pub fn load_workspace(data: &[u8], seed_names: bool) -> Result<MemoryWorkspace> {
    let obj = object::File::parse(data).context("failed to parse image")?;
    // Thumb function symbols carry the interworking bit in bit 0.
    let thumb_bit = obj.architecture() == Architecture::Arm;

    let mut workspace = MemoryWorkspace::new();
    for section in obj.sections() {
        if !is_loaded(section.kind()) || section.size() == 0 {
            continue;
        }
        let start = section.address();
        match start.checked_add(section.size()) {
            Some(end) => workspace.add_region(start, end),
            None => warn!(
                section = section.name().unwrap_or("?"),
                "section at 0x{start:x} wraps the address space, ignoring"
            ),
        }
    }

    for sym in obj.symbols() {
        if sym.is_undefined() {
            continue;
        }
        let kind = match sym.kind() {
            SymbolKind::Text => TargetKind::Function,
            SymbolKind::Data => TargetKind::Data,
            _ => continue,
        };
        let name = sym.name().context("invalid symbol name in image")?;
        // `$t`, `$d`, `$a` are ARM mapping symbols, not names.
        if name.is_empty() || name.starts_with('$') {
            continue;
        }

        let mut address = sym.address();
        if kind == TargetKind::Function && thumb_bit {
            address &= !1;
        }
        let Some(end) = address.checked_add(sym.size()) else {
            warn!(%name, "symbol at 0x{address:x} wraps the address space, ignoring");
            continue;
        };

        if seed_names {
            workspace.add_symbol(address, name, kind);
        }
        if kind == TargetKind::Function && end > address {
            workspace.add_block(BasicBlock {
                start: address,
                end,
                function_start: address,
            });
        }
    }

    debug!(
        symbols = workspace.len(),
        blocks = workspace.blocks().len(),
        "loaded workspace from image"
    );
    Ok(workspace)
}
