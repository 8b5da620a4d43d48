//! Symbol resolution and application.
//!
//! Turns parsed map records into workspace symbols:
//! 1. Classify: drop sections, zero-size and unknown-kind records; pick
//!    function or data for the rest and build the prefixed display name.
//! 2. Skip any address the workspace has already named.
//! 3. For functions, move the address to the start of the function owning the
//!    covering basic block. Map values for code can land past the prologue.
//!    Records with no covering block are deferred.
//! 4. Define the symbol.
//!
//! Every call returns its own `ImportReport`; nothing is kept between calls.

use tracing::{debug, info, warn};

use crate::symbol::{ParsedSymbol, ResolvedSymbol, SymbolKind, TargetKind};
use crate::workspace::Workspace;

pub const DEFAULT_PREFIX: &str = "keil_";
pub const DEFAULT_NAMESPACE: &str = "keil_map";

/// Knobs for an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Prepended to every imported name.
    pub name_prefix: String,
    /// Namespace tag isolating imported symbols from other sources.
    pub namespace: String,
    /// Move function symbols to the start of their owning function.
    pub align_functions_to_basic_block: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_PREFIX.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            align_functions_to_basic_block: true,
        }
    }
}

/// Result of one `apply` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Symbols defined in the workspace, at the address actually used.
    pub applied: Vec<ResolvedSymbol>,
    /// Functions with no covering basic block. Not retried.
    pub deferred: Vec<ResolvedSymbol>,
    /// Records whose address already carried a symbol.
    pub skipped_existing: usize,
    /// Records rejected by classification.
    pub dropped: usize,
    /// Definitions the workspace refused.
    pub failed: usize,
}

/// Map a parsed record to the symbol to import, or `None` if it is dropped.
pub fn classify(symbol: &ParsedSymbol, options: &ImportOptions) -> Option<ResolvedSymbol> {
    let target_kind = match &symbol.kind {
        SymbolKind::ThumbCode => TargetKind::Function,
        SymbolKind::Number | SymbolKind::Data => TargetKind::Data,
        SymbolKind::Section => return None,
        SymbolKind::Other(token) => {
            warn!(name = %symbol.name, kind = %token, "unknown symbol kind, dropping");
            return None;
        }
    };
    if symbol.size == 0 {
        return None;
    }

    Some(ResolvedSymbol {
        address: symbol.address,
        map_address: symbol.address,
        display_name: format!("{}{}", options.name_prefix, symbol.name),
        namespace: options.namespace.clone(),
        target_kind,
    })
}

/// Apply `symbols` to `workspace` in order.
pub fn apply<W: Workspace + ?Sized>(
    workspace: &mut W,
    symbols: &[ParsedSymbol],
    options: &ImportOptions,
) -> ImportReport {
    let mut report = ImportReport::default();

    for symbol in symbols {
        let Some(mut resolved) = classify(symbol, options) else {
            report.dropped += 1;
            continue;
        };

        if let Some(existing) = workspace.symbol_at(resolved.address) {
            debug!(
                name = %symbol.name,
                existing = %existing.name,
                "address 0x{:x} already named, skipping",
                resolved.address
            );
            report.skipped_existing += 1;
            continue;
        }

        if resolved.target_kind == TargetKind::Function && options.align_functions_to_basic_block {
            let blocks = workspace.basic_blocks_at(resolved.address);
            let Some(block) = blocks.first() else {
                debug!(name = %symbol.name, "no basic block at 0x{:x}, deferring", resolved.address);
                report.deferred.push(resolved);
                continue;
            };

            let start = block.owning_function_start();
            if start != resolved.address {
                if let Some(existing) = workspace.symbol_at(start) {
                    debug!(
                        name = %symbol.name,
                        existing = %existing.name,
                        "function start 0x{:x} already named, skipping",
                        start
                    );
                    report.skipped_existing += 1;
                    continue;
                }
                debug!(name = %symbol.name, "realigned 0x{:x} -> 0x{:x}", resolved.address, start);
                resolved.address = start;
            }
        }

        match workspace.define_symbol(
            resolved.address,
            &resolved.display_name,
            resolved.target_kind,
            &resolved.namespace,
        ) {
            Ok(()) => report.applied.push(resolved),
            Err(err) => {
                warn!(name = %resolved.display_name, "failed to define symbol: {err}");
                report.failed += 1;
            }
        }
    }

    info!(
        applied = report.applied.len(),
        deferred = report.deferred.len(),
        skipped = report.skipped_existing,
        dropped = report.dropped,
        failed = report.failed,
        "map import finished"
    );
    report
}
