//! In-memory workspace.
//!
//! Implements `Workspace` over a symbol map and a flat list of basic blocks.
//! Used by the CLI (seeded from an ELF image) and by tests.

use std::collections::BTreeMap;

use super::{BasicBlock, SymbolSource, Workspace, WorkspaceSymbol};
use crate::error::WorkspaceError;
use crate::symbol::TargetKind;

#[derive(Debug, Default, Clone)]
pub struct MemoryWorkspace {
    symbols: BTreeMap<u64, WorkspaceSymbol>,
    blocks: Vec<BasicBlock>,
    /// Addressable ranges `[start, end)`. Empty accepts any address.
    regions: Vec<(u64, u64)>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow definitions in `[start, end)`. Once any region is added,
    /// addresses outside all regions are refused.
    pub fn add_region(&mut self, start: u64, end: u64) {
        self.regions.push((start, end));
    }

    fn is_addressable(&self, address: u64) -> bool {
        self.regions.is_empty()
            || self
                .regions
                .iter()
                .any(|&(start, end)| (start..end).contains(&address))
    }

    /// Record a symbol found by analysis. Replaces any symbol at the same address.
    pub fn add_symbol(&mut self, address: u64, name: &str, kind: TargetKind) {
        self.symbols.insert(
            address,
            WorkspaceSymbol {
                address,
                name: name.to_string(),
                kind,
                namespace: None,
                source: SymbolSource::Analysis,
            },
        );
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        let at = self.blocks.partition_point(|b| b.start <= block.start);
        self.blocks.insert(at, block);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &WorkspaceSymbol> {
        self.symbols.values()
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Workspace for MemoryWorkspace {
    fn symbol_at(&self, address: u64) -> Option<WorkspaceSymbol> {
        self.symbols.get(&address).cloned()
    }

    fn basic_blocks_at(&self, address: u64) -> Vec<BasicBlock> {
        self.blocks
            .iter()
            .filter(|block| block.contains(address))
            .copied()
            .collect()
    }

    fn define_symbol(
        &mut self,
        address: u64,
        name: &str,
        kind: TargetKind,
        namespace: &str,
    ) -> Result<(), WorkspaceError> {
        if !self.is_addressable(address) {
            return Err(WorkspaceError::OutOfRange(address));
        }
        self.symbols.insert(
            address,
            WorkspaceSymbol {
                address,
                name: name.to_string(),
                kind,
                namespace: Some(namespace.to_string()),
                source: SymbolSource::User,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_found_by_containment() {
        let mut ws = MemoryWorkspace::new();
        ws.add_block(BasicBlock { start: 0x1010, end: 0x1020, function_start: 0x1000 });
        ws.add_block(BasicBlock { start: 0x1000, end: 0x1010, function_start: 0x1000 });

        assert_eq!(ws.blocks()[0].start, 0x1000);
        assert_eq!(ws.basic_blocks_at(0x1014)[0].start, 0x1010);
        assert_eq!(ws.basic_blocks_at(0x1000)[0].owning_function_start(), 0x1000);
        assert!(ws.basic_blocks_at(0x1020).is_empty());
    }

    #[test]
    fn defined_symbols_are_user_symbols() {
        let mut ws = MemoryWorkspace::new();
        ws.add_symbol(0x2000_0000, "stack", TargetKind::Data);
        ws.define_symbol(0x0800_0100, "keil_main", TargetKind::Function, "keil_map")
            .unwrap();

        let sym = ws.symbol_at(0x0800_0100).unwrap();
        assert_eq!(sym.source, SymbolSource::User);
        assert_eq!(sym.namespace.as_deref(), Some("keil_map"));
        assert_eq!(ws.symbol_at(0x2000_0000).unwrap().source, SymbolSource::Analysis);
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn regions_reject_foreign_addresses() {
        let mut ws = MemoryWorkspace::new();
        ws.add_region(0x0800_0000, 0x0801_0000);
        ws.add_region(0x2000_0100, 0x2000_0200);
        assert!(ws.define_symbol(0x2000_0100, "buf", TargetKind::Data, "keil_map").is_ok());
        assert_eq!(
            ws.define_symbol(0x2000_0000, "ram", TargetKind::Data, "keil_map"),
            Err(WorkspaceError::OutOfRange(0x2000_0000))
        );
        assert_eq!(ws.len(), 1);
    }
}
