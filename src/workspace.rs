//! Workspace abstraction.
//!
//! The resolver never talks to an analysis backend directly. It goes through
//! the `Workspace` trait, which exposes the three things it needs: whether an
//! address is already named, which basic blocks cover an address, and a way
//! to define a new user symbol.

use crate::error::WorkspaceError;
use crate::symbol::TargetKind;

pub mod memory;

pub use memory::MemoryWorkspace;

/// Where a workspace symbol came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSource {
    /// Found by the workspace's own analysis or loaded with the image.
    Analysis,
    /// Defined explicitly, e.g. by a map import. Persisted as user state.
    User,
}

/// A named symbol already present in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSymbol {
    pub address: u64,
    pub name: String,
    pub kind: TargetKind,
    pub namespace: Option<String>,
    pub source: SymbolSource,
}

/// A disassembled basic block, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicBlock {
    pub start: u64,
    pub end: u64,
    /// Entry address of the function the block belongs to.
    pub function_start: u64,
}

impl BasicBlock {
    pub fn contains(&self, address: u64) -> bool {
        (self.start..self.end).contains(&address)
    }

    pub fn owning_function_start(&self) -> u64 {
        self.function_start
    }
}

/// Host capabilities consumed by the resolver.
#[cfg_attr(test, mockall::automock)]
pub trait Workspace {
    /// The symbol defined at exactly `address`, if any.
    fn symbol_at(&self, address: u64) -> Option<WorkspaceSymbol>;

    /// Basic blocks covering `address`, in the host's preferred order.
    fn basic_blocks_at(&self, address: u64) -> Vec<BasicBlock>;

    /// Define a user symbol at `address` under `namespace`.
    fn define_symbol(
        &mut self,
        address: u64,
        name: &str,
        kind: TargetKind,
        namespace: &str,
    ) -> Result<(), WorkspaceError>;
}
