//! Symbol data model.
//!
//! Records as they come out of the map file (`ParsedSymbol`) and the
//! workspace-ready form produced by the resolver (`ResolvedSymbol`).

use std::fmt;

/// Symbol classification as written in the map file's `Type` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Number,
    ThumbCode,
    /// Structural entry (input section marker). Never imported.
    Section,
    Data,
    /// A type token outside the known set, kept so the resolver can report it.
    Other(String),
}

impl SymbolKind {
    /// Map a (possibly fused) type token to a kind.
    pub fn from_token(token: &str) -> Self {
        match token {
            "Number" => SymbolKind::Number,
            "Thumb Code" => SymbolKind::ThumbCode,
            "Section" => SymbolKind::Section,
            "Data" => SymbolKind::Data,
            other => SymbolKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SymbolKind::Number => "Number",
            SymbolKind::ThumbCode => "Thumb Code",
            SymbolKind::Section => "Section",
            SymbolKind::Data => "Data",
            SymbolKind::Other(token) => token,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The optional `ABSOLUTE` marker at the end of an entry line.
///
/// A missing trailing column is `Unknown`, not `No`: the map format does not
/// say whether absence means "relocatable" or "not recorded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Absolute {
    #[default]
    Unknown,
    Yes,
    No,
}

impl Absolute {
    pub const MARKER: &'static str = "ABSOLUTE";

    /// Derive the flag from the tokens following the size column.
    ///
    /// Every trailing token is scanned, including tokens after the object column.
    pub fn from_trailing<'a>(tokens: impl Iterator<Item = &'a str>) -> Self {
        let mut seen_any = false;
        for token in tokens {
            if token.eq_ignore_ascii_case(Self::MARKER) {
                return Absolute::Yes;
            }
            seen_any = true;
        }
        if seen_any {
            Absolute::No
        } else {
            Absolute::Unknown
        }
    }
}

/// Which symbol table block of the map file an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Local,
    Global,
}

impl Section {
    /// Literal marker that opens the block in the map file.
    pub fn marker(self) -> &'static str {
        match self {
            Section::Local => "Local Symbols",
            Section::Global => "Global Symbols",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// One entry of the map file's symbol table.
///
/// `name` is only unique within its defining object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSymbol {
    pub name: String,
    pub address: u64,
    pub kind: SymbolKind,
    /// Size in bytes. Zero is accepted here and filtered by the resolver.
    pub size: u64,
    pub is_absolute: Absolute,
    pub is_local: bool,
}

impl ParsedSymbol {
    pub fn section(&self) -> Section {
        if self.is_local {
            Section::Local
        } else {
            Section::Global
        }
    }
}

impl fmt::Display for ParsedSymbol {
    /// Canonical entry line: `name 0xADDR type size [ABSOLUTE]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 0x{:08x} {} {}",
            self.name, self.address, self.kind, self.size
        )?;
        match self.is_absolute {
            Absolute::Unknown => Ok(()),
            Absolute::Yes => write!(f, " {}", Absolute::MARKER),
            // Any non-marker trailing token reads back as `No`.
            Absolute::No => f.write_str(" -"),
        }
    }
}

/// Kind of symbol the workspace will define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Function,
    Data,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Function => f.write_str("function"),
            TargetKind::Data => f.write_str("data"),
        }
    }
}

/// A map-file record accepted for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    /// Address to define. Starts as the map-file value; prologue realignment may move it.
    pub address: u64,
    /// The map-file value, kept for reporting.
    pub map_address: u64,
    pub display_name: String,
    pub namespace: String,
    pub target_kind: TargetKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tokens_map_to_variants() {
        assert_eq!(SymbolKind::from_token("Thumb Code"), SymbolKind::ThumbCode);
        assert_eq!(SymbolKind::from_token("Data"), SymbolKind::Data);
        assert_eq!(
            SymbolKind::from_token("ARM"),
            SymbolKind::Other("ARM".to_string())
        );
        assert_eq!(SymbolKind::ThumbCode.to_string(), "Thumb Code");
    }

    #[test]
    fn absolute_flag_is_tri_state() {
        assert_eq!(Absolute::from_trailing(std::iter::empty()), Absolute::Unknown);
        assert_eq!(Absolute::from_trailing(["main.o"].into_iter()), Absolute::No);
        assert_eq!(
            Absolute::from_trailing(["main.o", "ABSOLUTE"].into_iter()),
            Absolute::Yes
        );
        assert_eq!(Absolute::from_trailing(["a.o", "x.o", "absolute"].into_iter()), Absolute::Yes);
    }

    #[test]
    fn display_writes_canonical_line() {
        let sym = ParsedSymbol {
            name: "HAL_Init".to_string(),
            address: 0x0800_0200,
            kind: SymbolKind::ThumbCode,
            size: 20,
            is_absolute: Absolute::Unknown,
            is_local: false,
        };
        assert_eq!(sym.to_string(), "HAL_Init 0x08000200 Thumb Code 20");
        assert_eq!(sym.section(), Section::Global);
    }
}
