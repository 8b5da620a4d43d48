//! Linker map parser.
//!
//! Scans the text of a Keil-style map file for the `Local Symbols` and
//! `Global Symbols` blocks and turns their entry lines into `ParsedSymbol`s.
//! A block is:
//!
//! ```text
//! Local Symbols
//!
//!     Symbol Name        Value       Ov Type        Size  Object(Section)
//!
//!     main               0x08000100   Thumb Code    16  main.o(.text)
//!     ...
//! <blank line>
//! ```
//!
//! Everything outside those blocks is skipped. A bad entry line is logged and
//! dropped; only a block without its column header aborts the parse.

use tracing::{debug, info, warn};

use crate::error::{EntryError, MapError};
use crate::symbol::{Absolute, ParsedSymbol, Section, SymbolKind};
use crate::utils::context_window;

/// Lines of raw text logged on each side of a malformed entry.
pub const CONTEXT_LINES: usize = 2;

const HEADER_MARKER: &str = "Symbol Name";
const WEAK_PLACEHOLDER: &str = "-";

/// Outcome of a well-formed entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Symbol(ParsedSymbol),
    /// `name - Undefined Weak Reference`: no address to import.
    WeakReference(String),
}

/// Parse one entry line of the given block.
///
/// Shape: `name hex-address type size [trailing...]`, where `type` may be the
/// two tokens `Thumb Code`. Tokens are whitespace-split, so an object path
/// containing spaces spills into extra trailing tokens.
pub fn parse_entry(line: &str, section: Section) -> Result<Entry, EntryError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let name = *tokens.first().ok_or(EntryError::MissingField("name"))?;
    let value = *tokens.get(1).ok_or(EntryError::MissingField("address"))?;

    if value == WEAK_PLACEHOLDER {
        return Ok(Entry::WeakReference(name.to_string()));
    }

    let type_token = *tokens.get(2).ok_or(EntryError::MissingField("type"))?;
    let (kind, size_at) = match (type_token, tokens.get(3)) {
        ("Thumb", Some(&"Code")) => (SymbolKind::ThumbCode, 4),
        (token, _) => (SymbolKind::from_token(token), 3),
    };

    let address = parse_hex(value).ok_or_else(|| EntryError::InvalidAddress(value.to_string()))?;
    let size_token = *tokens.get(size_at).ok_or(EntryError::MissingField("size"))?;
    let size = size_token
        .parse::<u64>()
        .map_err(|_| EntryError::InvalidSize(size_token.to_string()))?;

    Ok(Entry::Symbol(ParsedSymbol {
        name: name.to_string(),
        address,
        kind,
        size,
        is_absolute: Absolute::from_trailing(tokens[size_at + 1..].iter().copied()),
        is_local: section == Section::Local,
    }))
}

fn parse_hex(token: &str) -> Option<u64> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u64::from_str_radix(digits, 16).ok()
}

/// Parse a whole map file.
pub fn parse_map(text: &str) -> Result<Vec<ParsedSymbol>, MapError> {
    MapParser::new(text).parse()
}

/// Cursor-based scanner over the map text.
pub struct MapParser<'a> {
    text: &'a str,
    cur: usize,
}

impl<'a> MapParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cur: 0 }
    }

    /// Run the scan to the end of the text, returning entries in file order.
    pub fn parse(mut self) -> Result<Vec<ParsedSymbol>, MapError> {
        let mut symbols = Vec::new();
        while self.cur < self.text.len() {
            self.skip_whitespace();
            if let Some(section) = self.section_marker() {
                self.header(section)?;
                let before = symbols.len();
                self.entries(section, &mut symbols);
                debug!(%section, count = symbols.len() - before, "parsed symbol block");
                continue;
            }
            self.advance();
        }
        Ok(symbols)
    }

    fn rest(&self) -> &'a str {
        &self.text[self.cur..]
    }

    fn advance(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.cur += c.len_utf8();
        }
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.cur += literal.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.cur += rest.len() - rest.trim_start().len();
    }

    /// Consume through the next newline. Returns the line's start offset and
    /// its text without the newline.
    fn next_line(&mut self) -> (usize, &'a str) {
        let start = self.cur;
        let rest = self.rest();
        match rest.find('\n') {
            Some(end) => {
                self.cur += end + 1;
                (start, &rest[..end])
            }
            None => {
                self.cur = self.text.len();
                (start, rest)
            }
        }
    }

    fn section_marker(&mut self) -> Option<Section> {
        [Section::Local, Section::Global]
            .into_iter()
            .find(|section| self.eat(section.marker()))
    }

    fn header(&mut self, section: Section) -> Result<(), MapError> {
        self.skip_whitespace();
        if !self.eat(HEADER_MARKER) {
            return Err(MapError::HeaderNotFound {
                section,
                offset: self.cur,
            });
        }
        self.next_line();
        Ok(())
    }

    fn entries(&mut self, section: Section, out: &mut Vec<ParsedSymbol>) {
        self.skip_whitespace();
        while self.cur < self.text.len() {
            let (start, line) = self.next_line();
            if line.trim().is_empty() {
                break;
            }
            // An empty block runs straight into the next marker.
            let trimmed = line.trim_start();
            if [Section::Local, Section::Global]
                .iter()
                .any(|next| trimmed.starts_with(next.marker()))
            {
                self.cur = start;
                break;
            }
            match parse_entry(line, section) {
                Ok(Entry::Symbol(symbol)) => out.push(symbol),
                Ok(Entry::WeakReference(name)) => {
                    info!(%name, "undefined weak reference, skipping");
                }
                Err(err) => {
                    warn!(
                        %section,
                        offset = start,
                        "skipping entry: {err}\n{}",
                        context_window(self.text, start, CONTEXT_LINES)
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SCENARIO_A: &str = "\
Image Symbol Table

    Local Symbols

    Symbol Name        Value       Ov Type        Size  Object(Section)

    main 0x08000100 Thumb Code 00000010 main.o
    counter 0x20000004 Data 00000004 main.o

    Global Symbols

    Symbol Name        Value       Ov Type        Size  Object(Section)

    HAL_Init 0x08000200 Thumb Code 00000020 hal.o

";

    fn symbol(line: &str, section: Section) -> ParsedSymbol {
        match parse_entry(line, section) {
            Ok(Entry::Symbol(symbol)) => symbol,
            other => panic!("expected a symbol, got {other:?}"),
        }
    }

    #[test]
    fn parses_local_and_global_blocks() {
        let symbols = parse_map(SCENARIO_A).unwrap();
        let summary: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind.clone(), s.is_local))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("main", SymbolKind::ThumbCode, true),
                ("counter", SymbolKind::Data, true),
                ("HAL_Init", SymbolKind::ThumbCode, false),
            ]
        );
        assert_eq!(symbols[0].address, 0x0800_0100);
        assert_eq!(symbols[0].size, 10);
        assert_eq!(symbols[2].size, 20);
    }

    #[test_case("main 0x08000100 Thumb Code 16 main.o", SymbolKind::ThumbCode, 16, Absolute::No ; "thumb code fused")]
    #[test_case("tick 0x20000010 Data 4", SymbolKind::Data, 4, Absolute::Unknown ; "no trailing column")]
    #[test_case("main.c 0x00000000 Number 0 main.o ABSOLUTE", SymbolKind::Number, 0, Absolute::Yes ; "absolute marker")]
    #[test_case("RESET 0x08000000 Section 392 startup.o(RESET)", SymbolKind::Section, 392, Absolute::No ; "section entry")]
    fn parses_entry_shapes(line: &str, kind: SymbolKind, size: u64, absolute: Absolute) {
        let sym = symbol(line, Section::Local);
        assert_eq!(sym.kind, kind);
        assert_eq!(sym.size, size);
        assert_eq!(sym.is_absolute, absolute);
    }

    #[test]
    fn unknown_kind_is_carried_through() {
        let sym = symbol("isr 0x08000400 Veneer 8 a.o", Section::Global);
        assert_eq!(sym.kind, SymbolKind::Other("Veneer".to_string()));
        assert!(!sym.is_local);
    }

    #[test]
    fn weak_reference_is_not_a_symbol() {
        assert_eq!(
            parse_entry("__decompress - Undefined Weak Reference", Section::Global),
            Ok(Entry::WeakReference("__decompress".to_string()))
        );
    }

    #[test_case("lonely", EntryError::MissingField("address") ; "name only")]
    #[test_case("foo 0x100", EntryError::MissingField("type") ; "no type")]
    #[test_case("foo 0x100 Data", EntryError::MissingField("size") ; "no size")]
    #[test_case("foo zz Data 4", EntryError::InvalidAddress("zz".into()) ; "bad address")]
    #[test_case("foo 0x100 Data four", EntryError::InvalidSize("four".into()) ; "bad size")]
    #[test_case("fn 0x100 ARM Code 8 a.o", EntryError::InvalidSize("Code".into()) ; "unfused two-token type")]
    fn rejects_malformed_entries(line: &str, expected: EntryError) {
        assert_eq!(parse_entry(line, Section::Local), Err(expected));
    }

    #[test]
    fn malformed_line_does_not_stop_the_block() {
        let text = "Local Symbols\n\nSymbol Name Value Type Size\n\
                    a 0x10 Data 4 a.o\n\
                    broken 0xZZ Data 4 a.o\n\
                    b 0x20 Data 4 b.o\n\n";
        let names: Vec<_> = parse_map(text).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn missing_header_is_fatal() {
        let text = "Global Symbols\n\n    a 0x10 Data 4 a.o\n\n";
        assert_eq!(
            parse_map(text),
            Err(MapError::HeaderNotFound {
                section: Section::Global,
                offset: 20,
            })
        );
    }

    #[test]
    fn repeated_blocks_concatenate_in_file_order() {
        let text = "Global Symbols\nSymbol Name\n g1 0x1 Data 1\n\n\
                    Local Symbols\nSymbol Name\n l1 0x2 Data 1\n\n\
                    Global Symbols\nSymbol Name\n g2 0x3 Data 1\n";
        let symbols = parse_map(text).unwrap();
        let summary: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.is_local))
            .collect();
        assert_eq!(summary, [("g1", false), ("l1", true), ("g2", false)]);
    }

    #[test]
    fn empty_block_does_not_swallow_next_marker() {
        let text = "Local Symbols\n\n    Symbol Name  Value\n\n\
                    Global Symbols\n\n    Symbol Name  Value\n\n    g 0x8 Data 2 g.o\n";
        let symbols = parse_map(text).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "g");
        assert!(!symbols[0].is_local);
    }

    #[test]
    fn text_without_blocks_yields_nothing() {
        assert_eq!(parse_map("Memory Map of the image\n\n  Image Entry point : 0x08000131\n"), Ok(vec![]));
        assert_eq!(parse_map(""), Ok(vec![]));
    }
}
