//! Source mapping: instruction index → script source location.
//!
//! Each entry marks the first instruction emitted for a statement or call;
//! it covers every following instruction up to the next entry. The
//! interpreter uses this to attach a line and column to runtime faults, and
//! hosts receive it with the compile result.

use blockplay_types::Span;
use serde::Serialize;

/// A complete source map for a compiled script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceMap {
    pub entries: Vec<SourceMapEntry>,
}

/// One instruction index mapped to its originating source region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMapEntry {
    /// First instruction covered by this entry.
    pub instr: u32,
    /// Source span (1-based line/column).
    pub span: Span,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Push a new entry. Entries must be pushed in instruction order; an
    /// entry at the same index as the previous one replaces it.
    pub fn push(&mut self, instr: u32, span: Span) {
        match self.entries.last_mut() {
            Some(last) if last.instr == instr => last.span = span,
            _ => self.entries.push(SourceMapEntry { instr, span }),
        }
    }

    /// Span of the instruction at `pc`.
    pub fn lookup(&self, pc: u32) -> Option<Span> {
        let idx = self.entries.partition_point(|e| e.instr <= pc);
        idx.checked_sub(1).map(|i| self.entries[i].span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_covering_entry() {
        let mut sm = SourceMap::new();
        sm.push(0, Span::new(1, 1, 1, 10));
        sm.push(4, Span::new(2, 1, 2, 8));
        sm.push(9, Span::new(3, 3, 3, 20));

        assert_eq!(sm.lookup(0).map(|s| s.start_line), Some(1));
        assert_eq!(sm.lookup(3).map(|s| s.start_line), Some(1));
        assert_eq!(sm.lookup(4).map(|s| s.start_line), Some(2));
        assert_eq!(sm.lookup(100).map(|s| s.start_line), Some(3));
    }

    #[test]
    fn lookup_before_first_entry() {
        let mut sm = SourceMap::new();
        sm.push(2, Span::new(1, 1, 1, 1));
        assert_eq!(sm.lookup(1), None);
    }

    #[test]
    fn same_index_replaces() {
        let mut sm = SourceMap::new();
        sm.push(0, Span::new(1, 1, 1, 1));
        sm.push(0, Span::new(5, 1, 5, 1));
        assert_eq!(sm.entries.len(), 1);
        assert_eq!(sm.lookup(0).map(|s| s.start_line), Some(5));
    }

    #[test]
    fn json_uses_editor_field_names() {
        let mut sm = SourceMap::new();
        sm.push(3, Span::new(2, 4, 2, 9));
        let json = serde_json::to_value(&sm).unwrap();
        assert_eq!(json["entries"][0]["instr"], 3);
        assert_eq!(json["entries"][0]["span"]["line"], 2);
        assert_eq!(json["entries"][0]["span"]["column"], 4);
    }
}
