use super::phases::types::LabelName;
use crate::spec::types::hw::{Channel, Register, Word};
use strum::IntoEnumIterator;

/// Identifier to meaning, either an address or a value.
///
/// Definitions are only ever appended; a later definition of a name shadows
/// earlier ones (including the architecture defaults) rather than replacing them.
#[derive(Debug, Clone)]
pub struct LabelTable {
    entries: Vec<(LabelName, Word)>,
}

impl Default for LabelTable {
    fn default() -> Self {
        LabelTable::with_defaults()
    }
}

impl LabelTable {
    pub fn empty() -> Self {
        LabelTable {
            entries: Vec::new(),
        }
    }

    /// The architecture's memory channel and register names.
    pub fn with_defaults() -> Self {
        let mut table = LabelTable::empty();
        for ch in Channel::iter() {
            table.define(ch.label(), ch as Word);
        }
        for reg in Register::iter() {
            table.define(reg.label(), reg as Word);
        }
        table
    }

    pub fn define(&mut self, name: impl Into<LabelName>, meaning: Word) {
        self.entries.push((name.into(), meaning));
    }

    pub fn lookup(&self, name: &str) -> Option<Word> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, meaning)| *meaning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Word)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), *m))
    }
}

pub fn is_legal_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
