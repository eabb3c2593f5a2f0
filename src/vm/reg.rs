use super::types::Fault;
use crate::spec::types::hw::*;
use enum_map::EnumMap;
use std::fmt::Display;
use strum::IntoEnumIterator;

pub struct RegFile {
    regs: EnumMap<Register, Word>,
}

impl Display for RegFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\tNumber\tName{:27}\tCurrent Value", "")?;
        for r in Register::iter() {
            let name = format!("{} ({})", r, r.description());
            writeln!(f, "\t{}\t{:31}\t{}", r as usize, name, self.regs[r])?;
        }

        Ok(())
    }
}

impl Default for RegFile {
    fn default() -> Self {
        RegFile::new()
    }
}

impl RegFile {
    pub fn new() -> Self {
        let mut regs = EnumMap::new();
        regs[Register::CSP] = CALL_STACK_EMPTY;
        RegFile { regs }
    }

    pub fn get(&self, r: Register) -> Word {
        self.regs[r]
    }

    pub fn set(&mut self, r: Register, val: Word) {
        self.regs[r] = val;
    }

    /// Resolves a register index taken from an instruction operand.
    pub fn index(w: Word) -> Result<Register, Fault> {
        Register::from_word(w).ok_or(Fault::UnknownRegister(w))
    }
}
