use crate::spec::types::hw::Word;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use once_cell::sync::Lazy;
use static_assertions::const_assert_eq;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

pub const INSTRUCTION_COUNT: usize = 28;
pub const MAX_OPERANDS: usize = 2;

/// The instruction table. The discriminant of each variant is the word the
/// assembler emits for its mnemonic, and the word the VM dispatches on.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
pub enum Opcode {
    #[strum(to_string = "pl")]
    Place = 0,
    #[strum(to_string = "mv")]
    Move = 1,

    #[strum(to_string = "st")]
    Store = 2,
    #[strum(to_string = "ld")]
    Load = 3,

    #[strum(to_string = "jm")]
    Jump = 4,
    #[strum(to_string = "js")]
    JumpIfSet = 5,
    #[strum(to_string = "jc")]
    JumpIfClear = 6,

    #[strum(to_string = "a+")]
    Add = 7,
    #[strum(to_string = "a-")]
    Sub = 8,
    #[strum(to_string = "a!")]
    Not = 9,
    #[strum(to_string = "ai")]
    Inc = 10,
    #[strum(to_string = "ad")]
    Dec = 11,
    #[strum(to_string = "a*")]
    Mul = 12,
    #[strum(to_string = "a/")]
    Div = 13,

    #[strum(to_string = "a&")]
    And = 14,
    #[strum(to_string = "a|")]
    Or = 15,
    #[strum(to_string = "a^")]
    Xor = 16,
    #[strum(to_string = "al")]
    Shl = 17,
    #[strum(to_string = "ar")]
    Shr = 18,

    #[strum(to_string = "gt")]
    Greater = 19,
    #[strum(to_string = "lt")]
    Less = 20,
    #[strum(to_string = "ge")]
    GreaterEq = 21,
    #[strum(to_string = "le")]
    LessEq = 22,
    #[strum(to_string = "eq")]
    Equal = 23,
    #[strum(to_string = "ne")]
    NotEqual = 24,

    #[strum(to_string = "cl")]
    Call = 25,
    #[strum(to_string = "rt")]
    Return = 26,

    // Never dispatched: the VM halts on reaching it.
    #[strum(to_string = "fi")]
    Finish = 27,
}

const_assert_eq!(Opcode::Finish as usize + 1, INSTRUCTION_COUNT);

static MNEMONICS: Lazy<HashMap<String, Opcode>> =
    Lazy::new(|| Opcode::iter().map(|op| (op.to_string(), op)).collect());

impl Opcode {
    pub fn operands(self) -> usize {
        match self {
            Opcode::Place | Opcode::Move => 2,
            Opcode::Jump | Opcode::JumpIfSet | Opcode::JumpIfClear | Opcode::Call => 1,
            _ => 0,
        }
    }

    /// Mnemonics are case sensitive.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        MNEMONICS.get(mnemonic).copied()
    }

    pub fn from_word(w: Word) -> Option<Opcode> {
        Opcode::from_u64(w)
    }

    pub fn to_word(self) -> Word {
        self as Word
    }

    pub fn is_terminal(self) -> bool {
        self == Opcode::Finish
    }
}
