use derive_more::Display;
use enum_map::Enum;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::convert::TryInto;
use strum_macros::EnumIter;

pub type Byte = u8;
pub type Word = u64;

pub const BYTE_WIDTH: usize = 8;
pub const WORD_WIDTH: usize = 64;
pub const WORD_BYTES: usize = WORD_WIDTH / BYTE_WIDTH;
pub const WORD_MAX: Word = Word::MAX;

/*
    Notes on the image format:

    An image is a flat sequence of `Word`s with no header. Word `i` of the image is
    the word at address `i` of main memory once loaded, and the machine attaches no
    type to it: whether it is an opcode, an operand or data is decided only by where
    CEA happens to point.

    Each word is serialized as 8 little-endian bytes, regardless of host byte order.
*/

/// Returns the decoded words, plus the number of trailing bytes which did
/// not make up a whole word (these are zero-padded into a final word).
pub fn bytes_to_words(bytes: &[Byte]) -> (Vec<Word>, usize) {
    let chunks = bytes.chunks_exact(WORD_BYTES);
    let rem = chunks.remainder();

    let mut words: Vec<Word> = chunks
        .map(|ch| Word::from_le_bytes(ch.try_into().unwrap_or_default()))
        .collect();

    if !rem.is_empty() {
        let mut last = [0; WORD_BYTES];
        last[..rem.len()].copy_from_slice(rem);
        words.push(Word::from_le_bytes(last));
    }

    (words, rem.len())
}

pub fn words_to_bytes(words: &[Word]) -> Vec<Byte> {
    words.iter().flat_map(|w| w.to_le_bytes().to_vec()).collect()
}

pub const fn low_byte(w: Word) -> Byte {
    (w & 0xFF) as Byte
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, Enum, EnumIter)]
pub enum Register {
    MCH,
    MAR,
    MDR,
    ACC,
    DAT,
    CEA,
    CSP,
}

impl Register {
    pub const COUNT: usize = 7;

    pub fn from_word(w: Word) -> Option<Register> {
        Register::from_u64(w)
    }

    pub fn description(self) -> &'static str {
        match self {
            Register::MCH => "Memory Channel",
            Register::MAR => "Memory Address Register",
            Register::MDR => "Memory Data Register",
            Register::ACC => "Accumulator",
            Register::DAT => "Data",
            Register::CEA => "Current Execution Address",
            Register::CSP => "Callstack Pointer",
        }
    }

    pub fn label(self) -> String {
        self.to_string().to_lowercase()
    }
}

/// The value CSP holds while the call stack is empty.
pub const CALL_STACK_EMPTY: Word = WORD_MAX;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromPrimitive, Enum, EnumIter)]
pub enum Channel {
    MEM,
    INP,
    OUT,
    CST,
}

impl Channel {
    pub fn from_word(w: Word) -> Option<Channel> {
        Channel::from_u64(w)
    }

    pub fn label(self) -> String {
        self.to_string().to_lowercase()
    }
}

/// MAR values understood by the INP and OUT channels.
pub mod port {
    use super::Word;

    pub const STDIO: Word = 0;
    pub const STORAGE: Word = 1;
}

/// What INP/OUT loads produce when there is nothing to read.
pub const EOF_WORD: Word = WORD_MAX;
