use crate::spec::types::hw::*;
use std::fmt::Display;

/// Why a running machine stopped without reaching `fi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    UnknownOpcode(Word),
    UnknownRegister(Word),
    UnknownChannel(Word),
    CallStackUnderflow,
    ChannelExhausted(Channel, Word),
    DivisionByZero,
    ExecutionOutOfBounds(Word),
    TruncatedInstruction(Word),
    Io(Channel, String),
}

impl Fault {
    pub fn is_allocation_failure(&self) -> bool {
        match self {
            Fault::ChannelExhausted(..) => true,
            _ => false,
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::UnknownOpcode(w) => write!(f, "Encountered unknown instruction '{}'", w),
            Fault::UnknownRegister(w) => write!(f, "Attempted to access unknown register '{}'", w),
            Fault::UnknownChannel(w) => write!(f, "Attempted to access unknown MCH '{}'", w),
            Fault::CallStackUnderflow => write!(f, "Callstack underflow"),
            Fault::ChannelExhausted(ch, addr) => write!(
                f,
                "Could not grow channel {} to hold address {}",
                ch, addr
            ),
            Fault::DivisionByZero => write!(f, "Division by zero"),
            Fault::ExecutionOutOfBounds(addr) => write!(
                f,
                "Execution ran past the end of main memory at address {}",
                addr
            ),
            Fault::TruncatedInstruction(addr) => write!(
                f,
                "Instruction at address {} is missing operands at the end of main memory",
                addr
            ),
            Fault::Io(ch, msg) => write!(f, "I/O failure on channel {}: {}", ch, msg),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadError {
    TooLarge(usize),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::TooLarge(words) => write!(
                f,
                "Image of {} words does not fit in main memory",
                words
            ),
        }
    }
}

impl std::error::Error for Fault {}
impl std::error::Error for LoadError {}
