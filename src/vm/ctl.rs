use super::alu;
use crate::spec::defs::inst::Opcode;
use crate::spec::types::hw::*;
use std::fmt::Display;

/// A fetched instruction, with its operand words still uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Place { value: Word, reg: Word },
    Move { src: Word, dst: Word },
    Store,
    Load,
    Jump(Word),
    JumpIfSet(Word),
    JumpIfClear(Word),
    Alu(Opcode),
    Call(Word),
    Return,
    Finish,
}

/// Where CEA goes once an instruction has executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Past the instruction and its operands, counting from the value CEA
    /// holds after execution.
    Next,
    Jump(Word),
}

impl Instruction {
    /// `operands` must hold exactly `op.operands()` words.
    pub fn decode(op: Opcode, operands: &[Word]) -> Instruction {
        let arg = |i: usize| operands.get(i).copied().unwrap_or(0);

        match op {
            Opcode::Place => Instruction::Place {
                value: arg(0),
                reg: arg(1),
            },
            Opcode::Move => Instruction::Move {
                src: arg(0),
                dst: arg(1),
            },
            Opcode::Store => Instruction::Store,
            Opcode::Load => Instruction::Load,
            Opcode::Jump => Instruction::Jump(arg(0)),
            Opcode::JumpIfSet => Instruction::JumpIfSet(arg(0)),
            Opcode::JumpIfClear => Instruction::JumpIfClear(arg(0)),
            Opcode::Call => Instruction::Call(arg(0)),
            Opcode::Return => Instruction::Return,
            Opcode::Finish => Instruction::Finish,
            op => {
                debug_assert!(alu::is_alu_op(op));
                Instruction::Alu(op)
            }
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Place { .. } => Opcode::Place,
            Instruction::Move { .. } => Opcode::Move,
            Instruction::Store => Opcode::Store,
            Instruction::Load => Opcode::Load,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfSet(_) => Opcode::JumpIfSet,
            Instruction::JumpIfClear(_) => Opcode::JumpIfClear,
            Instruction::Alu(op) => *op,
            Instruction::Call(_) => Opcode::Call,
            Instruction::Return => Opcode::Return,
            Instruction::Finish => Opcode::Finish,
        }
    }

    /// Words occupied in memory, including the opcode.
    pub fn width(&self) -> Word {
        1 + self.opcode().operands() as Word
    }
}

fn reg_name(w: Word) -> String {
    Register::from_word(w).map_or_else(|| format!("?{}", w), Register::label)
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode())?;
        match self {
            Instruction::Place { value, reg } => write!(f, " {:#X} {}", value, reg_name(*reg)),
            Instruction::Move { src, dst } => write!(f, " {} {}", reg_name(*src), reg_name(*dst)),
            Instruction::Jump(target)
            | Instruction::JumpIfSet(target)
            | Instruction::JumpIfClear(target)
            | Instruction::Call(target) => write!(f, " {:#X}", target),
            _ => Ok(()),
        }
    }
}
