use super::types::Fault;
use crate::spec::defs::inst::Opcode;
use crate::spec::types::hw::*;

enum OpFunc {
    Unary(fn(Word) -> Word),
    Binary(fn(Word, Word) -> Word),
    Checked(fn(Word, Word) -> Option<Word>),
    Compare(fn(&Word, &Word) -> bool),
}

impl OpFunc {
    fn eval(&self, acc: Word, dat: Word) -> Result<Word, Fault> {
        match self {
            OpFunc::Unary(f) => Ok(f(acc)),
            OpFunc::Binary(f) => Ok(f(acc, dat)),
            OpFunc::Checked(f) => f(acc, dat).ok_or(Fault::DivisionByZero),
            OpFunc::Compare(f) => Ok(f(&acc, &dat) as Word),
        }
    }
}

fn shl(a: Word, b: Word) -> Word {
    if b >= WORD_WIDTH as Word {
        0
    } else {
        a << b
    }
}

fn shr(a: Word, b: Word) -> Word {
    if b >= WORD_WIDTH as Word {
        0
    } else {
        a >> b
    }
}

fn func_of(op: Opcode) -> Option<OpFunc> {
    Some(match op {
        Opcode::Add => OpFunc::Binary(Word::wrapping_add),
        Opcode::Sub => OpFunc::Binary(Word::wrapping_sub),
        Opcode::Not => OpFunc::Unary(|a| !a),
        Opcode::Inc => OpFunc::Unary(|a| a.wrapping_add(1)),
        Opcode::Dec => OpFunc::Unary(|a| a.wrapping_sub(1)),
        Opcode::Mul => OpFunc::Binary(Word::wrapping_mul),
        Opcode::Div => OpFunc::Checked(Word::checked_div),

        Opcode::And => OpFunc::Binary(|a, b| a & b),
        Opcode::Or => OpFunc::Binary(|a, b| a | b),
        Opcode::Xor => OpFunc::Binary(|a, b| a ^ b),
        Opcode::Shl => OpFunc::Binary(shl),
        Opcode::Shr => OpFunc::Binary(shr),

        Opcode::Greater => OpFunc::Compare(Word::gt),
        Opcode::Less => OpFunc::Compare(Word::lt),
        Opcode::GreaterEq => OpFunc::Compare(Word::ge),
        Opcode::LessEq => OpFunc::Compare(Word::le),
        Opcode::Equal => OpFunc::Compare(Word::eq),
        Opcode::NotEqual => OpFunc::Compare(Word::ne),

        _ => return None,
    })
}

pub fn is_alu_op(op: Opcode) -> bool {
    func_of(op).is_some()
}

/// The new value of ACC after `op`, given ACC and DAT.
pub fn eval(op: Opcode, acc: Word, dat: Word) -> Result<Word, Fault> {
    match func_of(op) {
        Some(func) => func.eval(acc, dat),
        None => Ok(acc),
    }
}
