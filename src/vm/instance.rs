use super::ctl::{Flow, Instruction};
use super::io::Io;
use super::mem::{Buffer, CallStack};
use super::reg::RegFile;
use super::types::{Fault, LoadError};
use super::alu;
use crate::spec::defs::inst::{Opcode, MAX_OPERANDS};
use crate::spec::types::hw::*;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted(Fault),
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Running => write!(f, "Running"),
            State::Halted => write!(f, "Halted"),
            State::Faulted(_) => write!(f, "Faulted"),
        }
    }
}

pub struct Instance<'a> {
    state: State,
    cycles: u64,
    real_ns_elapsed: u128,

    reg: RegFile,
    mem: Buffer,
    cst: CallStack,
    io: Io<'a>,
}

/// The traceback printed when a program faults.
impl<'a> Display for Instance<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Traceback:")?;
        writeln!(f, "\t---Registers---")?;
        write!(f, "{}", self.reg)?;

        let csp = self.reg.get(Register::CSP);
        writeln!(f, "\t---Callstack---")?;
        writeln!(f, "\tAddress\tValue")?;
        for (idx, ret) in self.cst.frames().iter().enumerate().rev() {
            let marker = if idx as Word == csp { "\t<- CSP" } else { "" };
            writeln!(f, "\t{}\t{}{}", idx, ret, marker)?;
        }

        let cea = self.reg.get(Register::CEA);
        let mar = match Channel::from_word(self.reg.get(Register::MCH)) {
            Some(Channel::MEM) => Some(self.reg.get(Register::MAR)),
            _ => None,
        };
        writeln!(f, "\t---Main Memory---")?;
        writeln!(f, "\tAddress\tValue")?;
        for (idx, w) in self.mem.words().iter().enumerate() {
            let idx = idx as Word;
            writeln!(
                f,
                "\t{}\t{}{}{}",
                idx,
                w,
                if idx == cea { "\t<- CEA" } else { "" },
                if Some(idx) == mar { "\t<- MAR" } else { "" }
            )?;
        }

        Ok(())
    }
}

impl<'a> Instance<'a> {
    /// Loads a serialized image into main memory.
    pub fn new(image: &[Byte], io: Io<'a>) -> Result<Self, LoadError> {
        let (words, rem) = bytes_to_words(image);
        if rem != 0 {
            log::warn!(
                "image ends with a partial word of {} bytes, padding with zeroes",
                rem
            );
        }

        Instance::from_words(words, io)
    }

    pub fn from_words(image: Vec<Word>, io: Io<'a>) -> Result<Self, LoadError> {
        if image.len() > Buffer::LIMIT {
            return Err(LoadError::TooLarge(image.len()));
        }

        log::debug!("loaded image of {} words", image.len());

        Ok(Instance {
            state: State::Running,
            cycles: 0,
            real_ns_elapsed: 0,

            reg: RegFile::new(),
            mem: Buffer::with_contents(Channel::MEM, image),
            cst: CallStack::new(),
            io,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn real_ns_elapsed(&self) -> u128 {
        self.real_ns_elapsed
    }

    pub fn register(&self, r: Register) -> Word {
        self.reg.get(r)
    }

    pub fn set_register(&mut self, r: Register, val: Word) {
        self.reg.set(r, val)
    }

    pub fn main_memory(&self) -> &[Word] {
        self.mem.words()
    }

    pub fn call_stack(&self) -> &[Word] {
        self.cst.frames()
    }

    /// The instruction at CEA, if it can be fetched.
    pub fn fetch(&self) -> Result<Instruction, Fault> {
        let cea = self.reg.get(Register::CEA);
        let word = self
            .mem
            .peek(cea)
            .ok_or(Fault::ExecutionOutOfBounds(cea))?;
        let op = Opcode::from_word(word).ok_or(Fault::UnknownOpcode(word))?;

        let mut operands = [0; MAX_OPERANDS];
        for (i, slot) in operands.iter_mut().enumerate().take(op.operands()) {
            *slot = self
                .mem
                .peek(cea.wrapping_add(1 + i as Word))
                .ok_or(Fault::TruncatedInstruction(cea))?;
        }

        Ok(Instruction::decode(op, &operands[..op.operands()]))
    }

    fn store(&mut self) -> Result<(), Fault> {
        let (mar, mdr) = (self.reg.get(Register::MAR), self.reg.get(Register::MDR));

        match self.channel()? {
            Channel::MEM => self.mem.write(mar, mdr),
            Channel::CST => self.cst.buffer_mut().write(mar, mdr),
            ch => self.io.store(ch, mar, mdr),
        }
    }

    fn load(&mut self) -> Result<(), Fault> {
        let (mar, mdr) = (self.reg.get(Register::MAR), self.reg.get(Register::MDR));

        let val = match self.channel()? {
            Channel::MEM => self.mem.read(mar)?,
            Channel::CST => self.cst.buffer_mut().read(mar)?,
            ch => self.io.load(ch, mar, mdr)?,
        };
        self.reg.set(Register::MDR, val);

        Ok(())
    }

    fn channel(&self) -> Result<Channel, Fault> {
        let mch = self.reg.get(Register::MCH);
        Channel::from_word(mch).ok_or(Fault::UnknownChannel(mch))
    }

    fn execute(&mut self, inst: Instruction) -> Result<Flow, Fault> {
        let acc = self.reg.get(Register::ACC);

        match inst {
            Instruction::Place { value, reg } => self.reg.set(RegFile::index(reg)?, value),
            Instruction::Move { src, dst } => {
                let val = self.reg.get(RegFile::index(src)?);
                self.reg.set(RegFile::index(dst)?, val);
            }
            Instruction::Store => self.store()?,
            Instruction::Load => self.load()?,

            Instruction::Jump(target) => return Ok(Flow::Jump(target)),
            Instruction::JumpIfSet(target) if acc != 0 => return Ok(Flow::Jump(target)),
            Instruction::JumpIfClear(target) if acc == 0 => return Ok(Flow::Jump(target)),
            Instruction::JumpIfSet(_) | Instruction::JumpIfClear(_) => (),

            Instruction::Alu(op) => {
                let dat = self.reg.get(Register::DAT);
                self.reg.set(Register::ACC, alu::eval(op, acc, dat)?);
            }

            Instruction::Call(target) => {
                let idx = self.cst.push(self.reg.get(Register::CEA))?;
                self.reg.set(Register::CSP, idx);
                return Ok(Flow::Jump(target));
            }
            Instruction::Return => {
                let csp = self.reg.get(Register::CSP);
                let ret = self.cst.pop_at(csp)?;
                self.reg.set(Register::CSP, csp.wrapping_sub(1));
                // Resume after the `cl` and its operand.
                let width = Instruction::Call(0).width();
                return Ok(Flow::Jump(ret.wrapping_add(width)));
            }

            Instruction::Finish => (),
        }

        Ok(Flow::Next)
    }

    fn cycle(&mut self) -> Result<State, Fault> {
        let inst = self.fetch()?;
        if inst.opcode().is_terminal() {
            return Ok(State::Halted);
        }

        log::trace!("{:#06X}: {}", self.reg.get(Register::CEA), inst);

        let cea = match self.execute(inst)? {
            Flow::Next => self.reg.get(Register::CEA).wrapping_add(inst.width()),
            Flow::Jump(target) => target,
        };
        self.reg.set(Register::CEA, cea);

        Ok(State::Running)
    }

    /// Executes a single instruction. Does nothing unless running.
    pub fn step(&mut self) -> &State {
        if !self.is_running() {
            return &self.state;
        }

        self.cycles += 1;
        self.state = self.cycle().unwrap_or_else(State::Faulted);

        if !self.is_running() {
            if let Err(fault) = self.io.flush() {
                log::warn!("could not flush output on stop: {}", fault);
            }
        }

        &self.state
    }

    /// Runs until the program halts or faults, or for at most `max_cycles`.
    pub fn run(&mut self, max_cycles: Option<u64>) -> &State {
        let then = std::time::Instant::now();

        let mut cycles = 0;
        while self.is_running() && max_cycles.map_or(true, |max| cycles < max) {
            self.step();
            cycles += 1;
        }

        self.real_ns_elapsed += then.elapsed().as_nanos();
        &self.state
    }
}
