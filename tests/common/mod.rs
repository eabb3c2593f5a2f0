#![allow(dead_code)]

use fvm::assembler;
use fvm::spec::types::hw::{Register, Word};
use fvm::vm::{Instance, Io, State};
use std::io::Cursor;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Snapshot {
    pub state: State,
    pub registers: Vec<Word>,
    pub call_stack: Vec<Word>,
    pub output: Vec<u8>,
    pub disk: Vec<u8>,
    pub dump: String,
}

impl Snapshot {
    pub fn reg(&self, r: Register) -> Word {
        self.registers[r as usize]
    }
}

pub fn run_image(image: Vec<Word>, input: &[u8], disk: Vec<u8>) -> Snapshot {
    let mut input = input;
    let mut output: Vec<u8> = Vec::new();
    let mut disk = Cursor::new(disk);

    let (state, registers, call_stack, dump) = {
        let io = Io::new(&mut input, &mut output, &mut disk);
        let mut vm = Instance::from_words(image, io).unwrap();
        vm.run(Some(1_000_000));

        let registers = (0..Register::COUNT as Word)
            .map(|w| vm.register(Register::from_word(w).unwrap()))
            .collect();
        (
            vm.state().clone(),
            registers,
            vm.call_stack().to_vec(),
            vm.to_string(),
        )
    };

    Snapshot {
        state,
        registers,
        call_stack,
        output,
        disk: disk.into_inner(),
        dump,
    }
}

pub fn assemble(src: &str) -> Vec<Word> {
    assembler::assemble(src).unwrap_or_else(|errs| panic!("{}", errs))
}

pub fn run_source(src: &str) -> Snapshot {
    run_image(assemble(src), b"", Vec::new())
}

/// A fresh scratch directory for tests which go through the filesystem.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fvm-test-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
