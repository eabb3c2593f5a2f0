use crate::spec::types::hw::{Byte, Register};
use crate::vm::{Instance, Io, LoadError, State};
use ansi_term::Color::Red;
use derive_more::Constructor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    /// Print every instruction to stderr before it executes.
    Disassemble,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub max_cycles: Option<u64>,
    pub verbosity: Verbosity,

    pub print_marginals: bool,
    pub dump_on_fault: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_cycles: None,
            verbosity: Verbosity::Silent,
            print_marginals: false,
            dump_on_fault: true,
        }
    }
}

#[derive(Debug, Constructor)]
pub struct Summary {
    pub state: State,
    pub timeout: bool,
    pub total_cycles: u64,
    pub real_ns_elapsed: u128,
}

impl Summary {
    pub fn to_effective_freq_megahertz(&self) -> f64 {
        ((self.total_cycles as f64) * 1000.0) / (self.real_ns_elapsed as f64)
    }

    pub fn exit_code(&self) -> i32 {
        match &self.state {
            State::Halted => 0,
            State::Faulted(fault) if fault.is_allocation_failure() => 3,
            State::Faulted(_) | State::Running => 4,
        }
    }
}

fn within_limit(vm: &Instance, max_cycles: Option<u64>) -> bool {
    max_cycles.map_or(true, |max| vm.cycles() < max)
}

/// Loads `image` and runs it to completion (or to `cfg.max_cycles`).
pub fn execute(cfg: &Config, image: &[Byte], io: Io) -> Result<Summary, LoadError> {
    let mut vm = Instance::new(image, io)?;

    if cfg.print_marginals {
        eprintln!("CPU Start");
    }

    match cfg.verbosity {
        Verbosity::Silent => {
            vm.run(cfg.max_cycles);
        }
        Verbosity::Disassemble => {
            while vm.is_running() && within_limit(&vm, cfg.max_cycles) {
                if let Ok(inst) = vm.fetch() {
                    eprintln!("{:#06X}: {}", vm.register(Register::CEA), inst);
                }
                vm.run(Some(1));
            }
        }
    }

    if let State::Faulted(fault) = vm.state() {
        if cfg.dump_on_fault {
            eprintln!("{} {}", Red.bold().paint("fvmr ->"), fault);
            eprint!("{}", vm);
        }
    }

    let summary = Summary::new(
        vm.state().clone(),
        vm.is_running(),
        vm.cycles(),
        vm.real_ns_elapsed(),
    );

    if cfg.print_marginals {
        eprintln!(
            "CPU Stop (in state {}{}), {} instructions executed taking {}ms, @{:.2}MHz",
            summary.state,
            if summary.timeout { "/Timeout" } else { "" },
            summary.total_cycles,
            (summary.real_ns_elapsed / 1000 / 1000),
            summary.to_effective_freq_megahertz()
        );
    }

    Ok(summary)
}
