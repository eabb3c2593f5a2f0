use super::{
    assemble::{self, Outcome},
    assets,
    run::execute::{self, Config, Verbosity},
    suite,
};
use crate::assembler;
use crate::vm::{Io, Storage};
use ansi_term::Color::Red;
use anyhow::Context;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::{fmt::Display, str::FromStr};
use structopt::StructOpt;

#[cfg(windows)]
fn enable_ansi() {
    if ansi_term::enable_ansi_support().is_err() {
        log::warn!("could not enable terminal ANSI support");
    }
}

#[cfg(not(windows))]
fn enable_ansi() {}

/// Installs the logger (default level `warn`, see `RUST_LOG`) and prepares
/// the terminal for coloured output.
pub fn terminal_init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    enable_ansi();
}

#[derive(StructOpt, Debug)]
#[structopt(name = "fvm")]
pub enum CommandRoot {
    Asm(SubcommandAsm),
    Vm(SubcommandVm),
    Run(SubcommandRun),
    Suite(SubcommandSuite),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "fvma")]
pub struct SubcommandAsm {
    #[structopt(name = "in.fa", parse(from_os_str))]
    in_src: PathBuf,

    #[structopt(name = "out.fb", parse(from_os_str))]
    out_bin: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
struct VmOpts {
    #[structopt(long, name = "max-cycles")]
    max_cycles: Option<CycleLimit>,

    /// Print every instruction as it executes.
    #[structopt(short, long)]
    verbose: bool,

    /// Print a summary when execution starts and stops.
    #[structopt(short, long)]
    marginals: bool,
}

impl VmOpts {
    fn to_config(&self) -> Config {
        Config {
            max_cycles: self.max_cycles.unwrap_or_default().into_option(),
            verbosity: if self.verbose {
                Verbosity::Disassemble
            } else {
                Verbosity::Silent
            },
            print_marginals: self.marginals,
            dump_on_fault: true,
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "fvmr")]
pub struct SubcommandVm {
    #[structopt(flatten)]
    vm_opts: VmOpts,

    #[structopt(name = "rom", parse(from_os_str))]
    rom: Option<PathBuf>,

    #[structopt(name = "disk", parse(from_os_str))]
    disk: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandRun {
    #[structopt(flatten)]
    vm_opts: VmOpts,

    #[structopt(name = "in.fa", parse(from_os_str))]
    in_src: PathBuf,

    /// Storage file; a blank in-memory disk is used if omitted.
    #[structopt(name = "disk", parse(from_os_str))]
    disk: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandSuite {
    #[structopt(name = "suite/dir", parse(from_os_str))]
    suite_dir: Option<PathBuf>,

    #[structopt(long, parse(from_os_str))]
    only: Option<OsString>,

    #[structopt(long, name = "max-cycles")]
    max_cycles: Option<CycleLimit>,
}

#[derive(Debug, Clone, Copy)]
pub struct CycleLimit(Option<u64>);

impl Display for CycleLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.map(|lim| lim.to_string()).as_deref().unwrap_or("∞")
        )
    }
}

impl FromStr for CycleLimit {
    type Err = <u64 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("unlimited") || s.eq_ignore_ascii_case("infinity") || s.eq("∞")
        {
            Ok(CycleLimit(None))
        } else {
            Ok(CycleLimit(Some(u64::from_str(s)?)))
        }
    }
}

/// Programs run forever unless asked otherwise; suites use `SUITE_DEFAULT`.
impl Default for CycleLimit {
    fn default() -> Self {
        CycleLimit(None)
    }
}

impl CycleLimit {
    pub const SUITE_DEFAULT: CycleLimit = CycleLimit(Some(10_000_000));

    pub fn into_option(self) -> Option<u64> {
        self.0
    }
}

pub mod exit {
    pub const OK: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CANNOT_OPEN: i32 = 2;
    pub const OUT_OF_MEMORY: i32 = 3;
}

fn report(tool: &str, msg: impl Display) {
    eprintln!("{} {}", Red.bold().paint(format!("{} ->", tool)), msg);
}

/// Reports a failure to read or write a file, and picks its exit code.
fn file_failure(tool: &str, err: anyhow::Error) -> i32 {
    report(tool, format!("{:#}", err));

    match err.downcast_ref::<io::Error>() {
        Some(e) if e.kind() == io::ErrorKind::OutOfMemory => exit::OUT_OF_MEMORY,
        _ => exit::CANNOT_OPEN,
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Vm(scmd) => vm(scmd),
        CommandRoot::Run(scmd) => run(scmd),
        CommandRoot::Suite(scmd) => suite(scmd),
    };
}

/// Assembly errors are reported but, as a soft failure, still exit with
/// status 0; the output file is left untouched.
pub fn asm(cmd: SubcommandAsm) -> ! {
    let out_bin = cmd.out_bin.unwrap_or_else(assets::default_binary_path);

    let code = match assemble::assemble_file(&cmd.in_src, &out_bin) {
        Ok(Outcome::Written(_)) => exit::OK,
        Ok(Outcome::Rejected(problems)) => {
            for problem in problems {
                report("fvma", problem);
            }
            report(
                "fvma",
                "Something smells fishy, so output file was not overwritten with generated binary",
            );
            exit::OK
        }
        Err(err) => file_failure("fvma", err),
    };

    std::process::exit(code);
}

fn open_storage(path: &Path) -> anyhow::Result<std::fs::File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("Could not open secondary storage '{}'", path.display()))
}

fn run_image<S: Storage>(image: &[u8], storage: &mut S, cfg: &Config) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();

    match execute::execute(cfg, image, Io::new(&mut input, &mut output, storage)) {
        Ok(summary) => summary.exit_code(),
        Err(err) => {
            report("fvmr", err);
            exit::OUT_OF_MEMORY
        }
    }
}

pub fn vm(cmd: SubcommandVm) -> ! {
    let rom_path = cmd.rom.unwrap_or_else(assets::default_rom_path);
    let disk_path = cmd.disk.unwrap_or_else(assets::default_disk_path);

    let opened = std::fs::read(&rom_path)
        .with_context(|| format!("Could not open ROM '{}'", rom_path.display()))
        .and_then(|rom| Ok((rom, open_storage(&disk_path)?)));

    let code = match opened {
        Ok((rom, mut disk)) => run_image(&rom, &mut disk, &cmd.vm_opts.to_config()),
        Err(err) => file_failure("fvmr", err),
    };

    std::process::exit(code);
}

pub fn run(cmd: SubcommandRun) -> ! {
    let image = match assemble::assemble_path(&cmd.in_src) {
        Ok(image) => image,
        Err(err) => {
            let code = match err.downcast_ref::<assembler::Errors>() {
                Some(errs) => {
                    for err in errs.iter() {
                        report("fvma", err);
                    }
                    exit::FAILURE
                }
                None => file_failure("fvma", err),
            };
            std::process::exit(code);
        }
    };

    let cfg = cmd.vm_opts.to_config();
    let code = match cmd.disk.as_deref().map(open_storage).transpose() {
        Ok(Some(mut disk)) => run_image(&image, &mut disk, &cfg),
        Ok(None) => run_image(&image, &mut Cursor::new(Vec::<u8>::new()), &cfg),
        Err(err) => file_failure("fvmr", err),
    };

    std::process::exit(code);
}

pub fn suite(cmd: SubcommandSuite) -> ! {
    let result = suite::run_suite(
        &cmd.suite_dir.unwrap_or_else(assets::default_suite_dir),
        cmd.only.as_deref(),
        cmd.max_cycles
            .unwrap_or(CycleLimit::SUITE_DEFAULT)
            .into_option(),
    );

    let code = match result {
        Ok(true) => exit::OK,
        Ok(false) => exit::FAILURE,
        Err(err) => {
            report("fvm", format!("{:#}", err));
            exit::FAILURE
        }
    };

    std::process::exit(code);
}
