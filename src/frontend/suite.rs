use super::run::execute::{self, Config, Summary, Verbosity};
use super::{assemble, assets};
use crate::assembler;
use crate::vm::{Io, State};
use ansi_term::Color::{Green, Red};
use anyhow::Context;
use derive_more::Constructor;
use std::ffi::{OsStr, OsString};
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(Constructor)]
struct UnitSrc {
    name: OsString,
    src: PathBuf,
    expected_output: Option<PathBuf>,
}

struct UnitResult {
    summary: Summary,
    output: Vec<u8>,
}

impl UnitSrc {
    /// Runs with empty stdin and a blank in-memory disk.
    fn execute(&self, max_cycles: Option<u64>) -> anyhow::Result<UnitResult> {
        let image = assemble::assemble_path(&self.src)?;

        let mut input: &[u8] = &[];
        let mut output: Vec<u8> = Vec::new();
        let mut disk = Cursor::new(Vec::<u8>::new());

        let cfg = Config {
            max_cycles,
            verbosity: Verbosity::Silent,
            print_marginals: false,
            dump_on_fault: false,
        };
        let summary = execute::execute(&cfg, &image, Io::new(&mut input, &mut output, &mut disk))?;

        Ok(UnitResult { summary, output })
    }

    fn expected_output(&self) -> anyhow::Result<Option<Vec<u8>>> {
        self.expected_output
            .as_deref()
            .map(|path| {
                std::fs::read(path)
                    .with_context(|| format!("Could not read expected output '{}'", path.display()))
            })
            .transpose()
    }
}

pub fn run_suite(
    suite_dir: &Path,
    only_this: Option<&OsStr>,
    max_cycles: Option<u64>,
) -> anyhow::Result<bool> {
    let all_units = find_units(suite_dir)?;

    let mut selected_units = match only_this {
        None => all_units,
        Some(only_this) => vec![all_units
            .into_iter()
            .find(|unit| unit.name.as_os_str() == only_this)
            .with_context(|| {
                format!(
                    "No unit named '{}' in suite '{}'",
                    only_this.to_string_lossy(),
                    suite_dir.display()
                )
            })?],
    };

    selected_units.sort_unstable_by(|unit1, unit2| unit1.name.cmp(&unit2.name));

    Ok(run_units(
        &suite_dir.to_string_lossy(),
        max_cycles,
        &selected_units,
    ))
}

fn find_file_unit(path: &Path) -> Option<UnitSrc> {
    if !path.extension().map_or(false, |ext| ext == assets::SOURCE_EXT) {
        return None;
    }

    let expected = path.with_extension(assets::EXPECTED_OUTPUT_EXT);
    Some(UnitSrc::new(
        path.file_stem()?.to_owned(),
        path.to_owned(),
        if expected.is_file() {
            Some(expected)
        } else {
            None
        },
    ))
}

fn find_units(suite_dir: &Path) -> anyhow::Result<Vec<UnitSrc>> {
    let mut units = Vec::new();

    let entries = suite_dir
        .read_dir()
        .with_context(|| format!("Could not open suite directory '{}'", suite_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            units.extend(find_file_unit(&path));
        }
    }

    Ok(units)
}

fn run_units(name: &str, max_cycles: Option<u64>, units: &[UnitSrc]) -> bool {
    let name_pad = units.iter().map(|unit| unit.name.len()).max().unwrap_or(0);

    println!("Running suite: '{}' ({} units)", name, units.len());
    println!("{:-<line_len$}", "", line_len = name_pad + 45);

    let passes = units
        .iter()
        .enumerate()
        .filter(|(num, unit)| run_unit(unit, num + 1, name_pad, max_cycles))
        .count();
    let success = passes == units.len();

    println!("{:-<line_len$}", "", line_len = name_pad + 45);
    println!(
        "Suite Result: {}, {}/{} passes",
        if success {
            Green.bold().paint("SUCCESS")
        } else {
            Red.bold().paint("FAILED")
        },
        passes,
        units.len()
    );

    success
}

fn judge(src: &UnitSrc, result: anyhow::Result<UnitResult>) -> (bool, String) {
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            let label = if err.downcast_ref::<assembler::Errors>().is_some() {
                "FAIL: ASSEMBLY ERROR"
            } else {
                "FAIL: ERROR"
            };
            return (
                false,
                format!(
                    "{}:\n\t{}",
                    Red.bold().paint(label),
                    err.to_string().replace("\n", "\n\t")
                ),
            );
        }
    };

    let summary = &result.summary;
    match (summary.timeout, &summary.state) {
        (true, _) => (
            false,
            format!(
                "{} after {} instructions ({}ms)",
                Red.bold().paint("FAIL: DETERMINISTIC TIMEOUT"),
                summary.total_cycles,
                summary.real_ns_elapsed / 1000 / 1000
            ),
        ),
        (false, State::Faulted(fault)) => (
            false,
            format!("{}: {}", Red.bold().paint("FAIL: FAULTED"), fault),
        ),
        (false, _) => match src.expected_output() {
            Err(err) => (false, format!("{}: {}", Red.bold().paint("FAIL: ERROR"), err)),
            Ok(Some(expected)) if expected != result.output => (
                false,
                format!(
                    "{}: expected {:?}, got {:?}",
                    Red.bold().paint("FAIL: OUTPUT MISMATCH"),
                    String::from_utf8_lossy(&expected),
                    String::from_utf8_lossy(&result.output)
                ),
            ),
            Ok(_) => (
                true,
                format!(
                    "{} {:7 } instrs {: >4}ms  ({: >5.2}MHz)",
                    Green.bold().paint("PASS"),
                    summary.total_cycles,
                    summary.real_ns_elapsed / 1000 / 1000,
                    summary.to_effective_freq_megahertz(),
                ),
            ),
        },
    }
}

fn run_unit(src: &UnitSrc, num: usize, name_pad: usize, max_cycles: Option<u64>) -> bool {
    let (success, msg) = judge(src, src.execute(max_cycles));

    println!(
        "Unit {:2 }: {} {}{}",
        num,
        src.name.to_string_lossy(),
        " ".repeat(name_pad - src.name.len()),
        msg
    );

    success
}
