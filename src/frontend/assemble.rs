use super::assets;
use crate::assembler;
use crate::spec::types::hw::{self, Byte};
use anyhow::Context;
use std::fmt::Display;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BadOutputName(pub PathBuf);

impl Display for BadOutputName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Output filename '{}' does not end with '.{}'",
            self.0.display(),
            assets::BINARY_EXT
        )
    }
}

impl std::error::Error for BadOutputName {}

#[derive(Debug)]
pub enum Outcome {
    /// The image was written, and held this many bytes.
    Written(usize),
    /// Nothing was written; one message per problem found.
    Rejected(Vec<String>),
}

/// Reads source as raw bytes; whether they are valid text is for the
/// assembler to report.
pub fn read_source(path: &Path) -> anyhow::Result<Vec<Byte>> {
    std::fs::read(path)
        .with_context(|| format!("Could not open source file '{}'", path.display()))
}

/// Assembles the file at `path` into a serialized image.
///
/// Errors in the program itself are returned as `assembler::Errors`, which
/// can be recovered with `downcast_ref`.
pub fn assemble_path(path: &Path) -> anyhow::Result<Vec<Byte>> {
    let source = read_source(path)?;
    Ok(hw::words_to_bytes(&assembler::assemble_raw(&source)?))
}

pub fn has_binary_ext(path: &Path) -> bool {
    path.to_string_lossy()
        .ends_with(&format!(".{}", assets::BINARY_EXT))
}

/// Assembles `src` and writes the image to `out`, unless the program has
/// errors or `out` is not named like an image, in which case `out` is
/// left untouched.
pub fn assemble_file(src: &Path, out: &Path) -> anyhow::Result<Outcome> {
    let source = read_source(src)?;

    let mut problems = Vec::new();
    let image = match assembler::assemble_raw(&source) {
        Ok(image) => Some(hw::words_to_bytes(&image)),
        Err(errs) => {
            problems.extend(errs.iter().map(ToString::to_string));
            None
        }
    };

    if !has_binary_ext(out) {
        problems.push(BadOutputName(out.to_owned()).to_string());
    }

    match image {
        Some(image) if problems.is_empty() => {
            std::fs::write(out, &image)
                .with_context(|| format!("Could not write output file '{}'", out.display()))?;
            log::debug!("wrote {} bytes to '{}'", image.len(), out.display());
            Ok(Outcome::Written(image.len()))
        }
        _ => Ok(Outcome::Rejected(problems)),
    }
}
