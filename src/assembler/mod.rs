pub mod labels;
pub mod literal;
pub mod phases;

pub use phases::types::{Error, Errors, Loc, Located};

use crate::spec::types::hw::{self, Byte, Word};

/// Assembles `source` into an image, or reports every error found.
pub fn assemble(source: &str) -> Result<Vec<Word>, Errors> {
    let mut errs = Errors::new();

    let (tokens, tk_errs) = phases::tokenize(source);
    errs.extend(tk_errs);

    let (table, res_errs) = phases::resolve(&tokens);
    errs.extend(res_errs);

    let (image, gen_errs) = phases::generate(&tokens, &table);
    errs.extend(gen_errs);

    errs.sort_by_loc();
    log::debug!("assembled {} words, {} errors", image.len(), errs.len());
    errs.into_result(image)
}

/// Assembles source exactly as read from a file. Invalid UTF-8 is reported
/// alongside any other errors rather than stopping assembly.
pub fn assemble_raw(source: &[u8]) -> Result<Vec<Word>, Errors> {
    let (text, enc_errs) = phases::tokenize::decode_source(source);
    if enc_errs.is_empty() {
        return assemble(&text);
    }

    let mut errs = assemble(&text).err().unwrap_or_default();
    errs.extend(enc_errs);
    errs.sort_by_loc();
    Err(errs)
}

pub fn assemble_bytes(source: &str) -> Result<Vec<Byte>, Errors> {
    Ok(hw::words_to_bytes(&assemble(source)?))
}
