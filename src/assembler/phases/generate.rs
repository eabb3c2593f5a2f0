use super::tokenize::{Token, TokenKind};
use super::types::{LabelName, Located};
use crate::assembler::labels::LabelTable;
use crate::assembler::literal::{self, Radix};
use crate::spec::types::hw::Word;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnknownLabel(LabelName),
    InvalidLiteral(String, literal::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownLabel(name) => write!(f, "Unrecognized label '{}'", name),
            Error::InvalidLiteral(raw, err) => write!(f, "In literal '{}': {}", raw, err),
        }
    }
}

/// A label which was never defined, but which is spelled as a decimal
/// number, stands for that number.
pub fn bare_numeral(name: &str) -> Option<Word> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    literal::decode(name, Radix::Decimal).ok()
}

fn decode_literal(tk: &Located<Token>, radix: Radix) -> Result<Word, Error> {
    let body = tk.val().body();
    if let Some(c) = literal::first_out_of_radix(body, radix) {
        log::warn!(
            "line {}: digit '{}' in literal '{}' is not below its radix {}",
            tk.loc().line(),
            c,
            tk.val().text,
            radix.base()
        );
    }

    literal::decode(body, radix).map_err(|err| Error::InvalidLiteral(tk.val().text.clone(), err))
}

fn words_of(tk: &Located<Token>, table: &LabelTable) -> Result<Vec<Word>, Error> {
    Ok(match tk.val().kind {
        TokenKind::LabelDef(_) => Vec::new(),
        TokenKind::Instruction(op) => vec![op.to_word()],
        TokenKind::Label => {
            let name = &tk.val().text;
            vec![table
                .lookup(name)
                .or_else(|| bare_numeral(name))
                .ok_or_else(|| Error::UnknownLabel(name.clone()))?]
        }
        TokenKind::String => literal::decode_string(tk.val().body()),
        TokenKind::Literal(radix) => vec![decode_literal(tk, radix)?],
    })
}

/// Emits the image for `tokens`, skipping (and reporting) any token which
/// cannot be turned into words.
pub fn generate(tokens: &[Located<Token>], table: &LabelTable) -> (Vec<Word>, Vec<Located<Error>>) {
    let mut image = Vec::with_capacity(tokens.len());
    let mut errs = Vec::new();

    for tk in tokens {
        match words_of(tk, table) {
            Ok(words) => image.extend(words),
            Err(err) => errs.push(tk.transfer(err)),
        }
    }

    (image, errs)
}
