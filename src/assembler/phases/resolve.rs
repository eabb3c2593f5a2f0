use super::tokenize::{Binding, Token, TokenKind};
use super::types::{LabelName, Located};
use crate::assembler::labels::{self, LabelTable};
use crate::assembler::literal;
use crate::spec::types::hw::Word;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    IllegalLabelCharacter(LabelName, char),
    EmptyLabelName,
    StringAssignedToLabel(LabelName),
    MissingValue(LabelName),
    ExpectedValue(LabelName, String),
    UnknownLabel(LabelName, LabelName),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IllegalLabelCharacter(name, c) => write!(
                f,
                "Illegal character '{}' in label '{}', names may only contain 0-9, A-Z, a-z, and '_'",
                c, name
            ),
            Error::EmptyLabelName => write!(f, "Label definition has an empty name"),
            Error::StringAssignedToLabel(name) => {
                write!(f, "Cannot assign a string literal to value label '{}'", name)
            }
            Error::MissingValue(name) => write!(
                f,
                "Value label '{}' is not followed by anything to take its value from",
                name
            ),
            Error::ExpectedValue(name, found) => write!(
                f,
                "Value label '{}' must be followed by a value, found label definition '{}'",
                name, found
            ),
            Error::UnknownLabel(name, refd) => write!(
                f,
                "Value label '{}' refers to '{}', which is not defined at that point",
                name, refd
            ),
        }
    }
}

fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::EmptyLabelName);
    }

    match name.chars().find(|&c| !labels::is_legal_label_char(c)) {
        Some(c) => Err(Error::IllegalLabelCharacter(name.to_owned(), c)),
        None => Ok(()),
    }
}

fn value_of(name: &str, next: Option<&Token>, table: &LabelTable) -> Result<Word, Error> {
    let next = next.ok_or_else(|| Error::MissingValue(name.to_owned()))?;

    match next.kind {
        TokenKind::Instruction(op) => Ok(op.to_word()),
        // A bad literal is reported once, by the generator.
        TokenKind::Literal(radix) => Ok(literal::decode(next.body(), radix).unwrap_or(0)),
        TokenKind::Label => table
            .lookup(&next.text)
            .or_else(|| super::generate::bare_numeral(&next.text))
            .ok_or_else(|| Error::UnknownLabel(name.to_owned(), next.text.clone())),
        TokenKind::String => Err(Error::StringAssignedToLabel(name.to_owned())),
        TokenKind::LabelDef(_) => Err(Error::ExpectedValue(name.to_owned(), next.text.clone())),
    }
}

/// Builds the label table from every definition in `tokens`.
///
/// A definition which fails to resolve is still entered (with meaning 0), so
/// that its uses do not produce further errors.
pub fn resolve(tokens: &[Located<Token>]) -> (LabelTable, Vec<Located<Error>>) {
    let mut table = LabelTable::with_defaults();
    let mut errs = Vec::new();

    for (idx, tk) in tokens.iter().enumerate() {
        let binding = match tk.val().kind {
            TokenKind::LabelDef(binding) => binding,
            _ => continue,
        };

        let name = tk.val().name();
        if let Err(err) = check_name(name) {
            errs.push(tk.transfer(err));
        }

        let meaning = match binding {
            Binding::Address => Ok(tk.val().address),
            Binding::Value => value_of(name, tokens.get(idx + 1).map(Located::val), &table),
        };

        table.define(
            name,
            meaning.unwrap_or_else(|err| {
                errs.push(tk.transfer(err));
                0
            }),
        );
    }

    log::debug!("resolved {} labels", table.len());

    (table, errs)
}
