use super::types::{Loc, Located};
use crate::assembler::literal::{self, Radix};
use crate::spec::defs::inst::Opcode;
use crate::spec::types::hw::Word;
use std::borrow::Cow;
use std::fmt::Display;

const COMMENT_CHAR: char = ';';
const NEWLINE_CHAR: char = '\n';
const LITERAL_START: char = '[';
const LITERAL_END: char = ']';
const ADDRESS_DEF_CHAR: char = ':';
const VALUE_DEF_CHAR: char = '=';

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnrecognizedSpecifier(String, char),
    UnterminatedLiteral(String),
    InvalidEncoding(u8),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnrecognizedSpecifier(raw, c) => write!(
                f,
                "Unrecognized raw-data type specifier '{}' in '{}', expected one of 's', 'b', 'x', 'o', 'd'",
                c, raw
            ),
            Error::UnterminatedLiteral(raw) => {
                write!(f, "Encountered unterminated literal '{}'", raw)
            }
            Error::InvalidEncoding(byte) => {
                write!(f, "Source is not valid UTF-8, found byte {:#04X}", byte)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// `name:`, the address the definition appears at.
    Address,
    /// `name=`, the value of the token which follows.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Instruction(Opcode),
    LabelDef(Binding),
    Label,
    String,
    Literal(Radix),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// The word offset this token occupies in the image.
    pub address: Word,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Instruction(op) => write!(f, "Instruction({})", op),
            TokenKind::LabelDef(_) => write!(f, "LabelDef({})", self.text),
            TokenKind::Label => write!(f, "Label({})", self.text),
            TokenKind::String => write!(f, "String({})", self.text),
            TokenKind::Literal(_) => write!(f, "Literal({})", self.text),
        }
    }
}

impl Token {
    /// The defined name, without its trailing ':' or '='.
    pub fn name(&self) -> &str {
        match self.kind {
            TokenKind::LabelDef(_) => &self.text[..self.text.len() - 1],
            _ => &self.text,
        }
    }

    /// The text between the brackets of a literal.
    pub fn body(&self) -> &str {
        match self.kind {
            TokenKind::String | TokenKind::Literal(_) => {
                let inner = &self.text[..self.text.len() - 2];
                inner
                    .strip_prefix(LITERAL_START)
                    .unwrap_or(inner)
            }
            _ => &self.text,
        }
    }

    /// How many words this token will occupy in the image.
    pub fn words(&self) -> usize {
        match self.kind {
            TokenKind::LabelDef(_) => 0,
            TokenKind::String => literal::decode_string(self.body()).len(),
            _ => 1,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == COMMENT_CHAR || c.is_whitespace()
}

#[derive(Debug, PartialEq, Eq)]
struct RawToken<'a> {
    text: &'a str,
    /// Set if a ':' or '=' appeared outside of any literal, in which
    /// case the token does not advance the address counter.
    definition: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeekMode {
    Whitespace,
    Comment,
    Name,
    Literal { prev: Option<char> },
}

impl<'a> RawToken<'a> {
    fn scan(source: &'a str) -> (Vec<Located<RawToken<'a>>>, Option<Located<Error>>) {
        let mut tokens = Vec::new();

        let mut mode = SeekMode::Whitespace;
        let mut start = (0, Loc::new(1, 1));
        let mut definition = false;
        let (mut line, mut col) = (1, 0);

        let mut finish = |start: (usize, Loc), end: usize, definition: bool| {
            tokens.push(Located::with_loc(
                start.1,
                RawToken {
                    text: &source[start.0..end],
                    definition,
                },
            ))
        };

        for (idx, c) in source.char_indices() {
            col += 1;
            let loc = Loc::new(line, col);
            if c == NEWLINE_CHAR {
                line += 1;
                col = 0;
            }

            mode = match mode {
                SeekMode::Comment if c == NEWLINE_CHAR => SeekMode::Whitespace,
                SeekMode::Comment => SeekMode::Comment,

                SeekMode::Literal { prev } => {
                    if c == LITERAL_END && prev != Some(literal::ESCAPE) {
                        SeekMode::Name
                    } else {
                        SeekMode::Literal { prev: Some(c) }
                    }
                }

                SeekMode::Whitespace | SeekMode::Name if is_separator(c) => {
                    if mode == SeekMode::Name {
                        finish(start, idx, definition);
                    }

                    if c == COMMENT_CHAR {
                        SeekMode::Comment
                    } else {
                        SeekMode::Whitespace
                    }
                }

                SeekMode::Whitespace | SeekMode::Name => {
                    if mode == SeekMode::Whitespace {
                        start = (idx, loc);
                        definition = false;
                    }

                    match c {
                        LITERAL_START => SeekMode::Literal { prev: None },
                        ADDRESS_DEF_CHAR | VALUE_DEF_CHAR => {
                            definition = true;
                            SeekMode::Name
                        }
                        _ => SeekMode::Name,
                    }
                }
            };
        }

        match mode {
            SeekMode::Name => {
                finish(start, source.len(), definition);
                (tokens, None)
            }
            SeekMode::Literal { .. } => (
                tokens,
                Some(Located::with_loc(
                    start.1,
                    Error::UnterminatedLiteral(source[start.0..].to_owned()),
                )),
            ),
            SeekMode::Whitespace | SeekMode::Comment => (tokens, None),
        }
    }
}

/// Assigns kinds and addresses to raw tokens, in source order.
#[derive(Debug, Default)]
struct Classifier {
    /// Operands still owed to the last instruction.
    operands: usize,
    address: Word,
}

impl Classifier {
    fn kind_of(&mut self, text: &str) -> Result<TokenKind, Error> {
        let mut rev = text.chars().rev();
        let (last, second_last) = (rev.next(), rev.next());

        match (last, second_last) {
            (Some(c), Some(LITERAL_END)) => {
                if self.operands > 0 {
                    self.operands -= 1;
                }

                return match c {
                    's' => Ok(TokenKind::String),
                    c => Radix::from_specifier(c)
                        .map(TokenKind::Literal)
                        .ok_or_else(|| Error::UnrecognizedSpecifier(text.to_owned(), c)),
                };
            }
            (Some(ADDRESS_DEF_CHAR), _) => return Ok(TokenKind::LabelDef(Binding::Address)),
            (Some(VALUE_DEF_CHAR), _) => return Ok(TokenKind::LabelDef(Binding::Value)),
            _ => (),
        }

        if self.operands > 0 {
            self.operands -= 1;
            return Ok(TokenKind::Label);
        }

        Ok(match Opcode::from_mnemonic(text) {
            Some(op) => {
                self.operands = op.operands();
                TokenKind::Instruction(op)
            }
            None => TokenKind::Label,
        })
    }

    fn classify(&mut self, raw: Located<RawToken>) -> Result<Located<Token>, Located<Error>> {
        let address = self.address;
        let definition = raw.val().definition;

        let token = raw.map_result(|raw| {
            let kind = self.kind_of(raw.text);
            if !definition && kind.is_err() {
                self.address = self.address.wrapping_add(1);
            }

            Ok(Token {
                kind: kind?,
                text: raw.text.to_owned(),
                address,
            })
        })?;

        if !definition {
            self.address = self
                .address
                .wrapping_add(token.val().words() as Word);
        }

        Ok(token)
    }
}

/// Decodes source text read from a file. Each invalid UTF-8 sequence is
/// replaced by U+FFFD, which takes up one column, and reported where it
/// appeared.
pub fn decode_source(bytes: &[u8]) -> (Cow<'_, str>, Vec<Located<Error>>) {
    let mut errs = Vec::new();
    let (mut line, mut col) = (1, 0);
    let mut rest = bytes;

    while let Err(err) = std::str::from_utf8(rest) {
        let (valid, invalid) = rest.split_at(err.valid_up_to());
        for c in std::str::from_utf8(valid).unwrap_or_default().chars() {
            if c == NEWLINE_CHAR {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        col += 1;
        if let Some(&byte) = invalid.first() {
            errs.push(Located::with_loc(
                Loc::new(line, col),
                Error::InvalidEncoding(byte),
            ));
        }

        rest = &invalid[err.error_len().unwrap_or(invalid.len())..];
    }

    (String::from_utf8_lossy(bytes), errs)
}

pub fn tokenize(source: &str) -> (Vec<Located<Token>>, Vec<Located<Error>>) {
    let (raws, unterminated) = RawToken::scan(source);

    let mut classifier = Classifier::default();
    let mut tokens = Vec::with_capacity(raws.len());
    let mut errs = Vec::new();

    for raw in raws {
        match classifier.classify(raw) {
            Ok(token) => tokens.push(token),
            Err(err) => errs.push(err),
        }
    }

    errs.extend(unterminated);
    log::debug!("tokenized {} tokens, {} errors", tokens.len(), errs.len());

    (tokens, errs)
}

#[cfg(test)]
mod tests {
    use super::super::types::{Loc, Located};
    use super::*;

    fn raw_texts(source: &str) -> Vec<&str> {
        let (raws, err) = RawToken::scan(source);
        assert_eq!(err, None);
        raws.into_iter().map(|raw| raw.value().text).collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errs) = tokenize(source);
        assert!(errs.is_empty(), "{:?}", errs);
        tokens.into_iter().map(|tk| tk.value().kind).collect()
    }

    fn addresses(source: &str) -> Vec<Word> {
        let (tokens, errs) = tokenize(source);
        assert!(errs.is_empty(), "{:?}", errs);
        tokens.into_iter().map(|tk| tk.value().address).collect()
    }

    #[test]
    fn scan_simple() {
        assert_eq!(raw_texts("pl [5]d acc"), vec!["pl", "[5]d", "acc"]);
    }

    #[test]
    fn scan_locations() {
        let (raws, _) = RawToken::scan("pl\n  acc");
        assert_eq!(
            raws,
            vec![
                Located::with_loc(
                    Loc::new(1, 1),
                    RawToken {
                        text: "pl",
                        definition: false
                    }
                ),
                Located::with_loc(
                    Loc::new(2, 3),
                    RawToken {
                        text: "acc",
                        definition: false
                    }
                ),
            ]
        );
    }

    #[test]
    fn scan_collapses_whitespace() {
        assert_eq!(raw_texts(" \t a  \n\n\t b \r\n"), vec!["a", "b"]);
    }

    #[test]
    fn scan_comment() {
        assert_eq!(raw_texts("a ;my comment text\nb"), vec!["a", "b"]);
    }

    #[test]
    fn scan_comment_nospace() {
        assert_eq!(raw_texts("a;my comment text\nb"), vec!["a", "b"]);
    }

    #[test]
    fn scan_comment_only() {
        assert_eq!(raw_texts(";"), Vec::<&str>::new());
        assert_eq!(raw_texts("; a b c"), Vec::<&str>::new());
    }

    #[test]
    fn scan_final_token_without_newline() {
        assert_eq!(raw_texts("a fi"), vec!["a", "fi"]);
    }

    #[test]
    fn scan_empty() {
        assert_eq!(raw_texts(""), Vec::<&str>::new());
    }

    #[test]
    fn scan_literal_keeps_whitespace_and_comments() {
        assert_eq!(
            raw_texts("[hello ; there\nfriend]s fi"),
            vec!["[hello ; there\nfriend]s", "fi"]
        );
    }

    #[test]
    fn scan_escaped_bracket() {
        assert_eq!(raw_texts(r"[a\]b]s x"), vec![r"[a\]b]s", "x"]);
    }

    #[test]
    fn scan_definition_flag() {
        let (raws, _) = RawToken::scan("a: [b:c]s d=");
        let flags: Vec<bool> = raws.into_iter().map(|raw| raw.value().definition).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn scan_unterminated() {
        let (raws, err) = RawToken::scan("a [bc");
        assert_eq!(raws.len(), 1);
        assert_eq!(
            err,
            Some(Located::with_loc(
                Loc::new(1, 3),
                Error::UnterminatedLiteral("[bc".to_owned())
            ))
        );
    }

    #[test]
    fn classify_instruction_operands() {
        assert_eq!(
            kinds("pl [5]d acc a+ jm fi fi"),
            vec![
                TokenKind::Instruction(Opcode::Place),
                TokenKind::Literal(Radix::Decimal),
                TokenKind::Label,
                TokenKind::Instruction(Opcode::Add),
                TokenKind::Instruction(Opcode::Jump),
                TokenKind::Label,
                TokenKind::Instruction(Opcode::Finish),
            ]
        );
    }

    #[test]
    fn classify_literals() {
        assert_eq!(
            kinds("[1]b [7]o [9]d [f]x [s]s []d"),
            vec![
                TokenKind::Literal(Radix::Binary),
                TokenKind::Literal(Radix::Octal),
                TokenKind::Literal(Radix::Decimal),
                TokenKind::Literal(Radix::Hex),
                TokenKind::String,
                TokenKind::Literal(Radix::Decimal),
            ]
        );
    }

    #[test]
    fn decode_valid_source() {
        let (text, errs) = decode_source("pl [5]d acc".as_bytes());
        assert_eq!(text, "pl [5]d acc");
        assert!(errs.is_empty());
    }

    #[test]
    fn decode_invalid_source() {
        let (text, errs) = decode_source(b"fi\n[caf\xE9]s \xFF\xFEx");
        assert_eq!(text, "fi\n[caf\u{FFFD}]s \u{FFFD}\u{FFFD}x");
        assert_eq!(
            errs,
            vec![
                Located::with_loc(Loc::new(2, 5), Error::InvalidEncoding(0xE9)),
                Located::with_loc(Loc::new(2, 9), Error::InvalidEncoding(0xFF)),
                Located::with_loc(Loc::new(2, 10), Error::InvalidEncoding(0xFE)),
            ]
        );

        let (tokens, tk_errs) = tokenize(&text);
        assert!(tk_errs.is_empty());
        assert_eq!(tokens[1].loc(), Loc::new(2, 1));
    }

    #[test]
    fn literal_is_decided_by_its_suffix() {
        assert_eq!(
            kinds("12]d pl 7]x acc ]s"),
            vec![
                TokenKind::Literal(Radix::Decimal),
                TokenKind::Instruction(Opcode::Place),
                TokenKind::Literal(Radix::Hex),
                TokenKind::Label,
                TokenKind::String,
            ]
        );

        let (tokens, _) = tokenize("12]d");
        assert_eq!(tokens[0].val().body(), "12");
    }

    #[test]
    fn classify_definitions() {
        assert_eq!(
            kinds("loop: n= [3]d"),
            vec![
                TokenKind::LabelDef(Binding::Address),
                TokenKind::LabelDef(Binding::Value),
                TokenKind::Literal(Radix::Decimal),
            ]
        );
    }

    #[test]
    fn unknown_mnemonic_is_label() {
        assert_eq!(kinds("PL xx"), vec![TokenKind::Label, TokenKind::Label]);
    }

    #[test]
    fn unrecognized_specifier() {
        let (tokens, errs) = tokenize("[12]q fi");
        assert_eq!(
            errs,
            vec![Located::with_loc(
                Loc::new(1, 1),
                Error::UnrecognizedSpecifier("[12]q".to_owned(), 'q')
            )]
        );
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].val().address, 1);
    }

    #[test]
    fn string_advances_by_length() {
        assert_eq!(addresses("[abc]s fi"), vec![0, 3]);
        assert_eq!(addresses(r"[a\nb]s fi"), vec![0, 3]);
        assert_eq!(addresses("[]s fi"), vec![0, 0]);
    }

    #[test]
    fn definitions_advance_by_nothing() {
        assert_eq!(addresses("start: pl [1]d acc end: fi"), vec![0, 0, 1, 2, 3, 3]);
    }

    #[test]
    fn token_accessors() {
        let (tokens, _) = tokenize("loop: [ff]x [hi]s");
        assert_eq!(tokens[0].val().name(), "loop");
        assert_eq!(tokens[1].val().body(), "ff");
        assert_eq!(tokens[2].val().body(), "hi");
        assert_eq!(tokens[2].val().words(), 2);
    }
}
