use super::{generate, resolve, tokenize};
use derive_more::Constructor;
use itertools::Itertools;
use std::fmt::Display;

/*
    Phases:

        1.  Tokenization: The source is scanned once, left to right. Comments are dropped, runs of
            whitespace separate tokens, and bracketed literals are kept whole (they may contain
            whitespace and ';'). Each token is classified as an instruction, a label definition,
            a label reference, or a typed literal, and is assigned the address it will occupy
            in the image. Label definitions occupy no space, strings occupy one word per byte,
            and everything else occupies exactly one word.

        2.  Resolution: Every label definition is validated and entered into the `LabelTable`,
            which starts out holding the architecture's names (`mem`, `acc`, ...). A definition
            ending in ':' means the address it was declared at, one ending in '=' means the value
            of the token which follows it. Since this pass completes before anything is emitted,
            labels may be referenced before their definition.

        3.  Generation: Every token other than a label definition is turned into one or more
            words: instructions into their opcodes, labels into their table entries, literals into
            their values, and strings into one word per byte.

    No phase stops at the first problem. Each phase records its errors and carries on, so that a
    single run reports as much as possible, and `assemble` only returns an image if no phase
    recorded anything.
*/

pub type LabelName = String;

#[derive(Debug, PartialEq, Clone, Copy, Eq, Constructor)]
pub struct Loc {
    line: usize,
    col: usize,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Located<T: Sized> {
    loc: Loc,
    val: T,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}: {}", self.loc, self.val)
    }
}

impl<T> Located<T> {
    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located { loc, val }
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    pub fn val(&self) -> &T {
        &self.val
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn map<S, F>(self, f: F) -> Located<S>
    where
        F: FnOnce(T) -> S,
    {
        Located::with_loc(self.loc, f(self.val))
    }

    pub fn map_result<S, E, F>(self, f: F) -> Result<Located<S>, Located<E>>
    where
        F: FnOnce(T) -> Result<S, E>,
    {
        match f(self.val) {
            Ok(s) => Ok(Located::with_loc(self.loc, s)),
            Err(err) => Err(Located::with_loc(self.loc, err)),
        }
    }

    pub fn transfer<S>(&self, s: S) -> Located<S> {
        Located::with_loc(self.loc, s)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Tokenize(Located<tokenize::Error>),
    Resolve(Located<resolve::Error>),
    Generate(Located<generate::Error>),
}

impl Error {
    pub fn loc(&self) -> Loc {
        match self {
            Error::Tokenize(err) => err.loc(),
            Error::Resolve(err) => err.loc(),
            Error::Generate(err) => err.loc(),
        }
    }
}

impl From<Located<tokenize::Error>> for Error {
    fn from(err: Located<tokenize::Error>) -> Self {
        Error::Tokenize(err)
    }
}

impl From<Located<resolve::Error>> for Error {
    fn from(err: Located<resolve::Error>) -> Self {
        Error::Resolve(err)
    }
}

impl From<Located<generate::Error>> for Error {
    fn from(err: Located<generate::Error>) -> Self {
        Error::Generate(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assembly Error (in ")?;
        match self {
            Error::Tokenize(_) => write!(f, "Tokenizer"),
            Error::Resolve(_) => write!(f, "Resolver"),
            Error::Generate(_) => write!(f, "Generator"),
        }?;
        write!(f, ") ")?;
        match self {
            Error::Tokenize(err) => write!(f, "{}", err),
            Error::Resolve(err) => write!(f, "{}", err),
            Error::Generate(err) => write!(f, "{}", err),
        }
    }
}

/// Every error recorded during one assembly run, in source order.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub fn new() -> Self {
        Errors(Vec::new())
    }

    pub fn push(&mut self, err: impl Into<Error>) {
        self.0.push(err.into())
    }

    pub fn extend<E: Into<Error>>(&mut self, errs: impl IntoIterator<Item = E>) {
        self.0.extend(errs.into_iter().map(Into::into))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }

    pub fn sort_by_loc(&mut self) {
        self.0
            .sort_by_key(|err| (err.loc().line(), err.loc().col()));
    }

    pub fn into_result<T>(self, val: T) -> Result<T, Errors> {
        if self.is_empty() {
            Ok(val)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().map(ToString::to_string).join("\n"))
    }
}

impl std::error::Error for Errors {}
