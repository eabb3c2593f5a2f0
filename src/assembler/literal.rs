use crate::spec::types::hw::Word;
use std::fmt::Display;
use strum_macros::EnumIter;

pub const SEPARATOR: char = '\'';
pub const ESCAPE: char = '\\';

const DIGITS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    InvalidDigit(char),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDigit(c) => write!(
                f,
                "Invalid character in literal '{}': digits must be 0-9, a-f (any case), or \"'\" as a separator",
                c
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub fn from_specifier(c: char) -> Option<Radix> {
        match c {
            'b' => Some(Radix::Binary),
            'o' => Some(Radix::Octal),
            'd' => Some(Radix::Decimal),
            'x' => Some(Radix::Hex),
            _ => None,
        }
    }

    pub fn specifier(self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Decimal => 'd',
            Radix::Hex => 'x',
        }
    }

    pub fn base(self) -> Word {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

fn digit_value(c: char) -> Option<Word> {
    let c = c.to_ascii_lowercase();
    DIGITS.iter().position(|&d| d == c).map(|v| v as Word)
}

/// Decodes the digits of a numeric literal (the text between the brackets).
///
/// Digits are accumulated from the least significant end, wrapping on overflow.
/// A digit at or above the radix is not rejected, it simply contributes its
/// value times the positional weight; see `first_out_of_radix`.
pub fn decode(digits: &str, radix: Radix) -> Result<Word, Error> {
    let mut value: Word = 0;
    let mut weight: Word = 1;

    for c in digits.chars().rev().filter(|&c| c != SEPARATOR) {
        let digit = digit_value(c).ok_or(Error::InvalidDigit(c))?;
        value = value.wrapping_add(digit.wrapping_mul(weight));
        weight = weight.wrapping_mul(radix.base());
    }

    Ok(value)
}

pub fn first_out_of_radix(digits: &str, radix: Radix) -> Option<char> {
    digits
        .chars()
        .find(|&c| digit_value(c).map_or(false, |v| v >= radix.base()))
}

fn unescape(c: char) -> char {
    match c {
        '/' => '\\',
        'n' => '\n',
        'b' => '\x08',
        'r' => '\r',
        c => c,
    }
}

/// Decodes the body of a string literal into one word per byte.
///
/// A backslash always begins an escape and is itself never emitted, so an
/// unrecognized escape yields just the escaped character and a trailing
/// backslash yields nothing. No terminator is appended.
pub fn decode_string(body: &str) -> Vec<Word> {
    let mut words = Vec::with_capacity(body.len());
    let mut escape = false;
    let mut buf = [0; 4];

    for c in body.chars() {
        if c == ESCAPE {
            escape = true;
            continue;
        }

        let c = if escape { unescape(c) } else { c };
        escape = false;

        words.extend(c.encode_utf8(&mut buf).bytes().map(Word::from));
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn encode(n: Word, radix: Radix) -> String {
        match radix {
            Radix::Binary => format!("{:b}", n),
            Radix::Octal => format!("{:o}", n),
            Radix::Decimal => format!("{}", n),
            Radix::Hex => format!("{:x}", n),
        }
    }

    fn with_separators(digits: &str) -> String {
        let mut out = String::new();
        for (idx, c) in digits.chars().enumerate() {
            if idx > 0 && idx % 3 == 0 {
                out.push(SEPARATOR);
            }
            out.push(c);
        }
        out
    }

    #[test]
    fn round_trips_every_radix() {
        let samples = [
            0,
            1,
            7,
            10,
            255,
            0xDEAD_BEEF,
            1 << 40,
            0x0123_4567_89AB_CDEF,
            Word::MAX,
        ];
        for radix in Radix::iter() {
            for &n in samples.iter() {
                let digits = encode(n, radix);
                assert_eq!(decode(&digits, radix), Ok(n), "{} in {:?}", digits, radix);
                assert_eq!(decode(&with_separators(&digits), radix), Ok(n));
            }
        }
    }

    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0
        }
    }

    #[test]
    fn round_trips_random_digits() {
        let mut rng = Lcg(0x5EED);
        for _ in 0..2000 {
            // Mix small and full-width values.
            let n = rng.next() >> (rng.next() % 64);
            for radix in Radix::iter() {
                let mut digits = String::new();
                for c in encode(n, radix).chars() {
                    if rng.next() % 4 == 0 {
                        digits.push(SEPARATOR);
                    }
                    digits.push(c);
                }
                if rng.next() % 2 == 0 {
                    digits = digits.to_uppercase();
                }

                assert_eq!(decode(&digits, radix), Ok(n), "{} in {:?}", digits, radix);
            }
        }
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(decode("ff", Radix::Hex), Ok(255));
        assert_eq!(decode("FF", Radix::Hex), Ok(255));
        assert_eq!(decode("fF", Radix::Hex), Ok(255));
    }

    #[test]
    fn separators_are_ignored() {
        assert_eq!(decode("1'000'000", Radix::Decimal), Ok(1_000_000));
        assert_eq!(decode("''", Radix::Decimal), Ok(0));
        assert_eq!(decode("1010'1010", Radix::Binary), Ok(0xAA));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(decode("", Radix::Hex), Ok(0));
    }

    #[test]
    fn invalid_digit() {
        assert_eq!(decode("12g4", Radix::Hex), Err(Error::InvalidDigit('g')));
        assert_eq!(decode("1 2", Radix::Decimal), Err(Error::InvalidDigit(' ')));
    }

    #[test]
    fn digits_above_radix_are_weighted() {
        assert_eq!(decode("12", Radix::Binary), Ok(4));
        assert_eq!(first_out_of_radix("12", Radix::Binary), Some('2'));
        assert_eq!(first_out_of_radix("1'0", Radix::Binary), None);
        assert_eq!(first_out_of_radix("9a", Radix::Decimal), Some('a'));
    }

    #[test]
    fn overflow_wraps() {
        assert_eq!(decode("10000000000000000", Radix::Hex), Ok(0));
        assert_eq!(decode("10000000000000001", Radix::Hex), Ok(1));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(decode_string("ab"), vec![97, 98]);
        assert_eq!(decode_string(r"a\nb"), vec![97, 10, 98]);
        assert_eq!(decode_string(r"\/\b\r"), vec![92, 8, 13]);
        assert_eq!(decode_string(r"\]\q"), vec![93, 113]);
        assert_eq!(decode_string(r"x\"), vec![120]);
        assert_eq!(decode_string(r"\\n"), vec![10]);
        assert_eq!(decode_string(""), Vec::<Word>::new());
    }

    #[test]
    fn string_is_bytes() {
        assert_eq!(decode_string("é"), vec![0xC3, 0xA9]);
    }
}
