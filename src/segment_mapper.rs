//! Text to seven-segment patterns
//!
//! Patterns use the MAX7219 "no decode" bit order: bit 7 is the decimal point, bits
//! 6 to 0 are segments A to G.

use core::str::Chars;

use crate::error::{Error, Result};

/// Decimal point bit
pub const DOT: u8 = 0x80;

/// Segment pattern for `ch`, if it can be shown
pub const fn lookup(ch: char) -> Option<u8> {
    let pattern = match ch {
        ' ' => 0x00,
        '-' => 0x01,
        '_' => 0x08,
        '\'' => 0x02,
        '0' => 0x7e,
        '1' => 0x30,
        '2' => 0x6d,
        '3' => 0x79,
        '4' => 0x33,
        '5' => 0x5b,
        '6' => 0x5f,
        '7' => 0x70,
        '8' => 0x7f,
        '9' => 0x7b,
        'a' => 0x7d,
        'b' => 0x1f,
        'c' => 0x0d,
        'd' => 0x3d,
        'e' => 0x6f,
        'f' => 0x47,
        'g' => 0x7b,
        'h' => 0x17,
        'i' => 0x10,
        'j' => 0x18,
        'l' => 0x06,
        'n' => 0x15,
        'o' => 0x1d,
        'p' => 0x67,
        'q' => 0x73,
        'r' => 0x05,
        's' => 0x5b,
        't' => 0x0f,
        'u' => 0x1c,
        'v' => 0x1c,
        'y' => 0x3b,
        'z' => 0x6d,
        'A' => 0x77,
        'B' => 0x7f,
        'C' => 0x4e,
        'D' => 0x7e,
        'E' => 0x4f,
        'F' => 0x47,
        'G' => 0x5e,
        'H' => 0x37,
        'I' => 0x30,
        'J' => 0x38,
        'L' => 0x0e,
        'N' => 0x76,
        'O' => 0x7e,
        'P' => 0x67,
        'Q' => 0x73,
        'R' => 0x46,
        'S' => 0x5b,
        'T' => 0x0f,
        'U' => 0x3e,
        'V' => 0x3e,
        'Y' => 0x3b,
        'Z' => 0x6d,
        ',' | '.' => DOT,
        '°' => 0x63,
        _ => return None,
    };
    Some(pattern)
}

/// How dots are laid out on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPolicy {
    /// Every character takes a digit, dots included
    Regular,
    /// A dot lights the decimal point of the digit before it
    #[default]
    DotMuncher,
}

impl SegmentPolicy {
    /// Encode `text` under this policy
    pub fn encode(self, text: &str, notfound: Option<char>) -> Result<Vec<u8>> {
        Ok(match self {
            SegmentPolicy::Regular => regular(text, notfound)?.collect(),
            SegmentPolicy::DotMuncher => dot_muncher(text, notfound)?.collect(),
        })
    }
}

fn substitute(notfound: Option<char>) -> Result<Option<u8>> {
    match notfound {
        None => Ok(None),
        Some(ch) => lookup(ch).map(Some).ok_or(Error::UnknownSubstitute(ch)),
    }
}

/// One pattern per character
///
/// Characters without a pattern are replaced by the pattern of `notfound`, or
/// skipped when `notfound` is `None`.
pub fn regular(text: &str, notfound: Option<char>) -> Result<Regular<'_>> {
    Ok(Regular {
        chars: text.chars(),
        notfound: substitute(notfound)?,
    })
}

/// Like [`regular`], but `.` and `,` are merged into the previous pattern
pub fn dot_muncher(text: &str, notfound: Option<char>) -> Result<DotMuncher<'_>> {
    Ok(DotMuncher {
        chars: text.chars(),
        notfound: substitute(notfound)?,
        pending: None,
    })
}

/// Iterator returned by [`regular`]
#[derive(Debug, Clone)]
pub struct Regular<'a> {
    chars: Chars<'a>,
    notfound: Option<u8>,
}

impl Iterator for Regular<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            let ch = self.chars.next()?;
            if let Some(pattern) = lookup(ch).or(self.notfound) {
                return Some(pattern);
            }
        }
    }
}

/// Iterator returned by [`dot_muncher`]
#[derive(Debug, Clone)]
pub struct DotMuncher<'a> {
    chars: Chars<'a>,
    notfound: Option<u8>,
    // last pattern, held back until we know whether a dot follows
    pending: Option<u8>,
}

impl Iterator for DotMuncher<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            match self.chars.next() {
                None => return self.pending.take(),
                Some('.' | ',') => {
                    return Some(self.pending.take().map_or(DOT, |prev| prev | DOT));
                }
                Some(ch) => {
                    let Some(pattern) = lookup(ch).or(self.notfound) else {
                        continue;
                    };
                    if let Some(prev) = self.pending.replace(pattern) {
                        return Some(prev);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn munch(text: &str) -> Vec<u8> {
        dot_muncher(text, Some('_')).unwrap().collect()
    }

    #[test]
    fn regular_substitutes_unknown() {
        let out: Vec<u8> = regular("Hello world", Some('_')).unwrap().collect();
        assert_eq!(
            out,
            [0x37, 0x6f, 0x06, 0x06, 0x1d, 0x00, 0x08, 0x1d, 0x05, 0x06, 0x3d]
        );
    }

    #[test]
    fn regular_keeps_dots_in_their_own_digit() {
        let out: Vec<u8> = regular("127.0.0.1", None).unwrap().collect();
        assert_eq!(out, [0x30, 0x6d, 0x70, 0x80, 0x7e, 0x80, 0x7e, 0x80, 0x30]);
    }

    #[test]
    fn dot_merges_into_previous() {
        assert_eq!(munch("3.14159"), [0xF9, 0x30, 0x33, 0x30, 0x5b, 0x7b]);
        assert_eq!(munch("127.0.0.1"), [0x30, 0x6d, 0xF0, 0xFE, 0xFE, 0x30]);
    }

    #[test]
    fn trailing_dot() {
        assert_eq!(
            munch("  52590."),
            [0x00, 0x00, 0x5b, 0x6d, 0x5b, 0x7b, 0x6d, 0xFE]
        );
    }

    #[test]
    fn degree_sign() {
        assert_eq!(munch("29.12°C"), [0x6d, 0xFB, 0x30, 0x6d, 0x63, 0x4e]);
    }

    #[test]
    fn leading_and_double_dots_stand_alone() {
        assert_eq!(munch(".5"), [0x80, 0x5b]);
        assert_eq!(munch(".."), [0x80, 0x80]);
        assert_eq!(munch("1..2"), [0xB0, 0x80, 0x6d]);
    }

    #[test]
    fn comma_acts_as_dot() {
        assert_eq!(munch("1,5"), [0xB0, 0x5b]);
    }

    #[test]
    fn empty_text_is_empty() {
        assert_eq!(munch(""), Vec::<u8>::new());
        assert_eq!(regular("", None).unwrap().count(), 0);
    }

    #[test]
    fn unknown_is_substituted_or_dropped() {
        assert_eq!(munch("B&B"), [0x7f, 0x08, 0x7f]);
        let dropped: Vec<u8> = dot_muncher("B&B", None).unwrap().collect();
        assert_eq!(dropped, [0x7f, 0x7f]);
    }

    #[test]
    fn substitute_must_have_a_pattern() {
        assert!(matches!(
            regular("x", Some('&')),
            Err(Error::UnknownSubstitute('&'))
        ));
        assert!(dot_muncher("x", Some('&')).is_err());
    }

    #[test]
    fn policy_dispatch() {
        assert_eq!(SegmentPolicy::Regular.encode("1.", None).unwrap(), [0x30, 0x80]);
        assert_eq!(SegmentPolicy::DotMuncher.encode("1.", None).unwrap(), [0xB0]);
    }
}
