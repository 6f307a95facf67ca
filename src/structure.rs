//! Shape validation: fixed-length segments of digits, letters or alphanumerics.
//!
//! Layouts are written in the notation of the SWIFT IBAN registry, e.g.
//! `4!a6!n8!n` for a British BBAN: four letters, then six digits, then eight digits.

use std::fmt;
use std::str::FromStr;

use nom::character::complete::{char, digit1, one_of};
use nom::combinator::{all_consuming, map_opt, map_res};
use nom::multi::many1;
use nom::sequence::{terminated, tuple};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::validation::{ErrorCode, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    Letter,
    Alphanumeric,
}

impl CharClass {
    pub fn matches(self, b: u8) -> bool {
        match self {
            CharClass::Digit => b.is_ascii_digit(),
            CharClass::Letter => b.is_ascii_uppercase(),
            CharClass::Alphanumeric => b.is_ascii_digit() || b.is_ascii_uppercase(),
        }
    }

    fn from_notation(c: char) -> Option<Self> {
        match c {
            'n' => Some(CharClass::Digit),
            'a' => Some(CharClass::Letter),
            'c' => Some(CharClass::Alphanumeric),
            _ => None,
        }
    }

    fn notation(self) -> char {
        match self {
            CharClass::Digit => 'n',
            CharClass::Letter => 'a',
            CharClass::Alphanumeric => 'c',
        }
    }

    fn describe(self) -> &'static str {
        match self {
            CharClass::Digit => "digits",
            CharClass::Letter => "letters",
            CharClass::Alphanumeric => "letters or digits",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub offset: usize,
    pub length: usize,
    pub class: CharClass,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LayoutParseError {
    #[error("invalid layout notation `{0}`")]
    InvalidNotation(String),

    #[error("layout segments must not be empty")]
    EmptySegment,

    #[error("segment at offset {found} should start at offset {expected}")]
    NonContiguous { expected: usize, found: usize },

    #[error("layout segments add up to more than {} characters", usize::MAX)]
    TooLong,
}

/// Ordered, contiguous segments covering a whole identifier body.
#[derive(Clone, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct SegmentLayout {
    segments: Vec<Segment>,
    length: usize,
}

impl SegmentLayout {
    /// Builds a layout from `(length, class)` pairs laid end to end.
    pub fn new(parts: &[(usize, CharClass)]) -> Result<Self, LayoutParseError> {
        let mut offset = 0;
        let mut segments = Vec::with_capacity(parts.len());
        for &(length, class) in parts {
            segments.push(Segment {
                offset,
                length,
                class,
            });
            offset = offset
                .checked_add(length)
                .ok_or(LayoutParseError::TooLong)?;
        }
        Self::from_segments(segments)
    }

    /// Builds a layout from explicit segments, which must be non-empty and
    /// follow each other without gaps or overlaps starting at offset 0.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, LayoutParseError> {
        let mut expected = 0;
        for segment in &segments {
            if segment.length == 0 {
                return Err(LayoutParseError::EmptySegment);
            }
            if segment.offset != expected {
                return Err(LayoutParseError::NonContiguous {
                    expected,
                    found: segment.offset,
                });
            }
            expected = expected
                .checked_add(segment.length)
                .ok_or(LayoutParseError::TooLong)?;
        }
        Ok(Self {
            segments,
            length: expected,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_length(&self) -> usize {
        self.length
    }

    /// Checks the length of `canonical` first, then every character against the
    /// class of its segment. Stops at the first violation.
    pub fn check(&self, canonical: &str) -> Result<(), ValidationError> {
        let expected = self.total_length();
        if canonical.len() != expected {
            return Err(ValidationError::new(
                ErrorCode::InvalidLength,
                format!(
                    "expected {expected} characters, found {}",
                    canonical.len()
                ),
            ));
        }
        let bytes = canonical.as_bytes();
        for (idx, segment) in self.segments.iter().enumerate() {
            let end = segment.offset + segment.length;
            if !bytes[segment.offset..end]
                .iter()
                .all(|b| segment.class.matches(*b))
            {
                return Err(ValidationError::new(
                    ErrorCode::InvalidFormat,
                    format!(
                        "segment {} (positions {}-{}) must contain only {}",
                        idx + 1,
                        segment.offset + 1,
                        end,
                        segment.class.describe()
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn parse_segment(input: &str) -> IResult<&str, (usize, CharClass)> {
    tuple((
        terminated(map_res(digit1, usize::from_str), char('!')),
        map_opt(one_of("nac"), CharClass::from_notation),
    ))(input)
}

impl FromStr for SegmentLayout {
    type Err = LayoutParseError;

    fn from_str(notation: &str) -> Result<Self, Self::Err> {
        let (_, parts) = all_consuming(many1(parse_segment))(notation)
            .map_err(|_| LayoutParseError::InvalidNotation(notation.to_owned()))?;
        SegmentLayout::new(&parts)
    }
}

impl fmt::Display for SegmentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}!{}", segment.length, segment.class.notation())?;
        }
        Ok(())
    }
}
