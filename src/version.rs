// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version ordering.
//!
//! CodeBit versions are opaque strings. They are never parsed into a rigid
//! grammar like SemVer. Instead, two versions are ordered through a
//! __mixed alphanumeric comparison__: contiguous runs of decimal digits, in
//! any script, are compared as unsigned integers of arbitrary length, and
//! everything else is compared character by character with case folded.
//!
//! This lets dotted numbers mix with alphabetic qualifiers and still sort
//! naturally, e.g., "1.30.5" is newer than "1.8.5", and "alpha24" is older than
//! "Lima10".
//!
//! # Superseded Behavior
//!
//! Older releases of the CodeBit tooling compared non-digit characters
//! case-sensitively. That behavior is superseded: "Beta" and "beta" are the
//! same qualifier here.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FmtResult},
    iter::Peekable,
    str::Chars,
};

// INVARIANT: Unicode assigns decimal digits (general category Nd) only in
//   contiguous runs of ten, in ascending order of value. Each entry is the
//   code point of a zero, sorted. Current as of Unicode 15.0.
const DECIMAL_ZEROS: [u32; 68] = [
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66,
    0x0BE6, 0x0C66, 0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040,
    0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0,
    0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0, 0xA9F0, 0xAA50, 0xABF0,
    0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0,
    0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50,
    0x11D50, 0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8,
    0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Compare two version strings.
///
/// Two cursors walk both strings from left to right. The first difference
/// decides the order. When one side runs out of characters while the other
/// still has some left, the exhausted side is the lesser one.
///
/// Digits are any Unicode decimal digits, so "١٠" (Arabic-Indic ten) is newer
/// than "5".
///
/// # Invariants
///
/// - Total order: `compare(a, b) == compare(b, a).reverse()`.
/// - Digit runs compare numerically, so "0001234" equals "1234".
pub fn compare(lhs: &str, rhs: &str) -> Ordering {
    let mut lhs = lhs.chars().peekable();
    let mut rhs = rhs.chars().peekable();

    loop {
        let (left, right) = match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(left), Some(right)) => (left, right),
        };

        let order = if decimal_value(left).is_some() && decimal_value(right).is_some() {
            let left = take_digits(&mut lhs);
            let right = take_digits(&mut rhs);
            compare_digits(&left, &right)
        } else {
            lhs.next();
            rhs.next();
            fold(left).cmp(fold(right))
        };

        if order != Ordering::Equal {
            return order;
        }
    }
}

/// Value of a Unicode decimal digit, if character is one.
fn decimal_value(ch: char) -> Option<u32> {
    let code = u32::from(ch);
    let index = DECIMAL_ZEROS.partition_point(|zero| *zero <= code);
    let zero = DECIMAL_ZEROS.get(index.checked_sub(1)?)?;
    let value = code - zero;

    (value < 10).then_some(value)
}

// INVARIANT: A digit facing a non-digit compares as its ASCII counterpart.
//   No non-digit sorts between '0' and '9', so every digit run lands on the
//   same side of any other character, regardless of script.
fn fold(ch: char) -> std::char::ToLowercase {
    decimal_value(ch)
        .and_then(|value| char::from_digit(value, 10))
        .unwrap_or(ch)
        .to_lowercase()
}

/// Consume the maximal run of decimal digits at the cursor as digit values.
fn take_digits(cursor: &mut Peekable<Chars<'_>>) -> Vec<u32> {
    let mut digits = Vec::new();
    while let Some(value) = cursor.peek().copied().and_then(decimal_value) {
        cursor.next();
        digits.push(value);
    }

    digits
}

/// Compare two digit runs as unbounded unsigned integers.
fn compare_digits(lhs: &[u32], rhs: &[u32]) -> Ordering {
    // INVARIANT: Leading zeros never carry weight.
    let lhs = strip_zeros(lhs);
    let rhs = strip_zeros(rhs);

    // INVARIANT: With zeros gone, more digits means a larger number. Equal
    //   length runs of digits order the same lexicographically and numerically.
    lhs.len().cmp(&rhs.len()).then_with(|| lhs.cmp(rhs))
}

fn strip_zeros(digits: &[u32]) -> &[u32] {
    let start = digits
        .iter()
        .position(|digit| *digit != 0)
        .unwrap_or(digits.len());

    &digits[start..]
}

/// Version string of a CodeBit.
///
/// Keeps the original text untouched for display, but orders and compares
/// through [`compare`]. Thus, `Version::from("1.01") == Version::from("1.1")`.
#[derive(Debug, Clone, Default)]
pub struct Version(String);

impl Version {
    /// Construct new version from raw text.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Treat version as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.0, &other.0)
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl From<String> for Version {
    fn from(version: String) -> Self {
        Self::new(version)
    }
}
