//! # ENDF-6 fixed-width fields
//!
//! ENDF-6 lines are 80 columns wide: six 11-character data fields, then the
//! control columns `MAT` (67-70), `MF` (71-72), `MT` (73-75) and a sequence number.
//!
//! ## Number syntax
//! -----------------
//! Floats are written in a compact form where the **exponent sign is the
//! separator**: `1.234+5` is `1.234e5`, `2.303070-4` is `2.30307e-4`. A bare
//! trailing dot (`6000.`) is an integer-valued float. The usual `e`/`E`/`d`/`D`
//! exponent markers are accepted as well. Integers are plain digit strings with an
//! optional sign. A field made only of blanks decodes to zero.
//!
//! Parsing is done with `nom` on the trimmed field and must consume it entirely.
use std::ops::Range;

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    sequence::preceded,
    IResult, Parser,
};

use crate::constants::{
    ENDF_FIELDS_PER_LINE, ENDF_FIELD_WIDTH, ENDF_LINE_WIDTH, MAT_COLUMNS, MF_COLUMNS, MT_COLUMNS,
};

use super::{FormatError, Origin};

fn mantissa(input: &str) -> IResult<&str, &str> {
    recognize((
        opt(one_of("+-")),
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
    ))
    .parse(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    alt((
        preceded(one_of("eEdD"), recognize((opt(one_of("+-")), digit1))),
        recognize((one_of("+-"), digit1)),
    ))
    .parse(input)
}

fn endf_float(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    all_consuming((mantissa, opt(exponent))).parse(input)
}

fn endf_int(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize((opt(one_of("+-")), digit1))).parse(input)
}

/// Decode one ENDF float field. `None` if the text is not a finite ENDF number.
pub fn parse_endf_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    let (_, (mantissa, exponent)) = endf_float(text).ok()?;
    let value: f64 = match exponent {
        Some(exp) => format!("{mantissa}e{exp}").parse().ok()?,
        None => mantissa.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Decode one ENDF integer field. `None` if the text is not an integer.
pub fn parse_endf_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    let (_, digits) = endf_int(text).ok()?;
    digits.parse().ok()
}

/// Byte range of the character columns `columns` in `text`.
fn column_bytes(text: &str, columns: Range<usize>) -> Range<usize> {
    let byte = |column: usize| {
        text.char_indices()
            .nth(column)
            .map_or(text.len(), |(offset, _)| offset)
    };
    byte(columns.start)..byte(columns.end)
}

/// One padded ENDF-6 line with its decoded control columns.
///
/// Columns are counted in characters: free-text lines (`MF=1` comments) may carry
/// non-ASCII names without shifting the control columns.
#[derive(Debug, Clone)]
pub(crate) struct EndfLine {
    text: String,
    ascii: bool,
    /// 1-based line number in the source.
    pub line_no: usize,
    pub mat: i32,
    pub mf: i32,
    pub mt: i32,
}

impl EndfLine {
    /// Pad `raw` to 80 columns and decode `MAT`/`MF`/`MT`.
    pub fn parse(raw: &str, line_no: usize, origin: &Origin) -> Result<Self, FormatError> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let text = format!("{raw:<width$}", width = ENDF_LINE_WIDTH);
        let ascii = text.is_ascii();

        let control = |columns: Range<usize>, field: usize| {
            let slice = if ascii {
                &text[columns]
            } else {
                &text[column_bytes(&text, columns)]
            };
            parse_endf_int(slice)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| FormatError::InvalidField {
                    origin: origin.clone(),
                    line: line_no,
                    field,
                    text: slice.to_string(),
                })
        };

        let mat = control(MAT_COLUMNS, 7)?;
        let mf = control(MF_COLUMNS, 8)?;
        let mt = control(MT_COLUMNS, 9)?;

        Ok(EndfLine {
            text,
            ascii,
            line_no,
            mat,
            mf,
            mt,
        })
    }

    /// Raw text of the 1-based data field `n` (`1..=6`).
    pub fn field(&self, n: usize) -> &str {
        debug_assert!((1..=ENDF_FIELDS_PER_LINE).contains(&n));
        let start = (n - 1) * ENDF_FIELD_WIDTH;
        let columns = start..start + ENDF_FIELD_WIDTH;
        if self.ascii {
            &self.text[columns]
        } else {
            &self.text[column_bytes(&self.text, columns)]
        }
    }

    pub fn float(&self, n: usize, origin: &Origin) -> Result<f64, FormatError> {
        parse_endf_float(self.field(n)).ok_or_else(|| self.invalid(n, origin))
    }

    pub fn int(&self, n: usize, origin: &Origin) -> Result<i64, FormatError> {
        parse_endf_int(self.field(n)).ok_or_else(|| self.invalid(n, origin))
    }

    fn invalid(&self, n: usize, origin: &Origin) -> FormatError {
        FormatError::InvalidField {
            origin: origin.clone(),
            line: self.line_no,
            field: n,
            text: self.field(n).trim().to_string(),
        }
    }
}
