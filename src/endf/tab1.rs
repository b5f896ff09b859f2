//! Decoding of `MF=3` TAB1 sections.
//!
//! Layout of an `MF=3/MT=n` section:
//!
//! ```text
//! line 1          ZA  AWR   0    0    0    0        HEAD
//! line 2          QM  QI    0    LR   NR   NP       TAB1 control
//! ceil(2NR/6)     NBT(1) INT(1) NBT(2) INT(2) ...   interpolation table
//! ceil(2NP/6)     E(1) sigma(1) E(2) sigma(2) ...   data points
//! ```
//!
//! `ZA` packs the target as `Z*1000 + A` (`A = 0` for a natural element).
use itertools::Itertools;

use crate::{
    constants::{AtomicNumber, MassNumber, ENDF_FIELDS_PER_LINE},
    tabulated::TabulatedFunction,
};

use super::{fields::EndfLine, sections::Section, FormatError, Origin};

#[derive(Debug, Clone)]
pub(crate) struct Tab1 {
    pub z: AtomicNumber,
    pub a: MassNumber,
    pub function: TabulatedFunction,
}

/// Split a packed `ZA`. Rejects non-integral values and `Z = 0`.
pub fn split_za(za: f64) -> Option<(AtomicNumber, MassNumber)> {
    let rounded = za.round();
    if (za - rounded).abs() > 1e-6 || rounded < 1000.0 || rounded > u32::MAX as f64 {
        return None;
    }
    let za = rounded as u32;
    Some((za / 1000, za % 1000))
}

/// Read `count` consecutive numbers starting at the first field of `lines[0]`.
fn read_numbers<T>(
    lines: &[EndfLine],
    count: usize,
    read: impl Fn(&EndfLine, usize) -> Result<T, FormatError>,
) -> Result<Vec<T>, FormatError> {
    (0..count)
        .map(|k| {
            let line = &lines[k / ENDF_FIELDS_PER_LINE];
            read(line, k % ENDF_FIELDS_PER_LINE + 1)
        })
        .collect()
}

pub(crate) fn decode_tab1(section: &Section, origin: &Origin) -> Result<Tab1, FormatError> {
    let lines = &section.lines;
    let truncated = |expected: usize| FormatError::TruncatedSection {
        origin: origin.clone(),
        expected,
        found: lines.len(),
    };

    let [head, control, ..] = lines.as_slice() else {
        return Err(truncated(2));
    };

    let za = head.float(1, origin)?;
    let (z, a) = split_za(za).ok_or_else(|| FormatError::InvalidField {
        origin: origin.clone(),
        line: head.line_no,
        field: 1,
        text: head.field(1).trim().to_string(),
    })?;

    let nr = control.int(5, origin)?;
    let np = control.int(6, origin)?;
    if nr < 1 || np < 2 {
        return Err(FormatError::InvalidCounts {
            origin: origin.clone(),
            nr,
            np,
        });
    }
    let (nr, np) = (nr as usize, np as usize);

    let interp_lines = (2 * nr).div_ceil(ENDF_FIELDS_PER_LINE);
    let data_lines = (2 * np).div_ceil(ENDF_FIELDS_PER_LINE);
    let expected = 2 + interp_lines + data_lines;
    if lines.len() < expected {
        return Err(truncated(expected));
    }

    let interp_block = &lines[2..2 + interp_lines];
    let data_block = &lines[2 + interp_lines..expected];

    let regions: Vec<(i64, i64)> =
        read_numbers(interp_block, 2 * nr, |line, n| line.int(n, origin))?
            .into_iter()
            .tuples()
            .collect();
    let pairs: Vec<(f64, f64)> =
        read_numbers(data_block, 2 * np, |line, n| line.float(n, origin))?
            .into_iter()
            .tuples()
            .collect();

    let function = TabulatedFunction::new(pairs, regions, origin)?;
    Ok(Tab1 { z, a, function })
}
