//! Grouping of ENDF-6 lines into `(MAT, MF, MT)` sections.
//!
//! Lines are grouped into consecutive runs sharing `(MAT, MF)`, further split on
//! `MT`. A line with `MT <= 0` (SEND, FEND, MEND, TEND or the tape header) closes
//! the current section. A section that runs to end of input without its SEND line
//! is still emitted, so truncation is reported by the section decoder.
//!
//! A line whose control columns do not decode is kept out of the grouping. It marks
//! the section it interrupts as defective; outside any section it is reported on
//! its own. Either way the other sections of the text are unaffected.
use tracing::warn;

use crate::{
    constants::{NSUB_NEUTRON, NSUB_PROTON},
    tabulated::reaction::Projectile,
};

use super::{fields::EndfLine, FormatError, Origin};

#[derive(Debug, Clone)]
pub(crate) struct Section {
    pub mat: i32,
    pub mf: i32,
    pub mt: i32,
    pub lines: Vec<EndfLine>,
    /// First undecodable line met inside the section.
    pub defect: Option<FormatError>,
}

pub(crate) fn group_sections(text: &str, origin: &Origin) -> Vec<Result<Section, FormatError>> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for (i, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = match EndfLine::parse(raw, i + 1, origin) {
            Ok(line) => line,
            Err(err) => {
                match current.as_mut() {
                    Some(section) => {
                        section.defect.get_or_insert(err);
                    }
                    None => sections.push(Err(err)),
                }
                continue;
            }
        };

        if line.mt <= 0 {
            sections.extend(current.take().map(Ok));
            continue;
        }

        match current.as_mut() {
            Some(section)
                if (section.mat, section.mf, section.mt) == (line.mat, line.mf, line.mt) =>
            {
                section.lines.push(line);
            }
            _ => {
                sections.extend(current.take().map(Ok));
                current = Some(Section {
                    mat: line.mat,
                    mf: line.mf,
                    mt: line.mt,
                    lines: vec![line],
                    defect: None,
                });
            }
        }
    }
    sections.extend(current.map(Ok));

    sections
}

/// Target metadata carried by `MF=1/MT=451`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MaterialInfo {
    pub projectile: Option<Projectile>,
    pub isomeric_state: Option<u32>,
}

/// Read `LISO` (line 2, field 4) and, for ENDF-6 formatted materials (`NFOR=6`),
/// `NSUB` (line 3, field 5). Undecodable metadata yields empty info, the naming
/// resolver then takes over.
pub(crate) fn material_info(section: &Section, origin: &Origin) -> MaterialInfo {
    let read = || -> Result<MaterialInfo, FormatError> {
        let Some(second) = section.lines.get(1) else {
            return Ok(MaterialInfo::default());
        };
        let liso = second.int(4, origin)?;
        let nfor = second.int(6, origin)?;

        let projectile = match (nfor, section.lines.get(2)) {
            (6, Some(third)) => match third.int(5, origin)? {
                NSUB_NEUTRON => Some(Projectile::Neutron),
                NSUB_PROTON => Some(Projectile::Proton),
                _ => None,
            },
            _ => None,
        };

        Ok(MaterialInfo {
            projectile,
            isomeric_state: u32::try_from(liso).ok(),
        })
    };

    read().unwrap_or_else(|err| {
        warn!(mat = section.mat, error = %err, "ignoring undecodable MF=1/MT=451 header");
        MaterialInfo::default()
    })
}
