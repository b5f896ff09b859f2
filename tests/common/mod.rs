#![allow(dead_code)]

use std::io::Write;

use approx::assert_relative_eq;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::{write::GzEncoder, Compression};

/// ENDF compact float, right-aligned on 11 columns (`1.000000-5`).
pub fn endf_float(value: f64) -> String {
    let scientific = format!("{value:.6e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("scientific notation");
    let exponent: i32 = exponent.parse().expect("integer exponent");
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{:>11}", format!("{mantissa}{sign}{}", exponent.abs()))
}

pub fn endf_int(value: i64) -> String {
    format!("{value:>11}")
}

/// One 80-column line from up to six pre-formatted fields.
pub fn endf_line(fields: &[String], mat: i32, mf: i32, mt: i32, seq: usize) -> String {
    let body: String = fields.concat();
    format!("{body:<66}{mat:>4}{mf:>2}{mt:>3}{seq:>5}")
}

fn chunked_lines(fields: Vec<String>, mat: i32, mf: i32, mt: i32, seq: &mut usize) -> Vec<String> {
    fields
        .chunks(6)
        .map(|chunk| {
            *seq += 1;
            endf_line(chunk, mat, mf, mt, *seq)
        })
        .collect()
}

/// A complete `MF=3` section, SEND line included.
pub fn tab1_section(
    mat: i32,
    mt: i32,
    za: f64,
    regions: &[(i64, i64)],
    points: &[(f64, f64)],
) -> Vec<String> {
    let mut seq = 0;
    let mut lines = chunked_lines(
        vec![
            endf_float(za),
            endf_float(za / 1000.0 * 0.99),
            endf_int(0),
            endf_int(0),
            endf_int(0),
            endf_int(0),
        ],
        mat,
        3,
        mt,
        &mut seq,
    );
    lines.extend(chunked_lines(
        vec![
            endf_float(0.0),
            endf_float(0.0),
            endf_int(0),
            endf_int(0),
            endf_int(regions.len() as i64),
            endf_int(points.len() as i64),
        ],
        mat,
        3,
        mt,
        &mut seq,
    ));
    lines.extend(chunked_lines(
        regions
            .iter()
            .flat_map(|&(nbt, int)| [endf_int(nbt), endf_int(int)])
            .collect(),
        mat,
        3,
        mt,
        &mut seq,
    ));
    lines.extend(chunked_lines(
        points
            .iter()
            .flat_map(|&(e, sigma)| [endf_float(e), endf_float(sigma)])
            .collect(),
        mat,
        3,
        mt,
        &mut seq,
    ));
    lines.push(endf_line(&[], mat, 3, 0, 99999));
    lines
}

/// `MF=1/MT=451` header giving the sublibrary (`NSUB`) and isomeric state (`LISO`).
pub fn description_section(mat: i32, za: f64, nsub: i64, liso: i64) -> Vec<String> {
    let mut seq = 0;
    let mut lines = chunked_lines(
        vec![
            endf_float(za),
            endf_float(za / 1000.0 * 0.99),
            endf_int(-1),
            endf_int(0),
            endf_int(0),
            endf_int(0),
        ],
        mat,
        1,
        451,
        &mut seq,
    );
    lines.extend(chunked_lines(
        vec![
            endf_float(0.0),
            endf_float(0.0),
            endf_int(0),
            endf_int(liso),
            endf_int(0),
            endf_int(6),
        ],
        mat,
        1,
        451,
        &mut seq,
    ));
    lines.extend(chunked_lines(
        vec![
            endf_float(1.0),
            endf_float(2.0e7),
            endf_int(0),
            endf_int(0),
            endf_int(nsub),
            endf_int(8),
        ],
        mat,
        1,
        451,
        &mut seq,
    ));
    lines.push(endf_line(&[], mat, 1, 0, 99999));
    lines.push(endf_line(&[], mat, 0, 0, 0));
    lines
}

/// A tape: header line, the given sections of one material, FEND, MEND, TEND.
pub fn tape(mat: i32, sections: &[Vec<String>]) -> String {
    let mut lines = vec![endf_line(&[" endfxs test tape".to_string()], 1, 0, 0, 0)];
    for section in sections {
        lines.extend(section.iter().cloned());
    }
    lines.push(endf_line(&[], mat, 0, 0, 0));
    lines.push(endf_line(&[], 0, 0, 0, 0));
    lines.push(endf_line(&[], -1, 0, 0, 0));
    lines.join("\n") + "\n"
}

/// Li-6 neutron sublibrary content: elastic, (n,t) and capture.
pub fn li6_tape() -> String {
    tape(
        325,
        &[
            tab1_section(
                325,
                2,
                3006.0,
                &[(3, 2)],
                &[(1e-5, 0.7), (1.0, 0.75), (2e7, 1.2)],
            ),
            tab1_section(
                325,
                105,
                3006.0,
                &[(2, 5), (5, 2)],
                &[(1e-5, 4.8e4), (1.0, 150.0), (1e5, 1.0), (1e5, 1.1), (2e7, 0.03)],
            ),
            tab1_section(
                325,
                102,
                3006.0,
                &[(2, 5)],
                &[(1e-5, 2.0), (2e7, 1e-5)],
            ),
        ],
    )
}

pub fn write_file(dir: &Utf8Path, name: &str, content: &[u8]) -> Utf8PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(&path, content).expect("write test file");
    path
}

pub fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// A tar archive holding `(member name, content)` in order.
pub fn tar_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *content)
            .expect("tar append");
    }
    builder.into_inner().expect("tar finish")
}

pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = Utf8Path::from_path(dir.path())
        .expect("UTF-8 temporary directory")
        .to_path_buf();
    (dir, path)
}

pub fn assert_sigma_close(actual: f64, expected: f64) {
    assert_relative_eq!(actual, expected, max_relative = 1e-9);
}
