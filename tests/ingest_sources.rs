mod common;

use common::{
    description_section, endf_line, gzip, li6_tape, tab1_section, tape, tar_archive, temp_dir,
    write_file,
};
use endfxs::{
    catalog::diagnostics::ReactionQuery, FormatError, IngestSource, Projectile, TargetId,
    XsConfig, XsError, XsLibrary,
};

fn library() -> XsLibrary {
    XsLibrary::new(XsConfig::default().with_source_version("ENDF/B-VIII.0")).unwrap()
}

fn li6() -> TargetId {
    TargetId::new(3, 6, 0, Projectile::Neutron)
}

#[test]
fn test_ingest_plain_and_gzip_files() {
    let (_guard, dir) = temp_dir();
    let plain = write_file(&dir, "n-003_Li_006.endf", li6_tape().as_bytes());
    let fe56 = tape(
        2631,
        &[tab1_section(2631, 4, 26056.0, &[(2, 2)], &[(5.4e6, 0.0), (2e8, 0.3)])],
    );
    let compressed = write_file(&dir, "p-026_Fe_056.endf.gz", &gzip(fe56.as_bytes()));

    let library = library();
    let summary = library
        .ingest_descriptors(&[plain.as_str(), compressed.as_str()])
        .unwrap();
    assert_eq!(summary.records, 4);
    assert_eq!(summary.replaced, 0);
    assert_eq!(summary.sources, 2);
    assert_eq!(summary.generation, 1);

    let catalog = library.catalog();
    let fe = catalog
        .get(&TargetId::new(26, 56, 0, Projectile::Proton).with_mt(4))
        .unwrap();
    assert_eq!(fe.reaction_label, "p,n");
    assert_eq!(fe.source_version, "ENDF/B-VIII.0");
    assert_eq!(fe.function.e_max(), 2e8);

    let nt = library
        .resolve(&ReactionQuery::by_label(li6(), "n,t"))
        .unwrap();
    assert_eq!(nt.function.len(), 5);
    assert_eq!(nt.origin, plain.as_str());
}

#[test]
fn test_ingest_archive_in_member_order() {
    let (_guard, dir) = temp_dir();
    let first = li6_tape();
    let second = tape(
        325,
        &[tab1_section(325, 2, 3006.0, &[(2, 2)], &[(1e-5, 9.0), (2e7, 9.0)])],
    );
    let update = gzip(second.as_bytes());
    let archive = tar_archive(&[
        ("neutrons/n-003_Li_006.endf", first.as_bytes()),
        ("README", b"not data".as_slice()),
        ("neutrons/updates/n-003_Li_006.endf.gz", update.as_slice()),
    ]);
    let path = write_file(&dir, "endfb8.tgz", &gzip(&archive));

    let library = library();
    let summary = library
        .ingest(&[IngestSource::try_from(path.as_str()).unwrap()])
        .unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.replaced, 1);

    let elastic = library.catalog().get(&li6().with_mt(2)).unwrap();
    assert_eq!(elastic.function.points()[0].sigma_b, 9.0);
    assert_eq!(
        elastic.origin,
        format!("{path}!neutrons/updates/n-003_Li_006.endf.gz")
    );
}

#[test]
fn test_ingest_directory_and_json() {
    let (_guard, dir) = temp_dir();
    write_file(&dir, "neutrons/n-003_Li_006.endf", li6_tape().as_bytes());
    write_file(&dir, "neutrons/notes.md", b"# not data");
    write_file(
        &dir,
        "extra/am242m.jsonl",
        br#"{"Z": 95, "A": 242, "state": 1, "projectile": "n", "mt": 18, "points": [{"point_index": 1, "e_eV": 1e-5, "sigma_b": 6000.0}, {"point_index": 2, "e_eV": 2e7, "sigma_b": 2.0}], "interp": [{"nbt": 2, "int_law": 5}], "source_version": "JEFF-3.3"}
"#,
    );

    let library = library();
    let summary = library
        .ingest_descriptors(&[format!("dir:{dir}").as_str()])
        .unwrap();
    assert_eq!(summary.records, 4);

    let fission = library
        .resolve(&ReactionQuery::by_label(
            TargetId::new(95, 242, 1, Projectile::Neutron),
            "n,f",
        ))
        .unwrap();
    assert_eq!(fission.reaction_label, "n,fission");
    assert_eq!(fission.source_version, "JEFF-3.3");
}

#[test]
fn test_description_header_sets_projectile_and_state() {
    let (_guard, dir) = temp_dir();
    let text = tape(
        9547,
        &[
            description_section(9547, 95242.0, 10, 1),
            tab1_section(9547, 102, 95242.0, &[(2, 2)], &[(1e-5, 1e3), (2e7, 1e-3)]),
        ],
    );
    // nothing in the name says neutron or isomer
    let path = write_file(&dir, "am242.endf", text.as_bytes());

    let library = library();
    let summary = library.ingest_descriptors(&[path.as_str()]).unwrap();
    assert_eq!(summary.records, 1);
    assert_eq!(summary.sections_skipped, 0);

    let capture = library
        .catalog()
        .get(&TargetId::new(95, 242, 1, Projectile::Neutron).with_mt(102));
    assert!(capture.is_some());
}

#[test]
fn test_accented_description_keeps_every_reaction() {
    let (_guard, dir) = temp_dir();
    let mut description = description_section(325, 3006.0, 10, 0);
    let send = description.len() - 2;
    description.insert(
        send,
        endf_line(&[" Evaluated by J. Müller, Université de Liège".to_string()], 325, 1, 451, 4),
    );
    let text = tape(
        325,
        &[
            description,
            tab1_section(325, 2, 3006.0, &[(2, 2)], &[(1e-5, 0.7), (2e7, 1.2)]),
            tab1_section(325, 105, 3006.0, &[(2, 5)], &[(1e-5, 4.8e4), (2e7, 0.03)]),
            tab1_section(325, 102, 3006.0, &[(2, 5)], &[(1e-5, 2.0), (2e7, 1e-5)]),
        ],
    );
    let path = write_file(&dir, "li6-evaluation.endf", text.as_bytes());

    let library = library();
    let summary = library.ingest_descriptors(&[path.as_str()]).unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.sections_skipped, 0);
    for mt in [2, 102, 105] {
        assert!(library.catalog().get(&li6().with_mt(mt)).is_some(), "MT={mt}");
    }
}

#[test]
fn test_json_reaction_label_is_resolvable() {
    let (_guard, dir) = temp_dir();
    write_file(
        &dir,
        "li6-photons.jsonl",
        br#"{"Z": 3, "A": 6, "projectile": "n", "mt": 5, "reaction": "n,x(gamma)", "points": [{"point_index": 1, "e_eV": 1e6, "sigma_b": 0.1}, {"point_index": 2, "e_eV": 2e7, "sigma_b": 0.2}], "interp": [{"nbt": 2, "int_law": 2}]}
{"Z": 3, "A": 6, "projectile": "n", "mt": 102, "points": [{"point_index": 1, "e_eV": 1e-5, "sigma_b": 2.0}, {"point_index": 2, "e_eV": 2e7, "sigma_b": 1e-5}], "interp": [{"nbt": 2, "int_law": 5}]}
"#,
    );

    let library = library();
    library
        .ingest_descriptors(&[format!("jsonl:{dir}/li6-photons.jsonl").as_str()])
        .unwrap();

    let photons = library
        .resolve(&ReactionQuery::by_label(li6(), "N,X(Gamma)"))
        .unwrap();
    assert_eq!(photons.key.mt, 5);
    assert_eq!(photons.reaction_label, "n,x(gamma)");
    let both = library
        .resolve(&ReactionQuery::by_mt_and_label(li6(), 5, "n,x(gamma)"))
        .unwrap();
    assert_eq!(both, photons);

    let capture = library
        .resolve(&ReactionQuery::by_label(li6(), "n,gamma"))
        .unwrap();
    assert_eq!(capture.key.mt, 102);
}

#[test]
fn test_failed_ingestion_keeps_the_active_catalog() {
    let (_guard, dir) = temp_dir();
    let good = write_file(&dir, "n-003_Li_006.endf", li6_tape().as_bytes());
    let library = library();
    library.ingest_descriptors(&[good.as_str()]).unwrap();

    let broken = tape(
        325,
        &[
            tab1_section(325, 16, 3006.0, &[(3, 2)], &[(1.0, 1.0), (3.0, 1.0), (2.0, 1.0)]),
            tab1_section(325, 17, 3006.0, &[(2, 2)], &[(1.0, 1.0), (2.0, 1.0)]),
        ],
    );
    let bad = write_file(&dir, "n-003_Li_006_bad.endf", broken.as_bytes());
    let unnamed = write_file(&dir, "li6.endf", li6_tape().as_bytes());

    let err = library
        .ingest_descriptors(&[good.as_str(), bad.as_str(), unnamed.as_str()])
        .unwrap_err();
    let XsError::CatalogRejected(failures) = err else {
        panic!("expected a rejected build, got {err:?}");
    };
    assert_eq!(failures.len(), 4);
    assert!(matches!(
        failures[0],
        FormatError::NonMonotonicGrid { index: 3, .. }
    ));
    assert!(failures[1..]
        .iter()
        .all(|f| matches!(f, FormatError::UnresolvedProjectile { .. })));

    // previous generation still served
    assert_eq!(library.store().generation(), 1);
    assert_eq!(library.catalog().len(), 3);
    assert!(library.catalog().get(&li6().with_mt(17)).is_none());
}

#[test]
fn test_decode_reports_without_building() {
    let (_guard, dir) = temp_dir();
    let text = tape(
        325,
        &[
            tab1_section(325, 2, 3006.0, &[(2, 2)], &[(1e-5, 1.0), (2e7, 1.0)]),
            tab1_section(325, 102, 3006.0, &[(2, 7)], &[(1e-5, 1.0), (2e7, 1.0)]),
        ],
    );
    let path = write_file(&dir, "n-003_Li_006.endf", text.as_bytes());

    let library = library();
    let batch = library
        .decode(&[IngestSource::try_from(path.as_str()).unwrap()])
        .unwrap();
    assert_eq!(batch.records.len(), 2);
    assert!(batch.records[0].is_ok());
    assert_eq!(batch.failures().count(), 1);
    assert!(library.catalog().is_empty());
}

#[test]
fn test_missing_source_is_an_io_error() {
    let err = library()
        .ingest_descriptors(&["endf:/nonexistent/n-001_H_001.endf"])
        .unwrap_err();
    assert!(matches!(err, XsError::IoError(_)));
}
