//! Scans over synthetic archives: classfiles are built with
//! `ristretto_classfile`'s writer and packed with `zip`, so the whole
//! pipeline from bytes to resolved edges runs for real.

use jarscope_core::{
    ArchiveKind, DependencyResolver, DependencyTarget, KnownProfile, Permissive, PrefixProfile,
};
use jarscope_scanner::Scanner;
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{
    BaseType, ClassAccessFlags, ClassFile, Field, FieldAccessFlags, FieldType, Version,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use zip::write::{SimpleFileOptions, ZipWriter};

fn class_bytes(internal_name: &str, references: &[&str], marker: Option<i64>) -> Vec<u8> {
    let mut class = ClassFile {
        version: Version::Java8 { minor: 0 },
        ..Default::default()
    };
    class.access_flags = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER;
    class.this_class = class.constant_pool.add_class(internal_name).unwrap();
    class.super_class = class.constant_pool.add_class("java/lang/Object").unwrap();
    for reference in references {
        class.constant_pool.add_class(reference).unwrap();
    }
    if let Some(value) = marker {
        let name_index = class.constant_pool.add_utf8("serialVersionUID").unwrap();
        let descriptor_index = class.constant_pool.add_utf8("J").unwrap();
        let attribute_name = class.constant_pool.add_utf8("ConstantValue").unwrap();
        let value_index = class.constant_pool.add_long(value).unwrap();
        class.fields.push(Field {
            access_flags: FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
            name_index,
            descriptor_index,
            field_type: FieldType::Base(BaseType::Long),
            attributes: vec![Attribute::ConstantValue {
                name_index: attribute_name,
                constant_value_index: value_index,
            }],
        });
    }
    let mut bytes = Vec::new();
    class.to_bytes(&mut bytes).unwrap();
    bytes
}

fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut jar = ZipWriter::new(file);
    for (name, bytes) in entries {
        jar.start_file(*name, SimpleFileOptions::default()).unwrap();
        jar.write_all(bytes).unwrap();
    }
    jar.finish().unwrap();
}

fn java_se() -> Vec<Box<dyn KnownProfile>> {
    vec![Box::new(PrefixProfile::java_se())]
}

#[test]
fn two_jars_resolve_into_a_clean_dependency() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("a.jar"),
        &[("com/x/A.class", class_bytes("com/x/A", &[], None))],
    );
    write_jar(
        &dir.path().join("b.jar"),
        &[("com/y/B.class", class_bytes("com/y/B", &["com/x/A"], None))],
    );

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    assert_eq!(outcome.set.len(), 2);

    let b = outcome.set.get(outcome.set.find("b.jar").unwrap());
    assert!(b.requires.contains("com.x.A"));
    assert!(b.provides.contains_key("com.y.B"));
    // Self-provided names never remain in requires.
    for (_, id) in outcome.set.top_level() {
        let model = outcome.set.get(id);
        assert!(model.requires.iter().all(|r| !model.provides.contains_key(r)));
        for unit in model.provides.keys() {
            assert!(outcome.index.providers(unit).contains(&model.name));
        }
    }
    // java.lang edges are absorbed by the profile.
    assert_eq!(
        b.package_dependencies["com.y"],
        ["com.x".to_string()].into_iter().collect()
    );
    assert!(b.profiles.contains("Java SE"));

    let resolver = DependencyResolver::new(&outcome.set, &profiles, &Permissive);
    let resolution = resolver.resolve_all();
    assert_eq!(
        resolution.depends_on["b.jar"],
        [DependencyTarget::Archive("a.jar".to_string())]
            .into_iter()
            .collect()
    );
    assert_eq!(
        resolution.dependants["a.jar"],
        ["b.jar".to_string()].into_iter().collect()
    );
}

#[test]
fn resource_only_jar_is_not_recognized() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("res.jar"),
        &[("banner.txt", b"hello".to_vec())],
    );

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    assert!(outcome.set.is_empty());
}

#[test]
fn malformed_units_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("mixed.jar"),
        &[
            ("com/x/Good.class", class_bytes("com/x/Good", &[], None)),
            ("com/x/Bad.class", b"definitely not a classfile".to_vec()),
        ],
    );

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    let jar = outcome.set.get(outcome.set.find("mixed.jar").unwrap());
    assert_eq!(jar.provides.len(), 1);
    assert!(jar.provides.contains_key("com.x.Good"));
}

#[test]
fn nested_jar_inside_an_ear_becomes_a_sub_archive() {
    let dir = tempdir().unwrap();

    let inner = dir.path().join("inner.jar");
    write_jar(
        &inner,
        &[("com/i/I.class", class_bytes("com/i/I", &[], None))],
    );
    let inner_bytes = std::fs::read(&inner).unwrap();
    std::fs::remove_file(&inner).unwrap();

    write_jar(&dir.path().join("app.ear"), &[("lib/inner.jar", inner_bytes)]);

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    let ear_id = outcome.set.find("app.ear").unwrap();
    let ear = outcome.set.get(ear_id);
    assert_eq!(ear.kind, ArchiveKind::Ear);
    assert_eq!(ear.sub_archives.len(), 1);

    let sub = outcome.set.get(ear.sub_archives[0]);
    assert_eq!(sub.name, "inner.jar");
    assert_eq!(sub.parent, Some(ear_id));
    // Sub-archives index independently of their container.
    assert!(outcome.index.providers("com.i.I").contains("inner.jar"));
    // Containers inherit the first sub-archive's format version.
    assert_eq!(ear.format_version, Some(52));
}

#[test]
fn manifest_version_lands_in_the_location() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("v.jar"),
        &[
            ("com/v/V.class", class_bytes("com/v/V", &[], None)),
            (
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\nImplementation-Version: 1.4\n".to_vec(),
            ),
        ],
    );

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    let jar = outcome.set.get(outcome.set.find("v.jar").unwrap());
    let location = jar.locations.iter().next().unwrap();
    assert_eq!(location.version.as_deref(), Some("1.4"));
    assert!(!jar.manifest.is_empty());
}

#[test]
fn blacklisted_references_are_recorded_separately() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("user.jar"),
        &[(
            "com/y/B.class",
            class_bytes("com/y/B", &["com/forbidden/Api"], None),
        )],
    );

    let profiles = java_se();
    let blacklist = vec!["com.forbidden.*".to_string()];
    let outcome = Scanner::new(&profiles, &blacklist).scan(&[dir.path().to_path_buf()]);
    let jar = outcome.set.get(outcome.set.find("user.jar").unwrap());
    assert_eq!(
        jar.blacklisted_dependencies["com.y"],
        ["com.forbidden".to_string()].into_iter().collect()
    );
    // The edge still shows in the ordinary package view.
    assert!(jar.package_dependencies["com.y"].contains("com.forbidden"));
}

#[test]
fn duplicate_archive_names_merge_into_one_model() {
    let dir = tempdir().unwrap();
    for sub in ["one", "two"] {
        let subdir = dir.path().join(sub);
        std::fs::create_dir(&subdir).unwrap();
        write_jar(
            &subdir.join("dup.jar"),
            &[("com/d/D.class", class_bytes("com/d/D", &[], None))],
        );
    }

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    assert_eq!(outcome.set.len(), 1);
    let jar = outcome.set.get(outcome.set.find("dup.jar").unwrap());
    assert_eq!(jar.locations.len(), 2);
}

#[test]
fn serialization_marker_is_captured_per_unit() {
    let dir = tempdir().unwrap();
    write_jar(
        &dir.path().join("ser.jar"),
        &[(
            "com/s/S.class",
            class_bytes("com/s/S", &[], Some(7_601_234)),
        )],
    );

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[dir.path().to_path_buf()]);
    let jar = outcome.set.get(outcome.set.find("ser.jar").unwrap());
    assert_eq!(jar.provides["com.s.S"], Some(7_601_234));
    assert_eq!(jar.format_version, Some(52));
}

#[test]
fn exploded_classes_directory_scans_as_an_archive() {
    let dir = tempdir().unwrap();
    let classes = dir.path().join("classes");
    std::fs::create_dir_all(classes.join("com/c")).unwrap();
    std::fs::write(
        classes.join("com/c/C.class"),
        class_bytes("com/c/C", &[], None),
    )
    .unwrap();

    let profiles = java_se();
    let outcome = Scanner::new(&profiles, &[]).scan(&[classes.clone()]);
    assert_eq!(outcome.set.len(), 1);
    let model = outcome.set.get(outcome.set.find("classes").unwrap());
    assert_eq!(model.kind, ArchiveKind::ClassesDir);
    assert!(model.provides.contains_key("com.c.C"));
}
