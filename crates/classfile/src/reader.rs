//! Thin wrapper around `ristretto_classfile` that reduces a classfile to a
//! [`CompiledUnitFact`].

use crate::{CompiledUnitFact, Result};
use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassFile, Constant, FieldType};
use std::collections::BTreeSet;
use std::io::Cursor;

/// Parse one compiled unit.
///
/// Referenced names are gathered from every `Class` constant-pool entry,
/// from the descriptors of declared fields and methods, from `NameAndType`
/// and `MethodType` descriptors, and from runtime annotation types. The
/// result is deduplicated and in dotted form.
pub fn read(bytes: &[u8]) -> Result<CompiledUnitFact> {
    let class = ClassFile::from_bytes(&mut Cursor::new(bytes.to_vec()))?;

    let qualified_name = class.class_name()?.replace('/', ".");
    let format_version = class.version.major();

    let mut referenced = BTreeSet::new();

    for constant in class.constant_pool.iter() {
        match constant {
            Constant::Class(name_index) => {
                let name = class.constant_pool.try_get_utf8(*name_index)?;
                collect_internal_name(name, &mut referenced);
            }
            Constant::NameAndType {
                descriptor_index, ..
            } => {
                let descriptor = class.constant_pool.try_get_utf8(*descriptor_index)?;
                collect_descriptor(descriptor, &mut referenced);
            }
            Constant::MethodType(descriptor_index) => {
                let descriptor = class.constant_pool.try_get_utf8(*descriptor_index)?;
                collect_descriptor(descriptor, &mut referenced);
            }
            _ => {}
        }
    }

    let mut serialization_marker = None;

    for field in &class.fields {
        collect_field_type(&field.field_type, &mut referenced);
        collect_annotations(&class, &field.attributes, &mut referenced)?;

        let field_name = class.constant_pool.try_get_utf8(field.name_index)?;
        if field_name == "serialVersionUID" {
            for attribute in &field.attributes {
                if let Attribute::ConstantValue {
                    constant_value_index,
                    ..
                } = attribute
                {
                    if let Some(Constant::Long(value)) =
                        class.constant_pool.get(*constant_value_index)
                    {
                        serialization_marker = Some(*value);
                    }
                }
            }
        }
    }

    for method in &class.methods {
        let descriptor = class.constant_pool.try_get_utf8(method.descriptor_index)?;
        let (params, ret) = FieldType::parse_method_descriptor(descriptor)?;
        for param in &params {
            collect_field_type(param, &mut referenced);
        }
        if let Some(ret) = ret {
            collect_field_type(&ret, &mut referenced);
        }
        collect_annotations(&class, &method.attributes, &mut referenced)?;
    }

    collect_annotations(&class, &class.attributes, &mut referenced)?;

    Ok(CompiledUnitFact {
        qualified_name,
        referenced_names: referenced,
        serialization_marker,
        format_version,
    })
}

fn collect_annotations(
    class: &ClassFile,
    attributes: &[Attribute],
    into: &mut BTreeSet<String>,
) -> Result<()> {
    for attribute in attributes {
        let annotations = match attribute {
            Attribute::RuntimeVisibleAnnotations { annotations, .. } => annotations,
            Attribute::RuntimeInvisibleAnnotations { annotations, .. } => annotations,
            _ => continue,
        };
        for annotation in annotations {
            let descriptor = class.constant_pool.try_get_utf8(annotation.type_index)?;
            collect_descriptor(descriptor, into);
        }
    }
    Ok(())
}

/// An internal name is either a plain `com/x/Foo` or, for array classes,
/// a descriptor like `[Lcom/x/Foo;`.
fn collect_internal_name(name: &str, into: &mut BTreeSet<String>) {
    if name.starts_with('[') {
        collect_descriptor(name, into);
    } else {
        into.insert(name.replace('/', "."));
    }
}

/// Pulls every `L...;` object type out of a field or method descriptor.
/// Primitive and array markers carry no name and are skipped.
fn collect_descriptor(descriptor: &str, into: &mut BTreeSet<String>) {
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        let Some(end) = rest[start..].find(';') else {
            return;
        };
        into.insert(rest[start + 1..start + end].replace('/', "."));
        rest = &rest[start + end + 1..];
    }
}

fn collect_field_type(field_type: &FieldType, into: &mut BTreeSet<String>) {
    match field_type {
        FieldType::Object(name) => {
            into.insert(name.replace('/', "."));
        }
        FieldType::Array(component) => collect_field_type(component, into),
        FieldType::Base(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ristretto_classfile::attributes::Attribute;
    use ristretto_classfile::{
        BaseType, ClassAccessFlags, Field, FieldAccessFlags, Version,
    };

    fn sample_class() -> Vec<u8> {
        let mut class = ClassFile {
            version: Version::Java8 { minor: 0 },
            ..Default::default()
        };
        class.access_flags = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER;
        class.this_class = class.constant_pool.add_class("com/x/A").unwrap();
        class.super_class = class.constant_pool.add_class("java/lang/Object").unwrap();
        class
            .constant_pool
            .add_class("com/y/Helper")
            .unwrap();

        let name_index = class.constant_pool.add_utf8("serialVersionUID").unwrap();
        let descriptor_index = class.constant_pool.add_utf8("J").unwrap();
        let attribute_name = class.constant_pool.add_utf8("ConstantValue").unwrap();
        let value_index = class.constant_pool.add_long(42).unwrap();
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

        let mut bytes = Vec::new();
        class.to_bytes(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn reads_name_references_and_marker() {
        let fact = read(&sample_class()).unwrap();
        assert_eq!(fact.qualified_name, "com.x.A");
        assert_eq!(fact.format_version, 52);
        assert_eq!(fact.serialization_marker, Some(42));
        assert!(fact.referenced_names.contains("java.lang.Object"));
        assert!(fact.referenced_names.contains("com.y.Helper"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(read(b"not a classfile").is_err());
        assert!(read(&[]).is_err());
    }

    #[test]
    fn descriptor_scan_handles_methods_and_arrays() {
        let mut refs = BTreeSet::new();
        collect_descriptor("(J[Ljava/util/List;)Lcom/x/B;", &mut refs);
        assert!(refs.contains("java.util.List"));
        assert!(refs.contains("com.x.B"));
        assert_eq!(refs.len(), 2);

        let mut refs = BTreeSet::new();
        collect_internal_name("[[Lcom/x/C;", &mut refs);
        assert!(refs.contains("com.x.C"));
    }
}
