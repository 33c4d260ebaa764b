//! Turns the typed `ClassFile` the core crate returns back into the
//! source-like text `javap` is known for: binary names become dotted
//! package names, descriptors become parameter lists, and access flags
//! become the keyword sequence a Java programmer would have written.

use classfile_core::ClassFile;
use classfile_model::constant_pool::ConstantPoolEntry;
use classfile_model::descriptor::{FieldType, MethodDescriptor};
use classfile_model::flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

pub fn utf8_at(class: &ClassFile, index: u16) -> Option<&str> {
    match class.constant_pool.get(index as usize)?.as_ref()? {
        ConstantPoolEntry::Utf8(s) => Some(s.as_str()),
        _ => None,
    }
}

pub fn class_name_at(class: &ClassFile, class_index: u16) -> Option<String> {
    match class.constant_pool.get(class_index as usize)?.as_ref()? {
        ConstantPoolEntry::Class { name_index } => {
            utf8_at(class, *name_index).map(|s| s.replace('/', "."))
        }
        _ => None,
    }
}

pub fn name_and_type_at(class: &ClassFile, index: u16) -> Option<(&str, &str)> {
    match class.constant_pool.get(index as usize)?.as_ref()? {
        ConstantPoolEntry::NameAndType {
            name_index,
            descriptor_index,
        } => Some((utf8_at(class, *name_index)?, utf8_at(class, *descriptor_index)?)),
        _ => None,
    }
}

/// The Java source spelling of a field descriptor: `int`, `java.lang.String`,
/// `byte[]`, `java.lang.String[][]`.
pub fn field_type_name(ty: &FieldType) -> String {
    match ty {
        FieldType::Byte => "byte".to_string(),
        FieldType::Char => "char".to_string(),
        FieldType::Double => "double".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::Int => "int".to_string(),
        FieldType::Long => "long".to_string(),
        FieldType::Short => "short".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Object(name) => name.replace('/', "."),
        FieldType::Array(inner) => format!("{}[]", field_type_name(inner)),
    }
}

pub fn return_type_name(desc: &MethodDescriptor) -> String {
    match &desc.return_type {
        None => "void".to_string(),
        Some(ty) => field_type_name(ty),
    }
}

pub fn parameter_list(desc: &MethodDescriptor) -> String {
    desc.parameters
        .iter()
        .map(field_type_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a member's visibility passes the `--public`/`--protected`/
/// `--package`/`--private` filter. Package-private is the fallback when
/// none of the three explicit visibility bits are set.
pub fn passes_visibility_filter(
    is_public: bool,
    is_protected: bool,
    is_private: bool,
    show_public: bool,
    show_protected: bool,
    show_package: bool,
    show_private: bool,
) -> bool {
    if show_private {
        return true;
    }
    if is_private {
        return false;
    }
    if is_protected {
        return show_protected || show_package;
    }
    if is_public {
        return true;
    }
    // package-private
    show_package
}

pub fn class_flag_keywords(flags: ClassAccessFlags) -> Vec<&'static str> {
    let mut out = Vec::new();
    if flags.contains(ClassAccessFlags::ACC_PUBLIC) {
        out.push("public");
    }
    if flags.contains(ClassAccessFlags::ACC_FINAL) {
        out.push("final");
    }
    if flags.contains(ClassAccessFlags::ACC_ABSTRACT) && !flags.contains(ClassAccessFlags::ACC_INTERFACE) {
        out.push("abstract");
    }
    out
}

pub fn field_flag_keywords(flags: FieldAccessFlags) -> Vec<&'static str> {
    let mut out = Vec::new();
    if flags.contains(FieldAccessFlags::ACC_PUBLIC) {
        out.push("public");
    }
    if flags.contains(FieldAccessFlags::ACC_PROTECTED) {
        out.push("protected");
    }
    if flags.contains(FieldAccessFlags::ACC_PRIVATE) {
        out.push("private");
    }
    if flags.contains(FieldAccessFlags::ACC_STATIC) {
        out.push("static");
    }
    if flags.contains(FieldAccessFlags::ACC_FINAL) {
        out.push("final");
    }
    if flags.contains(FieldAccessFlags::ACC_TRANSIENT) {
        out.push("transient");
    }
    if flags.contains(FieldAccessFlags::ACC_VOLATILE) {
        out.push("volatile");
    }
    out
}

pub fn method_flag_keywords(flags: MethodAccessFlags) -> Vec<&'static str> {
    let mut out = Vec::new();
    if flags.contains(MethodAccessFlags::ACC_PUBLIC) {
        out.push("public");
    }
    if flags.contains(MethodAccessFlags::ACC_PROTECTED) {
        out.push("protected");
    }
    if flags.contains(MethodAccessFlags::ACC_PRIVATE) {
        out.push("private");
    }
    if flags.contains(MethodAccessFlags::ACC_STATIC) {
        out.push("static");
    }
    if flags.contains(MethodAccessFlags::ACC_FINAL) {
        out.push("final");
    }
    if flags.contains(MethodAccessFlags::ACC_SYNCHRONIZED) {
        out.push("synchronized");
    }
    if flags.contains(MethodAccessFlags::ACC_NATIVE) {
        out.push("native");
    }
    if flags.contains(MethodAccessFlags::ACC_ABSTRACT) {
        out.push("abstract");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_array_of_object_as_bracket_suffix() {
        let ty = FieldType::Array(Box::new(FieldType::Object("java/lang/String".into())));
        assert_eq!(field_type_name(&ty), "java.lang.String[]");
    }

    #[test]
    fn package_private_only_shown_under_package_filter() {
        assert!(!passes_visibility_filter(
            false, false, false, true, false, false, false
        ));
        assert!(passes_visibility_filter(
            false, false, false, false, false, true, false
        ));
    }

    #[test]
    fn private_filter_shows_everything() {
        assert!(passes_visibility_filter(
            false, false, true, false, false, false, true
        ));
    }
}
