//! Top-level sequencing: magic, version, constant pool, flags, superclass
//! graph, fields, methods, attributes, then a trailing-bytes check. Each
//! section pushes its own context frame so a failure deep inside, say,
//! `methods[3].Code.attributes[1]` renders a full path.

use classfile_model::attribute::context as attr_ctx;
use classfile_model::class_file::{ClassFile, ClassVersion, FieldInfo, MethodInfo};
use classfile_model::constant_pool::{ConstantPoolEntry, ConstantPoolTag};
use classfile_model::descriptor::{parse_field_descriptor, parse_method_descriptor};
use classfile_model::flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

use crate::access_flags;
use crate::attributes;
use crate::constant_pool::{self, ConstantPool};
use crate::context::{Cx, ScopedFrame};
use crate::error::{ClassFormatErrorKind, Result};
use crate::options::ParseOptions;

const MAGIC: u32 = 0xCAFE_BABE;

#[tracing::instrument(level = "debug", skip(bytes, options), fields(len = bytes.len()))]
pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<ClassFile> {
    let mut cx = Cx::new(bytes, options);

    let magic = cx.u4("magic")?;
    if magic != MAGIC {
        return Err(cx.err(ClassFormatErrorKind::InvalidMagic(magic)));
    }

    let minor_version = cx.u2("minor_version")?;
    let major_version = cx.u2("major_version")?;
    let version = ClassVersion::new(major_version, minor_version);

    let constant_pool_count = cx.u2("constant_pool_count")?;
    let pool = constant_pool::decode(&mut cx, constant_pool_count)?;

    let access_flags_raw = cx.u2("access_flags")?;
    let access_flags = ClassAccessFlags::from_bits_truncate(access_flags_raw);
    access_flags::validate_class_flags(access_flags).map_err(|kind| cx.err(kind))?;
    let declaring_is_interface = access_flags.contains(ClassAccessFlags::ACC_INTERFACE);

    let this_class = cx.u2("this_class")?;
    pool.require(&cx, this_class, ConstantPoolTag::Class)?;

    let super_class = cx.u2("super_class")?;
    if super_class != 0 {
        pool.require(&cx, super_class, ConstantPoolTag::Class)?;
    }

    let interfaces = decode_interfaces(&mut cx, &pool)?;
    let fields = decode_fields(&mut cx, &pool, options, version, declaring_is_interface)?;
    let methods = decode_methods(&mut cx, &pool, options, version, declaring_is_interface)?;

    let attributes = {
        let _frame = ScopedFrame::new(&mut cx.stack, "attributes");
        attributes::decode_attributes(&mut cx, &pool, attr_ctx::CLASS_FILE, options, version)?
    };

    let remaining = cx.reader.remaining();
    if remaining > 0 {
        return Err(cx.err(ClassFormatErrorKind::TrailingBytes { count: remaining }));
    }

    tracing::debug!(
        constant_pool_count,
        fields = fields.len(),
        methods = methods.len(),
        "parsed class file"
    );

    Ok(ClassFile {
        version,
        constant_pool: pool.entries,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

fn decode_interfaces(cx: &mut Cx, pool: &ConstantPool) -> Result<Vec<u16>> {
    let count = cx.u2("interfaces_count")?;
    let mut interfaces = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "interfaces", i as usize);
        let index = cx.u2("interfaces")?;
        pool.require(cx, index, ConstantPoolTag::Class)?;
        interfaces.push(index);
    }
    Ok(interfaces)
}

fn utf8_at<'a>(cx: &Cx, pool: &'a ConstantPool, index: u16) -> Result<&'a str> {
    match pool.require(cx, index, ConstantPoolTag::Utf8)? {
        ConstantPoolEntry::Utf8(s) => Ok(s.as_str()),
        _ => unreachable!("require() already checked the tag"),
    }
}

fn decode_fields(
    cx: &mut Cx,
    pool: &ConstantPool,
    options: &ParseOptions,
    version: ClassVersion,
    declaring_is_interface: bool,
) -> Result<Vec<FieldInfo>> {
    let count = cx.u2("fields_count")?;
    let mut fields = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "fields", i as usize);

        let access_flags_raw = cx.u2("access_flags")?;
        let access_flags = FieldAccessFlags::from_bits_truncate(access_flags_raw);
        access_flags::validate_field_flags(access_flags, declaring_is_interface)
            .map_err(|kind| cx.err(kind))?;

        let name_index = cx.u2("name_index")?;
        utf8_at(cx, pool, name_index)?;
        let descriptor_index = cx.u2("descriptor_index")?;
        let descriptor = utf8_at(cx, pool, descriptor_index)?;
        parse_field_descriptor(descriptor).map_err(|e| cx.err(ClassFormatErrorKind::from(e)))?;

        let attributes = {
            let _frame = ScopedFrame::new(&mut cx.stack, "attributes");
            attributes::decode_attributes(cx, pool, attr_ctx::FIELD, options, version)?
        };

        fields.push(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        });
    }
    Ok(fields)
}

fn decode_methods(
    cx: &mut Cx,
    pool: &ConstantPool,
    options: &ParseOptions,
    version: ClassVersion,
    declaring_is_interface: bool,
) -> Result<Vec<MethodInfo>> {
    let count = cx.u2("methods_count")?;
    let mut methods = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "methods", i as usize);

        let access_flags_raw = cx.u2("access_flags")?;
        let access_flags = MethodAccessFlags::from_bits_truncate(access_flags_raw);
        access_flags::validate_method_flags(access_flags, declaring_is_interface, version)
            .map_err(|kind| cx.err(kind))?;

        let name_index = cx.u2("name_index")?;
        let name = utf8_at(cx, pool, name_index)?.to_string();
        if name == "<init>" {
            access_flags::validate_instance_initializer_flags(access_flags)
                .map_err(|kind| cx.err(kind))?;
        }

        let descriptor_index = cx.u2("descriptor_index")?;
        let descriptor = utf8_at(cx, pool, descriptor_index)?;
        parse_method_descriptor(descriptor).map_err(|e| cx.err(ClassFormatErrorKind::from(e)))?;

        let attributes = {
            let _frame = ScopedFrame::new(&mut cx.stack, "attributes");
            attributes::decode_attributes(cx, pool, attr_ctx::METHOD, options, version)?
        };

        methods.push(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        });
    }
    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_class_file() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC.to_be_bytes());
        data.extend_from_slice(&[0, 0]); // minor_version
        data.extend_from_slice(&[0, 52]); // major_version = 52 (Java 8)
        data.extend_from_slice(&[0, 5]); // constant_pool_count = 5
        // #1 Utf8 "Main"
        data.push(1);
        data.extend_from_slice(&4u16.to_be_bytes());
        data.extend_from_slice(b"Main");
        // #2 Class -> #1
        data.push(7);
        data.extend_from_slice(&1u16.to_be_bytes());
        // #3 Utf8 "java/lang/Object"
        data.push(1);
        data.extend_from_slice(&16u16.to_be_bytes());
        data.extend_from_slice(b"java/lang/Object");
        // #4 Class -> #3
        data.push(7);
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0, 0x21]); // access_flags: PUBLIC | SUPER
        data.extend_from_slice(&2u16.to_be_bytes()); // this_class = #2
        data.extend_from_slice(&4u16.to_be_bytes()); // super_class = #4
        data.extend_from_slice(&[0, 0]); // interfaces_count
        data.extend_from_slice(&[0, 0]); // fields_count
        data.extend_from_slice(&[0, 0]); // methods_count
        data.extend_from_slice(&[0, 0]); // attributes_count
        data
    }

    #[test]
    fn parses_a_minimal_class_file() {
        let data = minimal_class_file();
        let class_file = parse(&data, &ParseOptions::default()).unwrap();
        assert_eq!(class_file.version, ClassVersion::new(52, 0));
        assert_eq!(class_file.this_class, 2);
        assert_eq!(class_file.super_class, 4);
        assert!(class_file.fields.is_empty());
        assert!(class_file.methods.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = minimal_class_file();
        data[0] = 0;
        let err = parse(&data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::InvalidMagic(_)));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut data = minimal_class_file();
        data.push(0xFF);
        let err = parse(&data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::TrailingBytes { count: 1 }));
    }

    #[test]
    fn rejects_invalid_class_access_flags() {
        let mut data = minimal_class_file();
        let access_flags_offset = data.len() - 4 - 2 - 2 - 2 - 2 - 2;
        assert_eq!(&data[access_flags_offset..access_flags_offset + 2], &[0, 0x21]);
        // ACC_INTERFACE without ACC_ABSTRACT is illegal.
        data[access_flags_offset] = 0x02;
        data[access_flags_offset + 1] = 0x00;
        let err = parse(&data, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::InvalidFlagMix { .. }));
    }
}
