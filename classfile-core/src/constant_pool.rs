//! Streams `constant_pool_count - 1` entries out of the class file body,
//! building both the value vector returned to callers and the compact
//! per-slot [`crate::cp_metadata::ConstantPoolMetadata`] side table used
//! later by attribute and descriptor resolution.

use classfile_model::constant_pool::{ConstantPoolEntry, ConstantPoolTag, ReferenceKind};

use crate::context::{Cx, ScopedFrame};
use crate::cp_metadata::ConstantPoolMetadata;
use crate::error::{ClassFormatErrorKind, Result};

#[derive(Debug)]
pub struct ConstantPool {
    pub entries: Vec<Option<ConstantPoolEntry>>,
    pub metadata: ConstantPoolMetadata,
}

impl ConstantPool {
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Fetch and require a specific tag, used by callers that already know
    /// what kind of entry an index is supposed to name (e.g. `this_class`
    /// must be a `Class` entry).
    pub fn require(&self, cx: &Cx, index: u16, expected: ConstantPoolTag) -> Result<&ConstantPoolEntry> {
        let entry = self.get(cx, index)?;
        if entry.tag() != expected {
            return Err(cx.err(ClassFormatErrorKind::MismatchedConstantPoolTag {
                index,
                expected: expected.name(),
                found: entry.tag().name(),
            }));
        }
        Ok(entry)
    }

    pub fn get(&self, cx: &Cx, index: u16) -> Result<&ConstantPoolEntry> {
        if index == 0 || index >= self.count() {
            return Err(cx.err(ClassFormatErrorKind::ConstantPoolIndexOutOfRange {
                index,
                count: self.count(),
            }));
        }
        self.entries[index as usize]
            .as_ref()
            .ok_or_else(|| cx.err(ClassFormatErrorKind::SecondSlotOfWideEntry(index)))
    }
}

/// `constant_pool_count` is one more than the number of entries: index 0 is
/// always invalid, and a Long/Double entry's second slot is also invalid
/// even though it physically occupies a vector slot.
#[tracing::instrument(level = "trace", skip(cx))]
pub fn decode(cx: &mut Cx, constant_pool_count: u16) -> Result<ConstantPool> {
    if constant_pool_count == 0 {
        return Err(cx.err(ClassFormatErrorKind::EmptyConstantPoolCount(constant_pool_count)));
    }

    let mut entries: Vec<Option<ConstantPoolEntry>> = vec![None; constant_pool_count as usize];
    let mut metadata = ConstantPoolMetadata::new(constant_pool_count);

    let mut index = 1u16;
    while index < constant_pool_count {
        let entry = decode_one(cx, index, constant_pool_count)?;
        let tag = entry.tag();
        if let ConstantPoolEntry::Utf8(ref s) = entry {
            metadata.put_utf8(index, s);
        } else {
            metadata.put_tag(index, tag);
        }
        let wide = tag.is_wide();
        entries[index as usize] = Some(entry);
        index += if wide { 2 } else { 1 };
    }

    Ok(ConstantPool { entries, metadata })
}

/// Every internal index a constant pool entry carries points at another
/// constant pool slot (except `InvokeDynamic`'s `bootstrap_method_attr_index`,
/// which indexes the `BootstrapMethods` attribute's table instead) and must
/// be in range right away, rather than waiting for some later reader to
/// dereference it through [`ConstantPool::get`].
fn check_cp_index(cx: &Cx, index: u16, constant_pool_count: u16) -> Result<u16> {
    if index == 0 || index >= constant_pool_count {
        return Err(cx.err(ClassFormatErrorKind::ConstantPoolIndexOutOfRange {
            index,
            count: constant_pool_count,
        }));
    }
    Ok(index)
}

fn decode_one(cx: &mut Cx, index: u16, constant_pool_count: u16) -> Result<ConstantPoolEntry> {
    let _frame = ScopedFrame::new_indexed(&mut cx.stack, "constant_pool", index as usize);

    let tag_byte = cx.u1("tag")?;
    let tag = ConstantPoolTag::try_from(tag_byte)
        .map_err(|raw| cx.err(ClassFormatErrorKind::InvalidConstantPoolTag(raw)))?;

    Ok(match tag {
        ConstantPoolTag::Utf8 => ConstantPoolEntry::Utf8(cx.modified_utf8("utf8_value")?),
        ConstantPoolTag::Integer => ConstantPoolEntry::Integer(cx.s4("bytes")?),
        ConstantPoolTag::Float => ConstantPoolEntry::Float(cx.f4("bytes")?),
        ConstantPoolTag::Long => ConstantPoolEntry::Long(cx.i8_wide("bytes")?),
        ConstantPoolTag::Double => ConstantPoolEntry::Double(cx.f8("bytes")?),
        ConstantPoolTag::Class => {
            let name_index = cx.u2("name_index")?;
            let name_index = check_cp_index(cx, name_index, constant_pool_count)?;
            ConstantPoolEntry::Class { name_index }
        }
        ConstantPoolTag::String => {
            let string_index = cx.u2("string_index")?;
            let string_index = check_cp_index(cx, string_index, constant_pool_count)?;
            ConstantPoolEntry::String { string_index }
        }
        ConstantPoolTag::Fieldref => {
            let class_index = cx.u2("class_index")?;
            let class_index = check_cp_index(cx, class_index, constant_pool_count)?;
            let name_and_type_index = cx.u2("name_and_type_index")?;
            let name_and_type_index = check_cp_index(cx, name_and_type_index, constant_pool_count)?;
            ConstantPoolEntry::Fieldref { class_index, name_and_type_index }
        }
        ConstantPoolTag::Methodref => {
            let class_index = cx.u2("class_index")?;
            let class_index = check_cp_index(cx, class_index, constant_pool_count)?;
            let name_and_type_index = cx.u2("name_and_type_index")?;
            let name_and_type_index = check_cp_index(cx, name_and_type_index, constant_pool_count)?;
            ConstantPoolEntry::Methodref { class_index, name_and_type_index }
        }
        ConstantPoolTag::InterfaceMethodref => {
            let class_index = cx.u2("class_index")?;
            let class_index = check_cp_index(cx, class_index, constant_pool_count)?;
            let name_and_type_index = cx.u2("name_and_type_index")?;
            let name_and_type_index = check_cp_index(cx, name_and_type_index, constant_pool_count)?;
            ConstantPoolEntry::InterfaceMethodref { class_index, name_and_type_index }
        }
        ConstantPoolTag::NameAndType => {
            let name_index = cx.u2("name_index")?;
            let name_index = check_cp_index(cx, name_index, constant_pool_count)?;
            let descriptor_index = cx.u2("descriptor_index")?;
            let descriptor_index = check_cp_index(cx, descriptor_index, constant_pool_count)?;
            ConstantPoolEntry::NameAndType { name_index, descriptor_index }
        }
        ConstantPoolTag::MethodHandle => {
            let reference_kind_byte = cx.u1("reference_kind")?;
            let reference_kind = ReferenceKind::try_from(reference_kind_byte)
                .map_err(|raw| cx.err(ClassFormatErrorKind::InvalidReferenceKind(raw)))?;
            let reference_index = cx.u2("reference_index")?;
            let reference_index = check_cp_index(cx, reference_index, constant_pool_count)?;
            ConstantPoolEntry::MethodHandle { reference_kind, reference_index }
        }
        ConstantPoolTag::MethodType => {
            let descriptor_index = cx.u2("descriptor_index")?;
            let descriptor_index = check_cp_index(cx, descriptor_index, constant_pool_count)?;
            ConstantPoolEntry::MethodType { descriptor_index }
        }
        ConstantPoolTag::InvokeDynamic => {
            let bootstrap_method_attr_index = cx.u2("bootstrap_method_attr_index")?;
            let name_and_type_index = cx.u2("name_and_type_index")?;
            let name_and_type_index = check_cp_index(cx, name_and_type_index, constant_pool_count)?;
            ConstantPoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index }
        }
        ConstantPoolTag::Module => {
            let name_index = cx.u2("name_index")?;
            let name_index = check_cp_index(cx, name_index, constant_pool_count)?;
            ConstantPoolEntry::Module { name_index }
        }
        ConstantPoolTag::Package => {
            let name_index = cx.u2("name_index")?;
            let name_index = check_cp_index(cx, name_index, constant_pool_count)?;
            ConstantPoolEntry::Package { name_index }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;

    fn cx_over(data: &[u8]) -> Cx<'_> {
        Cx::new(data, &ParseOptions::default())
    }

    #[test]
    fn decodes_utf8_and_class_entries() {
        // count=3: #1 Utf8 "A", #2 Class{name_index=1}
        let data = [
            0x01, 0x00, 0x01, b'A', // Utf8 "A"
            0x07, 0x00, 0x01, // Class -> #1
        ];
        let mut cx = cx_over(&data);
        let pool = decode(&mut cx, 3).unwrap();
        assert_eq!(pool.entries[1], Some(ConstantPoolEntry::Utf8("A".to_string())));
        assert_eq!(
            pool.entries[2],
            Some(ConstantPoolEntry::Class { name_index: 1 })
        );
        assert_eq!(pool.metadata.tag_at(1).unwrap(), ConstantPoolTag::Utf8);
    }

    #[test]
    fn long_entry_consumes_two_slots() {
        // count=3: #1 Long, #2 unused (second slot)
        let data = [0x05, 0, 0, 0, 0, 0, 0, 0, 1];
        let mut cx = cx_over(&data);
        let pool = decode(&mut cx, 3).unwrap();
        assert_eq!(pool.entries[1], Some(ConstantPoolEntry::Long(1)));
        assert_eq!(pool.entries[2], None);
        assert!(pool.get(&cx, 2).is_err());
    }

    #[test]
    fn rejects_class_entry_with_out_of_range_name_index() {
        // count=2: #1 Class{name_index=5}, but there is no slot 5.
        let data = [0x07, 0x00, 0x05];
        let mut cx = cx_over(&data);
        let err = decode(&mut cx, 2).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::ConstantPoolIndexOutOfRange { index: 5, count: 2 }
        ));
    }

    #[test]
    fn rejects_fieldref_with_zero_class_index() {
        // count=3: #1 Fieldref{class_index=0, name_and_type_index=2}
        let data = [0x09, 0x00, 0x00, 0x00, 0x02];
        let mut cx = cx_over(&data);
        let err = decode(&mut cx, 3).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::ConstantPoolIndexOutOfRange { index: 0, count: 3 }
        ));
    }

    #[test]
    fn rejects_unknown_tag() {
        let data = [0xFF];
        let mut cx = cx_over(&data);
        let err = decode(&mut cx, 2).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::InvalidConstantPoolTag(0xFF)
        ));
        assert_eq!(err.context.0, "constant_pool[1]");
    }
}
