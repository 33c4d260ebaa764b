//! Constant-pool entry payloads.
//!
//! These are plain value containers; the decoding and validation logic that
//! fills them in lives in `classfile-core::constant_pool`.

/// Wire tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantPoolTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantPoolTag {
    /// Every defined tag, in ordinal order used by the pool's side-table
    /// metadata encoding.
    pub const ALL: [ConstantPoolTag; 16] = [
        ConstantPoolTag::Utf8,
        ConstantPoolTag::Integer,
        ConstantPoolTag::Float,
        ConstantPoolTag::Long,
        ConstantPoolTag::Double,
        ConstantPoolTag::Class,
        ConstantPoolTag::String,
        ConstantPoolTag::Fieldref,
        ConstantPoolTag::Methodref,
        ConstantPoolTag::InterfaceMethodref,
        ConstantPoolTag::NameAndType,
        ConstantPoolTag::MethodHandle,
        ConstantPoolTag::MethodType,
        ConstantPoolTag::InvokeDynamic,
        ConstantPoolTag::Module,
        ConstantPoolTag::Package,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ConstantPoolTag::Utf8 => "Utf8",
            ConstantPoolTag::Integer => "Integer",
            ConstantPoolTag::Float => "Float",
            ConstantPoolTag::Long => "Long",
            ConstantPoolTag::Double => "Double",
            ConstantPoolTag::Class => "Class",
            ConstantPoolTag::String => "String",
            ConstantPoolTag::Fieldref => "Fieldref",
            ConstantPoolTag::Methodref => "Methodref",
            ConstantPoolTag::InterfaceMethodref => "InterfaceMethodref",
            ConstantPoolTag::NameAndType => "NameAndType",
            ConstantPoolTag::MethodHandle => "MethodHandle",
            ConstantPoolTag::MethodType => "MethodType",
            ConstantPoolTag::InvokeDynamic => "InvokeDynamic",
            ConstantPoolTag::Module => "Module",
            ConstantPoolTag::Package => "Package",
        }
    }

    /// Whether this tag's entry occupies two consecutive constant-pool slots.
    pub const fn is_wide(self) -> bool {
        matches!(self, ConstantPoolTag::Long | ConstantPoolTag::Double)
    }
}

impl TryFrom<u8> for ConstantPoolTag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            1 => ConstantPoolTag::Utf8,
            3 => ConstantPoolTag::Integer,
            4 => ConstantPoolTag::Float,
            5 => ConstantPoolTag::Long,
            6 => ConstantPoolTag::Double,
            7 => ConstantPoolTag::Class,
            8 => ConstantPoolTag::String,
            9 => ConstantPoolTag::Fieldref,
            10 => ConstantPoolTag::Methodref,
            11 => ConstantPoolTag::InterfaceMethodref,
            12 => ConstantPoolTag::NameAndType,
            15 => ConstantPoolTag::MethodHandle,
            16 => ConstantPoolTag::MethodType,
            18 => ConstantPoolTag::InvokeDynamic,
            19 => ConstantPoolTag::Module,
            20 => ConstantPoolTag::Package,
            other => return Err(other),
        })
    }
}

/// [Method handle reference kinds](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=126)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            1 => ReferenceKind::GetField,
            2 => ReferenceKind::GetStatic,
            3 => ReferenceKind::PutField,
            4 => ReferenceKind::PutStatic,
            5 => ReferenceKind::InvokeVirtual,
            6 => ReferenceKind::InvokeStatic,
            7 => ReferenceKind::InvokeSpecial,
            8 => ReferenceKind::NewInvokeSpecial,
            9 => ReferenceKind::InvokeInterface,
            other => return Err(other),
        })
    }
}

/// One decoded constant-pool entry. Long/Double entries additionally occupy
/// the following slot, which the pool leaves empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: ReferenceKind,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
}

impl ConstantPoolEntry {
    pub const fn tag(&self) -> ConstantPoolTag {
        match self {
            ConstantPoolEntry::Utf8(_) => ConstantPoolTag::Utf8,
            ConstantPoolEntry::Integer(_) => ConstantPoolTag::Integer,
            ConstantPoolEntry::Float(_) => ConstantPoolTag::Float,
            ConstantPoolEntry::Long(_) => ConstantPoolTag::Long,
            ConstantPoolEntry::Double(_) => ConstantPoolTag::Double,
            ConstantPoolEntry::Class { .. } => ConstantPoolTag::Class,
            ConstantPoolEntry::String { .. } => ConstantPoolTag::String,
            ConstantPoolEntry::Fieldref { .. } => ConstantPoolTag::Fieldref,
            ConstantPoolEntry::Methodref { .. } => ConstantPoolTag::Methodref,
            ConstantPoolEntry::InterfaceMethodref { .. } => ConstantPoolTag::InterfaceMethodref,
            ConstantPoolEntry::NameAndType { .. } => ConstantPoolTag::NameAndType,
            ConstantPoolEntry::MethodHandle { .. } => ConstantPoolTag::MethodHandle,
            ConstantPoolEntry::MethodType { .. } => ConstantPoolTag::MethodType,
            ConstantPoolEntry::InvokeDynamic { .. } => ConstantPoolTag::InvokeDynamic,
            ConstantPoolEntry::Module { .. } => ConstantPoolTag::Module,
            ConstantPoolEntry::Package { .. } => ConstantPoolTag::Package,
        }
    }
}
