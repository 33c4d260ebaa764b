//! Access-flag bit enumerations.
//!
//! These are the "pluggable validation table" surface the core parser treats
//! as an external collaborator: the bit layout for each flag kind, not the
//! rules about which bits may combine. The rule catalog lives in
//! `classfile-core::access_flags`.

use bitflags::bitflags;

bitflags! {
    /// [Class access flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=85)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassAccessFlags: u16 {
        const ACC_PUBLIC     = 0x0001;
        const ACC_FINAL      = 0x0010;
        const ACC_SUPER      = 0x0020;
        const ACC_INTERFACE  = 0x0200;
        const ACC_ABSTRACT   = 0x0400;
        const ACC_SYNTHETIC  = 0x1000;
        const ACC_ANNOTATION = 0x2000;
        const ACC_ENUM       = 0x4000;
        const ACC_MODULE     = 0x8000;
    }

    /// [Field access flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=98)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldAccessFlags: u16 {
        const ACC_PUBLIC    = 0x0001;
        const ACC_PRIVATE   = 0x0002;
        const ACC_PROTECTED = 0x0004;
        const ACC_STATIC    = 0x0008;
        const ACC_FINAL     = 0x0010;
        const ACC_VOLATILE  = 0x0040;
        const ACC_TRANSIENT = 0x0080;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ENUM      = 0x4000;
    }

    /// [Method access flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=112)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MethodAccessFlags: u16 {
        const ACC_PUBLIC       = 0x0001;
        const ACC_PRIVATE      = 0x0002;
        const ACC_PROTECTED    = 0x0004;
        const ACC_STATIC       = 0x0008;
        const ACC_FINAL        = 0x0010;
        const ACC_SYNCHRONIZED = 0x0020;
        const ACC_BRIDGE       = 0x0040;
        const ACC_VARARGS      = 0x0080;
        const ACC_NATIVE       = 0x0100;
        const ACC_ABSTRACT     = 0x0400;
        const ACC_STRICT       = 0x0800;
        const ACC_SYNTHETIC    = 0x1000;
    }

    /// [Nested class access flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=140)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InnerClassAccessFlags: u16 {
        const ACC_PUBLIC     = 0x0001;
        const ACC_PRIVATE    = 0x0002;
        const ACC_PROTECTED  = 0x0004;
        const ACC_STATIC     = 0x0008;
        const ACC_FINAL      = 0x0010;
        const ACC_INTERFACE  = 0x0200;
        const ACC_ABSTRACT   = 0x0400;
        const ACC_SYNTHETIC  = 0x1000;
        const ACC_ANNOTATION = 0x2000;
        const ACC_ENUM       = 0x4000;
    }

    /// [Method parameter access flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=172)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MethodParameterAccessFlags: u16 {
        const ACC_FINAL     = 0x0010;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED  = 0x8000;
    }

    /// [Module flags](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=178)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModuleFlags: u16 {
        const ACC_OPEN      = 0x0020;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED  = 0x8000;
    }

    /// `requires` entry flags within the `Module` attribute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModuleRequiresFlags: u16 {
        const ACC_TRANSITIVE  = 0x0020;
        const ACC_STATIC_PHASE = 0x0040;
        const ACC_SYNTHETIC    = 0x1000;
        const ACC_MANDATED     = 0x8000;
    }

    /// `exports`/`opens` entry flags within the `Module` attribute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModuleExportsOpensFlags: u16 {
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED  = 0x8000;
    }
}

/// The kind of entity a flag field belongs to, used to select the
/// applicable rule set out of `classfile-core::access_flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Class,
    Field,
    Method,
    InnerClass,
    MethodParameter,
    Module,
    ModuleRequires,
    ModuleExportsOpens,
}
