//! Access-flag combination rules.
//!
//! Each `validate_*` function checks one `access_flags` field against the
//! combination rules for that entity: these are closer to a semantic check
//! than a decode, but they only ever look at the flag bits (plus, where the
//! class file format makes meaning version-dependent, the class version) —
//! never at anything else in the class file — so they live beside the flag
//! bitsets rather than in the orchestrator.

use classfile_model::class_file::ClassVersion;
use classfile_model::flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};

use crate::error::ClassFormatErrorKind;

const JAVA_8: ClassVersion = ClassVersion::JAVA_8;

fn mix(entity: &'static str, reason: &'static str, flags: u16) -> ClassFormatErrorKind {
    ClassFormatErrorKind::InvalidFlagMix {
        entity,
        reason,
        flags,
    }
}

pub fn validate_class_flags(flags: ClassAccessFlags) -> Result<(), ClassFormatErrorKind> {
    let entity = "class";
    if flags.contains(ClassAccessFlags::ACC_MODULE) {
        // A module descriptor's access_flags must carry no other bit.
        if flags != ClassAccessFlags::ACC_MODULE {
            return Err(mix(
                entity,
                "ACC_MODULE must not be combined with any other flag",
                flags.bits(),
            ));
        }
        return Ok(());
    }
    if flags.contains(ClassAccessFlags::ACC_INTERFACE) {
        if !flags.contains(ClassAccessFlags::ACC_ABSTRACT) {
            return Err(mix(
                entity,
                "ACC_INTERFACE requires ACC_ABSTRACT",
                flags.bits(),
            ));
        }
        let forbidden = ClassAccessFlags::ACC_FINAL | ClassAccessFlags::ACC_SUPER | ClassAccessFlags::ACC_ENUM;
        if flags.intersects(forbidden) {
            return Err(mix(
                entity,
                "ACC_INTERFACE excludes ACC_FINAL, ACC_SUPER, and ACC_ENUM",
                flags.bits(),
            ));
        }
    } else {
        if flags.contains(ClassAccessFlags::ACC_ANNOTATION) {
            return Err(mix(
                entity,
                "ACC_ANNOTATION requires ACC_INTERFACE",
                flags.bits(),
            ));
        }
        if flags.contains(ClassAccessFlags::ACC_FINAL) && flags.contains(ClassAccessFlags::ACC_ABSTRACT) {
            return Err(mix(
                entity,
                "ACC_FINAL and ACC_ABSTRACT are mutually exclusive",
                flags.bits(),
            ));
        }
    }
    Ok(())
}

pub fn validate_field_flags(
    flags: FieldAccessFlags,
    declaring_is_interface: bool,
) -> Result<(), ClassFormatErrorKind> {
    let entity = "field";
    let visibility = FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_PRIVATE | FieldAccessFlags::ACC_PROTECTED;
    if (flags & visibility).bits().count_ones() > 1 {
        return Err(mix(
            entity,
            "at most one of ACC_PUBLIC, ACC_PRIVATE, ACC_PROTECTED may be set",
            flags.bits(),
        ));
    }
    if flags.contains(FieldAccessFlags::ACC_FINAL) && flags.contains(FieldAccessFlags::ACC_VOLATILE) {
        return Err(mix(
            entity,
            "ACC_FINAL and ACC_VOLATILE are mutually exclusive",
            flags.bits(),
        ));
    }
    if declaring_is_interface {
        let required = FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_STATIC | FieldAccessFlags::ACC_FINAL;
        if !flags.contains(required) {
            return Err(mix(
                entity,
                "an interface field must be ACC_PUBLIC, ACC_STATIC, and ACC_FINAL",
                flags.bits(),
            ));
        }
        let forbidden = FieldAccessFlags::ACC_PRIVATE
            | FieldAccessFlags::ACC_PROTECTED
            | FieldAccessFlags::ACC_VOLATILE
            | FieldAccessFlags::ACC_TRANSIENT
            | FieldAccessFlags::ACC_ENUM;
        if flags.intersects(forbidden) {
            return Err(mix(
                entity,
                "an interface field may not be private, protected, volatile, transient, or an enum constant",
                flags.bits(),
            ));
        }
    }
    Ok(())
}

pub fn validate_method_flags(
    flags: MethodAccessFlags,
    declaring_is_interface: bool,
    version: ClassVersion,
) -> Result<(), ClassFormatErrorKind> {
    let entity = "method";
    let visibility = MethodAccessFlags::ACC_PUBLIC | MethodAccessFlags::ACC_PRIVATE | MethodAccessFlags::ACC_PROTECTED;
    if (flags & visibility).bits().count_ones() > 1 {
        return Err(mix(
            entity,
            "at most one of ACC_PUBLIC, ACC_PRIVATE, ACC_PROTECTED may be set",
            flags.bits(),
        ));
    }
    if flags.contains(MethodAccessFlags::ACC_ABSTRACT) {
        let forbidden = MethodAccessFlags::ACC_FINAL
            | MethodAccessFlags::ACC_NATIVE
            | MethodAccessFlags::ACC_PRIVATE
            | MethodAccessFlags::ACC_STATIC
            | MethodAccessFlags::ACC_STRICT
            | MethodAccessFlags::ACC_SYNCHRONIZED;
        if flags.intersects(forbidden) {
            return Err(mix(
                entity,
                "ACC_ABSTRACT excludes ACC_FINAL, ACC_NATIVE, ACC_PRIVATE, ACC_STATIC, ACC_STRICT, and ACC_SYNCHRONIZED",
                flags.bits(),
            ));
        }
    }

    if declaring_is_interface {
        if version >= JAVA_8 {
            let vis = flags & visibility;
            if vis != MethodAccessFlags::ACC_PUBLIC && vis != MethodAccessFlags::ACC_PRIVATE {
                return Err(mix(
                    entity,
                    "an interface method (class file version 52.0+) must be exactly one of ACC_PUBLIC or ACC_PRIVATE",
                    flags.bits(),
                ));
            }
            let forbidden =
                MethodAccessFlags::ACC_PROTECTED | MethodAccessFlags::ACC_FINAL | MethodAccessFlags::ACC_SYNCHRONIZED | MethodAccessFlags::ACC_NATIVE;
            if flags.intersects(forbidden) {
                return Err(mix(
                    entity,
                    "an interface method may not be protected, final, synchronized, or native",
                    flags.bits(),
                ));
            }
        } else {
            let required = MethodAccessFlags::ACC_PUBLIC | MethodAccessFlags::ACC_ABSTRACT;
            let forbidden = MethodAccessFlags::ACC_PRIVATE
                | MethodAccessFlags::ACC_PROTECTED
                | MethodAccessFlags::ACC_STATIC
                | MethodAccessFlags::ACC_FINAL
                | MethodAccessFlags::ACC_SYNCHRONIZED
                | MethodAccessFlags::ACC_NATIVE
                | MethodAccessFlags::ACC_STRICT;
            if !flags.contains(required) || flags.intersects(forbidden) {
                return Err(mix(
                    entity,
                    "before class file version 52.0, an interface method must be exactly ACC_PUBLIC and ACC_ABSTRACT",
                    flags.bits(),
                ));
            }
        }
    }
    Ok(())
}

/// `<init>` carries a narrower set of legal flags than an ordinary method.
pub fn validate_instance_initializer_flags(flags: MethodAccessFlags) -> Result<(), ClassFormatErrorKind> {
    let forbidden = MethodAccessFlags::ACC_STATIC
        | MethodAccessFlags::ACC_FINAL
        | MethodAccessFlags::ACC_SYNCHRONIZED
        | MethodAccessFlags::ACC_BRIDGE
        | MethodAccessFlags::ACC_NATIVE
        | MethodAccessFlags::ACC_ABSTRACT;
    if flags.intersects(forbidden) {
        return Err(mix(
            "instance initializer",
            "<init> may not be static, final, synchronized, a bridge, native, or abstract",
            flags.bits(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_requires_abstract() {
        let err = validate_class_flags(ClassAccessFlags::ACC_INTERFACE).unwrap_err();
        assert!(matches!(err, ClassFormatErrorKind::InvalidFlagMix { .. }));
    }

    #[test]
    fn interface_with_abstract_is_valid() {
        assert!(validate_class_flags(ClassAccessFlags::ACC_INTERFACE | ClassAccessFlags::ACC_ABSTRACT).is_ok());
    }

    #[test]
    fn module_rejects_any_other_bit() {
        let err =
            validate_class_flags(ClassAccessFlags::ACC_MODULE | ClassAccessFlags::ACC_PUBLIC).unwrap_err();
        assert!(matches!(err, ClassFormatErrorKind::InvalidFlagMix { .. }));
    }

    #[test]
    fn field_rejects_two_visibility_bits() {
        let err =
            validate_field_flags(FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_PRIVATE, false)
                .unwrap_err();
        assert!(matches!(err, ClassFormatErrorKind::InvalidFlagMix { .. }));
    }

    #[test]
    fn interface_field_requires_public_static_final() {
        assert!(validate_field_flags(FieldAccessFlags::ACC_PUBLIC, true).is_err());
        assert!(validate_field_flags(
            FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_STATIC | FieldAccessFlags::ACC_FINAL,
            true
        )
        .is_ok());
    }

    #[test]
    fn pre_java8_interface_method_must_be_public_abstract_only() {
        let v = ClassVersion::new(51, 0);
        assert!(validate_method_flags(
            MethodAccessFlags::ACC_PUBLIC | MethodAccessFlags::ACC_ABSTRACT,
            true,
            v
        )
        .is_ok());
        assert!(validate_method_flags(MethodAccessFlags::ACC_PUBLIC, true, v).is_err());
    }

    #[test]
    fn java8_interface_method_allows_private_default_methods() {
        let v = ClassVersion::JAVA_8;
        assert!(validate_method_flags(MethodAccessFlags::ACC_PRIVATE, true, v).is_ok());
        assert!(validate_method_flags(
            MethodAccessFlags::ACC_PUBLIC | MethodAccessFlags::ACC_PRIVATE,
            true,
            v
        )
        .is_err());
    }

    #[test]
    fn abstract_method_excludes_final() {
        let err = validate_method_flags(
            MethodAccessFlags::ACC_ABSTRACT | MethodAccessFlags::ACC_FINAL,
            false,
            ClassVersion::JAVA_8,
        )
        .unwrap_err();
        assert!(matches!(err, ClassFormatErrorKind::InvalidFlagMix { .. }));
    }
}
