//! Attribute decoding: dispatches on the constant-pool metadata's
//! classification of `attribute_name_index`, parses the matching predefined
//! shape (or falls back to a raw byte blob), and checks the decoded body
//! consumed exactly `attribute_length` bytes.

use classfile_model::attribute::*;
use classfile_model::class_file::ClassVersion;
use classfile_model::flags::{
    InnerClassAccessFlags, MethodParameterAccessFlags, ModuleExportsOpensFlags, ModuleFlags,
    ModuleRequiresFlags,
};

use crate::bytecode;
use crate::constant_pool::ConstantPool;
use crate::context::{Cx, ScopedFrame};
use crate::cp_metadata::AttributeTypeError;
use crate::error::{ClassFormatErrorKind, Result};
use crate::options::ParseOptions;

struct Env<'p, 'o> {
    pool: &'p ConstantPool,
    options: &'o ParseOptions,
    version: ClassVersion,
}

pub fn decode_attributes(
    cx: &mut Cx,
    pool: &ConstantPool,
    context_mask: u32,
    options: &ParseOptions,
    version: ClassVersion,
) -> Result<Vec<AttributeInfo>> {
    let env = Env { pool, options, version };
    let count = cx.u2("attributes_count")?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "attributes", i as usize);
        out.push(decode_one(cx, &env, context_mask)?);
    }
    Ok(out)
}

fn decode_one(cx: &mut Cx, env: &Env, context_mask: u32) -> Result<AttributeInfo> {
    let name_index = cx.u2("attribute_name_index")?;
    let attribute_length = cx.u4("attribute_length")?;
    let start = cx.reader.position();

    let resolved = env
        .pool
        .metadata
        .attribute_type_at(name_index, context_mask)
        .map_err(|e| match e {
            AttributeTypeError::Slot(_) => cx.err(ClassFormatErrorKind::ConstantPoolIndexOutOfRange {
                index: name_index,
                count: env.pool.count(),
            }),
            AttributeTypeError::NotUtf8(found) => {
                cx.err(ClassFormatErrorKind::MismatchedConstantPoolTag {
                    index: name_index,
                    expected: "Utf8",
                    found: found.name(),
                })
            }
        })?;

    let attribute = match resolved {
        Some(attribute_type) => {
            let _frame = ScopedFrame::new(&mut cx.stack, attribute_type.name());
            decode_body(cx, env, attribute_type)?
        }
        None => {
            let info = cx.bytes(attribute_length as usize, "info")?.to_vec();
            AttributeInfo::Raw(RawAttribute { name_index, info })
        }
    };

    let consumed = (cx.reader.position() - start) as u32;
    if consumed != attribute_length {
        return Err(cx.err(ClassFormatErrorKind::AttributeLengthMismatch {
            declared: attribute_length,
            consumed,
            detail: String::new(),
        }));
    }
    Ok(attribute)
}

fn decode_body(cx: &mut Cx, env: &Env, attribute_type: AttributeType) -> Result<AttributeInfo> {
    Ok(match attribute_type {
        AttributeType::ConstantValue => AttributeInfo::ConstantValue(ConstantValue {
            constantvalue_index: cx.u2("constantvalue_index")?,
        }),
        AttributeType::Code => AttributeInfo::Code(decode_code(cx, env)?),
        AttributeType::StackMapTable => AttributeInfo::StackMapTable(decode_stack_map_table(cx)?),
        AttributeType::Exceptions => {
            let count = cx.u2("number_of_exceptions")?;
            let mut table = Vec::with_capacity(count as usize);
            for _ in 0..count {
                table.push(cx.u2("exception_index_table")?);
            }
            AttributeInfo::Exceptions(Exceptions(table))
        }
        AttributeType::InnerClasses => {
            let count = cx.u2("number_of_classes")?;
            let mut classes = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let inner_class_info_index = cx.u2("inner_class_info_index")?;
                let outer_class_info_index = non_zero(cx.u2("outer_class_info_index")?);
                let inner_name_index = non_zero(cx.u2("inner_name_index")?);
                let inner_class_access_flags =
                    InnerClassAccessFlags::from_bits_truncate(cx.u2("inner_class_access_flags")?);
                classes.push(InnerClassEntry {
                    inner_class_info_index,
                    outer_class_info_index,
                    inner_name_index,
                    inner_class_access_flags,
                });
            }
            AttributeInfo::InnerClasses(InnerClasses(classes))
        }
        AttributeType::EnclosingMethod => AttributeInfo::EnclosingMethod(EnclosingMethod {
            class_index: cx.u2("class_index")?,
            method_index: non_zero(cx.u2("method_index")?),
        }),
        AttributeType::Synthetic => AttributeInfo::Synthetic,
        AttributeType::Signature => AttributeInfo::Signature(Signature {
            signature_index: cx.u2("signature_index")?,
        }),
        AttributeType::SourceFile => AttributeInfo::SourceFile(SourceFile {
            sourcefile_index: cx.u2("sourcefile_index")?,
        }),
        AttributeType::SourceDebugExtension => {
            // The remaining bytes of this attribute are the whole payload;
            // there is no separate count prefix, only attribute_length.
            let remaining = cx.reader.remaining();
            let debug_extension = cx.bytes(remaining, "debug_extension")?.to_vec();
            AttributeInfo::SourceDebugExtension(SourceDebugExtension { debug_extension })
        }
        AttributeType::LineNumberTable => {
            let count = cx.u2("line_number_table_length")?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LineNumberEntry {
                    start_pc: cx.u2("start_pc")?,
                    line_number: cx.u2("line_number")?,
                });
            }
            AttributeInfo::LineNumberTable(LineNumberTable(entries))
        }
        AttributeType::LocalVariableTable => {
            let count = cx.u2("local_variable_table_length")?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableEntry {
                    start_pc: cx.u2("start_pc")?,
                    length: cx.u2("length")?,
                    name_index: cx.u2("name_index")?,
                    descriptor_index: cx.u2("descriptor_index")?,
                    index: cx.u2("index")?,
                });
            }
            AttributeInfo::LocalVariableTable(LocalVariableTable(entries))
        }
        AttributeType::LocalVariableTypeTable => {
            let count = cx.u2("local_variable_type_table_length")?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableTypeEntry {
                    start_pc: cx.u2("start_pc")?,
                    length: cx.u2("length")?,
                    name_index: cx.u2("name_index")?,
                    signature_index: cx.u2("signature_index")?,
                    index: cx.u2("index")?,
                });
            }
            AttributeInfo::LocalVariableTypeTable(LocalVariableTypeTable(entries))
        }
        AttributeType::Deprecated => AttributeInfo::Deprecated,
        AttributeType::RuntimeVisibleAnnotations => AttributeInfo::RuntimeVisibleAnnotations(
            RuntimeVisibleAnnotations(decode_annotations(cx, env, 0)?),
        ),
        AttributeType::RuntimeInvisibleAnnotations => AttributeInfo::RuntimeInvisibleAnnotations(
            RuntimeInvisibleAnnotations(decode_annotations(cx, env, 0)?),
        ),
        AttributeType::RuntimeVisibleParameterAnnotations => {
            AttributeInfo::RuntimeVisibleParameterAnnotations(RuntimeVisibleParameterAnnotations(
                decode_parameter_annotations(cx, env)?,
            ))
        }
        AttributeType::RuntimeInvisibleParameterAnnotations => {
            AttributeInfo::RuntimeInvisibleParameterAnnotations(RuntimeInvisibleParameterAnnotations(
                decode_parameter_annotations(cx, env)?,
            ))
        }
        AttributeType::RuntimeVisibleTypeAnnotations => AttributeInfo::RuntimeVisibleTypeAnnotations(
            RuntimeVisibleTypeAnnotations(decode_type_annotations(cx, env)?),
        ),
        AttributeType::RuntimeInvisibleTypeAnnotations => AttributeInfo::RuntimeInvisibleTypeAnnotations(
            RuntimeInvisibleTypeAnnotations(decode_type_annotations(cx, env)?),
        ),
        AttributeType::AnnotationDefault => {
            AttributeInfo::AnnotationDefault(AnnotationDefault(decode_element_value(cx, env, 0)?))
        }
        AttributeType::BootstrapMethods => {
            let count = cx.u2("num_bootstrap_methods")?;
            let mut methods = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let bootstrap_method_ref = cx.u2("bootstrap_method_ref")?;
                let argc = cx.u2("num_bootstrap_arguments")?;
                let mut bootstrap_arguments = Vec::with_capacity(argc as usize);
                for _ in 0..argc {
                    bootstrap_arguments.push(cx.u2("bootstrap_arguments")?);
                }
                methods.push(BootstrapMethodEntry {
                    bootstrap_method_ref,
                    bootstrap_arguments,
                });
            }
            AttributeInfo::BootstrapMethods(BootstrapMethods(methods))
        }
        AttributeType::MethodParameters => {
            let count = cx.u1("parameters_count")?;
            let mut parameters = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let name_index = non_zero(cx.u2("name_index")?);
                let access_flags =
                    MethodParameterAccessFlags::from_bits_truncate(cx.u2("access_flags")?);
                parameters.push(MethodParameterEntry { name_index, access_flags });
            }
            AttributeInfo::MethodParameters(MethodParameters(parameters))
        }
        AttributeType::Module => AttributeInfo::Module(decode_module(cx)?),
        AttributeType::ModulePackages => {
            let count = cx.u2("package_count")?;
            let mut packages = Vec::with_capacity(count as usize);
            for _ in 0..count {
                packages.push(cx.u2("package_index")?);
            }
            AttributeInfo::ModulePackages(ModulePackages(packages))
        }
        AttributeType::ModuleMainClass => AttributeInfo::ModuleMainClass(ModuleMainClass {
            main_class_index: cx.u2("main_class_index")?,
        }),
    })
}

fn non_zero(value: u16) -> Option<u16> {
    (value != 0).then_some(value)
}

fn decode_code(cx: &mut Cx, env: &Env) -> Result<Code> {
    let max_stack = cx.u2("max_stack")?;
    let max_locals = cx.u2("max_locals")?;
    let code_length = cx.u4("code_length")?;
    let code = cx.bytes(code_length as usize, "code")?.to_vec();
    bytecode::validate(cx, &code, env.version, env.options, max_locals, env.pool.count())?;

    let exception_table_length = cx.u2("exception_table_length")?;
    let mut exception_table = Vec::with_capacity(exception_table_length as usize);
    for _ in 0..exception_table_length {
        exception_table.push(ExceptionTableEntry {
            start_pc: cx.u2("start_pc")?,
            end_pc: cx.u2("end_pc")?,
            handler_pc: cx.u2("handler_pc")?,
            catch_type: non_zero(cx.u2("catch_type")?),
        });
    }

    let attributes = decode_attributes(
        cx,
        env.pool,
        classfile_model::attribute::context::CODE,
        env.options,
        env.version,
    )?;

    Ok(Code {
        max_stack,
        max_locals,
        code,
        exception_table,
        attributes,
    })
}

fn decode_verification_type(cx: &mut Cx) -> Result<VerificationTypeInfo> {
    let tag = cx.u1("tag")?;
    Ok(match tag {
        0 => VerificationTypeInfo::Top,
        1 => VerificationTypeInfo::Integer,
        2 => VerificationTypeInfo::Float,
        3 => VerificationTypeInfo::Double,
        4 => VerificationTypeInfo::Long,
        5 => VerificationTypeInfo::Null,
        6 => VerificationTypeInfo::UninitializedThis,
        7 => VerificationTypeInfo::Object {
            constant_pool_index: cx.u2("cpool_index")?,
        },
        8 => VerificationTypeInfo::Uninitialized {
            offset: cx.u2("offset")?,
        },
        other => return Err(cx.err(ClassFormatErrorKind::InvalidVerificationTypeTag(other))),
    })
}

fn decode_stack_map_table(cx: &mut Cx) -> Result<StackMapTable> {
    let count = cx.u2("number_of_entries")?;
    let mut frames = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "entries", i as usize);
        let frame_type = cx.u1("frame_type")?;
        frames.push(match frame_type {
            0..=63 => StackMapFrame::Same {
                offset_delta: frame_type as u16,
            },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                offset_delta: (frame_type - 64) as u16,
                stack: decode_verification_type(cx)?,
            },
            128..=246 => return Err(cx.err(ClassFormatErrorKind::ReservedFrameType(frame_type))),
            247 => StackMapFrame::SameLocals1StackItemExtended {
                offset_delta: cx.u2("offset_delta")?,
                stack: decode_verification_type(cx)?,
            },
            248..=250 => StackMapFrame::Chop {
                offset_delta: cx.u2("offset_delta")?,
                chopped_locals: 251 - frame_type,
            },
            251 => StackMapFrame::SameExtended {
                offset_delta: cx.u2("offset_delta")?,
            },
            252..=254 => {
                let offset_delta = cx.u2("offset_delta")?;
                let n = (frame_type - 251) as usize;
                let mut locals = Vec::with_capacity(n);
                for _ in 0..n {
                    locals.push(decode_verification_type(cx)?);
                }
                StackMapFrame::Append { offset_delta, locals }
            }
            255 => {
                let offset_delta = cx.u2("offset_delta")?;
                let locals_count = cx.u2("number_of_locals")?;
                let mut locals = Vec::with_capacity(locals_count as usize);
                for _ in 0..locals_count {
                    locals.push(decode_verification_type(cx)?);
                }
                let stack_count = cx.u2("number_of_stack_items")?;
                let mut stack = Vec::with_capacity(stack_count as usize);
                for _ in 0..stack_count {
                    stack.push(decode_verification_type(cx)?);
                }
                StackMapFrame::Full { offset_delta, locals, stack }
            }
        });
    }
    Ok(StackMapTable(frames))
}

fn check_depth(cx: &Cx, env: &Env, depth: u32) -> Result<()> {
    if depth > env.options.max_annotation_depth {
        return Err(cx.err(ClassFormatErrorKind::AnnotationNestingTooDeep {
            limit: env.options.max_annotation_depth,
        }));
    }
    Ok(())
}

fn decode_element_value(cx: &mut Cx, env: &Env, depth: u32) -> Result<ElementValue> {
    check_depth(cx, env, depth)?;
    let tag_byte = cx.u1("tag")?;
    let tag = tag_byte as char;
    Ok(match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' => ElementValue::Const {
            tag,
            const_value_index: cx.u2("const_value_index")?,
        },
        'e' => ElementValue::Enum {
            type_name_index: cx.u2("type_name_index")?,
            const_name_index: cx.u2("const_name_index")?,
        },
        'c' => ElementValue::Class {
            class_info_index: cx.u2("class_info_index")?,
        },
        '@' => ElementValue::Annotation(Box::new(decode_annotation(cx, env, depth + 1)?)),
        '[' => {
            let count = cx.u2("num_values")?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(decode_element_value(cx, env, depth + 1)?);
            }
            ElementValue::Array(values)
        }
        other => return Err(cx.err(ClassFormatErrorKind::InvalidElementValueTag(other))),
    })
}

fn decode_annotation(cx: &mut Cx, env: &Env, depth: u32) -> Result<Annotation> {
    let type_index = cx.u2("type_index")?;
    let count = cx.u2("num_element_value_pairs")?;
    let mut element_value_pairs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let element_name_index = cx.u2("element_name_index")?;
        let value = decode_element_value(cx, env, depth)?;
        element_value_pairs.push(ElementValuePair { element_name_index, value });
    }
    Ok(Annotation { type_index, element_value_pairs })
}

fn decode_annotations(cx: &mut Cx, env: &Env, depth: u32) -> Result<Vec<Annotation>> {
    let count = cx.u2("num_annotations")?;
    let mut annotations = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "annotations", i as usize);
        annotations.push(decode_annotation(cx, env, depth)?);
    }
    Ok(annotations)
}

fn decode_parameter_annotations(cx: &mut Cx, env: &Env) -> Result<Vec<ParameterAnnotations>> {
    // `num_parameters` is a single byte, unlike every other annotation count.
    let count = cx.u1("num_parameters")?;
    let mut parameters = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "parameter_annotations", i as usize);
        parameters.push(ParameterAnnotations(decode_annotations(cx, env, 0)?));
    }
    Ok(parameters)
}

fn decode_type_path(cx: &mut Cx) -> Result<TypePath> {
    let length = cx.u1("path_length")?;
    let mut entries = Vec::with_capacity(length as usize);
    for _ in 0..length {
        let type_path_kind = cx.u1("type_path_kind")?;
        if type_path_kind > 3 {
            return Err(cx.err(ClassFormatErrorKind::InvalidTypePathKind(type_path_kind)));
        }
        entries.push(TypePathEntry {
            type_path_kind,
            type_argument_index: cx.u1("type_argument_index")?,
        });
    }
    Ok(TypePath(entries))
}

fn decode_target_info(cx: &mut Cx, target_type: u8) -> Result<TargetInfo> {
    Ok(match target_type {
        0x00 | 0x01 => TargetInfo::TypeParameter {
            type_parameter_index: cx.u1("type_parameter_index")?,
        },
        0x10 => TargetInfo::Offset {
            offset: cx.u2("supertype_index")?,
        },
        0x11 | 0x12 => TargetInfo::TypeParameterBound {
            type_parameter_index: cx.u1("type_parameter_index")?,
            bound_index: cx.u1("bound_index")?,
        },
        0x13..=0x15 => TargetInfo::Empty,
        0x16 => TargetInfo::FormalParameter {
            formal_parameter_index: cx.u1("formal_parameter_index")?,
        },
        0x17 => TargetInfo::Offset {
            offset: cx.u2("throws_type_index")?,
        },
        0x40 | 0x41 => {
            let count = cx.u2("table_length")?;
            let mut table = Vec::with_capacity(count as usize);
            for _ in 0..count {
                table.push(LocalVarTargetEntry {
                    start_pc: cx.u2("start_pc")?,
                    length: cx.u2("length")?,
                    index: cx.u2("index")?,
                });
            }
            TargetInfo::LocalVar { table }
        }
        0x42 => TargetInfo::Offset {
            offset: cx.u2("exception_table_index")?,
        },
        0x43..=0x46 => TargetInfo::Offset {
            offset: cx.u2("offset")?,
        },
        0x47..=0x4B => TargetInfo::TypeArgument {
            offset: cx.u2("offset")?,
            type_argument_index: cx.u1("type_argument_index")?,
        },
        other => return Err(cx.err(ClassFormatErrorKind::InvalidTargetType(other))),
    })
}

fn decode_type_annotations(cx: &mut Cx, env: &Env) -> Result<Vec<TypeAnnotation>> {
    let count = cx.u2("num_annotations")?;
    let mut annotations = Vec::with_capacity(count as usize);
    for i in 0..count {
        let _frame = ScopedFrame::new_indexed(&mut cx.stack, "type_annotations", i as usize);
        let target_type = cx.u1("target_type")?;
        let target_info = decode_target_info(cx, target_type)?;
        let target_path = decode_type_path(cx)?;
        let type_index = cx.u2("type_index")?;
        let pair_count = cx.u2("num_element_value_pairs")?;
        let mut element_value_pairs = Vec::with_capacity(pair_count as usize);
        for _ in 0..pair_count {
            let element_name_index = cx.u2("element_name_index")?;
            let value = decode_element_value(cx, env, 0)?;
            element_value_pairs.push(ElementValuePair { element_name_index, value });
        }
        annotations.push(TypeAnnotation {
            target_type,
            target_info,
            target_path,
            type_index,
            element_value_pairs,
        });
    }
    Ok(annotations)
}

fn decode_module(cx: &mut Cx) -> Result<Module> {
    let name_index = cx.u2("module_name_index")?;
    let flags = ModuleFlags::from_bits_truncate(cx.u2("module_flags")?);
    let version_index = non_zero(cx.u2("module_version_index")?);

    let requires_count = cx.u2("requires_count")?;
    let mut requires = Vec::with_capacity(requires_count as usize);
    for _ in 0..requires_count {
        requires.push(ModuleRequiresEntry {
            requires_index: cx.u2("requires_index")?,
            requires_flags: ModuleRequiresFlags::from_bits_truncate(cx.u2("requires_flags")?),
            requires_version_index: non_zero(cx.u2("requires_version_index")?),
        });
    }

    let exports_count = cx.u2("exports_count")?;
    let mut exports = Vec::with_capacity(exports_count as usize);
    for _ in 0..exports_count {
        let exports_index = cx.u2("exports_index")?;
        let exports_flags = ModuleExportsOpensFlags::from_bits_truncate(cx.u2("exports_flags")?);
        let to_count = cx.u2("exports_to_count")?;
        let mut exports_to = Vec::with_capacity(to_count as usize);
        for _ in 0..to_count {
            exports_to.push(cx.u2("exports_to_index")?);
        }
        exports.push(ModuleExportsEntry {
            exports_index,
            exports_flags,
            exports_to,
        });
    }

    let opens_count = cx.u2("opens_count")?;
    let mut opens = Vec::with_capacity(opens_count as usize);
    for _ in 0..opens_count {
        let opens_index = cx.u2("opens_index")?;
        let opens_flags = ModuleExportsOpensFlags::from_bits_truncate(cx.u2("opens_flags")?);
        let to_count = cx.u2("opens_to_count")?;
        let mut opens_to = Vec::with_capacity(to_count as usize);
        for _ in 0..to_count {
            opens_to.push(cx.u2("opens_to_index")?);
        }
        opens.push(ModuleOpensEntry {
            opens_index,
            opens_flags,
            opens_to,
        });
    }

    let uses_count = cx.u2("uses_count")?;
    let mut uses = Vec::with_capacity(uses_count as usize);
    for _ in 0..uses_count {
        uses.push(cx.u2("uses_index")?);
    }

    let provides_count = cx.u2("provides_count")?;
    let mut provides = Vec::with_capacity(provides_count as usize);
    for _ in 0..provides_count {
        let provides_index = cx.u2("provides_index")?;
        let with_count = cx.u2("provides_with_count")?;
        let mut provides_with = Vec::with_capacity(with_count as usize);
        for _ in 0..with_count {
            provides_with.push(cx.u2("provides_with_index")?);
        }
        provides.push(ModuleProvidesEntry {
            provides_index,
            provides_with,
        });
    }

    Ok(Module {
        name_index,
        flags,
        version_index,
        requires,
        exports,
        opens,
        uses,
        provides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_pool;

    fn pool_with_utf8(name: &'static str) -> ConstantPool {
        let mut data = vec![1u8, 0, name.len() as u8];
        data.extend_from_slice(name.as_bytes());
        let leaked: &'static [u8] = Box::leak(data.into_boxed_slice());
        let mut cx = Cx::new(leaked, &ParseOptions::default());
        constant_pool::decode(&mut cx, 2).unwrap()
    }

    #[test]
    fn decodes_deprecated_attribute_with_zero_length() {
        let pool = pool_with_utf8("Deprecated");
        let data = [0x00, 0x01, 0, 0, 0, 0]; // name_index=1, length=0
        let mut cx = Cx::new(&data, &ParseOptions::default());
        let options = ParseOptions::default();
        let env = Env {
            pool: &pool,
            options: &options,
            version: ClassVersion::JAVA_8,
        };
        let attr = decode_one(&mut cx, &env, classfile_model::attribute::context::CLASS_FILE).unwrap();
        assert_eq!(attr, AttributeInfo::Deprecated);
    }

    #[test]
    fn unknown_attribute_name_falls_back_to_raw() {
        let pool = pool_with_utf8("TotallyMadeUp");
        let data = [0x00, 0x01, 0, 0, 0, 2, 0xAB, 0xCD];
        let mut cx = Cx::new(&data, &ParseOptions::default());
        let options = ParseOptions::default();
        let env = Env {
            pool: &pool,
            options: &options,
            version: ClassVersion::JAVA_8,
        };
        let attr = decode_one(&mut cx, &env, classfile_model::attribute::context::CLASS_FILE).unwrap();
        match attr {
            AttributeInfo::Raw(RawAttribute { info, .. }) => assert_eq!(info, vec![0xAB, 0xCD]),
            other => panic!("expected Raw, got {other:?}"),
        }
    }

    #[test]
    fn attribute_length_mismatch_is_rejected() {
        let pool = pool_with_utf8("Deprecated");
        // declares length 1 but Deprecated has no body
        let data = [0x00, 0x01, 0, 0, 0, 1, 0xFF];
        let mut cx = Cx::new(&data, &ParseOptions::default());
        let options = ParseOptions::default();
        let env = Env {
            pool: &pool,
            options: &options,
            version: ClassVersion::JAVA_8,
        };
        let err = decode_one(&mut cx, &env, classfile_model::attribute::context::CLASS_FILE).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::AttributeLengthMismatch { .. }));
    }

    #[test]
    fn annotation_nesting_beyond_limit_is_rejected() {
        let pool = pool_with_utf8("RuntimeVisibleAnnotations");
        // one annotation with one element_value_pair whose value is itself an
        // annotation, nested deeper than a limit of 0 allows.
        let data = [
            0x00, 0x01, // name_index
            0, 0, 0, 0, // attribute_length placeholder, fixed below
            0, 1, // num_annotations
            0, 1, // type_index
            0, 1, // num_element_value_pairs
            0, 1, // element_name_index
            b'@', // nested annotation
            0, 1, 0, 0, // nested annotation type_index + num_element_value_pairs=0
        ];
        let mut cx = Cx::new(&data, &ParseOptions::default());
        let mut options = ParseOptions::default();
        options.max_annotation_depth = 0;
        let env = Env {
            pool: &pool,
            options: &options,
            version: ClassVersion::JAVA_8,
        };
        let err = decode_one(&mut cx, &env, classfile_model::attribute::context::CLASS_FILE).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::AnnotationNestingTooDeep { .. }));
    }
}
