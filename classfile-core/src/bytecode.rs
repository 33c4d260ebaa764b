//! Decodes and validates a `Code` attribute's instruction stream.
//!
//! Two passes: the first walks the raw bytes opcode by opcode, recording
//! every branch target (and `lookupswitch`/`tableswitch` match-offset pair)
//! as it goes; the second checks every recorded target actually lands on an
//! instruction boundary. Splitting the passes avoids forward-reference
//! bookkeeping — an early `goto` to a `pc` the decoder hasn't reached yet is
//! just another entry resolved once the full boundary set is known.

use std::collections::BTreeSet;

use classfile_model::class_file::ClassVersion;

use crate::context::Cx;
use crate::error::{ClassFormatErrorKind, Result};
use crate::opcode::{self, Operand, IINC, LOOKUPSWITCH, TABLESWITCH, WIDE};
use crate::options::ParseOptions;

struct BranchRef {
    source_pc: u32,
    offset: i32,
    target: i64,
}

/// The outcome of the decode pass: every instruction boundary (so the
/// resolve pass can check targets against it) plus every branch that needs
/// resolving.
struct DecodeResult {
    boundaries: BTreeSet<u32>,
    branches: Vec<BranchRef>,
}

/// Validate `code`, the raw `Code` attribute instruction bytes. Returns
/// `Ok(())` if every opcode is legal for `version`, every fixed and
/// variable-length operand is well-formed, every branch target lands on an
/// instruction boundary within `code`, every local variable index is below
/// `max_locals`, every constant pool index is in `1..constant_pool_count`,
/// and every `newarray` atype byte names a real primitive array type.
///
/// Errors report the offset `cx`'s reader is positioned at when `validate`
/// is called, not a per-instruction offset within `code` — callers invoke
/// this once the whole `code` array has already been consumed from `cx`.
#[tracing::instrument(level = "trace", skip(cx, code, options), fields(len = code.len()))]
pub fn validate(
    cx: &Cx,
    code: &[u8],
    version: ClassVersion,
    options: &ParseOptions,
    max_locals: u16,
    constant_pool_count: u16,
) -> Result<()> {
    let decoded = decode_pass(cx, code, version, options, max_locals, constant_pool_count)?;
    resolve_pass(cx, &decoded, code.len() as u32)
}

/// `newarray`'s atype byte, the JVM spec's `T_BOOLEAN`..`T_LONG` range.
const MIN_ATYPE: u8 = 4;
const MAX_ATYPE: u8 = 11;
const NEWARRAY: u8 = 0xBC;

fn decode_pass(
    cx: &Cx,
    code: &[u8],
    version: ClassVersion,
    options: &ParseOptions,
    max_locals: u16,
    constant_pool_count: u16,
) -> Result<DecodeResult> {
    let mut boundaries = BTreeSet::new();
    let mut branches = Vec::new();
    let mut pc: u32 = 0;
    let len = code.len() as u32;

    while pc < len {
        boundaries.insert(pc);
        let opcode = code[pc as usize];

        if opcode::is_reserved(opcode) {
            let mnemonic = opcode::info(opcode).map(|i| i.mnemonic).unwrap_or("?");
            return Err(cx.err(ClassFormatErrorKind::ReservedOpcode { mnemonic }));
        }

        match opcode {
            TABLESWITCH => {
                pc = decode_tableswitch(cx, code, pc, options, &mut branches)?;
            }
            LOOKUPSWITCH => {
                pc = decode_lookupswitch(cx, code, pc, options, &mut branches)?;
            }
            WIDE => {
                pc = decode_wide(cx, code, pc, max_locals)?;
            }
            _ => {
                let info = opcode::info(opcode)
                    .ok_or_else(|| cx.err(ClassFormatErrorKind::UnassignedOpcode(opcode)))?;
                if let Some(min_version) = info.min_version {
                    if version < min_version {
                        return Err(cx.err(ClassFormatErrorKind::OpcodeNotYetLegal {
                            mnemonic: info.mnemonic,
                            min_version,
                        }));
                    }
                }
                let operand_start = pc + 1;
                let operand_len = info.operand.fixed_len() as u32;
                require_bytes(cx, code, operand_start, operand_len)?;

                check_index_operands(
                    cx,
                    code,
                    opcode,
                    operand_start,
                    info.operand,
                    max_locals,
                    constant_pool_count,
                )?;

                if info.operand.is_branch() {
                    let offset = read_branch_offset(code, operand_start, info.operand);
                    branches.push(BranchRef {
                        source_pc: pc,
                        offset,
                        target: pc as i64 + offset as i64,
                    });
                }
                pc = operand_start + operand_len;
            }
        }
    }

    Ok(DecodeResult { boundaries, branches })
}

/// Range-checks the operand bytes `decode_pass` doesn't otherwise inspect:
/// local variable indices against `max_locals`, constant pool indices
/// against `constant_pool_count`, and `newarray`'s atype byte against the
/// primitive array type range.
fn check_index_operands(
    cx: &Cx,
    code: &[u8],
    opcode: u8,
    operand_start: u32,
    operand: Operand,
    max_locals: u16,
    constant_pool_count: u16,
) -> Result<()> {
    match operand {
        Operand::LocalIndexU8 => {
            let index = code[operand_start as usize] as u16;
            check_local_index(cx, index, max_locals)?;
        }
        Operand::IincOperands => {
            let index = code[operand_start as usize] as u16;
            check_local_index(cx, index, max_locals)?;
        }
        Operand::PoolIndexU8 => {
            let index = code[operand_start as usize] as u16;
            check_pool_index(cx, index, constant_pool_count)?;
        }
        Operand::PoolIndexU16
        | Operand::MultianewarrayOperands
        | Operand::InvokeInterfaceOperands
        | Operand::InvokeDynamicOperands => {
            let index = u16::from_be_bytes([code[operand_start as usize], code[operand_start as usize + 1]]);
            check_pool_index(cx, index, constant_pool_count)?;
        }
        Operand::U8 if opcode == NEWARRAY => {
            let atype = code[operand_start as usize];
            if !(MIN_ATYPE..=MAX_ATYPE).contains(&atype) {
                return Err(cx.err(ClassFormatErrorKind::InvalidNewarrayAtype(atype)));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_local_index(cx: &Cx, index: u16, max_locals: u16) -> Result<()> {
    if index >= max_locals {
        return Err(cx.err(ClassFormatErrorKind::LocalVariableIndexOutOfRange { index, max_locals }));
    }
    Ok(())
}

fn check_pool_index(cx: &Cx, index: u16, constant_pool_count: u16) -> Result<()> {
    if index == 0 || index >= constant_pool_count {
        return Err(cx.err(ClassFormatErrorKind::ConstantPoolIndexOutOfRange {
            index,
            count: constant_pool_count,
        }));
    }
    Ok(())
}

fn require_bytes(cx: &Cx, code: &[u8], start: u32, len: u32) -> Result<()> {
    if start as usize + len as usize > code.len() {
        return Err(cx.err(ClassFormatErrorKind::AttributeLengthMismatch {
            declared: code.len() as u32,
            consumed: start + len,
            detail: ": instruction operand runs past the end of the code array".to_string(),
        }));
    }
    Ok(())
}

fn read_branch_offset(code: &[u8], at: u32, operand: Operand) -> i32 {
    let at = at as usize;
    match operand {
        Operand::BranchS16 => i16::from_be_bytes([code[at], code[at + 1]]) as i32,
        Operand::BranchS32 => i32::from_be_bytes([code[at], code[at + 1], code[at + 2], code[at + 3]]),
        _ => unreachable!("only branch operand shapes carry an offset"),
    }
}

/// Padding bytes between the opcode and the first aligned operand: enough
/// zero bytes to bring the next read up to a 4-byte boundary relative to
/// the start of the method's code array.
fn padding_after_opcode(pc: u32) -> u32 {
    let after_opcode = pc + 1;
    (4 - (after_opcode % 4)) % 4
}

fn check_padding(cx: &Cx, code: &[u8], start: u32, len: u32, options: &ParseOptions) -> Result<()> {
    if !options.reject_switch_padding {
        return Ok(());
    }
    for i in 0..len {
        if code[(start + i) as usize] != 0 {
            return Err(cx.err(ClassFormatErrorKind::NonZeroSwitchPadding {
                context: "tableswitch/lookupswitch padding",
            }));
        }
    }
    Ok(())
}

fn decode_tableswitch(
    cx: &Cx,
    code: &[u8],
    pc: u32,
    options: &ParseOptions,
    branches: &mut Vec<BranchRef>,
) -> Result<u32> {
    let padding = padding_after_opcode(pc);
    let padding_start = pc + 1;
    require_bytes(cx, code, padding_start, padding)?;
    check_padding(cx, code, padding_start, padding, options)?;

    let mut cursor = padding_start + padding;
    require_bytes(cx, code, cursor, 12)?;
    let default_offset = read_i32(code, cursor);
    let low = read_i32(code, cursor + 4);
    let high = read_i32(code, cursor + 8);
    cursor += 12;

    if high < low {
        return Err(cx.err(ClassFormatErrorKind::TableswitchHighLessThanLow { low, high }));
    }

    branches.push(BranchRef {
        source_pc: pc,
        offset: default_offset,
        target: pc as i64 + default_offset as i64,
    });

    let count = (high - low + 1) as u32;
    require_bytes(cx, code, cursor, count * 4)?;
    for i in 0..count {
        let offset = read_i32(code, cursor + i * 4);
        branches.push(BranchRef {
            source_pc: pc,
            offset,
            target: pc as i64 + offset as i64,
        });
    }
    Ok(cursor + count * 4)
}

fn decode_lookupswitch(
    cx: &Cx,
    code: &[u8],
    pc: u32,
    options: &ParseOptions,
    branches: &mut Vec<BranchRef>,
) -> Result<u32> {
    let padding = padding_after_opcode(pc);
    let padding_start = pc + 1;
    require_bytes(cx, code, padding_start, padding)?;
    check_padding(cx, code, padding_start, padding, options)?;

    let mut cursor = padding_start + padding;
    require_bytes(cx, code, cursor, 8)?;
    let default_offset = read_i32(code, cursor);
    let npairs = read_i32(code, cursor + 4);
    if npairs < 0 {
        return Err(cx.err(ClassFormatErrorKind::NegativeLookupswitchCount(npairs)));
    }
    cursor += 8;

    branches.push(BranchRef {
        source_pc: pc,
        offset: default_offset,
        target: pc as i64 + default_offset as i64,
    });

    require_bytes(cx, code, cursor, npairs as u32 * 8)?;
    let mut previous_match: Option<i32> = None;
    for i in 0..npairs as u32 {
        let pair_start = cursor + i * 8;
        let match_value = read_i32(code, pair_start);
        let offset = read_i32(code, pair_start + 4);
        if let Some(previous) = previous_match {
            if match_value <= previous {
                return Err(cx.err(ClassFormatErrorKind::UnorderedLookupswitch {
                    previous,
                    next: match_value,
                }));
            }
        }
        previous_match = Some(match_value);
        branches.push(BranchRef {
            source_pc: pc,
            offset,
            target: pc as i64 + offset as i64,
        });
    }
    Ok(cursor + npairs as u32 * 8)
}

fn decode_wide(cx: &Cx, code: &[u8], pc: u32, max_locals: u16) -> Result<u32> {
    require_bytes(cx, code, pc + 1, 1)?;
    let target_opcode = code[pc as usize + 1];
    let operand = opcode::wide_target_operand(target_opcode).ok_or_else(|| {
        let mnemonic = opcode::info(target_opcode).map(|i| i.mnemonic).unwrap_or("?");
        cx.err(ClassFormatErrorKind::IllegalWideTarget { mnemonic })
    })?;

    // `wide` doubles the local-index operand to two bytes; `iinc` under
    // `wide` additionally doubles its constant to two bytes.
    let len: u32 = match operand {
        Operand::LocalIndexU8 => 2,
        Operand::IincOperands if target_opcode == IINC => 4,
        _ => unreachable!("wide_target_operand only returns these two shapes"),
    };
    let operand_start = pc + 2;
    require_bytes(cx, code, operand_start, len)?;
    let index = u16::from_be_bytes([code[operand_start as usize], code[operand_start as usize + 1]]);
    check_local_index(cx, index, max_locals)?;
    Ok(operand_start + len)
}

fn read_i32(code: &[u8], at: u32) -> i32 {
    let at = at as usize;
    i32::from_be_bytes([code[at], code[at + 1], code[at + 2], code[at + 3]])
}

fn resolve_pass(cx: &Cx, decoded: &DecodeResult, code_length: u32) -> Result<()> {
    for branch in &decoded.branches {
        if branch.target < 0 || branch.target >= code_length as i64 {
            return Err(cx.err(ClassFormatErrorKind::BranchTargetOutOfRange {
                source_pc: branch.source_pc,
                offset: branch.offset,
                target: branch.target,
                code_length,
            }));
        }
        let target = branch.target as u32;
        if !decoded.boundaries.contains(&target) {
            return Err(cx.err(ClassFormatErrorKind::BranchTargetMisaligned {
                source_pc: branch.source_pc,
                target,
            }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cx() -> Cx<'static> {
        Cx::new(&[], &ParseOptions::default())
    }

    /// Generous defaults for tests that aren't exercising the index checks
    /// themselves.
    const LOCALS: u16 = 10;
    const POOL: u16 = 10;

    #[test]
    fn accepts_a_trivial_method_body() {
        // iconst_0; ireturn
        let code = [0x03, 0xAC];
        validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap();
    }

    #[test]
    fn accepts_goto_to_self() {
        // goto 0 (infinite loop, but a legal boundary target)
        let code = [0xA7, 0x00, 0x00];
        validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap();
    }

    #[test]
    fn rejects_branch_target_out_of_range() {
        let code = [0xA7, 0x7F, 0xFF]; // goto +32767
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::BranchTargetOutOfRange { .. }));
    }

    #[test]
    fn rejects_branch_into_instruction_middle() {
        // goto +2 lands inside the sipush operand that follows.
        let code = [0xA7, 0x00, 0x02, 0x11, 0x00, 0x01];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::BranchTargetMisaligned { .. }));
    }

    #[test]
    fn rejects_unassigned_opcode() {
        let code = [0xD0];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::UnassignedOpcode(0xD0)));
    }

    #[test]
    fn rejects_reserved_opcode() {
        let code = [0xCA];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::ReservedOpcode { .. }));
    }

    #[test]
    fn tableswitch_rejects_high_less_than_low() {
        let mut code = vec![TABLESWITCH];
        code.extend_from_slice(&[0, 0, 0]); // padding to 4-byte boundary
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&5i32.to_be_bytes()); // low = 5
        code.extend_from_slice(&1i32.to_be_bytes()); // high = 1
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::TableswitchHighLessThanLow { .. }));
    }

    #[test]
    fn lookupswitch_rejects_unordered_pairs() {
        let mut code = vec![LOOKUPSWITCH];
        code.extend_from_slice(&[0, 0, 0]);
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&2i32.to_be_bytes()); // npairs = 2
        code.extend_from_slice(&5i32.to_be_bytes());
        code.extend_from_slice(&0i32.to_be_bytes());
        code.extend_from_slice(&1i32.to_be_bytes()); // out of order
        code.extend_from_slice(&0i32.to_be_bytes());
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::UnorderedLookupswitch { .. }));
    }

    #[test]
    fn invokedynamic_rejected_before_java7() {
        let mut code = vec![0xBA];
        code.extend_from_slice(&[0, 1, 0, 0]);
        let err = validate(&cx(), &code, ClassVersion::new(50, 0), &ParseOptions::default(), LOCALS, POOL)
            .unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::OpcodeNotYetLegal { .. }));
    }

    #[test]
    fn wide_iinc_consumes_four_operand_bytes() {
        // wide iinc #1, #300
        let mut code = vec![WIDE, IINC];
        code.extend_from_slice(&1u16.to_be_bytes());
        code.extend_from_slice(&300i16.to_be_bytes());
        code.push(0xB1); // return, to land on a real boundary after
        validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap();
    }

    #[test]
    fn wide_rejects_illegal_target_opcode() {
        let code = [WIDE, 0x00]; // wide nop is not a legal pairing
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::IllegalWideTarget { .. }));
    }

    #[test]
    fn rejects_local_index_at_or_past_max_locals() {
        // iload 3, but max_locals is 3 (valid indices are 0..=2)
        let code = [0x15, 0x03, 0xAC];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), 3, POOL).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::LocalVariableIndexOutOfRange { index: 3, max_locals: 3 }
        ));
    }

    #[test]
    fn rejects_wide_local_index_at_or_past_max_locals() {
        // wide iload #5, max_locals is 5
        let mut code = vec![WIDE, 0x15];
        code.extend_from_slice(&5u16.to_be_bytes());
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), 5, POOL).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::LocalVariableIndexOutOfRange { index: 5, max_locals: 5 }
        ));
    }

    #[test]
    fn rejects_pool_index_zero() {
        // ldc #0
        let code = [0x12, 0x00, 0xAC];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::ConstantPoolIndexOutOfRange { index: 0, count: POOL }
        ));
    }

    #[test]
    fn rejects_pool_index_past_constant_pool_count() {
        // getstatic #20, but the pool only has 5 slots
        let code = [0xB2, 0x00, 0x14, 0xAC];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, 5).unwrap_err();
        assert!(matches!(
            err.kind,
            ClassFormatErrorKind::ConstantPoolIndexOutOfRange { index: 20, count: 5 }
        ));
    }

    #[test]
    fn rejects_newarray_with_invalid_atype() {
        // bipush 10; newarray 99 (not a real atype)
        let code = [0x10, 0x0A, 0xBC, 0x63];
        let err =
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap_err();
        assert!(matches!(err.kind, ClassFormatErrorKind::InvalidNewarrayAtype(0x63)));
    }

    #[test]
    fn accepts_newarray_with_every_valid_atype() {
        for atype in MIN_ATYPE..=MAX_ATYPE {
            let code = [0x10, 0x0A, NEWARRAY, atype, 0x57, 0xB1];
            validate(&cx(), &code, ClassVersion::JAVA_8, &ParseOptions::default(), LOCALS, POOL).unwrap();
        }
    }
}
