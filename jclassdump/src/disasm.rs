//! Renders a `Code` attribute's instruction stream as text, one line per
//! instruction: `pc: mnemonic operand  // comment`. This is a display-only
//! walk over bytes the core crate has already validated; unlike
//! `classfile_core::bytecode::validate` it doesn't re-check branch targets,
//! it just prints them.

use classfile_core::opcode::{self, Operand, IINC, LOOKUPSWITCH, TABLESWITCH, WIDE};
use classfile_model::class_file::ClassFile;

use crate::render;

pub struct Line {
    pub pc: u32,
    pub text: String,
}

pub fn disassemble(code: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pc: u32 = 0;
    let len = code.len() as u32;

    while pc < len {
        let opcode = code[pc as usize];
        match opcode {
            TABLESWITCH => pc = tableswitch_line(code, pc, &mut lines),
            LOOKUPSWITCH => pc = lookupswitch_line(code, pc, &mut lines),
            WIDE => pc = wide_line(code, pc, &mut lines),
            _ => pc = plain_line(code, pc, &mut lines),
        }
    }
    lines
}

fn push(lines: &mut Vec<Line>, pc: u32, text: String) {
    lines.push(Line { pc, text });
}

fn plain_line(code: &[u8], pc: u32, lines: &mut Vec<Line>) -> u32 {
    let byte = code[pc as usize];
    let Some(info) = opcode::info(byte) else {
        push(lines, pc, format!("<unassigned opcode {byte:#04x}>"));
        return pc + 1;
    };
    let operand_start = (pc + 1) as usize;
    let operand_len = info.operand.fixed_len();
    if operand_start + operand_len > code.len() {
        push(lines, pc, format!("{} <truncated>", info.mnemonic));
        return pc + 1 + operand_len as u32;
    }
    let text = match info.operand {
        Operand::None => info.mnemonic.to_string(),
        Operand::U8 | Operand::LocalIndexU8 => {
            format!("{} {}", info.mnemonic, code[operand_start])
        }
        Operand::S16 => {
            let v = i16::from_be_bytes([code[operand_start], code[operand_start + 1]]);
            format!("{} {}", info.mnemonic, v)
        }
        Operand::PoolIndexU8 => format!("{} #{}", info.mnemonic, code[operand_start]),
        Operand::PoolIndexU16 => {
            let index = u16::from_be_bytes([code[operand_start], code[operand_start + 1]]);
            format!("{} #{}", info.mnemonic, index)
        }
        Operand::BranchS16 => {
            let offset = i16::from_be_bytes([code[operand_start], code[operand_start + 1]]) as i32;
            format!("{} {}", info.mnemonic, pc as i32 + offset)
        }
        Operand::BranchS32 => {
            let offset = i32::from_be_bytes([
                code[operand_start],
                code[operand_start + 1],
                code[operand_start + 2],
                code[operand_start + 3],
            ]);
            format!("{} {}", info.mnemonic, pc as i32 + offset)
        }
        Operand::IincOperands => {
            let inc = code[operand_start + 1] as i8;
            format!("{} {}, {}", info.mnemonic, code[operand_start], inc)
        }
        Operand::MultianewarrayOperands => {
            let index = u16::from_be_bytes([code[operand_start], code[operand_start + 1]]);
            format!(
                "{} #{}, {}",
                info.mnemonic,
                index,
                code[operand_start + 2]
            )
        }
        Operand::InvokeInterfaceOperands => {
            let index = u16::from_be_bytes([code[operand_start], code[operand_start + 1]]);
            format!("{} #{}, {}", info.mnemonic, index, code[operand_start + 2])
        }
        Operand::InvokeDynamicOperands => {
            let index = u16::from_be_bytes([code[operand_start], code[operand_start + 1]]);
            format!("{} #{}", info.mnemonic, index)
        }
    };
    push(lines, pc, text);
    pc + 1 + operand_len as u32
}

fn padding_after_opcode(pc: u32) -> u32 {
    (4 - ((pc + 1) % 4)) % 4
}

fn read_i32(code: &[u8], at: u32) -> i32 {
    let at = at as usize;
    i32::from_be_bytes([code[at], code[at + 1], code[at + 2], code[at + 3]])
}

fn tableswitch_line(code: &[u8], pc: u32, lines: &mut Vec<Line>) -> u32 {
    let mut cursor = pc + 1 + padding_after_opcode(pc);
    let default_offset = read_i32(code, cursor);
    let low = read_i32(code, cursor + 4);
    let high = read_i32(code, cursor + 8);
    cursor += 12;
    let mut text = format!(
        "tableswitch {{ // {low} to {high}\n      default: {}",
        pc as i64 + default_offset as i64
    );
    for i in 0..(high - low + 1).max(0) as u32 {
        let offset = read_i32(code, cursor + i * 4);
        text.push_str(&format!(
            "\n      {}: {}",
            low + i as i32,
            pc as i64 + offset as i64
        ));
    }
    text.push_str("\n    }");
    push(lines, pc, text);
    cursor + (high - low + 1).max(0) as u32 * 4
}

fn lookupswitch_line(code: &[u8], pc: u32, lines: &mut Vec<Line>) -> u32 {
    let mut cursor = pc + 1 + padding_after_opcode(pc);
    let default_offset = read_i32(code, cursor);
    let npairs = read_i32(code, cursor + 4).max(0) as u32;
    cursor += 8;
    let mut text = format!(
        "lookupswitch {{ // {npairs} pairs\n      default: {}",
        pc as i64 + default_offset as i64
    );
    for i in 0..npairs {
        let match_value = read_i32(code, cursor + i * 8);
        let offset = read_i32(code, cursor + i * 8 + 4);
        text.push_str(&format!(
            "\n      {}: {}",
            match_value,
            pc as i64 + offset as i64
        ));
    }
    text.push_str("\n    }");
    push(lines, pc, text);
    cursor + npairs * 8
}

fn wide_line(code: &[u8], pc: u32, lines: &mut Vec<Line>) -> u32 {
    let target_opcode = code[pc as usize + 1];
    let mnemonic = opcode::info(target_opcode).map(|i| i.mnemonic).unwrap_or("?");
    if target_opcode == IINC {
        let index = u16::from_be_bytes([code[pc as usize + 2], code[pc as usize + 3]]);
        let inc = i16::from_be_bytes([code[pc as usize + 4], code[pc as usize + 5]]);
        push(lines, pc, format!("wide {mnemonic} {index}, {inc}"));
        pc + 6
    } else {
        let index = u16::from_be_bytes([code[pc as usize + 2], code[pc as usize + 3]]);
        push(lines, pc, format!("wide {mnemonic} {index}"));
        pc + 4
    }
}

/// Appends a `// <kind> Name.member:descriptor` comment for the constant
/// pool entry a `PoolIndex*`-shaped operand referred to, when it's a member
/// reference the reader would want resolved.
pub fn resolve_comment(class: &ClassFile, pool_index: u16) -> Option<String> {
    use classfile_model::constant_pool::ConstantPoolEntry;
    let entry = class.constant_pool.get(pool_index as usize)?.as_ref()?;
    let (kind, class_index, nat_index) = match entry {
        ConstantPoolEntry::Methodref {
            class_index,
            name_and_type_index,
        } => ("Method", *class_index, *name_and_type_index),
        ConstantPoolEntry::Fieldref {
            class_index,
            name_and_type_index,
        } => ("Field", *class_index, *name_and_type_index),
        ConstantPoolEntry::InterfaceMethodref {
            class_index,
            name_and_type_index,
        } => ("InterfaceMethod", *class_index, *name_and_type_index),
        _ => return None,
    };
    let owner = render::class_name_at(class, class_index)?;
    let (name, descriptor) = render::name_and_type_at(class, nat_index)?;
    Some(format!("// {kind} {owner}.{name}:{descriptor}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_a_trivial_return_sequence() {
        let code = [0x03, 0xAC]; // iconst_0; ireturn
        let lines = disassemble(&code);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "iconst_0");
        assert_eq!(lines[1].text, "ireturn");
    }

    #[test]
    fn disassembles_goto_with_resolved_target() {
        let code = [0xA7, 0x00, 0x03, 0x00, 0x03, 0xAC]; // goto 3; nop; nop; ireturn
        let lines = disassemble(&code);
        assert_eq!(lines[0].text, "goto 3");
    }

    #[test]
    fn disassembles_sipush_with_signed_operand() {
        let code = [0x11, 0xFF, 0xFF]; // sipush -1
        let lines = disassemble(&code);
        assert_eq!(lines[0].text, "sipush -1");
    }
}
