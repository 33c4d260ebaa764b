//! Per-opcode metadata: mnemonic, operand shape, and version gating.
//!
//! A flat, addressable table keyed by the opcode byte, so the bytecode
//! decoder below doesn't need a giant match on the mnemonic to know how
//! many operand bytes follow. `tableswitch`, `lookupswitch`, and `wide`
//! aren't representable as a fixed operand shape (their length depends on
//! the bytes themselves) and are handled directly by the decoder instead.

use classfile_model::class_file::ClassVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    /// A raw unsigned byte immediate (`newarray`'s `atype`).
    U8,
    /// A raw signed 16-bit immediate (`sipush`).
    S16,
    /// One-byte constant pool index (`ldc`).
    PoolIndexU8,
    /// Two-byte constant pool index.
    PoolIndexU16,
    /// One-byte local variable slot index.
    LocalIndexU8,
    /// Signed 16-bit branch offset, relative to the instruction's own `pc`.
    BranchS16,
    /// Signed 32-bit branch offset (the `_w` wide-branch family).
    BranchS32,
    /// `iinc`: local index (u8) then signed byte increment.
    IincOperands,
    /// `multianewarray`: two-byte pool index then one-byte dimension count.
    MultianewarrayOperands,
    /// `invokeinterface`: two-byte pool index, one-byte argument count, one
    /// zero byte.
    InvokeInterfaceOperands,
    /// `invokedynamic`: two-byte pool index, two zero bytes.
    InvokeDynamicOperands,
}

impl Operand {
    /// Bytes following the opcode byte itself. Only meaningful for shapes
    /// that aren't variable-length (`tableswitch`/`lookupswitch`/`wide` are
    /// handled outside this table).
    pub const fn fixed_len(self) -> usize {
        match self {
            Operand::None => 0,
            Operand::U8 => 1,
            Operand::S16 => 2,
            Operand::PoolIndexU8 => 1,
            Operand::PoolIndexU16 => 2,
            Operand::LocalIndexU8 => 1,
            Operand::BranchS16 => 2,
            Operand::BranchS32 => 4,
            Operand::IincOperands => 2,
            Operand::MultianewarrayOperands => 3,
            Operand::InvokeInterfaceOperands => 4,
            Operand::InvokeDynamicOperands => 4,
        }
    }

    pub const fn is_branch(self) -> bool {
        matches!(self, Operand::BranchS16 | Operand::BranchS32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub operand: Operand,
    /// `None` if valid since the format's earliest supported version.
    pub min_version: Option<ClassVersion>,
}

const fn op(mnemonic: &'static str, operand: Operand) -> Option<OpcodeInfo> {
    Some(OpcodeInfo {
        mnemonic,
        operand,
        min_version: None,
    })
}

const fn op_since(mnemonic: &'static str, operand: Operand, since: ClassVersion) -> Option<OpcodeInfo> {
    Some(OpcodeInfo {
        mnemonic,
        operand,
        min_version: Some(since),
    })
}

/// `tableswitch`, `lookupswitch`, and `wide` are represented here so
/// `info()` is total over `0..=255`, but their `operand.fixed_len()` is
/// meaningless — the decoder special-cases these three mnemonics.
pub fn info(opcode: u8) -> Option<OpcodeInfo> {
    use Operand::*;
    match opcode {
        0x00 => op("nop", None),
        0x01 => op("aconst_null", None),
        0x02 => op("iconst_m1", None),
        0x03 => op("iconst_0", None),
        0x04 => op("iconst_1", None),
        0x05 => op("iconst_2", None),
        0x06 => op("iconst_3", None),
        0x07 => op("iconst_4", None),
        0x08 => op("iconst_5", None),
        0x09 => op("lconst_0", None),
        0x0A => op("lconst_1", None),
        0x0B => op("fconst_0", None),
        0x0C => op("fconst_1", None),
        0x0D => op("fconst_2", None),
        0x0E => op("dconst_0", None),
        0x0F => op("dconst_1", None),
        0x10 => op("bipush", U8),
        0x11 => op("sipush", S16),
        0x12 => op("ldc", PoolIndexU8),
        0x13 => op("ldc_w", PoolIndexU16),
        0x14 => op("ldc2_w", PoolIndexU16),
        0x15 => op("iload", LocalIndexU8),
        0x16 => op("lload", LocalIndexU8),
        0x17 => op("fload", LocalIndexU8),
        0x18 => op("dload", LocalIndexU8),
        0x19 => op("aload", LocalIndexU8),
        0x1A => op("iload_0", None),
        0x1B => op("iload_1", None),
        0x1C => op("iload_2", None),
        0x1D => op("iload_3", None),
        0x1E => op("lload_0", None),
        0x1F => op("lload_1", None),
        0x20 => op("lload_2", None),
        0x21 => op("lload_3", None),
        0x22 => op("fload_0", None),
        0x23 => op("fload_1", None),
        0x24 => op("fload_2", None),
        0x25 => op("fload_3", None),
        0x26 => op("dload_0", None),
        0x27 => op("dload_1", None),
        0x28 => op("dload_2", None),
        0x29 => op("dload_3", None),
        0x2A => op("aload_0", None),
        0x2B => op("aload_1", None),
        0x2C => op("aload_2", None),
        0x2D => op("aload_3", None),
        0x2E => op("iaload", None),
        0x2F => op("laload", None),
        0x30 => op("faload", None),
        0x31 => op("daload", None),
        0x32 => op("aaload", None),
        0x33 => op("baload", None),
        0x34 => op("caload", None),
        0x35 => op("saload", None),
        0x36 => op("istore", LocalIndexU8),
        0x37 => op("lstore", LocalIndexU8),
        0x38 => op("fstore", LocalIndexU8),
        0x39 => op("dstore", LocalIndexU8),
        0x3A => op("astore", LocalIndexU8),
        0x3B => op("istore_0", None),
        0x3C => op("istore_1", None),
        0x3D => op("istore_2", None),
        0x3E => op("istore_3", None),
        0x3F => op("lstore_0", None),
        0x40 => op("lstore_1", None),
        0x41 => op("lstore_2", None),
        0x42 => op("lstore_3", None),
        0x43 => op("fstore_0", None),
        0x44 => op("fstore_1", None),
        0x45 => op("fstore_2", None),
        0x46 => op("fstore_3", None),
        0x47 => op("dstore_0", None),
        0x48 => op("dstore_1", None),
        0x49 => op("dstore_2", None),
        0x4A => op("dstore_3", None),
        0x4B => op("astore_0", None),
        0x4C => op("astore_1", None),
        0x4D => op("astore_2", None),
        0x4E => op("astore_3", None),
        0x4F => op("iastore", None),
        0x50 => op("lastore", None),
        0x51 => op("fastore", None),
        0x52 => op("dastore", None),
        0x53 => op("aastore", None),
        0x54 => op("bastore", None),
        0x55 => op("castore", None),
        0x56 => op("sastore", None),
        0x57 => op("pop", None),
        0x58 => op("pop2", None),
        0x59 => op("dup", None),
        0x5A => op("dup_x1", None),
        0x5B => op("dup_x2", None),
        0x5C => op("dup2", None),
        0x5D => op("dup2_x1", None),
        0x5E => op("dup2_x2", None),
        0x5F => op("swap", None),
        0x60 => op("iadd", None),
        0x61 => op("ladd", None),
        0x62 => op("fadd", None),
        0x63 => op("dadd", None),
        0x64 => op("isub", None),
        0x65 => op("lsub", None),
        0x66 => op("fsub", None),
        0x67 => op("dsub", None),
        0x68 => op("imul", None),
        0x69 => op("lmul", None),
        0x6A => op("fmul", None),
        0x6B => op("dmul", None),
        0x6C => op("idiv", None),
        0x6D => op("ldiv", None),
        0x6E => op("fdiv", None),
        0x6F => op("ddiv", None),
        0x70 => op("irem", None),
        0x71 => op("lrem", None),
        0x72 => op("frem", None),
        0x73 => op("drem", None),
        0x74 => op("ineg", None),
        0x75 => op("lneg", None),
        0x76 => op("fneg", None),
        0x77 => op("dneg", None),
        0x78 => op("ishl", None),
        0x79 => op("lshl", None),
        0x7A => op("ishr", None),
        0x7B => op("lshr", None),
        0x7C => op("iushr", None),
        0x7D => op("lushr", None),
        0x7E => op("iand", None),
        0x7F => op("land", None),
        0x80 => op("ior", None),
        0x81 => op("lor", None),
        0x82 => op("ixor", None),
        0x83 => op("lxor", None),
        0x84 => op("iinc", IincOperands),
        0x85 => op("i2l", None),
        0x86 => op("i2f", None),
        0x87 => op("i2d", None),
        0x88 => op("l2i", None),
        0x89 => op("l2f", None),
        0x8A => op("l2d", None),
        0x8B => op("f2i", None),
        0x8C => op("f2l", None),
        0x8D => op("f2d", None),
        0x8E => op("d2i", None),
        0x8F => op("d2l", None),
        0x90 => op("d2f", None),
        0x91 => op("i2b", None),
        0x92 => op("i2c", None),
        0x93 => op("i2s", None),
        0x94 => op("lcmp", None),
        0x95 => op("fcmpl", None),
        0x96 => op("fcmpg", None),
        0x97 => op("dcmpl", None),
        0x98 => op("dcmpg", None),
        0x99 => op("ifeq", BranchS16),
        0x9A => op("ifne", BranchS16),
        0x9B => op("iflt", BranchS16),
        0x9C => op("ifge", BranchS16),
        0x9D => op("ifgt", BranchS16),
        0x9E => op("ifle", BranchS16),
        0x9F => op("if_icmpeq", BranchS16),
        0xA0 => op("if_icmpne", BranchS16),
        0xA1 => op("if_icmplt", BranchS16),
        0xA2 => op("if_icmpge", BranchS16),
        0xA3 => op("if_icmpgt", BranchS16),
        0xA4 => op("if_icmple", BranchS16),
        0xA5 => op("if_acmpeq", BranchS16),
        0xA6 => op("if_acmpne", BranchS16),
        0xA7 => op("goto", BranchS16),
        0xA8 => op("jsr", BranchS16),
        0xA9 => op("ret", LocalIndexU8),
        0xAA => op("tableswitch", None),
        0xAB => op("lookupswitch", None),
        0xAC => op("ireturn", None),
        0xAD => op("lreturn", None),
        0xAE => op("freturn", None),
        0xAF => op("dreturn", None),
        0xB0 => op("areturn", None),
        0xB1 => op("return", None),
        0xB2 => op("getstatic", PoolIndexU16),
        0xB3 => op("putstatic", PoolIndexU16),
        0xB4 => op("getfield", PoolIndexU16),
        0xB5 => op("putfield", PoolIndexU16),
        0xB6 => op("invokevirtual", PoolIndexU16),
        0xB7 => op("invokespecial", PoolIndexU16),
        0xB8 => op("invokestatic", PoolIndexU16),
        0xB9 => op("invokeinterface", InvokeInterfaceOperands),
        0xBA => op_since("invokedynamic", InvokeDynamicOperands, ClassVersion::new(51, 0)),
        0xBB => op("new", PoolIndexU16),
        0xBC => op("newarray", U8),
        0xBD => op("anewarray", PoolIndexU16),
        0xBE => op("arraylength", None),
        0xBF => op("athrow", None),
        0xC0 => op("checkcast", PoolIndexU16),
        0xC1 => op("instanceof", PoolIndexU16),
        0xC2 => op("monitorenter", None),
        0xC3 => op("monitorexit", None),
        0xC4 => op("wide", None),
        0xC5 => op("multianewarray", MultianewarrayOperands),
        0xC6 => op("ifnull", BranchS16),
        0xC7 => op("ifnonnull", BranchS16),
        0xC8 => op("goto_w", BranchS32),
        0xC9 => op("jsr_w", BranchS32),
        // 0xCA breakpoint, 0xFE impdep1, 0xFF impdep2: reserved for
        // debuggers/JVM-internal use, never legal in a class file.
        0xCA | 0xFE | 0xFF => Option::None,
        _ => Option::None,
    }
}

/// Whether `opcode` is a defined-but-reserved instruction (as opposed to
/// simply unassigned).
pub fn is_reserved(opcode: u8) -> bool {
    matches!(opcode, 0xCA | 0xFE | 0xFF)
}

pub const TABLESWITCH: u8 = 0xAA;
pub const LOOKUPSWITCH: u8 = 0xAB;
pub const WIDE: u8 = 0xC4;
pub const IINC: u8 = 0x84;

/// Opcodes `wide` may legally prefix.
pub fn wide_target_operand(opcode: u8) -> Option<Operand> {
    match opcode {
        0x15 | 0x16 | 0x17 | 0x18 | 0x19 => Some(Operand::LocalIndexU8), // iload..aload
        0x36 | 0x37 | 0x38 | 0x39 | 0x3A => Some(Operand::LocalIndexU8), // istore..astore
        0xA9 => Some(Operand::LocalIndexU8),                            // ret
        IINC => Some(Operand::IincOperands),
        _ => None,
    }
}
