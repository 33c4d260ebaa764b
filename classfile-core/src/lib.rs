//! Streaming decoder and validator for the JVM class file format: the
//! constant pool, every predefined attribute shape, and a two-pass
//! bytecode validator that checks every branch target lands on an
//! instruction boundary inside the method body.

pub mod access_flags;
pub mod attributes;
pub mod byte_reader;
pub mod bytecode;
pub mod constant_pool;
pub mod context;
pub mod cp_metadata;
pub mod error;
pub mod opcode;
pub mod options;
pub mod orchestrator;

pub use classfile_model::class_file::ClassFile;
pub use error::{ClassFormatError, ClassFormatErrorKind, Result};
pub use options::ParseOptions;

/// Parse and validate a complete class file from its raw bytes.
pub fn parse_class_file(bytes: &[u8], options: &ParseOptions) -> Result<ClassFile> {
    orchestrator::parse(bytes, options)
}
