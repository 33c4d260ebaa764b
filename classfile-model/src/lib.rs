/// Access-flag bit enumerations, validated against a pluggable rule table.
pub mod flags;
/// [Attributes](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=176)
pub mod attribute;
/// [Class File Format](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=13)
pub mod class_file;
/// [Constant pool](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=103)
pub mod constant_pool;
/// [Descriptors](https://docs.oracle.com/javase/specs/jvms/se17/jvms17.pdf#page=104)
pub mod descriptor;

pub use attribute::AttributeInfo;
pub use class_file::{ClassFile, ClassVersion, FieldInfo, MethodInfo};
pub use constant_pool::ConstantPoolEntry;
