//! The explicit context stack used to render error locations like
//! `methods[3].Code.attributes[1].StackMapTable.entries[5].locals[2]`.
//! A deterministic, allocation-light stack the orchestrator pushes to on
//! entry to each array/structure context and pops on exit.

/// A fully rendered, dot-separated diagnostic path. Cheap to clone because
/// errors are constructed rarely (parsing is fatal on the first error).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextPath(pub String);

impl std::fmt::Display for ContextPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<class file>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One entry in the context stack: an array/field name, and an optional
/// index within it ((array-name, array-index) context
/// frames").
#[derive(Debug, Clone)]
struct Frame {
    name: &'static str,
    index: Option<usize>,
}

/// Grows on demand past its pre-allocated depth; 8 is
/// sufficient in practice.
#[derive(Debug, Clone)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub fn with_capacity(capacity: usize) -> Self {
        ContextStack {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Push a bare named field (e.g. entering the `Code` attribute body).
    pub fn push(&mut self, name: &'static str) {
        self.frames.push(Frame { name, index: None });
    }

    /// Push a named array context (e.g. `methods[3]`).
    pub fn push_indexed(&mut self, name: &'static str, index: usize) {
        self.frames.push(Frame {
            name,
            index: Some(index),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Render the current stack into a dot-separated path.
    pub fn path(&self) -> ContextPath {
        let mut out = String::new();
        for (i, frame) in self.frames.iter().enumerate() {
            if i != 0 {
                out.push('.');
            }
            out.push_str(frame.name);
            if let Some(index) = frame.index {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
        ContextPath(out)
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        ContextStack::with_capacity(8)
    }
}

/// RAII guard that pops its frame when dropped, so a `?`-propagated error
/// mid-field still leaves the stack balanced.
///
/// Holds a raw pointer rather than `&mut ContextStack` so that callers can
/// keep a frame alive across later mutable uses of the `Cx` it was pushed
/// from (e.g. further reads through `cx`), rather than being forced to end
/// the borrow immediately after construction. The pointer is created from,
/// and only ever dereferenced for the lifetime of, the exclusive borrow
/// passed into `new`/`new_indexed`, so this has the same aliasing behavior
/// as holding the reference directly.
pub struct ScopedFrame {
    stack: *mut ContextStack,
}

impl ScopedFrame {
    pub fn new(stack: &mut ContextStack, name: &'static str) -> Self {
        stack.push(name);
        ScopedFrame { stack }
    }

    pub fn new_indexed(stack: &mut ContextStack, name: &'static str, index: usize) -> Self {
        stack.push_indexed(name, index);
        ScopedFrame { stack }
    }
}

impl Drop for ScopedFrame {
    fn drop(&mut self) {
        // SAFETY: `stack` was derived from an exclusive `&mut ContextStack`
        // that lives at least as long as `self` (the constructors take it
        // by mutable reference and store it as a raw pointer for the
        // lifetime of this guard).
        unsafe { (*self.stack).pop() };
    }
}

/// Bundles the byte reader with the diagnostic context stack so every
/// typed read can be turned directly into a fully-located
/// [`crate::error::ClassFormatError`] on failure.
pub struct Cx<'a> {
    pub reader: crate::byte_reader::ByteReader<'a>,
    pub stack: ContextStack,
}

impl<'a> Cx<'a> {
    pub fn new(data: &'a [u8], options: &crate::options::ParseOptions) -> Self {
        Cx {
            reader: crate::byte_reader::ByteReader::new(data),
            stack: ContextStack::with_capacity(options.context_stack_capacity),
        }
    }

    pub fn err(&self, kind: crate::error::ClassFormatErrorKind) -> crate::error::ClassFormatError {
        crate::error::ClassFormatError::new(self.reader.position(), self.path(), kind)
    }

    pub fn path(&self) -> ContextPath {
        self.stack.path()
    }

    fn wrap<T>(
        &self,
        raw: Result<T, crate::byte_reader::RawError>,
    ) -> Result<T, crate::error::ClassFormatError> {
        raw.map_err(|e| crate::error::ClassFormatError::new(e.offset, self.path(), e.kind))
    }

    pub fn u1(&mut self, field: &'static str) -> Result<u8, crate::error::ClassFormatError> {
        let v = self.reader.u1(field);
        self.wrap(v)
    }

    pub fn u2(&mut self, field: &'static str) -> Result<u16, crate::error::ClassFormatError> {
        let v = self.reader.u2(field);
        self.wrap(v)
    }

    pub fn u4(&mut self, field: &'static str) -> Result<u32, crate::error::ClassFormatError> {
        let v = self.reader.u4(field);
        self.wrap(v)
    }

    pub fn s4(&mut self, field: &'static str) -> Result<i32, crate::error::ClassFormatError> {
        let v = self.reader.s4(field);
        self.wrap(v)
    }

    pub fn i8_wide(&mut self, field: &'static str) -> Result<i64, crate::error::ClassFormatError> {
        let v = self.reader.i8_wide(field);
        self.wrap(v)
    }

    pub fn f4(&mut self, field: &'static str) -> Result<f32, crate::error::ClassFormatError> {
        let v = self.reader.f4(field);
        self.wrap(v)
    }

    pub fn f8(&mut self, field: &'static str) -> Result<f64, crate::error::ClassFormatError> {
        let v = self.reader.f8(field);
        self.wrap(v)
    }

    pub fn bytes(
        &mut self,
        n: usize,
        field: &'static str,
    ) -> Result<&'a [u8], crate::error::ClassFormatError> {
        let v = self.reader.bytes(n, field);
        self.wrap(v)
    }

    pub fn modified_utf8(
        &mut self,
        field: &'static str,
    ) -> Result<String, crate::error::ClassFormatError> {
        let v = self.reader.modified_utf8(field);
        self.wrap(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_indexed_path() {
        let mut stack = ContextStack::default();
        stack.push_indexed("methods", 3);
        stack.push("Code");
        stack.push_indexed("attributes", 1);
        assert_eq!(stack.path().0, "methods[3].Code.attributes[1]");
    }

    #[test]
    fn scoped_frame_pops_on_drop() {
        let mut stack = ContextStack::default();
        {
            let _frame = ScopedFrame::new_indexed(&mut stack, "fields", 0);
            assert_eq!(stack.path().0, "fields[0]");
        }
        assert_eq!(stack.path().0, "");
    }
}
