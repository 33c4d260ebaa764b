//! Knobs the class file format leaves to the implementer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum `element_value` array nesting depth before parsing fails
    /// with "annotation nesting too deep" (default 64).
    pub max_annotation_depth: u32,
    /// Whether non-zero `tableswitch`/`lookupswitch` padding bytes are a
    /// hard error. This crate defaults to `true`; the choice
    /// leaves the choice open.
    pub reject_switch_padding: bool,
    /// Initial depth of the orchestrator's context stack.
    pub context_stack_capacity: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_annotation_depth: 64,
            reject_switch_padding: true,
            context_stack_capacity: 8,
        }
    }
}
