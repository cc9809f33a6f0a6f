use crate::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEffect {
    /// Run the producer for this generation.
    Invoke { generation: Generation },
    /// The invocation for this generation can no longer commit; abort it.
    Cancel { generation: Generation },
}
