use crate::{DependencyKey, Generation, ProducerFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceMsg<T> {
    /// The owning view mounted with its initial dependency list.
    Bind(DependencyKey),
    /// The owning view re-rendered with a (possibly equal) dependency list.
    DependenciesChanged(DependencyKey),
    /// Caller asked for a fresh evaluation, e.g. a Retry button.
    Refetch,
    /// A producer invocation settled.
    Settled {
        generation: Generation,
        outcome: Result<T, ProducerFailure>,
    },
    /// Put `data` back to the caller-supplied initial value.
    Reset,
    /// The owning view was discarded.
    Teardown,
}
