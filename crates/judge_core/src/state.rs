use crate::view_model::ResourceView;
use crate::DependencyKey;

/// Lifecycle phase of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing scheduled yet.
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Identifies one evaluation attempt. Only the current generation may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// State slot of one asynchronous resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    data: Option<T>,
    initial: Option<T>,
    phase: Phase,
    error: Option<String>,
    deps: Option<DependencyKey>,
    generation: Generation,
    torn_down: bool,
    dirty: bool,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            initial: None,
            phase: Phase::Idle,
            error: None,
            deps: None,
            generation: Generation::default(),
            torn_down: false,
            dirty: false,
        }
    }
}

impl<T: Clone> ResourceState<T> {
    /// Creates an unbound slot whose `data` starts at `initial`.
    pub fn new(initial: Option<T>) -> Self {
        Self {
            data: initial.clone(),
            initial,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ResourceView<T> {
        ResourceView {
            data: self.data.clone(),
            phase: self.phase,
            loading: self.phase == Phase::Loading,
            error: self.error.clone(),
        }
    }

    pub(crate) fn reset_data(&mut self) {
        self.data = self.initial.clone();
        self.dirty = true;
    }
}

impl<T> ResourceState<T> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn dependencies(&self) -> Option<&DependencyKey> {
        self.deps.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_dependencies(&mut self, deps: DependencyKey) {
        self.deps = Some(deps);
    }

    /// Opens a new generation in `Loading`; returns the generation it replaced
    /// if that one was still live.
    pub(crate) fn begin_evaluation(&mut self) -> (Generation, Option<Generation>) {
        let superseded = self.is_loading().then_some(self.generation);
        self.generation = self.generation.next();
        self.phase = Phase::Loading;
        self.error = None;
        self.dirty = true;
        (self.generation, superseded)
    }

    /// True if a result from `generation` may still be committed.
    pub fn accepts(&self, generation: Generation) -> bool {
        !self.torn_down && self.phase == Phase::Loading && self.generation == generation
    }

    pub(crate) fn commit_success(&mut self, value: T) {
        self.data = Some(value);
        self.phase = Phase::Succeeded;
        self.error = None;
        self.dirty = true;
    }

    /// Stale data is kept alongside the error.
    pub(crate) fn commit_failure(&mut self, message: String) {
        self.phase = Phase::Failed;
        self.error = Some(message);
        self.dirty = true;
    }

    /// Marks the slot dead; returns the live generation that must be cancelled.
    pub(crate) fn tear_down(&mut self) -> Option<Generation> {
        if self.torn_down {
            return None;
        }
        self.torn_down = true;
        self.is_loading().then_some(self.generation)
    }
}
