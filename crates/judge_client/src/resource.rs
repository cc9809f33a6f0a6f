use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use judge_core::{
    update_resource, DependencyKey, Generation, ResourceEffect, ResourceMsg, ResourceState,
    ResourceView,
};
use judge_logging::{judge_debug, judge_trace, judge_warn};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::producer::Producer;

/// Receives every observable state of a resource, in commit order.
///
/// Called while the resource is locked: implementations must not call back
/// into the resource.
pub trait StateSink<T>: Send + Sync {
    fn publish(&self, view: ResourceView<T>);
}

pub struct ChannelStateSink<T> {
    tx: mpsc::Sender<ResourceView<T>>,
}

impl<T> ChannelStateSink<T> {
    pub fn new(tx: mpsc::Sender<ResourceView<T>>) -> Self {
        Self { tx }
    }
}

impl<T: Send> StateSink<T> for ChannelStateSink<T> {
    fn publish(&self, view: ResourceView<T>) {
        let _ = self.tx.send(view);
    }
}

/// Sink for callers that only poll [`AsyncResource::view`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStateSink;

impl<T> StateSink<T> for NullStateSink {
    fn publish(&self, _view: ResourceView<T>) {}
}

pub struct ResourceBuilder<T: Send + 'static> {
    name: String,
    producer: Arc<dyn Producer<T>>,
    initial: Option<T>,
    deps: DependencyKey,
    sink: Arc<dyn StateSink<T>>,
}

impl<T: Clone + Send + 'static> ResourceBuilder<T> {
    /// Label used in log lines.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Value of `data` before the first success, e.g. an empty list.
    pub fn initial(mut self, initial: T) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn deps(mut self, deps: DependencyKey) -> Self {
        self.deps = deps;
        self
    }

    pub fn sink(mut self, sink: impl StateSink<T> + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Binds the resource and schedules its first evaluation on `runtime`.
    pub fn bind(self, runtime: &Handle) -> AsyncResource<T> {
        let shared = Arc::new(Shared {
            name: self.name,
            runtime: runtime.clone(),
            sink: self.sink,
            slot: Mutex::new(Slot {
                state: ResourceState::new(self.initial),
                producer: self.producer,
                in_flight: None,
            }),
        });
        Shared::apply(&shared, ResourceMsg::Bind(self.deps));
        AsyncResource { shared }
    }
}

/// One asynchronous read and its `{data, loading, error}` state.
///
/// Every result goes through the generation guard: only the most recent
/// evaluation may commit, and nothing commits once the resource is torn down.
/// Dropping the resource tears it down.
pub struct AsyncResource<T: Clone + Send + 'static> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> AsyncResource<T> {
    pub fn builder(producer: impl Producer<T> + 'static) -> ResourceBuilder<T> {
        ResourceBuilder {
            name: "resource".to_string(),
            producer: Arc::new(producer),
            initial: None,
            deps: DependencyKey::empty(),
            sink: Arc::new(NullStateSink),
        }
    }

    pub fn view(&self) -> ResourceView<T> {
        self.shared.lock().state.view()
    }

    /// Starts a new evaluation regardless of dependencies.
    pub fn refetch(&self) {
        Shared::apply(&self.shared, ResourceMsg::Refetch);
    }

    /// Re-evaluates only if `deps` differs by value from the current key.
    pub fn set_dependencies(&self, deps: DependencyKey) {
        Shared::apply(&self.shared, ResourceMsg::DependenciesChanged(deps));
    }

    /// Swaps in a producer built for `deps`. The producer is kept even when
    /// the key is unchanged, and used by the next evaluation.
    pub fn rebind(&self, producer: impl Producer<T> + 'static, deps: DependencyKey) {
        self.shared.lock().producer = Arc::new(producer);
        Shared::apply(&self.shared, ResourceMsg::DependenciesChanged(deps));
    }

    /// Puts `data` back to the initial value; a live evaluation keeps running.
    pub fn reset(&self) {
        Shared::apply(&self.shared, ResourceMsg::Reset);
    }

    pub fn teardown(&self) {
        Shared::apply(&self.shared, ResourceMsg::Teardown);
    }
}

impl<T: Clone + Send + 'static> Drop for AsyncResource<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct Shared<T: Send + 'static> {
    name: String,
    runtime: Handle,
    sink: Arc<dyn StateSink<T>>,
    slot: Mutex<Slot<T>>,
}

struct Slot<T: Send + 'static> {
    state: ResourceState<T>,
    producer: Arc<dyn Producer<T>>,
    in_flight: Option<(Generation, CancellationToken)>,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(shared: &Arc<Self>, msg: ResourceMsg<T>) {
        let mut slot = shared.lock();

        if let ResourceMsg::Settled {
            generation,
            outcome,
        } = &msg
        {
            if !slot.state.accepts(*generation) {
                judge_trace!(
                    "{}: discarding stale result of generation {}",
                    shared.name,
                    generation.get()
                );
                return;
            }
            if let Err(failure) = outcome {
                judge_warn!("{}: producer failed: {}", shared.name, failure);
            }
        }

        let state = std::mem::take(&mut slot.state);
        let (mut next, effects) = update_resource(state, msg);
        if next.consume_dirty() {
            judge_debug!(
                "{}: phase={:?} generation={}",
                shared.name,
                next.phase(),
                next.generation().get()
            );
            shared.sink.publish(next.view());
        }
        slot.state = next;

        for effect in effects {
            match effect {
                ResourceEffect::Cancel { generation } => {
                    let is_live = matches!(&slot.in_flight, Some((live, _)) if *live == generation);
                    if let Some((_, token)) = slot.in_flight.take_if(|_| is_live) {
                        judge_trace!(
                            "{}: cancelling generation {}",
                            shared.name,
                            generation.get()
                        );
                        token.cancel();
                    }
                }
                ResourceEffect::Invoke { generation } => {
                    let token = CancellationToken::new();
                    slot.in_flight = Some((generation, token.clone()));
                    let producer = Arc::clone(&slot.producer);
                    let task_shared = Arc::clone(shared);
                    shared
                        .runtime
                        .spawn(run_producer(task_shared, producer, generation, token));
                }
            }
        }
        if !slot.state.is_loading() {
            slot.in_flight = None;
        }
    }
}

async fn run_producer<T: Clone + Send + 'static>(
    shared: Arc<Shared<T>>,
    producer: Arc<dyn Producer<T>>,
    generation: Generation,
    token: CancellationToken,
) {
    let outcome = tokio::select! {
        _ = token.cancelled() => return,
        outcome = producer.produce() => outcome,
    };
    Shared::apply(
        &shared,
        ResourceMsg::Settled {
            generation,
            outcome,
        },
    );
}
