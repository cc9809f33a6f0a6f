use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, Once};
use std::time::Duration;

use judge_client::{AsyncResource, ChannelStateSink, FnProducer, Producer, StateSink};
use judge_core::{DependencyKey, Phase, ProducerFailure, ResourceView};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(judge_logging::initialize_for_tests);
}

#[derive(Clone)]
struct TestSink<T> {
    views: Arc<Mutex<Vec<ResourceView<T>>>>,
}

impl<T: Clone> TestSink<T> {
    fn new() -> Self {
        Self {
            views: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn count(&self) -> usize {
        self.views.lock().unwrap().len()
    }

    fn history(&self) -> Vec<ResourceView<T>> {
        self.views.lock().unwrap().clone()
    }
}

impl<T: Send> StateSink<T> for TestSink<T> {
    fn publish(&self, view: ResourceView<T>) {
        self.views.lock().unwrap().push(view);
    }
}

fn delayed<T>(millis: u64, outcome: Result<T, ProducerFailure>) -> impl Producer<T>
where
    T: Clone + Send + Sync + 'static,
{
    FnProducer::new(move || {
        let outcome = outcome.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            outcome
        }
    })
}

async fn wait_for<T: Clone + Send + 'static>(
    resource: &AsyncResource<T>,
    pred: impl Fn(&ResourceView<T>) -> bool,
) -> ResourceView<T> {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let view = resource.view();
            if pred(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("resource reached expected state")
}

fn settled<T>(view: &ResourceView<T>) -> bool {
    matches!(view.phase, Phase::Succeeded | Phase::Failed)
}

#[tokio::test]
async fn bind_loads_then_succeeds() {
    init_logging();
    let sink = TestSink::new();
    let resource = AsyncResource::builder(delayed(5, Ok(vec!["a".to_string()])))
        .name("problems")
        .initial(Vec::new())
        .sink(sink.clone())
        .bind(&Handle::current());

    let loading = resource.view();
    assert!(loading.loading);
    assert_eq!(loading.phase, Phase::Loading);
    assert_eq!(loading.data, Some(Vec::new()));

    let view = wait_for(&resource, settled).await;
    assert_eq!(view.phase, Phase::Succeeded);
    assert_eq!(view.data, Some(vec!["a".to_string()]));
    assert!(!view.loading);

    let phases: Vec<_> = sink.history().iter().map(|view| view.phase).collect();
    assert_eq!(phases, vec![Phase::Loading, Phase::Succeeded]);
}

#[tokio::test]
async fn teardown_before_resolution_never_publishes() {
    init_logging();
    let sink = TestSink::new();
    let resource = AsyncResource::builder(delayed(50, Ok(vec!["a", "b"])))
        .sink(sink.clone())
        .bind(&Handle::current());
    let published_at_teardown = sink.count();

    drop(resource);
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(sink.count(), published_at_teardown);
}

#[tokio::test]
async fn explicit_teardown_freezes_view() {
    init_logging();
    let resource = AsyncResource::builder(delayed(20, Ok(1))).bind(&Handle::current());
    resource.teardown();
    resource.refetch();
    tokio::time::sleep(Duration::from_millis(40)).await;

    let view = resource.view();
    assert_eq!(view.phase, Phase::Loading);
    assert_eq!(view.data, None);
}

#[tokio::test]
async fn failed_refetch_keeps_previous_data() {
    init_logging();
    let resource = AsyncResource::builder(delayed(1, Ok(10)))
        .deps(DependencyKey::new([1]))
        .bind(&Handle::current());
    wait_for(&resource, settled).await;

    resource.rebind(
        delayed(1, Err(ProducerFailure::message("boom"))),
        DependencyKey::new([2]),
    );
    let view = wait_for(&resource, |view| view.phase == Phase::Failed).await;

    assert_eq!(view.error.as_deref(), Some("boom"));
    assert_eq!(view.data, Some(10));
    assert!(!view.loading);
}

#[tokio::test]
async fn empty_dependencies_evaluate_once_and_refetch_adds_one() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let producer = FnProducer::new(move || {
        let counter = counter.clone();
        async move { Ok::<_, ProducerFailure>(counter.fetch_add(1, Ordering::SeqCst) + 1) }
    });
    let resource = AsyncResource::builder(producer).bind(&Handle::current());
    wait_for(&resource, |view| view.data == Some(1)).await;

    resource.set_dependencies(DependencyKey::empty());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    resource.refetch();
    wait_for(&resource, |view| view.data == Some(2)).await;
    resource.refetch();
    wait_for(&resource, |view| view.data == Some(3)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn dependency_churn_commits_only_last_key() {
    init_logging();
    let sink = TestSink::new();
    let resource = AsyncResource::builder(delayed(10, Ok(1)))
        .deps(DependencyKey::new([1]))
        .sink(sink.clone())
        .bind(&Handle::current());
    resource.rebind(delayed(20, Ok(2)), DependencyKey::new([2]));
    resource.rebind(delayed(40, Ok(3)), DependencyKey::new([3]));

    tokio::time::sleep(Duration::from_millis(80)).await;
    let view = resource.view();
    assert_eq!(view.phase, Phase::Succeeded);
    assert_eq!(view.data, Some(3));

    let committed: Vec<_> = sink.history().into_iter().filter_map(|view| view.data).collect();
    assert_eq!(committed, vec![3]);
}

#[tokio::test]
async fn manual_refetch_wins_over_inflight_evaluation() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let producer = FnProducer::new(move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 0 {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok::<_, ProducerFailure>("automatic")
            } else {
                Ok("manual")
            }
        }
    });
    let sink = TestSink::new();
    let resource = AsyncResource::builder(producer)
        .sink(sink.clone())
        .bind(&Handle::current());
    resource.refetch();

    tokio::time::sleep(Duration::from_millis(70)).await;
    assert_eq!(resource.view().data, Some("manual"));
    assert!(sink
        .history()
        .iter()
        .all(|view| view.data != Some("automatic")));
}

#[tokio::test]
async fn reset_restores_initial_value() {
    init_logging();
    let resource = AsyncResource::builder(delayed(1, Ok(vec![7, 8])))
        .initial(Vec::new())
        .bind(&Handle::current());
    wait_for(&resource, settled).await;

    resource.reset();
    let view = resource.view();
    assert_eq!(view.data, Some(Vec::new()));
    assert_eq!(view.phase, Phase::Succeeded);
}

#[tokio::test]
async fn channel_sink_delivers_states_in_order() {
    init_logging();
    let (tx, rx) = mpsc::channel();
    let resource = AsyncResource::builder(delayed::<u8>(1, Err(ProducerFailure::opaque())))
        .sink(ChannelStateSink::new(tx))
        .bind(&Handle::current());
    wait_for(&resource, settled).await;

    let views: Vec<ResourceView<u8>> = rx.try_iter().collect();
    assert_eq!(views.len(), 2);
    assert!(views[0].loading);
    assert_eq!(views[1].phase, Phase::Failed);
    assert_eq!(
        views[1].error.as_deref(),
        Some("An unexpected error occurred.")
    );
}
