use std::future::Future;

use judge_core::ProducerFailure;

/// Zero-argument asynchronous read bound to a resource.
#[async_trait::async_trait]
pub trait Producer<T: Send + 'static>: Send + Sync {
    async fn produce(&self) -> Result<T, ProducerFailure>;
}

/// Adapts a closure returning a future into a [`Producer`].
pub struct FnProducer<F> {
    f: F,
}

impl<F> FnProducer<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait::async_trait]
impl<T, F, Fut> Producer<T> for FnProducer<F>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ProducerFailure>> + Send + 'static,
{
    async fn produce(&self) -> Result<T, ProducerFailure> {
        (self.f)().await
    }
}
