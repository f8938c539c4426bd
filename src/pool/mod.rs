//! Bounded-concurrency task pool streaming results in completion waves.
//!
//! [`TaskPool::run_waves`] pulls items one at a time from an [`Items`] source and
//! spawns a retry-wrapped task for each, never holding more than
//! [`PoolConfig::concurrency`] tasks at once. When no slot is free (or the input is
//! exhausted) it waits until at least one task finishes, gathers every task that
//! has finished by then into a *wave*, yields that wave and refills the freed
//! slots from the remaining input.
//!
//! Task creation follows input order. Emission does not: results come out grouped
//! by wave and the order inside a wave is unspecified.
//!
//! The first failure observed ends the stream. Results of the same wave that
//! succeeded are dropped, no further items are pulled and the remaining in-flight
//! tasks are aborted. Dropping the stream early aborts in-flight tasks as well.

mod items;


pub use items::Items;

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::task::JoinSet;

use crate::config::{PoolConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::execute_with_retry;

/// Fan-out executor bounded by a concurrency limit
#[derive(Clone, Debug)]
pub struct TaskPool {
    config: PoolConfig,
}

impl TaskPool {
    /// Create a pool, rejecting a zero concurrency limit or an invalid retry policy
    pub fn new(config: PoolConfig) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(Error::config(
                "pool concurrency must be at least 1",
                "concurrency",
            ));
        }
        config.retry.validate()?;
        Ok(Self { config })
    }

    /// Pool settings
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run `operation` over `items`, yielding individual results as they complete
    ///
    /// Flattened view of [`TaskPool::run_waves`]. After an `Err` the stream ends.
    pub fn run<'a, I, U, V, F, Fut>(
        &self,
        items: I,
        operation_name: &str,
        operation: F,
    ) -> BoxStream<'a, Result<V>>
    where
        I: Into<Items<'a, U>>,
        U: Clone + Debug + Send + 'static,
        V: Send + 'static,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.run_waves(items, operation_name, operation)
            .flat_map(|wave| match wave {
                Ok(results) => stream::iter(results.into_iter().map(Ok)).left_stream(),
                Err(e) => stream::once(future::ready(Err(e))).right_stream(),
            })
            .boxed()
    }

    /// Run `operation` over `items`, yielding one `Vec` per completion wave
    ///
    /// Every task is wrapped with [`execute_with_retry`] using this pool's
    /// [`RetryConfig`]. A wave containing a failure is replaced by that failure
    /// and the stream ends after it.
    pub fn run_waves<'a, I, U, V, F, Fut>(
        &self,
        items: I,
        operation_name: &str,
        operation: F,
    ) -> BoxStream<'a, Result<Vec<V>>>
    where
        I: Into<Items<'a, U>>,
        U: Clone + Debug + Send + 'static,
        V: Send + 'static,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let run = PoolRun {
            items: items.into().into_stream(),
            in_flight: JoinSet::new(),
            free_slots: self.config.concurrency,
            exhausted: false,
            finished: false,
            admitted: 0,
            operation: Arc::new(operation),
            operation_name: Arc::from(operation_name),
            retry: Arc::new(self.config.retry.clone()),
        };

        stream::unfold(run, |mut run| async move {
            let wave = run.next_wave().await?;
            Some((wave, run))
        })
        .boxed()
    }
}

/// State of one pool invocation
struct PoolRun<'a, U, V, F> {
    items: BoxStream<'a, U>,
    in_flight: JoinSet<Result<V>>,
    free_slots: usize,
    exhausted: bool,
    finished: bool,
    admitted: u64,
    operation: Arc<F>,
    operation_name: Arc<str>,
    retry: Arc<RetryConfig>,
}

impl<U, V, F, Fut> PoolRun<'_, U, V, F>
where
    U: Clone + Debug + Send + 'static,
    V: Send + 'static,
    F: Fn(U) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    /// Admit until saturated or exhausted, then wait for the next wave.
    ///
    /// Returns `None` once the input is exhausted and nothing is in flight, or
    /// after a failure has been reported.
    async fn next_wave(&mut self) -> Option<Result<Vec<V>>> {
        if self.finished {
            return None;
        }

        while !self.exhausted && self.free_slots > 0 {
            match self.items.next().await {
                Some(item) => self.admit(item),
                None => {
                    self.exhausted = true;
                    tracing::debug!(
                        operation = %self.operation_name,
                        admitted = self.admitted,
                        "Input exhausted, draining in-flight tasks"
                    );
                }
            }
        }

        // Empty only when the input is exhausted, since free_slots + in_flight == concurrency
        let first = self.in_flight.join_next().await?;
        let mut wave = vec![first];
        while let Some(done) = self.in_flight.try_join_next() {
            wave.push(done);
        }
        self.free_slots += wave.len();

        let wave_size = wave.len();
        let mut results = Vec::with_capacity(wave_size);
        for done in wave {
            match done.map_err(Error::from).and_then(|result| result) {
                Ok(value) => results.push(value),
                Err(e) => return Some(Err(self.abort(e, wave_size))),
            }
        }

        tracing::debug!(
            operation = %self.operation_name,
            wave_size = wave_size,
            in_flight = self.in_flight.len(),
            "Completion wave ready"
        );
        Some(Ok(results))
    }

    fn admit(&mut self, item: U) {
        let operation = Arc::clone(&self.operation);
        let operation_name = Arc::clone(&self.operation_name);
        let retry = Arc::clone(&self.retry);

        self.admitted += 1;
        self.free_slots -= 1;
        tracing::debug!(
            operation = %self.operation_name,
            item = ?item,
            admitted = self.admitted,
            free_slots = self.free_slots,
            "Admitting task"
        );

        self.in_flight.spawn(async move {
            execute_with_retry(&operation_name, operation.as_ref(), item, &retry).await
        });
    }

    fn abort(&mut self, error: Error, wave_size: usize) -> Error {
        self.finished = true;
        let aborted = self.in_flight.len();
        self.in_flight.abort_all();
        tracing::error!(
            operation = %self.operation_name,
            error = %error,
            wave_size = wave_size,
            aborted_tasks = aborted,
            "Task failed, aborting pool"
        );
        error
    }
}
