use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::execute::{self, ExecuteOutcome, ExecuteRequest};
use crate::index::Index;
use crate::schema::ExecutableSchema;
use crate::scheduler::{Invalidation, Scheduler};

/// Name of the directive this store treats as marking a query live.
/// Fixed rather than configurable: spec.md names `@live` throughout and
/// no example in the corpus parameterizes a directive's own name.
const LIVE_DIRECTIVE_NAME: &str = "live";

/// The in-process live-query store (spec.md §1 "Scope").
///
/// Holds the identifier index and the configuration every execution and
/// invalidation is run against. Cheap to clone-share: wrap it in an `Arc`
/// (or hand out clones of one, if you add `#[derive(Clone)]` call sites
/// that need it) the same way the teacher shares its schema across
/// request handlers.
pub struct LiveQueryStore<S: ExecutableSchema> {
    scheduler: Scheduler<S>,
}

impl<S: ExecutableSchema> LiveQueryStore<S> {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            scheduler: Scheduler::new(Arc::new(Index::new()), config),
        }
    }

    /// Execute `request`. If its operation carries `@live`, the result is
    /// the first value of a subscription whose later values arrive
    /// through [`invalidate`](Self::invalidate); otherwise it is an
    /// ordinary one-shot execution.
    pub async fn execute(&self, request: ExecuteRequest<S>) -> Result<ExecuteOutcome<S>> {
        execute::execute(
            request,
            self.scheduler.index.clone(),
            self.scheduler.config.id_field_name.clone(),
            self.scheduler.config.include_identifier_extension,
            self.scheduler.config.channel_buffer_size,
            LIVE_DIRECTIVE_NAME,
        )
        .await
    }

    /// Notify the store that the resources named by `invalidation` may
    /// have changed, re-running every live query that currently depends
    /// on any of them (spec.md §4.4 "invalidate").
    ///
    /// Accepts a single identifier or a collection of them — see
    /// [`Invalidation`]'s `From` impls.
    pub async fn invalidate(&self, invalidation: impl Into<Invalidation>) {
        self.scheduler.invalidate(invalidation).await;
    }
}

impl<S: ExecutableSchema> Default for LiveQueryStore<S> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
