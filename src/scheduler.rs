use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{error, info_span, Instrument};

use crate::config::StoreConfig;
use crate::identifier;
use crate::index::Index;
use crate::record::LiveQueryRecord;
use crate::result::LiveResult;
use crate::schema::{ExecutableSchema, ExecutionOutcome};

/// Normalized input to [`Scheduler::invalidate`] — the Rust expression of
/// spec.md §4.4's `string | iterable<string>` polymorphism via trait
/// conversions rather than runtime shape inspection.
pub enum Invalidation {
    One(String),
    Many(Vec<String>),
}

impl Invalidation {
    fn into_ids(self) -> Vec<String> {
        match self {
            Invalidation::One(id) => vec![id],
            Invalidation::Many(ids) => ids,
        }
    }
}

impl From<String> for Invalidation {
    fn from(id: String) -> Self {
        Invalidation::One(id)
    }
}

impl From<&str> for Invalidation {
    fn from(id: &str) -> Self {
        Invalidation::One(id.to_string())
    }
}

impl From<Vec<String>> for Invalidation {
    fn from(ids: Vec<String>) -> Self {
        Invalidation::Many(ids)
    }
}

impl<'a> From<Vec<&'a str>> for Invalidation {
    fn from(ids: Vec<&'a str>) -> Self {
        Invalidation::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for Invalidation {
    fn from(ids: &[String]) -> Self {
        Invalidation::Many(ids.to_vec())
    }
}

/// The scheduler / coalescing engine (component D, spec.md §4.4).
pub struct Scheduler<S: ExecutableSchema> {
    pub(crate) index: Arc<Index<S>>,
    pub(crate) config: StoreConfig,
}

impl<S: ExecutableSchema> Scheduler<S> {
    pub fn new(index: Arc<Index<S>>, config: StoreConfig) -> Self {
        Self { index, config }
    }

    /// Accept invalidations, coalesce per affected record, and re-execute.
    /// Resolves once every run triggered by this call has completed —
    /// primarily useful for test determinism (spec.md §4.4).
    pub async fn invalidate(&self, invalidation: impl Into<Invalidation>) {
        let ids = invalidation.into().into_ids();

        let mut affected: HashMap<u64, Arc<LiveQueryRecord<S>>> = HashMap::new();
        for id in ids {
            if id.is_empty() {
                continue;
            }
            for record in self.index.lookup(&id) {
                affected.entry(record.id).or_insert(record);
            }
        }

        let mut handles = Vec::with_capacity(affected.len());
        for record in affected.into_values() {
            if let Some(handle) = self.schedule(record) {
                handles.push(handle);
            }
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Per-record coalescing (spec.md §4.4 `schedule`): queue a run if
    /// none is in flight or queued; otherwise mark `rerun_after` so the
    /// in-flight run loops back around instead of a second task spawning.
    fn schedule(&self, record: Arc<LiveQueryRecord<S>>) -> Option<tokio::task::JoinHandle<()>> {
        if record.terminated.load(Ordering::SeqCst) {
            return None;
        }

        {
            let mut state = record.run_state.lock().unwrap();
            if state.pending_run {
                state.rerun_after = true;
                return None;
            }
            state.pending_run = true;
        }

        let index = self.index.clone();
        let id_field_name = self.config.id_field_name.clone();
        let include_identifier_extension = self.config.include_identifier_extension;
        Some(tokio::spawn(
            run(record, index, id_field_name, include_identifier_extension).instrument(info_span!("live_query.run")),
        ))
    }
}

/// One scheduled re-execution of a record (spec.md §4.4 `run`), looping
/// without yielding between invalidations whenever `rerun_after` was set
/// while the previous pass was executing — this is the coalescing burst
/// collapse spec.md §5 requires.
pub(crate) async fn run<S: ExecutableSchema>(record: Arc<LiveQueryRecord<S>>, index: Arc<Index<S>>, id_field_name: String, include_identifier_extension: bool) {
    loop {
        {
            let mut state = record.run_state.lock().unwrap();
            state.rerun_after = false;
        }

        if record.terminated.load(Ordering::SeqCst) {
            break;
        }

        let outcome = record
            .schema
            .execute_once(&record.document, &record.variables, record.operation_name.as_deref(), &record.root_value, &record.context_value)
            .await;

        // The consumer may have disconnected while `execute_once` was in
        // flight; its result is discarded (spec.md §5 "Cancellation").
        if record.terminated.load(Ordering::SeqCst) {
            break;
        }

        match outcome {
            ExecutionOutcome::Stream => {
                error!(record_id = record.id, "live query's executeOnce returned an asynchronous sequence");
                record
                    .push(LiveResult {
                        data: None,
                        errors: vec![serde_json::json!({ "message": crate::error::Error::LiveMixedWithDeferStream.to_string() })],
                        extensions: None,
                        is_live: true,
                    })
                    .await;
            }
            ExecutionOutcome::Single(execution_result) => {
                let data = execution_result.data.clone().unwrap_or(serde_json::Value::Null);
                let config = StoreConfig {
                    include_identifier_extension,
                    id_field_name: id_field_name.clone(),
                };
                let ids = identifier::extract(
                    record.schema.as_ref(),
                    &record.document,
                    &record.selection,
                    &record.root_type,
                    &data,
                    &record.root_value,
                    &record.variables,
                    &config,
                );

                index.register(&record, ids.clone());

                let mut extensions = execution_result.extensions.clone();
                if include_identifier_extension {
                    let mut sorted: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
                    sorted.sort_unstable();
                    extensions.get_or_insert_with(serde_json::Map::new).insert(
                        "liveResourceIdentifier".to_string(),
                        serde_json::Value::Array(sorted.into_iter().map(|s| serde_json::Value::String(s.to_string())).collect()),
                    );
                }

                record
                    .push(LiveResult {
                        data: execution_result.data,
                        errors: execution_result.errors,
                        extensions,
                        is_live: true,
                    })
                    .await;
            }
        }

        let rerun = {
            let mut state = record.run_state.lock().unwrap();
            if state.rerun_after && !record.terminated.load(Ordering::SeqCst) {
                true
            } else {
                state.pending_run = false;
                false
            }
        };
        if !rerun {
            break;
        }
    }
}
