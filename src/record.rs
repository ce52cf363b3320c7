use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::document::{ExecutableDocument, SelectionSet};
use crate::result::LiveResult;
use crate::schema::ExecutableSchema;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// The two-field coalescing handshake (spec.md §4.4, Design Notes §9):
/// at most one run in flight or queued per record, plus a flag recording
/// that another invalidation arrived while a run was in flight.
#[derive(Default)]
pub(crate) struct RunState {
    pub pending_run: bool,
    pub rerun_after: bool,
}

/// One live subscription's in-memory state (component B, spec.md §4.2).
pub struct LiveQueryRecord<S: ExecutableSchema> {
    pub(crate) id: u64,
    pub(crate) schema: Arc<S>,
    pub(crate) document: Arc<ExecutableDocument>,
    pub(crate) root_type: String,
    pub(crate) selection: SelectionSet,
    pub(crate) variables: serde_json::Map<String, serde_json::Value>,
    pub(crate) operation_name: Option<String>,
    pub(crate) root_value: S::RootValue,
    pub(crate) context_value: S::ContextValue,
    pub(crate) identifiers: Mutex<HashSet<Arc<str>>>,
    pub(crate) run_state: Mutex<RunState>,
    pub(crate) terminated: AtomicBool,
    sender: tokio::sync::mpsc::Sender<LiveResult>,
}

impl<S: ExecutableSchema> LiveQueryRecord<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        schema: Arc<S>,
        document: Arc<ExecutableDocument>,
        root_type: String,
        selection: SelectionSet,
        variables: serde_json::Map<String, serde_json::Value>,
        operation_name: Option<String>,
        root_value: S::RootValue,
        context_value: S::ContextValue,
        sender: tokio::sync::mpsc::Sender<LiveResult>,
    ) -> Self {
        Self {
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            schema,
            document,
            root_type,
            selection,
            variables,
            operation_name,
            root_value,
            context_value,
            identifiers: Mutex::new(HashSet::new()),
            run_state: Mutex::new(RunState::default()),
            terminated: AtomicBool::new(false),
            sender,
        }
    }

    /// Enqueue a result on the record's output channel. A send error means
    /// the consumer has already disconnected and the channel is closed;
    /// per spec.md §4.2 a push after close is simply discarded.
    pub(crate) async fn push(&self, result: LiveResult) {
        let _ = self.sender.send(result).await;
    }

    /// The identifier set this record currently depends on, kept in sync
    /// by the index on every `register`/`clear` (spec.md §4.3).
    pub fn identifiers(&self) -> HashSet<Arc<str>> {
        self.identifiers.lock().unwrap().clone()
    }
}

/// Gives `Arc<LiveQueryRecord<S>>` identity-based `Hash`/`Eq` so it can
/// live inside the index's sets without requiring `S` (or the record's
/// root/context values) to be hashable themselves.
pub(crate) struct RecordHandle<S: ExecutableSchema>(pub Arc<LiveQueryRecord<S>>);

impl<S: ExecutableSchema> Clone for RecordHandle<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: ExecutableSchema> PartialEq for RecordHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl<S: ExecutableSchema> Eq for RecordHandle<S> {}

impl<S: ExecutableSchema> std::hash::Hash for RecordHandle<S> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}
