use std::sync::Arc;

use crate::document::{select_operation, ExecutableDocument};
use crate::error::Result;
use crate::index::Index;
use crate::record::LiveQueryRecord;
use crate::schema::{ExecutableSchema, ExecutionOutcome, ExecutionResult};
use crate::scheduler;
use crate::stream::LiveQueryStream;

/// Everything [`execute`](crate::LiveQueryStore::execute) needs to run a
/// document once, or subscribe to it if it is a live query.
///
/// Built with the "required fields via `new`, optional ones via setters"
/// convention the teacher's request builders use — `root_type` is the
/// operation's root type name (`"Query"`, `"Mutation"`, ...) since this
/// crate has no schema registry of its own to derive it from the
/// operation kind (see DESIGN.md).
pub struct ExecuteRequest<S: ExecutableSchema> {
    schema: Arc<S>,
    document: Arc<ExecutableDocument>,
    root_type: String,
    root_value: S::RootValue,
    context_value: S::ContextValue,
    variables: serde_json::Map<String, serde_json::Value>,
    operation_name: Option<String>,
}

impl<S: ExecutableSchema> ExecuteRequest<S> {
    pub fn new(schema: Arc<S>, document: Arc<ExecutableDocument>, root_type: impl Into<String>, root_value: S::RootValue, context_value: S::ContextValue) -> Self {
        Self {
            schema,
            document,
            root_type: root_type.into(),
            root_value,
            context_value,
            variables: serde_json::Map::new(),
            operation_name: None,
        }
    }

    pub fn variables(mut self, variables: serde_json::Map<String, serde_json::Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// The outcome of [`execute`](crate::LiveQueryStore::execute): either an
/// ordinary one-shot result, or a live query's sequence of results.
pub enum ExecuteOutcome<S: ExecutableSchema> {
    Once(ExecutionResult),
    Live(LiveQueryStream<S>),
}

/// Execute `request`, subscribing it to the store's index if its
/// operation carries the live directive (spec.md §4.4 "execute").
pub(crate) async fn execute<S: ExecutableSchema>(
    request: ExecuteRequest<S>,
    index: Arc<Index<S>>,
    id_field_name: String,
    include_identifier_extension: bool,
    channel_buffer_size: usize,
    live_directive_name: &str,
) -> Result<ExecuteOutcome<S>> {
    let ExecuteRequest {
        schema,
        document,
        root_type,
        root_value,
        context_value,
        variables,
        operation_name,
    } = request;

    let operation = select_operation(&document, operation_name.as_deref())?;
    let is_live = operation.directives.iter().any(|d| d.name == live_directive_name);
    let selection = operation.selection_set.clone();
    let resolved_operation_name = operation.name.clone();

    if !is_live {
        let outcome = schema
            .execute_once(&document, &variables, operation_name.as_deref(), &root_value, &context_value)
            .await;
        return Ok(ExecuteOutcome::Once(match outcome {
            ExecutionOutcome::Single(result) => result,
            ExecutionOutcome::Stream => ExecutionResult {
                data: None,
                errors: vec![serde_json::json!({ "message": crate::error::Error::LiveMixedWithDeferStream.to_string() })],
                extensions: None,
            },
        }));
    }

    let (sender, receiver) = tokio::sync::mpsc::channel(channel_buffer_size.max(1));
    let record = Arc::new(LiveQueryRecord::new(
        schema,
        document,
        root_type,
        selection,
        variables,
        resolved_operation_name,
        root_value,
        context_value,
        sender,
    ));

    // The record's first run executes inline rather than through
    // `Scheduler::schedule` so the subscriber's very first poll has a
    // result waiting instead of racing a freshly spawned task.
    {
        let mut state = record.run_state.lock().unwrap();
        state.pending_run = true;
    }
    scheduler::run(record.clone(), index.clone(), id_field_name, include_identifier_extension).await;

    Ok(ExecuteOutcome::Live(LiveQueryStream::new(receiver, record, index)))
}
