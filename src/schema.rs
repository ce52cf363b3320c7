use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::document::ExecutableDocument;

/// A single execution result, in the shape `executeOnce` is expected to
/// return: `{data?, errors?, extensions?}`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

/// What a call to `execute_once` produced.
///
/// `Stream` models the case where the underlying engine returned an
/// asynchronous sequence instead of a single result — which can only
/// happen if `@live` was illegally mixed with `@defer`/`@stream`, since
/// validation is supposed to forbid that combination (spec.md §4.4 step 2,
/// §7 kind 3).
pub enum ExecutionOutcome {
    Single(ExecutionResult),
    Stream,
}

/// The GraphQL engine, as an external collaborator.
///
/// This crate never parses a schema, resolves a field, or validates a
/// document — it consumes a pure `execute_once` function and two small
/// pieces of schema introspection needed only by the identifier
/// extractor (spec.md §4.1): whether a type carries the configured
/// non-null ID field, what a field's declared return type is, and
/// whatever extra identifiers a field's `collectResourceIdentifiers`
/// extension contributes.
#[async_trait]
pub trait ExecutableSchema: Send + Sync + 'static {
    /// Opaque root value threaded through to every resolver, captured at
    /// subscription time and re-used on every re-execution.
    type RootValue: Clone + Send + Sync + 'static;
    /// Opaque per-execution context value, likewise captured and reused.
    type ContextValue: Clone + Send + Sync + 'static;

    /// Execute `document` once against `variables`, producing either a
    /// single result or (illegally, for `@live`) a streamed one.
    async fn execute_once(
        &self,
        document: &ExecutableDocument,
        variables: &serde_json::Map<String, serde_json::Value>,
        operation_name: Option<&str>,
        root_value: &Self::RootValue,
        context_value: &Self::ContextValue,
    ) -> ExecutionOutcome;

    /// Does `type_name` declare a non-null field named `id_field_name`?
    /// Drives the object-identifier rule (`TypeName:idValue`).
    fn has_non_null_id_field(&self, type_name: &str, id_field_name: &str) -> bool;

    /// The declared (unwrapped, named) return type of `parent_type.field_name`,
    /// used to thread the correct parent type through nested selections.
    /// Abstract (interface/union) fields should return the abstract type
    /// name here; the extractor prefers a concrete `__typename` found in
    /// the response data when one is present.
    fn field_type_name(&self, parent_type: &str, field_name: &str) -> Option<String>;

    /// Extra resource identifiers contributed by
    /// `extensions.liveQuery.collectResourceIdentifiers` on
    /// `parent_type.field_name`, if any. The default implementation
    /// contributes nothing, matching fields with no such extension.
    fn collect_resource_identifiers(
        &self,
        parent_type: &str,
        field_name: &str,
        root_value: &Self::RootValue,
        args: &BTreeMap<String, serde_json::Value>,
    ) -> Vec<String> {
        let _ = (parent_type, field_name, root_value, args);
        Vec::new()
    }
}
