//! A tiny in-memory "engine" standing in for a real GraphQL execution
//! engine, implementing just enough of [`ExecutableSchema`] to exercise
//! the store end to end: a `Post { id title }` type, `Query.post(id)` /
//! `Query.posts` / `Query.ping(id)`, and `Mutation.setTitle(id, title)`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use graphql_live_query::{
    select_operation, ExecutableDocument, ExecutableSchema, ExecutionOutcome, ExecutionResult, FieldSelection, Selection, SelectionSet,
};

#[derive(Default)]
pub struct Db {
    posts: Mutex<HashMap<String, String>>,
}

impl Db {
    pub fn insert(&self, id: &str, title: &str) {
        self.posts.lock().unwrap().insert(id.to_string(), title.to_string());
    }

    pub fn set_title(&self, id: &str, title: &str) {
        self.posts.lock().unwrap().insert(id.to_string(), title.to_string());
    }

    pub fn remove(&self, id: &str) {
        self.posts.lock().unwrap().remove(id);
    }
}

pub struct TestSchema {
    pub db: Arc<Db>,
}

impl TestSchema {
    pub fn new(db: Arc<Db>) -> Arc<Self> {
        Arc::new(Self { db })
    }

    fn post_json(&self, id: &str, selection: &SelectionSet) -> Option<serde_json::Value> {
        let title = self.db.posts.lock().unwrap().get(id).cloned()?;
        let mut object = serde_json::Map::new();
        for item in &selection.items {
            if let Selection::Field(field) = item {
                let value = match field.name.as_str() {
                    "id" | "postId" => serde_json::Value::String(id.to_string()),
                    "title" => serde_json::Value::String(title.clone()),
                    "__typename" => serde_json::Value::String("Post".to_string()),
                    _ => serde_json::Value::Null,
                };
                object.insert(field.response_key().to_string(), value);
            }
        }
        Some(serde_json::Value::Object(object))
    }

    fn resolve_field(&self, field: &FieldSelection, variables: &serde_json::Map<String, serde_json::Value>) -> serde_json::Value {
        let args: BTreeMap<String, serde_json::Value> = field
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), graphql_live_query::resolve_value(value, variables)))
            .collect();

        match field.name.as_str() {
            "post" => {
                let id = args.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                self.post_json(id, &field.selection_set).unwrap_or(serde_json::Value::Null)
            }
            "posts" => {
                let ids: Vec<String> = self.db.posts.lock().unwrap().keys().cloned().collect();
                let mut ids = ids;
                ids.sort();
                serde_json::Value::Array(ids.iter().filter_map(|id| self.post_json(id, &field.selection_set)).collect())
            }
            "ping" => {
                let id = args.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                serde_json::Value::String(format!("pong:{}", id))
            }
            "setTitle" => {
                let id = args.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let title = args.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                self.db.set_title(&id, &title);
                self.post_json(&id, &field.selection_set).unwrap_or(serde_json::Value::Null)
            }
            "deletePost" => {
                let id = args.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                self.db.remove(id);
                serde_json::Value::Bool(true)
            }
            _ => serde_json::Value::Null,
        }
    }
}

#[async_trait]
impl ExecutableSchema for TestSchema {
    type RootValue = ();
    type ContextValue = ();

    async fn execute_once(
        &self,
        document: &ExecutableDocument,
        variables: &serde_json::Map<String, serde_json::Value>,
        operation_name: Option<&str>,
        _root_value: &(),
        _context_value: &(),
    ) -> ExecutionOutcome {
        let operation = match select_operation(document, operation_name) {
            Ok(operation) => operation,
            Err(err) => {
                return ExecutionOutcome::Single(ExecutionResult {
                    data: None,
                    errors: vec![serde_json::json!({ "message": err.to_string() })],
                    extensions: None,
                })
            }
        };

        let mut data = serde_json::Map::new();
        for item in &operation.selection_set.items {
            if let Selection::Field(field) = item {
                data.insert(field.response_key().to_string(), self.resolve_field(field, variables));
            }
        }

        ExecutionOutcome::Single(ExecutionResult {
            data: Some(serde_json::Value::Object(data)),
            errors: Vec::new(),
            extensions: None,
        })
    }

    fn has_non_null_id_field(&self, type_name: &str, id_field_name: &str) -> bool {
        type_name == "Post" && (id_field_name == "id" || id_field_name == "postId")
    }

    fn field_type_name(&self, parent_type: &str, field_name: &str) -> Option<String> {
        match (parent_type, field_name) {
            ("Query", "post") | ("Query", "posts") | ("Mutation", "setTitle") => Some("Post".to_string()),
            _ => None,
        }
    }

    fn collect_resource_identifiers(&self, parent_type: &str, field_name: &str, _root_value: &(), args: &BTreeMap<String, serde_json::Value>) -> Vec<String> {
        if parent_type == "Query" && field_name == "ping" {
            if let Some(id) = args.get("id").and_then(|v| v.as_str()) {
                return vec![format!("Ping:{}", id)];
            }
        }
        Vec::new()
    }
}
