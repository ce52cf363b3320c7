//! Wires a tiny in-memory blog schema through a [`LiveQueryStore`],
//! subscribes to a `@live` query, and invalidates it from a second task
//! to show a subscriber observing a mutation it never asked to be
//! notified about by name.
//!
//! Run with `cargo run --example live_query_demo`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use graphql_live_query::{
    parse, select_operation, ExecutableDocument, ExecutableSchema, ExecuteOutcome, ExecuteRequest, ExecutionOutcome, ExecutionResult, FieldSelection,
    LiveQueryStore, Selection, SelectionSet, StoreConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Db {
    posts: Mutex<HashMap<String, String>>,
}

struct BlogSchema {
    db: Arc<Db>,
}

impl BlogSchema {
    fn post_json(&self, id: &str, selection: &SelectionSet) -> Option<serde_json::Value> {
        let title = self.db.posts.lock().unwrap().get(id).cloned()?;
        let mut object = serde_json::Map::new();
        for item in &selection.items {
            if let Selection::Field(field) = item {
                let value = match field.name.as_str() {
                    "id" => serde_json::Value::String(id.to_string()),
                    "title" => serde_json::Value::String(title.clone()),
                    _ => serde_json::Value::Null,
                };
                object.insert(field.response_key().to_string(), value);
            }
        }
        Some(serde_json::Value::Object(object))
    }

    fn resolve(&self, field: &FieldSelection, variables: &serde_json::Map<String, serde_json::Value>) -> serde_json::Value {
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
            "setTitle" => {
                let id = args.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let title = args.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                self.db.posts.lock().unwrap().insert(id.clone(), title);
                self.post_json(&id, &field.selection_set).unwrap_or(serde_json::Value::Null)
            }
            _ => serde_json::Value::Null,
        }
    }
}

#[async_trait]
impl ExecutableSchema for BlogSchema {
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
                data.insert(field.response_key().to_string(), self.resolve(field, variables));
            }
        }
        ExecutionOutcome::Single(ExecutionResult {
            data: Some(serde_json::Value::Object(data)),
            errors: Vec::new(),
            extensions: None,
        })
    }

    fn has_non_null_id_field(&self, type_name: &str, id_field_name: &str) -> bool {
        type_name == "Post" && id_field_name == "id"
    }

    fn field_type_name(&self, parent_type: &str, field_name: &str) -> Option<String> {
        match (parent_type, field_name) {
            ("Query", "post") | ("Mutation", "setTitle") => Some("Post".to_string()),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let db = Arc::new(Db::default());
    db.posts.lock().unwrap().insert("1".to_string(), "Hello, world!".to_string());

    let schema = Arc::new(BlogSchema { db: db.clone() });
    let store = Arc::new(LiveQueryStore::new(StoreConfig::default()));

    let document = Arc::new(parse(r#"query @live { post(id: "1") { id title } }"#).unwrap());
    let mut stream = match store
        .execute(ExecuteRequest::new(schema, document, "Query", (), ()))
        .await
        .expect("document executes")
    {
        ExecuteOutcome::Live(stream) => stream,
        ExecuteOutcome::Once(_) => unreachable!("the @live directive makes this a live query"),
    };

    let writer_store = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        db.posts.lock().unwrap().insert("1".to_string(), "Hello, live queries!".to_string());
        writer_store.invalidate("Post:1").await;
    });

    // Two results are expected: the initial one, then the rerun the
    // writer task's invalidation triggers. A real subscriber would keep
    // polling for as long as it stays interested.
    for _ in 0..2 {
        let result = stream.next().await.expect("writer task keeps the stream alive");
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    }
    stream.stop();
}
