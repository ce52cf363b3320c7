//! The identifier extractor (component A, spec.md §4.1).
//!
//! Walks a finished execution's selection set in lock-step with its
//! `data`, producing the set of resource identifiers the result depends
//! on: schema coordinates (`Type.field`, optionally with canonicalized
//! arguments), object identifiers (`Type:id`), and whatever extra
//! identifiers a field's `collectResourceIdentifiers` extension
//! contributes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::document::{self, Directive, ExecutableDocument, FieldSelection, Selection, SelectionSet};
use crate::schema::ExecutableSchema;

/// Extract the resource identifiers a result depends on.
///
/// `root_type` is the name of the operation's root type (`Query` /
/// `Mutation` / `Subscription` as resolved by the caller — this crate has
/// no schema registry of its own to look that up from the operation kind
/// alone, see DESIGN.md).
pub fn extract<S: ExecutableSchema>(
    schema: &S,
    document: &ExecutableDocument,
    selection_set: &SelectionSet,
    root_type: &str,
    data: &serde_json::Value,
    root_value: &S::RootValue,
    variables: &serde_json::Map<String, serde_json::Value>,
    config: &StoreConfig,
) -> HashSet<Arc<str>> {
    let fragments: HashMap<&str, &document::FragmentDefinition> =
        document.fragments.iter().map(|(name, def)| (name.as_str(), def)).collect();

    let mut out = HashSet::new();
    walk_selection_set(schema, &fragments, selection_set, root_type, data, root_value, variables, config, &mut out);
    out
}

fn walk_selection_set<S: ExecutableSchema>(
    schema: &S,
    fragments: &HashMap<&str, &document::FragmentDefinition>,
    selection_set: &SelectionSet,
    parent_type: &str,
    data: &serde_json::Value,
    root_value: &S::RootValue,
    variables: &serde_json::Map<String, serde_json::Value>,
    config: &StoreConfig,
    out: &mut HashSet<Arc<str>>,
) {
    emit_object_identifier(schema, parent_type, data, config, out);

    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => {
                if is_skipped(&field.directives, variables) {
                    continue;
                }
                walk_field(schema, fragments, field, parent_type, data, root_value, variables, config, out);
            }
            Selection::FragmentSpread { fragment_name, directives } => {
                if is_skipped(directives, variables) {
                    continue;
                }
                if let Some(fragment) = fragments.get(fragment_name.as_str()) {
                    let fragment_type = runtime_type_name(data, &fragment.type_condition);
                    walk_selection_set(
                        schema,
                        fragments,
                        &fragment.selection_set,
                        &fragment_type,
                        data,
                        root_value,
                        variables,
                        config,
                        out,
                    );
                }
                // An unknown fragment spread is a validation error the
                // engine should already have rejected; silently skipping
                // it here keeps the extractor a total function over
                // whatever document/data pair it is handed.
            }
            Selection::InlineFragment {
                type_condition,
                directives,
                selection_set,
            } => {
                if is_skipped(directives, variables) {
                    continue;
                }
                let fragment_type = match type_condition {
                    Some(condition) => runtime_type_name(data, condition),
                    None => parent_type.to_string(),
                };
                walk_selection_set(schema, fragments, selection_set, &fragment_type, data, root_value, variables, config, out);
            }
        }
    }
}

fn walk_field<S: ExecutableSchema>(
    schema: &S,
    fragments: &HashMap<&str, &document::FragmentDefinition>,
    field: &FieldSelection,
    parent_type: &str,
    data: &serde_json::Value,
    root_value: &S::RootValue,
    variables: &serde_json::Map<String, serde_json::Value>,
    config: &StoreConfig,
    out: &mut HashSet<Arc<str>>,
) {
    if field.name == "__typename" {
        return;
    }

    out.insert(Arc::from(format!("{}.{}", parent_type, field.name)));

    let resolved_args: BTreeMap<String, serde_json::Value> = field
        .arguments
        .iter()
        .map(|(name, value)| (name.clone(), document::resolve_value(value, variables)))
        .collect();

    if !resolved_args.is_empty() {
        let rendered = resolved_args
            .iter()
            .map(|(name, value)| format!("{}:{}", name, crate::canonical_json::to_canonical_string(value)))
            .collect::<Vec<_>>()
            .join(",");
        out.insert(Arc::from(format!("{}.{}({})", parent_type, field.name, rendered)));
    }

    for id in schema.collect_resource_identifiers(parent_type, &field.name, root_value, &resolved_args) {
        if !id.is_empty() {
            out.insert(Arc::from(id));
        }
    }

    if field.selection_set.items.is_empty() {
        return;
    }

    let Some(child_data) = data.get(field.response_key()) else {
        return;
    };

    let declared_type = schema.field_type_name(parent_type, &field.name);

    match child_data {
        serde_json::Value::Null => {}
        serde_json::Value::Array(items) => {
            for item in items {
                if item.is_null() {
                    continue;
                }
                let child_type = declared_type.clone().map(|t| runtime_type_name(item, &t)).unwrap_or_default();
                walk_selection_set(schema, fragments, &field.selection_set, &child_type, item, root_value, variables, config, out);
            }
        }
        _ => {
            let child_type = declared_type.map(|t| runtime_type_name(child_data, &t)).unwrap_or_default();
            walk_selection_set(schema, fragments, &field.selection_set, &child_type, child_data, root_value, variables, config, out);
        }
    }
}

fn emit_object_identifier<S: ExecutableSchema>(schema: &S, type_name: &str, data: &serde_json::Value, config: &StoreConfig, out: &mut HashSet<Arc<str>>) {
    if type_name.is_empty() {
        return;
    }
    let serde_json::Value::Object(fields) = data else {
        return;
    };
    if !schema.has_non_null_id_field(type_name, &config.id_field_name) {
        return;
    }
    let Some(id_value) = fields.get(&config.id_field_name) else {
        return;
    };
    if let Some(rendered) = render_id(id_value) {
        out.insert(Arc::from(format!("{}:{}", type_name, rendered)));
    }
}

fn render_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Prefer a concrete `__typename` present in the data over the
/// schema-declared type, so abstract (interface/union) fields resolve to
/// the runtime type actually returned.
fn runtime_type_name(data: &serde_json::Value, declared: &str) -> String {
    data.get("__typename")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| declared.to_string())
}

fn is_skipped(directives: &[Directive], variables: &serde_json::Map<String, serde_json::Value>) -> bool {
    for directive in directives {
        let Some(if_value) = directive.argument("if") else { continue };
        let resolved = document::resolve_value(if_value, variables);
        let condition = resolved.as_bool().unwrap_or(false);
        match directive.name.as_str() {
            "skip" if condition => return true,
            "include" if !condition => return true,
            _ => {}
        }
    }
    false
}
