//! Owned, lifetime-free representation of an executable GraphQL document.
//!
//! The store only ever needs to walk selection sets, inspect directives,
//! and resolve argument values — never the full grammar `graphql-parser`
//! exposes (type definitions, schema extensions, ...). Converting once,
//! at parse time, into these owned types keeps every other module free
//! of `graphql_parser`'s lifetime parameter.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// A GraphQL value, after conversion from `graphql_parser::query::Value`.
///
/// `Variable` is resolved against a live query's captured variables by
/// [`resolve_value`] wherever a value is actually needed; it is kept here
/// so the same `Value` type can represent both literal arguments and
/// variable references found in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

/// Resolve a document `Value` into a `serde_json::Value`, substituting
/// variable references from `variables`. A variable with no entry in
/// `variables` resolves to `null`, matching how a conforming GraphQL
/// engine treats an unset optional variable.
pub fn resolve_value(value: &Value, variables: &serde_json::Map<String, serde_json::Value>) -> serde_json::Value {
    match value {
        Value::Variable(name) => variables.get(name).cloned().unwrap_or(serde_json::Value::Null),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Null => serde_json::Value::Null,
        Value::Enum(name) => serde_json::Value::String(name.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(|v| resolve_value(v, variables)).collect()),
        Value::Object(fields) => {
            let map = fields
                .iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, variables)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// A `@directive(arg: value, ...)` application.
#[derive(Debug, Clone)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, Value)>,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// One field, inline fragment, or fragment spread inside a selection set.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread {
        fragment_name: String,
        directives: Vec<Directive>,
    },
    InlineFragment {
        type_condition: Option<String>,
        directives: Vec<Directive>,
        selection_set: SelectionSet,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct FieldSelection {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, Value)>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

impl FieldSelection {
    /// The key this field's value is stored under in the response map —
    /// the alias if one was given, otherwise the field name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub type_condition: String,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

/// A fully-owned, parsed GraphQL document.
#[derive(Debug, Clone, Default)]
pub struct ExecutableDocument {
    pub operations: Vec<Operation>,
    pub fragments: HashMap<String, FragmentDefinition>,
}

/// Parse a GraphQL document using `graphql-parser`, converting its
/// borrowed AST into the owned representation above.
pub fn parse(source: &str) -> Result<ExecutableDocument> {
    let parsed = graphql_parser::parse_query::<String>(source).map_err(|err| Error::Parse(err.to_string()))?;
    Ok(convert_document(&parsed))
}

fn convert_document(doc: &graphql_parser::query::Document<'_, String>) -> ExecutableDocument {
    let mut operations = Vec::new();
    let mut fragments = HashMap::new();

    for definition in &doc.definitions {
        match definition {
            graphql_parser::query::Definition::Operation(op) => {
                operations.push(convert_operation(op));
            }
            graphql_parser::query::Definition::Fragment(frag) => {
                let type_condition = match &frag.type_condition {
                    graphql_parser::query::TypeCondition::On(name) => name.clone(),
                };
                fragments.insert(
                    frag.name.clone(),
                    FragmentDefinition {
                        type_condition,
                        directives: convert_directives(&frag.directives),
                        selection_set: convert_selection_set(&frag.selection_set),
                    },
                );
            }
        }
    }

    ExecutableDocument { operations, fragments }
}

fn convert_operation(op: &graphql_parser::query::OperationDefinition<'_, String>) -> Operation {
    use graphql_parser::query::OperationDefinition::*;
    match op {
        SelectionSet(selection_set) => Operation {
            kind: OperationKind::Query,
            name: None,
            directives: Vec::new(),
            selection_set: convert_selection_set(selection_set),
        },
        Query(query) => Operation {
            kind: OperationKind::Query,
            name: query.name.clone(),
            directives: convert_directives(&query.directives),
            selection_set: convert_selection_set(&query.selection_set),
        },
        Mutation(mutation) => Operation {
            kind: OperationKind::Mutation,
            name: mutation.name.clone(),
            directives: convert_directives(&mutation.directives),
            selection_set: convert_selection_set(&mutation.selection_set),
        },
        Subscription(subscription) => Operation {
            kind: OperationKind::Subscription,
            name: subscription.name.clone(),
            directives: convert_directives(&subscription.directives),
            selection_set: convert_selection_set(&subscription.selection_set),
        },
    }
}

fn convert_selection_set(selection_set: &graphql_parser::query::SelectionSet<'_, String>) -> SelectionSet {
    SelectionSet {
        items: selection_set.items.iter().map(convert_selection).collect(),
    }
}

fn convert_selection(selection: &graphql_parser::query::Selection<'_, String>) -> Selection {
    use graphql_parser::query::Selection::*;
    match selection {
        Field(field) => Selection::Field(FieldSelection {
            alias: field.alias.clone(),
            name: field.name.clone(),
            arguments: convert_arguments(&field.arguments),
            directives: convert_directives(&field.directives),
            selection_set: convert_selection_set(&field.selection_set),
        }),
        FragmentSpread(spread) => Selection::FragmentSpread {
            fragment_name: spread.fragment_name.clone(),
            directives: convert_directives(&spread.directives),
        },
        InlineFragment(inline) => Selection::InlineFragment {
            type_condition: inline.type_condition.as_ref().map(|cond| match cond {
                graphql_parser::query::TypeCondition::On(name) => name.clone(),
            }),
            directives: convert_directives(&inline.directives),
            selection_set: convert_selection_set(&inline.selection_set),
        },
    }
}

fn convert_directives(directives: &[graphql_parser::query::Directive<'_, String>]) -> Vec<Directive> {
    directives
        .iter()
        .map(|d| Directive {
            name: d.name.clone(),
            arguments: convert_arguments(&d.arguments),
        })
        .collect()
}

fn convert_arguments(arguments: &[(String, graphql_parser::query::Value<'_, String>)]) -> Vec<(String, Value)> {
    arguments.iter().map(|(name, value)| (name.clone(), convert_value(value))).collect()
}

fn convert_value(value: &graphql_parser::query::Value<'_, String>) -> Value {
    use graphql_parser::query::Value::*;
    match value {
        Variable(name) => Value::Variable(name.clone()),
        Int(n) => Value::Int(n.as_i64().unwrap_or_default()),
        Float(n) => Value::Float(*n),
        String(s) => Value::String(s.clone()),
        Boolean(b) => Value::Boolean(*b),
        Null => Value::Null,
        Enum(name) => Value::Enum(name.clone()),
        List(items) => Value::List(items.iter().map(convert_value).collect()),
        Object(fields) => Value::Object(fields.iter().map(|(k, v)| (k.clone(), convert_value(v))).collect()),
    }
}

/// Result of inspecting the selected operation for a given directive.
#[derive(Debug, Clone)]
pub struct OperationInspection {
    pub is_live: bool,
    pub operation_name: Option<String>,
}

/// Select the operation named by `operation_name` (or the sole operation
/// if the document has exactly one and none was requested), and report
/// whether it carries `directive_name`.
///
/// This is the "document-inspection helper" spec.md describes as an
/// external collaborator: it never touches a schema, only the document.
pub fn inspect_operation(document: &ExecutableDocument, operation_name: Option<&str>, directive_name: &str) -> Result<OperationInspection> {
    let operation = select_operation(document, operation_name)?;
    Ok(OperationInspection {
        is_live: operation.directives.iter().any(|d| d.name == directive_name),
        operation_name: operation.name.clone(),
    })
}

pub fn select_operation<'d>(document: &'d ExecutableDocument, operation_name: Option<&str>) -> Result<&'d Operation> {
    match operation_name {
        Some(name) => document
            .operations
            .iter()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| Error::UnknownOperation(name.to_string())),
        None => match document.operations.len() {
            0 => Err(Error::NoOperation),
            1 => Ok(&document.operations[0]),
            _ => Err(Error::AmbiguousOperation),
        },
    }
}
