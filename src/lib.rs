//! An in-process live-query store for GraphQL `@live` operations.
//!
//! Wraps any engine that can execute a parsed document once
//! ([`ExecutableSchema`]) with the machinery spec.md describes: an
//! identifier extractor that walks a result alongside its selection set,
//! an index associating resource identifiers with the live subscriptions
//! that depend on them, and a scheduler that coalesces bursts of
//! invalidations into a single re-execution per affected subscription.
//!
//! This crate does not parse schemas, resolve fields, or validate
//! documents — [`ExecutableSchema`] is the seam where an actual GraphQL
//! engine plugs in.

mod canonical_json;
mod config;
mod document;
mod error;
mod execute;
mod identifier;
mod index;
mod record;
mod result;
mod scheduler;
mod schema;
mod store;
mod stream;

pub use config::StoreConfig;
pub use document::{
    parse, resolve_value, select_operation, Directive, ExecutableDocument, FieldSelection, FragmentDefinition, Operation, OperationKind, Selection, SelectionSet, Value,
};
pub use error::{Error, Result};
pub use execute::{ExecuteOutcome, ExecuteRequest};
pub use result::LiveResult;
pub use scheduler::Invalidation;
pub use schema::{ExecutableSchema, ExecutionOutcome, ExecutionResult};
pub use store::LiveQueryStore;
pub use stream::LiveQueryStream;
