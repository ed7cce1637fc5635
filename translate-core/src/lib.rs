//! Compiles declarative, tree-shaped graph selections into executable
//! Cypher programs.
//!
//! The flow per compiled field: the [`factory`] builds an operation tree
//! (filters, sorts, pagination, nested operations) from the validated
//! request arguments and the schema model; a bottom-up transpile pass
//! walks that tree, allocating unique names through the shared
//! [`Environment`] and emitting clause fragments; the fragments render
//! into one program plus a collision-free parameter map.
//!
//! Compilation is synchronous and request-scoped: every call owns its own
//! context/environment graph, nothing is shared across requests except
//! the read-only schema. Any error aborts the whole compilation — there
//! is no partial output.

pub mod ast;
pub mod context;
pub mod error;
pub mod factory;
pub mod request;

pub use context::{Context, Environment, RequestContext};
pub use error::{TranslateError, TranslateResult};

use cypher_builder::{render_clauses, CypherValue};
use graph_schema::Schema;
use indexmap::IndexMap;

use crate::ast::operations::Operation;
use crate::request::{ConnectionArgs, FieldArgs};

/// One compiled field: the program text, its parameters, and the name of
/// the variable holding the field's result shape.
#[derive(Debug)]
pub struct CompiledQuery {
    pub cypher: String,
    pub params: IndexMap<String, CypherValue>,
    pub projection: String,
}

/// Compiles a plain read field rooted at `entity_name`.
pub fn compile_read(
    schema: &Schema,
    entity_name: &str,
    args: &FieldArgs,
    request: RequestContext,
) -> TranslateResult<CompiledQuery> {
    let env = Environment::new();
    let ctx = Context::new(env.clone(), request);
    register_auth(&ctx);

    let entity = schema.concrete(entity_name)?.clone();
    let operation = Operation::Read(factory::read_operation(schema, &entity, None, args, &ctx)?);

    finish(&operation, &ctx)
}

/// Compiles a connection field rooted at `entity_name`. Union and
/// interface entities produce a composite operation with one partial per
/// concrete member.
pub fn compile_connection(
    schema: &Schema,
    entity_name: &str,
    args: &ConnectionArgs,
    request: RequestContext,
) -> TranslateResult<CompiledQuery> {
    let env = Environment::new();
    let ctx = Context::new(env.clone(), request);
    register_auth(&ctx);

    let entity = schema.entity(entity_name)?.clone();
    let operation = factory::connection_operation(schema, &entity, None, args, &ctx)?;

    finish(&operation, &ctx)
}

fn finish(operation: &Operation, ctx: &Context) -> TranslateResult<CompiledQuery> {
    tracing::debug!(
        dependencies = ?ast::relationship_dependencies(operation),
        "transpiling operation tree"
    );

    let result = operation.transpile(ctx)?;

    let mut projection = String::new();
    result.projection.render(&mut projection);

    Ok(CompiledQuery {
        cypher: render_clauses(&result.clauses),
        params: ctx.env().params(),
        projection,
    })
}

/// The opaque auth claims bag rides into the program as the `auth`
/// parameter, uninterpreted. Generated authorization predicates reference
/// it at execution time.
fn register_auth(ctx: &Context) {
    if let Some(auth) = ctx.request().auth.clone() {
        ctx.env().register_param("auth", CypherValue::from(auth));
    }
}
