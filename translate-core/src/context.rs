//! Scoping for tree construction and transpilation.
//!
//! A [`Context`] is an immutable chain of scopes: entering a nested
//! subquery derives a child context via the `with_*` constructors and
//! leaves the parent untouched. The only mutable piece is the shared
//! [`Environment`], which hands out unique names and records parameter
//! values; it is shared by reference across the whole tree so sibling
//! subtrees never allocate colliding names. Compilation is single-threaded
//! per request, so plain interior mutability is all that is needed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cypher_builder::{CypherValue, Expr, Variable};
use indexmap::IndexMap;

use crate::{TranslateError, TranslateResult};

/// Per-compilation name allocator and parameter registry.
#[derive(Debug, Default)]
pub struct Environment {
    counter: Cell<usize>,
    param_counter: Cell<usize>,
    params: RefCell<IndexMap<String, CypherValue>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn next_index(&self) -> usize {
        let index = self.counter.get();
        self.counter.set(index + 1);
        index
    }

    /// A fresh `thisN` variable for a matched node or relationship.
    pub fn new_target(&self) -> Variable {
        Variable::new(format!("this{}", self.next_index()))
    }

    /// A fresh `varN` variable for subquery results and other bindings.
    /// Shares the counter with [`Self::new_target`], so names are strictly
    /// increasing across both prefixes.
    pub fn new_variable(&self) -> Variable {
        Variable::new(format!("var{}", self.next_index()))
    }

    /// Registers `value` under a fresh `paramN` name and returns the
    /// `$paramN` reference.
    pub fn new_param(&self, value: impl Into<CypherValue>) -> Expr {
        let index = self.param_counter.get();
        self.param_counter.set(index + 1);

        let name = format!("param{index}");
        self.params.borrow_mut().insert(name.clone(), value.into());
        Expr::Param(name)
    }

    /// Registers a parameter under a caller-chosen name, used for
    /// request-scoped payloads forwarded verbatim (e.g. auth claims).
    pub fn register_param(&self, name: impl Into<String>, value: impl Into<CypherValue>) -> Expr {
        let name = name.into();
        self.params.borrow_mut().insert(name.clone(), value.into());
        Expr::Param(name)
    }

    /// Snapshot of all registered parameters in registration order.
    pub fn params(&self) -> IndexMap<String, CypherValue> {
        self.params.borrow().clone()
    }
}

/// Opaque request-scoped data forwarded into the compilation unchanged.
/// The compiler never interprets it beyond pass-through.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    /// Auth claims bag, registered verbatim as the `auth` parameter.
    pub auth: Option<serde_json::Value>,
    /// Feature flags and other engine-specific extras.
    pub extensions: IndexMap<String, serde_json::Value>,
}

/// The scope threaded through tree construction and transpilation.
///
/// Cloning is cheap; `with_*` constructors derive child scopes without
/// mutating the receiver.
#[derive(Debug, Clone)]
pub struct Context {
    env: Rc<Environment>,
    request: Rc<RequestContext>,
    target: Option<Variable>,
    relationship: Option<Variable>,
    score: Option<Variable>,
}

impl Context {
    pub fn new(env: Rc<Environment>, request: RequestContext) -> Self {
        Self {
            env,
            request: Rc::new(request),
            target: None,
            relationship: None,
            score: None,
        }
    }

    pub fn with_target(&self, target: Variable) -> Self {
        Self {
            target: Some(target),
            ..self.clone()
        }
    }

    pub fn with_relationship(&self, relationship: Variable) -> Self {
        Self {
            relationship: Some(relationship),
            ..self.clone()
        }
    }

    pub fn with_score(&self, score: Variable) -> Self {
        Self {
            score: Some(score),
            ..self.clone()
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// The node or relationship currently in scope. Nodes that produce
    /// predicates or subqueries must call this before proceeding; a
    /// missing target is a tree-construction bug, not a request error.
    pub fn target(&self) -> TranslateResult<&Variable> {
        self.target
            .as_ref()
            .ok_or_else(|| TranslateError::structural("no target binding in scope"))
    }

    /// The relationship variable in scope, required by edge-attached
    /// filters and sorts.
    pub fn relationship(&self) -> TranslateResult<&Variable> {
        self.relationship
            .as_ref()
            .ok_or_else(|| TranslateError::structural("no relationship binding in scope"))
    }

    pub fn score(&self) -> Option<&Variable> {
        self.score.as_ref()
    }
}
