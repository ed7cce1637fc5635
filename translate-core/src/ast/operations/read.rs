use std::sync::Arc;

use cypher_builder::{
    Clause, Expr, ProjectionItem, ReturnClause, Variable, WithClause,
};
use graph_schema::{ConcreteEntity, Relationship};

use crate::ast::filters::{self, Filter};
use crate::ast::operations::match_stage;
use crate::ast::pagination::Pagination;
use crate::ast::sort::{self, Sort};
use crate::ast::{substitute_this, QueryAstNode, TranspileResult};
use crate::{Context, TranslateResult};

/// One projected attribute of a read.
#[derive(Debug)]
pub enum ProjectionField {
    /// Stored attribute, projected as a plain `.name` pick.
    Stored(String),
    /// Computed attribute, materialized through its own subquery and
    /// aliased into the projection.
    Computed { name: String, expression: String },
}

impl ProjectionField {
    pub fn name(&self) -> &str {
        match self {
            ProjectionField::Stored(name) => name,
            ProjectionField::Computed { name, .. } => name,
        }
    }
}

/// Full-text search stage replacing the MATCH of a root read. The score
/// variable is allocated at tree-construction time so sort resolution
/// can see it.
#[derive(Debug)]
pub struct FulltextStage {
    pub index: String,
    pub phrase: String,
    pub score_variable: Variable,
}

/// Match + filter + sort + paginate + flat projection. Nested
/// relationship selections transpile to `CALL` subqueries in a child
/// context.
#[derive(Debug)]
pub struct ReadOperation {
    pub entity: Arc<ConcreteEntity>,
    pub relationship: Option<Arc<Relationship>>,
    /// Response key under which a nested operation projects its result.
    pub alias: String,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub pagination: Pagination,
    pub selection: Vec<ProjectionField>,
    pub nested: Vec<ReadOperation>,
    pub fulltext: Option<FulltextStage>,
}

impl ReadOperation {
    pub fn transpile(&self, ctx: &Context) -> TranslateResult<TranspileResult> {
        let (mut clauses, target, child_ctx) = self.match_and_filter(ctx)?;

        self.order_stage(&mut clauses, &target, &child_ctx)?;

        let (projection_subqueries, items) = self.projection(&child_ctx, &target)?;
        clauses.extend(projection_subqueries);
        clauses.push(Clause::Return(ReturnClause::aliased(
            Expr::MapProjection {
                variable: target.clone(),
                items,
            },
            target.clone(),
        )));

        Ok(TranspileResult {
            clauses,
            projection: Expr::Variable(target),
        })
    }

    /// Transpiles this operation as a nested selection of `ctx`'s target:
    /// a `CALL` subquery collecting the projected maps into a fresh
    /// variable (`head`-collapsed for to-one relationships).
    pub(crate) fn transpile_nested(&self, ctx: &Context) -> TranslateResult<(Clause, Variable)> {
        let parent = ctx.target()?.clone();
        let (mut clauses, target, child_ctx) = self.match_and_filter(ctx)?;

        self.order_stage(&mut clauses, &target, &child_ctx)?;

        let (projection_subqueries, items) = self.projection(&child_ctx, &target)?;
        clauses.extend(projection_subqueries);

        let collected = Expr::function(
            "collect",
            vec![Expr::MapProjection {
                variable: target,
                items,
            }],
        );
        let projected = match &self.relationship {
            Some(relationship) if relationship.is_to_one() => {
                Expr::function("head", vec![collected])
            }
            _ => collected,
        };

        let result = ctx.env().new_variable();
        clauses.push(Clause::Return(ReturnClause::aliased(projected, result.clone())));

        Ok((
            Clause::CallSubquery {
                imports: vec![parent],
                clauses,
            },
            result,
        ))
    }

    fn match_and_filter(&self, ctx: &Context) -> TranslateResult<(Vec<Clause>, Variable, Context)> {
        match &self.fulltext {
            Some(stage) => {
                let target = ctx.env().new_target();
                let index = ctx.env().new_param(stage.index.clone());
                let phrase = ctx.env().new_param(stage.phrase.clone());

                let mut clauses = vec![Clause::CallProcedure {
                    procedure: "db.index.fulltext.queryNodes".to_owned(),
                    args: vec![index, phrase],
                    yields: vec![
                        ("node".to_owned(), target.clone()),
                        ("score".to_owned(), stage.score_variable.clone()),
                    ],
                }];

                let child_ctx = ctx
                    .with_target(target.clone())
                    .with_score(stage.score_variable.clone());

                let compiled = filters::compile_all(&self.filters, &child_ctx)?;
                clauses.extend(compiled.subqueries);
                if let Some(predicate) = compiled.predicate {
                    clauses.push(Clause::With(WithClause::star().with_filter(predicate)));
                }

                Ok((clauses, target, child_ctx))
            }
            None => match_stage(&self.entity, self.relationship.as_ref(), &self.filters, ctx),
        }
    }

    /// Stage three: sort subqueries, then one `WITH *` carrying ORDER BY
    /// and SKIP/LIMIT, in that order. Skipped entirely when neither is
    /// requested.
    fn order_stage(
        &self,
        clauses: &mut Vec<Clause>,
        target: &Variable,
        ctx: &Context,
    ) -> TranslateResult<()> {
        let node_base = Expr::variable(target);
        let edge_base = match &self.relationship {
            Some(_) => Some(Expr::variable(ctx.relationship()?)),
            None => None,
        };

        let (sort_subqueries, order_items) =
            sort::compile_all(&self.sorts, ctx, &node_base, edge_base.as_ref())?;
        clauses.extend(sort_subqueries);

        let (skip, limit) = self.pagination.compile(ctx);
        if !order_items.is_empty() || skip.is_some() || limit.is_some() {
            clauses.push(Clause::With(
                WithClause::star()
                    .with_order_by(order_items)
                    .with_skip(skip)
                    .with_limit(limit),
            ));
        }

        Ok(())
    }

    /// Stage four: the flat map projection. Computed attributes and
    /// nested selections contribute `CALL` subqueries evaluated before
    /// the RETURN that references their variables.
    fn projection(
        &self,
        ctx: &Context,
        target: &Variable,
    ) -> TranslateResult<(Vec<Clause>, Vec<ProjectionItem>)> {
        let mut subqueries = Vec::new();
        let mut items = Vec::new();

        for field in &self.selection {
            match field {
                ProjectionField::Stored(name) => {
                    items.push(ProjectionItem::Property(name.clone()));
                }
                ProjectionField::Computed { name, expression } => {
                    let variable = ctx.env().new_variable();
                    subqueries.push(Clause::CallSubquery {
                        imports: vec![target.clone()],
                        clauses: vec![Clause::Return(ReturnClause::aliased(
                            Expr::Raw(substitute_this(expression, target)),
                            variable.clone(),
                        ))],
                    });
                    items.push(ProjectionItem::Aliased {
                        alias: name.clone(),
                        expr: Expr::Variable(variable),
                    });
                }
            }
        }

        for nested in &self.nested {
            let (subquery, variable) = nested.transpile_nested(ctx)?;
            subqueries.push(subquery);
            items.push(ProjectionItem::Aliased {
                alias: nested.alias.clone(),
                expr: Expr::Variable(variable),
            });
        }

        Ok((subqueries, items))
    }
}

impl QueryAstNode for ReadOperation {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        let mut children: Vec<&dyn QueryAstNode> = Vec::new();
        children.extend(self.filters.iter().map(|f| f as &dyn QueryAstNode));
        children.extend(self.sorts.iter().map(|s| s as &dyn QueryAstNode));
        children.push(&self.pagination);
        children.extend(self.nested.iter().map(|n| n as &dyn QueryAstNode));
        children
    }

    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        self.relationship.as_ref()
    }
}
