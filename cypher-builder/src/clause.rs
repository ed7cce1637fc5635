use itertools::Itertools;

use crate::{Expr, Pattern, Variable};

/// Sort direction of a single ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn render(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// One `ORDER BY` key. Keys are consumed in caller order; the renderer
/// never reorders them.
#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: SortDirection,
}

/// One projected item of a `WITH` or `RETURN` clause.
#[derive(Debug, Clone)]
pub enum WithItem {
    Star,
    Variable(Variable),
    Aliased { expr: Expr, alias: Variable },
}

impl WithItem {
    fn render(&self, out: &mut String) {
        match self {
            WithItem::Star => out.push('*'),
            WithItem::Variable(v) => out.push_str(v.name()),
            WithItem::Aliased { expr, alias } => {
                expr.render(out);
                out.push_str(" AS ");
                out.push_str(alias.name());
            }
        }
    }
}

/// `WITH` clause. The sub-lines always render in the fixed order
/// items, WHERE, ORDER BY, SKIP, LIMIT; pagination therefore can never
/// precede ordering inside one clause.
#[derive(Debug, Clone)]
pub struct WithClause {
    pub items: Vec<WithItem>,
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub skip: Option<Expr>,
    pub limit: Option<Expr>,
}

impl WithClause {
    pub fn star() -> Self {
        Self::items(vec![WithItem::Star])
    }

    pub fn items(items: Vec<WithItem>) -> Self {
        Self {
            items,
            filter: None,
            order_by: Vec::new(),
            skip: None,
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByItem>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_skip(mut self, skip: Option<Expr>) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: Option<Expr>) -> Self {
        self.limit = limit;
        self
    }
}

/// `RETURN` clause; same ordering rules as [`WithClause`].
#[derive(Debug, Clone)]
pub struct ReturnClause {
    pub items: Vec<WithItem>,
    pub order_by: Vec<OrderByItem>,
    pub skip: Option<Expr>,
    pub limit: Option<Expr>,
}

impl ReturnClause {
    pub fn items(items: Vec<WithItem>) -> Self {
        Self {
            items,
            order_by: Vec::new(),
            skip: None,
            limit: None,
        }
    }

    pub fn aliased(expr: Expr, alias: Variable) -> Self {
        Self::items(vec![WithItem::Aliased { expr, alias }])
    }
}

/// One imperative clause of the generated program.
#[derive(Debug, Clone)]
pub enum Clause {
    Match {
        pattern: Pattern,
        filter: Option<Expr>,
    },
    With(WithClause),
    /// `CALL { ... }` subquery. Imported variables render as the leading
    /// `WITH` line of the subquery body.
    CallSubquery {
        imports: Vec<Variable>,
        clauses: Vec<Clause>,
    },
    Unwind {
        expr: Expr,
        alias: Variable,
    },
    /// `CALL proc(args) YIELD item AS var, ...` procedure invocation.
    CallProcedure {
        procedure: String,
        args: Vec<Expr>,
        yields: Vec<(String, Variable)>,
    },
    Return(ReturnClause),
    /// Branches combined with `UNION`; branch order is caller order.
    Union(Vec<Vec<Clause>>),
}

const INDENT: &str = "    ";

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn render_order_by(out: &mut String, depth: usize, order_by: &[OrderByItem]) {
    if order_by.is_empty() {
        return;
    }
    push_indent(out, depth);
    out.push_str("ORDER BY ");
    let rendered = order_by
        .iter()
        .map(|item| {
            let mut s = String::new();
            item.expr.render(&mut s);
            s.push(' ');
            s.push_str(item.direction.render());
            s
        })
        .join(", ");
    out.push_str(&rendered);
    out.push('\n');
}

fn render_paging(out: &mut String, depth: usize, skip: &Option<Expr>, limit: &Option<Expr>) {
    if let Some(skip) = skip {
        push_indent(out, depth);
        out.push_str("SKIP ");
        skip.render(out);
        out.push('\n');
    }
    if let Some(limit) = limit {
        push_indent(out, depth);
        out.push_str("LIMIT ");
        limit.render(out);
        out.push('\n');
    }
}

fn render_items(out: &mut String, items: &[WithItem]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.render(out);
    }
}

impl Clause {
    pub fn render(&self, out: &mut String, depth: usize) {
        match self {
            Clause::Match { pattern, filter } => {
                push_indent(out, depth);
                out.push_str("MATCH ");
                pattern.render(out);
                out.push('\n');
                if let Some(filter) = filter {
                    push_indent(out, depth);
                    out.push_str("WHERE ");
                    filter.render(out);
                    out.push('\n');
                }
            }
            Clause::With(with) => {
                push_indent(out, depth);
                out.push_str("WITH ");
                render_items(out, &with.items);
                out.push('\n');
                if let Some(filter) = &with.filter {
                    push_indent(out, depth);
                    out.push_str("WHERE ");
                    filter.render(out);
                    out.push('\n');
                }
                render_order_by(out, depth, &with.order_by);
                render_paging(out, depth, &with.skip, &with.limit);
            }
            Clause::CallSubquery { imports, clauses } => {
                push_indent(out, depth);
                out.push_str("CALL {\n");
                if !imports.is_empty() {
                    push_indent(out, depth + 1);
                    out.push_str("WITH ");
                    out.push_str(&imports.iter().map(Variable::name).join(", "));
                    out.push('\n');
                }
                for clause in clauses {
                    clause.render(out, depth + 1);
                }
                push_indent(out, depth);
                out.push_str("}\n");
            }
            Clause::Unwind { expr, alias } => {
                push_indent(out, depth);
                out.push_str("UNWIND ");
                expr.render(out);
                out.push_str(" AS ");
                out.push_str(alias.name());
                out.push('\n');
            }
            Clause::CallProcedure {
                procedure,
                args,
                yields,
            } => {
                push_indent(out, depth);
                out.push_str("CALL ");
                out.push_str(procedure);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.render(out);
                }
                out.push(')');
                if !yields.is_empty() {
                    out.push_str(" YIELD ");
                    let rendered = yields
                        .iter()
                        .map(|(item, alias)| format!("{item} AS {alias}"))
                        .join(", ");
                    out.push_str(&rendered);
                }
                out.push('\n');
            }
            Clause::Return(ret) => {
                push_indent(out, depth);
                out.push_str("RETURN ");
                render_items(out, &ret.items);
                out.push('\n');
                render_order_by(out, depth, &ret.order_by);
                render_paging(out, depth, &ret.skip, &ret.limit);
            }
            Clause::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        push_indent(out, depth);
                        out.push_str("UNION\n");
                    }
                    for clause in branch {
                        clause.render(out, depth);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Comparison, NodePattern, render_clauses};
    use expect_test::expect;

    #[test]
    fn with_renders_paging_after_ordering() {
        let this0 = Variable::new("this0");
        let clause = Clause::With(
            WithClause::star()
                .with_order_by(vec![OrderByItem {
                    expr: Expr::property(&this0, "title"),
                    direction: SortDirection::Ascending,
                }])
                .with_skip(Some(Expr::param("param0")))
                .with_limit(Some(Expr::param("param1"))),
        );

        expect![[r#"
            WITH *
            ORDER BY this0.title ASC
            SKIP $param0
            LIMIT $param1"#]]
        .assert_eq(&render_clauses(&[clause]));
    }

    #[test]
    fn call_subquery_indents_and_imports() {
        let this0 = Variable::new("this0");
        let var1 = Variable::new("var1");
        let clause = Clause::CallSubquery {
            imports: vec![this0.clone()],
            clauses: vec![Clause::Return(ReturnClause::aliased(
                Expr::function("count", vec![Expr::variable(&this0)]),
                var1,
            ))],
        };

        expect![[r#"
            CALL {
                WITH this0
                RETURN count(this0) AS var1
            }"#]]
        .assert_eq(&render_clauses(&[clause]));
    }

    #[test]
    fn union_branches_render_in_caller_order() {
        let branch = |name: &str, var: &str| {
            let v = Variable::new(var);
            vec![
                Clause::Match {
                    pattern: Pattern::node(NodePattern::new(v.clone(), vec![name.to_owned()])),
                    filter: None,
                },
                Clause::Return(ReturnClause::aliased(Expr::variable(&v), Variable::new("edge"))),
            ]
        };

        let clause = Clause::Union(vec![branch("Movie", "this0"), branch("Series", "this1")]);

        expect![[r#"
            MATCH (this0:Movie)
            RETURN this0 AS edge
            UNION
            MATCH (this1:Series)
            RETURN this1 AS edge"#]]
        .assert_eq(&render_clauses(&[clause]));
    }

    #[test]
    fn match_with_filter() {
        let this0 = Variable::new("this0");
        let clause = Clause::Match {
            pattern: Pattern::node(NodePattern::new(this0.clone(), vec!["Movie".to_owned()])),
            filter: Some(Expr::compare(
                Expr::property(&this0, "year"),
                Comparison::GreaterThanOrEqual,
                Expr::param("param0"),
            )),
        };

        expect![[r#"
            MATCH (this0:Movie)
            WHERE this0.year >= $param0"#]]
        .assert_eq(&render_clauses(&[clause]));
    }
}
