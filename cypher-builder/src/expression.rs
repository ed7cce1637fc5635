use crate::{CypherValue, Pattern};

/// A query variable. Uniqueness of names is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    Contains,
    StartsWith,
    EndsWith,
}

impl Comparison {
    fn render(self) -> &'static str {
        match self {
            Comparison::Equals => "=",
            Comparison::NotEquals => "<>",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::In => "IN",
            Comparison::Contains => "CONTAINS",
            Comparison::StartsWith => "STARTS WITH",
            Comparison::EndsWith => "ENDS WITH",
        }
    }
}

/// One entry of a map projection: either a plain `.prop` pick or an
/// aliased expression.
#[derive(Debug, Clone)]
pub enum ProjectionItem {
    Property(String),
    Aliased { alias: String, expr: Expr },
}

/// A Cypher expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Variable(Variable),
    /// `base.name` property access. `base` is usually a variable but may be
    /// another property access (`edge.node.title`).
    Property { base: Box<Expr>, name: String },
    /// `$name` parameter reference.
    Param(String),
    Literal(CypherValue),
    Comparison {
        lhs: Box<Expr>,
        op: Comparison,
        rhs: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    /// `name(arg, ...)` function invocation.
    Function { name: String, args: Vec<Expr> },
    /// `COUNT { <pattern> [WHERE <predicate>] }` subquery expression.
    PatternCount {
        pattern: Pattern,
        predicate: Option<Box<Expr>>,
    },
    /// `EXISTS { <pattern> [WHERE <predicate>] }` subquery predicate.
    Exists {
        pattern: Pattern,
        predicate: Option<Box<Expr>>,
    },
    /// `{ key: expr, ... }` map literal.
    MapLiteral(Vec<(String, Expr)>),
    /// `var { .prop, alias: expr, ... }` map projection.
    MapProjection {
        variable: Variable,
        items: Vec<ProjectionItem>,
    },
    /// A pre-rendered fragment, used for computed-attribute expressions
    /// after `this`-substitution.
    Raw(String),
}

impl Expr {
    pub fn variable(variable: &Variable) -> Self {
        Expr::Variable(variable.clone())
    }

    pub fn property(variable: &Variable, name: impl Into<String>) -> Self {
        Expr::Property {
            base: Box::new(Expr::Variable(variable.clone())),
            name: name.into(),
        }
    }

    /// Nested property access on an arbitrary base expression.
    pub fn nested_property(base: Expr, name: impl Into<String>) -> Self {
        Expr::Property {
            base: Box::new(base),
            name: name.into(),
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Expr::Param(name.into())
    }

    pub fn literal(value: impl Into<CypherValue>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn compare(lhs: Expr, op: Comparison, rhs: Expr) -> Self {
        Expr::Comparison {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    /// AND-combines predicates in caller order. The empty combination is
    /// the identity `true`; a single operand collapses to itself.
    pub fn and(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::Literal(CypherValue::Bool(true)),
            1 => operands.pop().unwrap(),
            _ => Expr::And(operands),
        }
    }

    /// OR-combines predicates in caller order. The empty combination is
    /// the identity `false`; a single operand collapses to itself.
    pub fn or(mut operands: Vec<Expr>) -> Self {
        match operands.len() {
            0 => Expr::Literal(CypherValue::Bool(false)),
            1 => operands.pop().unwrap(),
            _ => Expr::Or(operands),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn render(&self, out: &mut String) {
        match self {
            Expr::Variable(v) => out.push_str(v.name()),
            Expr::Property { base, name } => {
                base.render(out);
                out.push('.');
                out.push_str(name);
            }
            Expr::Param(name) => {
                out.push('$');
                out.push_str(name);
            }
            Expr::Literal(value) => value.render(out),
            Expr::Comparison { lhs, op, rhs } => {
                lhs.render(out);
                out.push(' ');
                out.push_str(op.render());
                out.push(' ');
                rhs.render(out);
            }
            Expr::And(operands) => render_connective(out, operands, " AND "),
            Expr::Or(operands) => render_connective(out, operands, " OR "),
            Expr::Not(operand) => {
                out.push_str("NOT (");
                operand.render(out);
                out.push(')');
            }
            Expr::Function { name, args } => {
                out.push_str(name);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.render(out);
                }
                out.push(')');
            }
            Expr::PatternCount { pattern, predicate } => {
                out.push_str("COUNT { ");
                pattern.render(out);
                if let Some(predicate) = predicate {
                    out.push_str(" WHERE ");
                    predicate.render(out);
                }
                out.push_str(" }");
            }
            Expr::Exists { pattern, predicate } => {
                out.push_str("EXISTS { ");
                pattern.render(out);
                if let Some(predicate) = predicate {
                    out.push_str(" WHERE ");
                    predicate.render(out);
                }
                out.push_str(" }");
            }
            Expr::MapLiteral(entries) => {
                out.push_str("{ ");
                for (i, (key, expr)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    expr.render(out);
                }
                out.push_str(" }");
            }
            Expr::MapProjection { variable, items } => {
                out.push_str(variable.name());
                out.push_str(" { ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match item {
                        ProjectionItem::Property(name) => {
                            out.push('.');
                            out.push_str(name);
                        }
                        ProjectionItem::Aliased { alias, expr } => {
                            out.push_str(alias);
                            out.push_str(": ");
                            expr.render(out);
                        }
                    }
                }
                out.push_str(" }");
            }
            Expr::Raw(fragment) => out.push_str(fragment),
        }
    }
}

/// AND/OR chains render wrapped in parentheses, with composite operands
/// parenthesized recursively by their own rendering.
fn render_connective(out: &mut String, operands: &[Expr], connective: &str) {
    out.push('(');
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push_str(connective);
        }
        operand.render(out);
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(expr: &Expr) -> String {
        let mut out = String::new();
        expr.render(&mut out);
        out
    }

    #[test]
    fn empty_and_renders_true() {
        assert_eq!(rendered(&Expr::and(vec![])), "true");
    }

    #[test]
    fn empty_or_renders_false() {
        assert_eq!(rendered(&Expr::or(vec![])), "false");
    }

    #[test]
    fn single_operand_collapses() {
        let this0 = Variable::new("this0");
        let cmp = Expr::compare(
            Expr::property(&this0, "title"),
            Comparison::Equals,
            Expr::param("param0"),
        );
        assert_eq!(rendered(&Expr::and(vec![cmp])), "this0.title = $param0");
    }

    #[test]
    fn connectives_keep_operand_order() {
        let this0 = Variable::new("this0");
        let a = Expr::compare(
            Expr::property(&this0, "year"),
            Comparison::GreaterThan,
            Expr::param("param0"),
        );
        let b = Expr::compare(
            Expr::property(&this0, "title"),
            Comparison::StartsWith,
            Expr::param("param1"),
        );
        assert_eq!(
            rendered(&Expr::or(vec![a, b])),
            "(this0.year > $param0 OR this0.title STARTS WITH $param1)"
        );
    }

    #[test]
    fn map_projection_mixes_picks_and_aliases() {
        let this0 = Variable::new("this0");
        let expr = Expr::MapProjection {
            variable: this0,
            items: vec![
                ProjectionItem::Property("title".to_owned()),
                ProjectionItem::Aliased {
                    alias: "actors".to_owned(),
                    expr: Expr::Variable(Variable::new("var1")),
                },
            ],
        };
        assert_eq!(rendered(&expr), "this0 { .title, actors: var1 }");
    }
}
