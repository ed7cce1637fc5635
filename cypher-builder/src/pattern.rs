use crate::Variable;

/// Direction of a relationship step within a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// `-[r:T]->`
    Outgoing,
    /// `<-[r:T]-`
    Incoming,
}

/// `(var:Label1:Label2)` node pattern. Both the variable and the labels
/// are optional; an anonymous unlabeled node renders as `()`.
#[derive(Debug, Clone)]
pub struct NodePattern {
    pub variable: Option<Variable>,
    pub labels: Vec<String>,
}

impl NodePattern {
    pub fn new(variable: Variable, labels: Vec<String>) -> Self {
        Self {
            variable: Some(variable),
            labels,
        }
    }

    pub fn anonymous(labels: Vec<String>) -> Self {
        Self {
            variable: None,
            labels,
        }
    }

    fn render(&self, out: &mut String) {
        out.push('(');
        if let Some(variable) = &self.variable {
            out.push_str(variable.name());
        }
        for label in &self.labels {
            out.push(':');
            out.push_str(label);
        }
        out.push(')');
    }
}

/// `-[var:TYPE]->` relationship pattern.
#[derive(Debug, Clone)]
pub struct RelationshipPattern {
    pub variable: Option<Variable>,
    pub rel_type: String,
    pub direction: PatternDirection,
}

impl RelationshipPattern {
    pub fn new(variable: Variable, rel_type: impl Into<String>, direction: PatternDirection) -> Self {
        Self {
            variable: Some(variable),
            rel_type: rel_type.into(),
            direction,
        }
    }

    pub fn anonymous(rel_type: impl Into<String>, direction: PatternDirection) -> Self {
        Self {
            variable: None,
            rel_type: rel_type.into(),
            direction,
        }
    }
}

/// A linear pattern: a start node followed by relationship/node steps.
#[derive(Debug, Clone)]
pub struct Pattern {
    start: NodePattern,
    steps: Vec<(RelationshipPattern, NodePattern)>,
}

impl Pattern {
    pub fn node(start: NodePattern) -> Self {
        Self {
            start,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, relationship: RelationshipPattern, node: NodePattern) -> Self {
        self.steps.push((relationship, node));
        self
    }

    pub fn render(&self, out: &mut String) {
        self.start.render(out);
        for (relationship, node) in &self.steps {
            match relationship.direction {
                PatternDirection::Outgoing => out.push('-'),
                PatternDirection::Incoming => out.push_str("<-"),
            }
            out.push('[');
            if let Some(variable) = &relationship.variable {
                out.push_str(variable.name());
            }
            out.push(':');
            out.push_str(&relationship.rel_type);
            out.push(']');
            match relationship.direction {
                PatternDirection::Outgoing => out.push_str("->"),
                PatternDirection::Incoming => out.push('-'),
            }
            node.render(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(pattern: &Pattern) -> String {
        let mut out = String::new();
        pattern.render(&mut out);
        out
    }

    #[test]
    fn single_node() {
        let pattern = Pattern::node(NodePattern::new(
            Variable::new("this0"),
            vec!["Movie".to_owned()],
        ));
        assert_eq!(rendered(&pattern), "(this0:Movie)");
    }

    #[test]
    fn incoming_step() {
        let pattern = Pattern::node(NodePattern::new(Variable::new("this0"), vec!["Movie".to_owned()]))
            .step(
                RelationshipPattern::new(Variable::new("this1"), "ACTED_IN", PatternDirection::Incoming),
                NodePattern::new(Variable::new("this2"), vec!["Person".to_owned()]),
            );
        assert_eq!(rendered(&pattern), "(this0:Movie)<-[this1:ACTED_IN]-(this2:Person)");
    }

    #[test]
    fn anonymous_outgoing_step() {
        let pattern = Pattern::node(NodePattern::new(Variable::new("this0"), vec!["Person".to_owned()]))
            .step(
                RelationshipPattern::anonymous("ACTED_IN", PatternDirection::Outgoing),
                NodePattern::anonymous(vec!["Movie".to_owned()]),
            );
        assert_eq!(rendered(&pattern), "(this0:Person)-[:ACTED_IN]->(:Movie)");
    }
}
