/// Scalar kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Point,
}

/// A named attribute of an entity or relationship.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub kind: ScalarKind,
    pub is_list: bool,
    /// For computed attributes, the Cypher expression producing the value.
    /// The expression references the current node as `this` and is
    /// substituted at transpile time.
    pub computed: Option<String>,
}

impl Attribute {
    pub fn stored(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_list: false,
            computed: None,
        }
    }

    pub fn stored_list(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            is_list: true,
            ..Self::stored(name, kind)
        }
    }

    pub fn computed(name: impl Into<String>, kind: ScalarKind, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            is_list: false,
            computed: Some(expression.into()),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }
}
