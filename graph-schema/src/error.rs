use thiserror::Error;

/// Resolution failures against the schema model. These surface as request
/// errors in the translation layer: the schema itself is trusted, the
/// names coming from a request are not.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    #[error("entity {0} is a union or interface, expected a concrete type")]
    NotConcrete(String),

    #[error("no filter attribute {attribute} on {entity}")]
    UnknownAttribute { attribute: String, entity: String },

    #[error("unknown relationship {relationship} on {entity}")]
    UnknownRelationship { relationship: String, entity: String },
}
