/// Errors raised while building, changing or decoding facts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    /// A required attribute was not supplied at construction.
    #[error("{variant}: required attribute `{attribute}` is missing")]
    RequiredAttribute { variant: String, attribute: String },

    /// An attribute outside the variant's schema was supplied.
    #[error("{variant}: unknown attribute `{attribute}`")]
    WrongAttribute { variant: String, attribute: String },

    /// `change` targeted an attribute outside the variant's schema.
    #[error("{variant} {uid}: cannot change unknown attribute `{attribute}`")]
    WrongChangeAttribute {
        variant: String,
        uid: String,
        attribute: String,
    },

    /// The variant's uid rule produced no uid.
    #[error("{variant}: uid could not be computed")]
    UidNotComputed { variant: String },

    /// A record names a variant the registry does not know.
    #[error("unknown fact variant `{0}`")]
    UnknownVariant(String),

    /// A composite attribute holds something other than a list of facts.
    #[error("{variant}: attribute `{attribute}` must be a list of facts")]
    InvalidComposite { variant: String, attribute: String },

    /// A float attribute is NaN or infinite.
    #[error("{variant}: attribute `{attribute}` is not a finite number")]
    NonFiniteNumber { variant: String, attribute: String },

    /// A serialized record does not have the `{class, attributes}` shape.
    #[error("malformed fact record: {0}")]
    MalformedRecord(String),
}

/// Errors raised by knowledge base operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("no location known for {object}")]
    NotLocated { object: String },

    #[error(transparent)]
    Fact(#[from] FactError),
}
