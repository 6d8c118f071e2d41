use thiserror::Error;

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unresolved symbol `{name}` in {context}")]
    UnresolvedSymbol { name: String, context: String },

    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String },

    #[error("ambiguous call to `{name}`: {}", candidates.join(", "))]
    AmbiguousOverload {
        name: String,
        candidates: Vec<String>,
    },

    #[error("expected {expected}, found {found}")]
    InvalidCast { expected: String, found: String },

    #[error("malformed generic signature `{signature}`: {reason}")]
    MalformedGenericSignature { signature: String, reason: String },

    #[error("resolution exceeded the depth limit of {limit}")]
    ResolutionTooDeep { limit: usize },

    #[error("`{type_name}` takes {expected} type arguments, found {found}")]
    TypeArgumentCount {
        type_name: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    ClassFile(#[from] javelin_classfile::Error),
}

impl ResolveError {
    pub(crate) fn unresolved(name: impl Into<String>, context: impl Into<String>) -> Self {
        ResolveError::UnresolvedSymbol {
            name: name.into(),
            context: context.into(),
        }
    }

    pub(crate) fn unsupported(construct: impl Into<String>) -> Self {
        ResolveError::UnsupportedConstruct {
            construct: construct.into(),
        }
    }

    pub(crate) fn invalid_cast(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ResolveError::InvalidCast {
            expected: expected.into(),
            found: found.into(),
        }
    }

    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolveError::UnresolvedSymbol { .. })
    }
}
