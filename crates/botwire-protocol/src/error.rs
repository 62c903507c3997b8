//! Registry and decode error types.

use thiserror::Error;

use crate::quick::QuickOpKind;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry misuse, caught at registration or lookup time.
///
/// Duplicate registrations are startup-time bugs in the catalogue; unknown
/// lookups are runtime requests for shapes the registry never learned.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An action with this wire name is already registered.
    #[error("action \"{0}\" is already registered")]
    DuplicateAction(String),

    /// No action with this wire name is registered.
    #[error("unknown action \"{0}\"")]
    UnknownAction(String),

    /// An event family with this post type is already registered.
    #[error("event family \"{0}\" is already registered")]
    DuplicateFamily(String),

    /// An event variant was registered before its family.
    #[error("event family \"{0}\" is not registered")]
    UnregisteredFamily(String),

    /// The (family, discriminator value) bucket already has a shape bound.
    #[error("event variant ({0}, {1}) is already registered")]
    DuplicateEventVariant(String, String),

    /// The (family, discriminator value) bucket already has a quick
    /// operation bound.
    #[error("quick operation for ({0}, {1}) is already registered")]
    DuplicateQuickOperation(String, String),

    /// No quick operation is bound to the bucket.
    #[error("no quick operation defined for ({0}, {1})")]
    NoQuickOperationDefined(String, String),
}

/// Failure to resolve an untyped payload to exactly one typed variant.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload carries no `post_type` tag, or the tag is not a string.
    #[error("event payload carries no post_type tag")]
    MissingPostType,

    /// No event family is registered for the payload's post type.
    #[error("unknown event family \"{0}\"")]
    UnknownEventFamily(String),

    /// The family's discriminator field is absent from the payload.
    #[error("event family \"{family}\" requires discriminator field \"{field}\", which is missing")]
    MissingDiscriminator { family: String, field: String },

    /// No concrete shape is registered for the (family, discriminator)
    /// bucket.
    #[error("unknown event variant ({family}, {value})")]
    UnknownEventVariant { family: String, value: String },

    /// The payload does not validate against the selected shape. `path`
    /// names the decode location (bucket or response) the failure occurred
    /// at; the source error names the offending field.
    #[error("schema validation failed at {path}: {source}")]
    SchemaValidation {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The supplied operation's declared variant does not match the one
    /// bound to the event's bucket. Structural compatibility does not
    /// count: the match is by declared identity.
    #[error("mismatched quick operation: event expects {expected}, got {found}")]
    MismatchedQuickOperation {
        expected: QuickOpKind,
        found: QuickOpKind,
    },

    /// The action was registered with a different response shape than the
    /// caller requested.
    #[error("action \"{0}\" is registered with a different response shape")]
    ResponseShapeConflict(String),

    /// Registry lookup failed while resolving a payload.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
