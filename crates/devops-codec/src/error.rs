use thiserror::Error;

/// Codec error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed XML document: {0}")]
    MalformedDocument(String),

    #[error("Can not find pipeline definition")]
    MissingPipelineDefinition,

    #[error("Can not find multi-branch pipeline definition")]
    MissingMultiBranchDefinition,

    #[error("Multi-branch pipeline has no branch source")]
    MissingBranchSource,

    #[error("Unsupported source type: {0}")]
    UnsupportedSourceType(String),

    #[error("Invalid {kind} source definition: {reason}")]
    InvalidSourceDefinition { kind: String, reason: String },

    #[error("Unrecognized source class: {0}")]
    UnrecognizedSourceClass(String),

    #[error("Unsupported fork trust choice: {0}")]
    InvalidTrustValue(String),

    #[error("Invalid parameter type: {0:?}")]
    InvalidParameterType(String),

    #[error("Invalid strategy id: {0}")]
    InvalidStrategyId(String),

    #[error("Invalid timer interval: {0}")]
    IntervalParseError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

