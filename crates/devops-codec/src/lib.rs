//! Jenkins job-config codec for Devops
//!
//! Translates the compact JSON description of a pipeline job into the XML
//! document Jenkins stores for it, and back:
//! - `pipeline` - single pipelines (`flow-definition`)
//! - `multibranch` - multi-branch pipelines and their SCM summary
//! - `source` - branch source kinds and their XML shapes
//! - `schedule` - folder-scan interval to cron-like schedule
//! - `version` - XML declaration version shim
//! - `xml` - element tree used by all of the above
//!
//! Every operation is a pure function of its input.

pub mod error;
pub mod multibranch;
pub mod pipeline;
pub mod schedule;
pub mod source;
pub mod types;
pub mod version;
pub mod xml;

pub use error::{
    CodecError,
    CodecResult,
};
pub use multibranch::{
    decode_multi_branch_pipeline,
    decode_scm_summary,
    encode_multi_branch_pipeline,
};
pub use pipeline::{
    decode_pipeline,
    encode_pipeline,
};
pub use schedule::to_schedule;
pub use source::{
    ForkDiscovery,
    ForkTrust,
    GitSource,
    GithubSource,
    SingleSvnSource,
    Source,
    SourceKind,
    SvnSource,
};
pub use types::{
    DiscarderProperty,
    MultiBranchPipeline,
    Parameter,
    ParameterKind,
    ParameterType,
    Pipeline,
    RemoteTrigger,
    ScmInfo,
    TimerTrigger,
};
pub use version::rewrite_declared_version;
