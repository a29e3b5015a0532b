//! SonarQube analysis client for Devops
//!
//! Resolves the compute-engine task recorded on a Jenkins build to its
//! component and loads that component's measures and open issues.

mod client;
mod error;
pub mod types;

pub use client::SonarClient;
pub use error::{
    SonarError,
    SonarResult,
};
pub use types::{
    CeTask,
    SonarStatus,
};
