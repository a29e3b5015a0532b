pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validation;

pub use interpolation::interpolate;
pub use loader::{
    ConfigLoadError,
    ConfigLoader,
};
pub use schema::{
    DevopsConfig,
    JenkinsConfig,
    LogConfig,
    SonarConfig,
};
pub use validation::ValidationResult;
