pub mod errors;
pub mod status;

pub use errors::{CycleError, HarborError, PlatformError, ValidationError};
pub use status::{CycleOutcome, EngineStatus};

pub type Result<T> = std::result::Result<T, HarborError>;
