pub mod commit;
pub mod config;
pub mod error;
pub mod mask;

pub use commit::CommitRecord;
pub use config::{Config, ConfigFile, DEFAULT_POLLING_PERIOD};
pub use error::{ConfigError, UpdateError};
pub use mask::{mask_secrets, mask_secrets_with};
