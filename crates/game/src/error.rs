use std::path::PathBuf;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read encounter config {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse encounter config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid encounter config: {0}")]
    Invalid(String),
}
