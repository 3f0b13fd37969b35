use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read portfolio manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse portfolio manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid portfolio manifest: {0}")]
    Validation(String),
}
