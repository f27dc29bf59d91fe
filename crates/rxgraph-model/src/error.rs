use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
