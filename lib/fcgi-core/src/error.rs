use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures raised while turning an endpoint string into a socket address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty endpoint")]
    EmptyEndpoint,

    #[error("path \"{path}\" is too long for a Domain socket")]
    PathTooLong { path: String },

    #[error("path \"{path}\" contains a NUL byte")]
    InvalidPath { path: String },

    #[error("no port specified in \"{endpoint}\"")]
    MissingPort { endpoint: String },

    #[error("invalid port specified: \"{port}\"")]
    InvalidPort { port: String },

    #[error("failed to resolve \"{host}\" to exactly one IP address")]
    HostResolutionFailed { host: String },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Server {fs_path}: {source}")]
    Address {
        fs_path: String,
        #[source]
        source: AddressError,
    },

    #[error("Invalid server configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}
