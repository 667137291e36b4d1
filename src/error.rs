use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a single download.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration key is missing or has the wrong kind
    #[error("The {key} value is not valid")]
    InvalidConfig { key: &'static str },

    #[error("Could not load client credentials from '{}': {reason}", .path.display())]
    Credentials { path: PathBuf, reason: String },

    #[error("Could not load token from '{}': {reason}", .path.display())]
    Token { path: PathBuf, reason: String },

    /// The injected prompt failed to produce an authorization code
    #[error("Could not read the authorization code: {0}")]
    Prompt(#[source] io::Error),

    #[error("Error retrieving access token (status {status}): {message}")]
    TokenExchange { status: u16, message: String },

    #[error("GoogleAPIError {status} {message}")]
    Api { status: u16, message: String },

    #[error("Invalid metadata for file {id}: {reason}")]
    Metadata { id: String, reason: String },

    #[error(
        "A size of the file must be smaller than {max} bytes. Current size is: {size} bytes"
    )]
    SizeExceeded { max: u64, size: u64 },

    /// The message is fixed; the offending type is kept for callers
    #[error("This type of files can't be downloaded")]
    UnsupportedFormat { mime_type: String },

    /// The byte transfer failed part way; the file at `path` is left truncated
    #[error("Error while writing to file '{}'", .path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
