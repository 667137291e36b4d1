mod config;

pub use config::{Config, Format};

use std::{path::PathBuf, pin::Pin};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

pub type BoxedAsyncRead<'a> = Pin<Box<dyn AsyncRead + Send + 'a>>;

/// What a finished download produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    /// Random hex stem of the local file, without extension
    pub file_name: String,
    pub ext: String,
    pub file_path: PathBuf,
    /// MIME type reported by Drive for the remote file
    pub mime_type: String,
    pub export_type: Option<String>,
}
