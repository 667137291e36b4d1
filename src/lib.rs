//! Download a single Google Drive file to a uniquely named local path.
//!
//! ```no_run
//! # async fn run() -> gdrive_fetch::Result<()> {
//! let downloader = gdrive_fetch::Downloader::from_value(&serde_json::json!({
//!     "scopes": ["https://www.googleapis.com/auth/drive.readonly"],
//!     "tokenPath": "token.json",
//!     "credentialsPath": "credentials.json",
//!     "fileDir": "files/",
//!     "mimeTypes": {
//!         "application/pdf": { "ext": "pdf" },
//!         "application/vnd.google-apps.document": { "ext": "pdf", "exportType": "application/pdf" }
//!     },
//!     "maxFileSize": 10485760
//! }))?;
//!
//! let result = downloader.download("1a2b3c").await?;
//! println!("{}", result.file_path.display());
//! # Ok(())
//! # }
//! ```

mod api;
mod error;
mod local;

pub mod google_drive;
pub mod types;

pub use api::*;
pub use error::{Error, Result};
pub use google_drive::{CodePrompt, StdinPrompt};
pub use types::*;
