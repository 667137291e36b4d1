use fievar::Fields;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Metadata Drive returns for a single file.
#[derive(Debug, Clone, Deserialize, Fields)]
pub struct DriveFile {
    pub id: String,
    pub kind: Option<String>,
    /// Decimal byte count, absent for Google Docs, Sheets and other native formats
    pub size: Option<String>,
    pub name: String,
    #[serde(rename = "mimeType")]
    #[fievar(name = "mimeType")]
    pub mime_type: String,
}

impl DriveFile {
    pub fn size(&self) -> Result<Option<u64>> {
        self.size
            .as_deref()
            .map(|s| {
                s.parse::<u64>().map_err(|e| Error::Metadata {
                    id: self.id.clone(),
                    reason: format!("invalid size `{s}`: {e}"),
                })
            })
            .transpose()
    }
}
