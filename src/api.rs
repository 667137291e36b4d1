use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    google_drive::{self as gd, oauth, CodePrompt, Drive, DriveFile, OAuthClient, StdinPrompt},
    local,
    types::*,
};

/// Fetches single Drive files into a local directory.
///
/// Each [`Downloader::download`] call runs
/// authorize → metadata → size check → format lookup → name → transfer
/// and stops at the first failing step.
pub struct Downloader {
    config: Config,
    prompt: Box<dyn CodePrompt>,
    res_uri: String,
}

impl Downloader {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            prompt: Box::new(StdinPrompt),
            res_uri: gd::RES_URI.to_string(),
        })
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Self::new(Config::from_value(value)?)
    }

    /// Replaces the terminal prompt used when no token has been persisted yet.
    pub fn with_prompt(mut self, prompt: impl CodePrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Points the client at another `files` resource, e.g. a mock server.
    pub fn with_api_uri(mut self, uri: impl Into<String>) -> Self {
        self.res_uri = uri.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn download(&self, id: &str) -> Result<DownloadResult> {
        let client = OAuthClient::from_file(&self.config.credentials_path).await?;
        let token = oauth::authorize(
            &client,
            &self.config.scopes,
            &self.config.token_path,
            self.prompt.as_ref(),
        )
        .await?;
        let drive = Drive::new(&self.res_uri, &token);

        let meta = gd::get_meta(&drive, id).await?;
        check_size(&meta, self.config.max_file_size)?;
        let Format { ext, export_type } = self.config.format(&meta.mime_type)?;

        let (file_name, file_path) =
            local::unique_path(&self.config.file_dir, ext, local::random_id).await;
        debug!(path = %file_path.display(), "downloading");

        let body = match export_type {
            Some(t) => gd::export(&drive, &meta.id, t).await?,
            None => gd::read(&drive, &meta.id).await?,
        };
        let written = local::write(&file_path, body).await?;

        info!(
            path = %file_path.display(),
            bytes = written,
            "downloaded {}",
            meta.name
        );

        Ok(DownloadResult {
            file_name,
            ext: ext.clone(),
            file_path,
            mime_type: meta.mime_type,
            export_type: export_type.clone(),
        })
    }
}

/// Rejects files larger than `max`. Files that report no size (native Google
/// formats) always pass.
pub fn check_size(meta: &DriveFile, max: u64) -> Result<()> {
    match meta.size()? {
        Some(size) if size > max => Err(Error::SizeExceeded { max, size }),
        _ => Ok(()),
    }
}
