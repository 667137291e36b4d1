use fievar::Fields;
use futures::TryStreamExt;
use reqwest::{header::AUTHORIZATION, RequestBuilder};
use tokio_util::compat::FuturesAsyncReadCompatExt;
use tracing::{debug, instrument};

use super::{
    types::{DriveFile, Token},
    utils::{ok, IntoIOErr},
    HTTP,
};
use crate::{error::Result, types::BoxedAsyncRead};

pub const RES_URI: &str = "https://www.googleapis.com/drive/v3/files";

lazy_static::lazy_static! {
    static ref GET_FIELDS: String = DriveFile::fields().join(",");
}

/// An authorized handle on the `files` resource.
#[derive(Debug, Clone)]
pub struct Drive {
    res_uri: String,
    auth_header: String,
}

impl Drive {
    pub fn new(res_uri: &str, token: &Token) -> Self {
        Self {
            res_uri: res_uri.trim_end_matches('/').to_string(),
            auth_header: token.auth_header(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        HTTP.get(format!("{}/{}", self.res_uri, path))
            .header(AUTHORIZATION, &self.auth_header)
    }
}

#[instrument(skip(drive))]
pub async fn get_meta(drive: &Drive, id: &str) -> Result<DriveFile> {
    let res = drive
        .get(id)
        .query(&[("fields", GET_FIELDS.as_str())])
        .send()
        .await?;

    let f = ok(res).await?.json::<DriveFile>().await?;
    debug!(mime_type = %f.mime_type, size = ?f.size, "got metadata");

    Ok(f)
}

/// Streams the raw content of `id`.
#[instrument(skip(drive))]
pub async fn read(drive: &Drive, id: &str) -> Result<BoxedAsyncRead<'static>> {
    let req = drive.get(id).query(&[("alt", "media")]);
    stream(req).await
}

/// Streams `id` converted server-side to `mime_type`.
#[instrument(skip(drive))]
pub async fn export(drive: &Drive, id: &str, mime_type: &str) -> Result<BoxedAsyncRead<'static>> {
    let req = drive
        .get(&format!("{id}/export"))
        .query(&[("mimeType", mime_type)]);
    stream(req).await
}

async fn stream(req: RequestBuilder) -> Result<BoxedAsyncRead<'static>> {
    let body = ok(req.send().await?)
        .await?
        .bytes_stream()
        .map_err(|e| e.into_io_err());

    Ok(Box::pin(Box::pin(body).into_async_read().compat()))
}
