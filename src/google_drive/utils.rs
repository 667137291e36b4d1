use std::io;

use reqwest::Response;

use crate::error::{Error, Result};

pub trait IntoIOErr {
    fn into_io_err(self) -> io::Error;
}

impl IntoIOErr for reqwest::Error {
    fn into_io_err(self) -> io::Error {
        io::Error::new(io::ErrorKind::Other, self)
    }
}

/// Passes successful responses through and turns anything else into [`Error::Api`].
pub async fn ok(res: Response) -> Result<Response> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let message = res.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
