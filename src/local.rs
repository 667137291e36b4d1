use std::path::{Path, PathBuf};

use rand::RngCore;
use tokio::{
    fs,
    io::{self, AsyncRead, AsyncWriteExt},
};
use tracing::debug;

use crate::error::{Error, Result};

// 20 bytes -> 40 hex chars
const ID_BYTES: usize = 20;

pub fn random_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Picks `dir/<id>.<ext>` for the first id from `next_id` that does not exist yet.
///
/// There is no retry ceiling: a source that only ever yields taken names
/// never returns. An error while probing counts as "does not exist". The
/// check and the later create are not atomic.
pub async fn unique_path(
    dir: &Path,
    ext: &str,
    mut next_id: impl FnMut() -> String,
) -> (String, PathBuf) {
    loop {
        let file_name = next_id();
        let file_path = dir.join(format!("{file_name}.{ext}"));

        match fs::try_exists(&file_path).await {
            Ok(true) => debug!(path = %file_path.display(), "file name collision, regenerating"),
            _ => return (file_name, file_path),
        }
    }
}

/// Copies `src` into a fresh file at `path`, returning the number of bytes written.
///
/// A failure part way leaves whatever was written so far on disk.
pub async fn write(path: &Path, mut src: impl AsyncRead + Unpin) -> Result<u64> {
    let transfer = |source: io::Error| Error::Transfer {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(transfer)?;

    let copied = io::copy(&mut src, &mut file).await;
    // settle in-flight writes even when the source failed
    let flushed = file.flush().await;

    let written = copied.map_err(transfer)?;
    flushed.map_err(transfer)?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use tokio::io::ReadBuf;

    use super::*;

    #[test]
    fn random_id_is_40_hex_chars() {
        let id = random_id();

        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, random_id());
    }

    #[tokio::test]
    async fn unique_path_skips_existing_names() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let taken: Vec<String> = (0..5).map(|i| format!("taken{i}")).collect();
        for name in &taken {
            fs::write(dir.path().join(format!("{name}.txt")), b"x").await?;
        }

        let mut ids = taken.into_iter().chain(["free".to_string()]);
        let (name, path) = unique_path(dir.path(), "txt", || ids.next().unwrap()).await;

        assert_eq!(name, "free");
        assert_eq!(path, dir.path().join("free.txt"));
        assert!(!fs::try_exists(&path).await?);

        Ok(())
    }

    #[tokio::test]
    async fn same_stem_with_other_extension_is_not_a_collision() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.pdf"), b"x").await?;

        let (name, _) = unique_path(dir.path(), "txt", || "a".to_string()).await;
        assert_eq!(name, "a");

        Ok(())
    }

    #[tokio::test]
    async fn write_copies_all_bytes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.bin");
        let data: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();

        let n = write(&path, &data[..]).await?;

        assert_eq!(n, data.len() as u64);
        assert_eq!(fs::read(&path).await?, data);

        Ok(())
    }

    /// Yields `head` once, then fails.
    struct Broken {
        head: Option<Vec<u8>>,
    }

    impl AsyncRead for Broken {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            match this.head.take() {
                Some(h) => {
                    buf.put_slice(&h);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn failed_transfer_leaves_partial_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("partial.bin");

        let r = write(&path, Broken { head: Some(b"abc".to_vec()) }).await;

        assert!(matches!(r, Err(Error::Transfer { .. })));
        assert_eq!(fs::read(&path).await?, b"abc");

        Ok(())
    }
}
