//! Streaming a response body to disk.
//!
//! The body is copied through a write buffer of [`CHUNK_SIZE`] bytes, so the
//! memory held by a transfer does not depend on the size of the artifact.
//! Whatever was received before a failure is flushed to disk before the error
//! is returned: the next attempt resumes from it.

use super::range::WriteMode;
use crate::error::{Error, Result};

use futures::{Stream, StreamExt};
use indicatif::ProgressBar;
use std::io;
use std::path::Path;
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, warn};

/// Size of the write buffer between the network and the destination file.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Open the destination according to `mode`, creating missing parent directories.
pub async fn open_destination(path: &Path, mode: WriteMode) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    match mode {
        WriteMode::Truncate => options.truncate(true),
        WriteMode::Append => options.append(true),
    };
    options.open(path).await
}

/// Remove the destination, if there is one.
pub async fn discard(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Copy `body` into the file at `path` and return the number of bytes written.
///
/// The stream ending is the normal way out. An error from the stream or from
/// the file ends the copy early; the bytes written so far stay on disk.
pub async fn write_stream<S, B, E>(
    body: S,
    path: &Path,
    mode: WriteMode,
    progress: &ProgressBar,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    Error: From<E>,
{
    let file = open_destination(path, mode).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut written: u64 = 0;

    debug!("Writing {:?} in {:?} mode", path, mode);
    futures::pin_mut!(body);
    while let Some(item) = body.next().await {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => {
                keep_partial(&mut writer, path, written).await;
                return Err(e.into());
            }
        };
        let chunk = chunk.as_ref();

        if let Err(e) = writer.write_all(chunk).await {
            keep_partial(&mut writer, path, written).await;
            return Err(e.into());
        }
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    writer.flush().await?;
    debug!("Wrote {} bytes to {:?}", written, path);
    Ok(written)
}

async fn keep_partial(writer: &mut BufWriter<File>, path: &Path, written: u64) {
    if let Err(e) = writer.flush().await {
        warn!("Could not flush partial content of {:?}: {}", path, e);
    } else {
        debug!("Kept {} bytes of partial content in {:?}", written, path);
    }
}
