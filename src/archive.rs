//! Unpacking of fetched artifacts
//!
//! The archive type is sniffed from the leading bytes rather than the file
//! name. Gzip layers are peeled one at a time; a tar or zip archive found
//! underneath is extracted next to the downloaded file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::debug;

const UNKNOWN_MIME_TYPE: &str = "unknown";

#[derive(Debug, Error)]
pub enum UnpackFailure {
    #[error("unsupported MIME type {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Error)]
#[error("failed to extract '{file_name}' with the 'params.unpack' option enabled: {failure}")]
pub struct ArchiveError {
    pub file_name: String,
    pub failure: UnpackFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Gzip,
    Tar,
    Zip,
    Other(&'static str),
}

fn sniff(path: &Path) -> io::Result<ArchiveKind> {
    let kind = match infer::get_from_path(path)?.map(|t| t.mime_type()) {
        Some("application/gzip") => ArchiveKind::Gzip,
        Some("application/x-tar") => ArchiveKind::Tar,
        Some("application/zip") => ArchiveKind::Zip,
        Some(other) => ArchiveKind::Other(other),
        None => ArchiveKind::Other(UNKNOWN_MIME_TYPE),
    };

    Ok(kind)
}

/// Decompresses one gzip layer next to `source`, returning the new file.
///
/// The output takes the name stored in the gzip header, or `<source>.uncompressed`.
fn gunzip(source: &Path) -> io::Result<PathBuf> {
    let mut fallback = source.as_os_str().to_os_string();
    fallback.push(".uncompressed");
    let fallback = PathBuf::from(fallback);

    let mut decoder = GzDecoder::new(File::open(source)?);
    io::copy(&mut decoder, &mut File::create(&fallback)?)?;

    let stored_name = decoder
        .header()
        .and_then(|header| header.filename())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .and_then(|name| Path::new(&name).file_name().map(|n| n.to_os_string()));

    match (stored_name, source.parent()) {
        (Some(name), Some(dir)) => {
            let destination = dir.join(name);
            std::fs::rename(&fallback, &destination)?;
            Ok(destination)
        }
        _ => Ok(fallback),
    }
}

fn untar(source: &Path, destination: &Path) -> io::Result<()> {
    tar::Archive::new(File::open(source)?).unpack(destination)
}

fn unzip(source: &Path, destination: &Path) -> Result<(), UnpackFailure> {
    zip::ZipArchive::new(File::open(source)?)?.extract(destination)?;
    Ok(())
}

fn unpack_kind(path: &Path) -> Result<(), UnpackFailure> {
    let mut current = path.to_path_buf();
    let mut kind = sniff(&current)?;

    if let ArchiveKind::Other(mime_type) = kind {
        return Err(UnpackFailure::Unsupported(mime_type));
    }

    while kind == ArchiveKind::Gzip {
        current = gunzip(&current)?;
        debug!("Decompressed gzip layer into {}", current.display());
        kind = sniff(&current)?;
    }

    let destination = current
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    match kind {
        ArchiveKind::Tar => untar(&current, destination)?,
        ArchiveKind::Zip => unzip(&current, destination)?,
        // a plain gzipped file needs nothing beyond decompression
        _ => return Ok(()),
    }

    debug!("Extracted {} into {}", current.display(), destination.display());
    Ok(())
}

/// Unpacks a downloaded archive in place
pub fn unpack(path: &Path) -> Result<(), ArchiveError> {
    unpack_kind(path).map_err(|failure| ArchiveError {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        failure,
    })
}
