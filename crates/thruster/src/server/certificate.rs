//! Certificate materialisation: turns configured TLS material into files a
//! TLS listener can open.
//!
//! Paths pass through untouched; a missing file is reported later by the
//! listener, not here. Inline PEM is written verbatim to a fresh temporary
//! file which is removed again when the [`Materialized`] value is dropped.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::TempPath;
use tracing::debug;

use crate::{config::CertSource, error::ServerError};

/// A resolved certificate or key file.
#[derive(Debug)]
pub struct Materialized {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl Materialized {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when the file was written from inline PEM.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Certificate chain and private key, both resolved.
#[derive(Debug)]
pub struct TlsMaterial {
    pub certificate: Materialized,
    pub key: Materialized,
}

impl TlsMaterial {
    /// Resolve both halves. Both must succeed before TLS listening begins.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if either half is missing or inline PEM
    /// cannot be written out.
    pub fn resolve(
        certificate: Option<&CertSource>,
        key: Option<&CertSource>,
    ) -> Result<Self, ServerError> {
        let certificate = certificate
            .ok_or_else(|| ServerError::Config("tls is enabled but no certificate is configured".into()))?;
        let key = key
            .ok_or_else(|| ServerError::Config("tls is enabled but no public_key is configured".into()))?;

        Ok(Self {
            certificate: materialize(certificate, "cert")?,
            key: materialize(key, "key")?,
        })
    }
}

/// Resolve a plain config string using the length heuristic of
/// [`CertSource::detect`].
pub fn resolve(value: &str, prefix: &str) -> Result<Materialized, ServerError> {
    materialize(&CertSource::detect(value), prefix)
}

/// Resolve a [`CertSource`]. Temporary files are named `<prefix>XXXXXX`.
pub fn materialize(source: &CertSource, prefix: &str) -> Result<Materialized, ServerError> {
    match source {
        CertSource::Path(path) => Ok(Materialized {
            path: path.clone(),
            temp: None,
        }),
        CertSource::Inline(pem) => write_temp(pem, prefix),
    }
}

fn write_temp(content: &str, prefix: &str) -> Result<Materialized, ServerError> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile()
        .map_err(|e| ServerError::Config(format!("failed to create temporary {prefix} file: {e}")))?;

    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| ServerError::Config(format!("failed to write temporary {prefix} file: {e}")))?;

    let temp = file.into_temp_path();
    debug!(path = %temp.display(), prefix, "materialised inline PEM");
    Ok(Materialized {
        path: temp.to_path_buf(),
        temp: Some(temp),
    })
}
