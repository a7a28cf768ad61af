//! Configuration loading and validation.
//!
//! A [`Config`] is either built literally (tests, embedding code) or read from
//! a YAML file with [`Config::from_file`]. Scalar fields can be overridden
//! from `THRUSTER_*` environment variables. The value is moved into a
//! [`crate::Server`] and never changes afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::ServerError;

/// Plain-string certificate settings at least this many characters long are
/// treated as inline PEM; shorter ones are file paths.
pub const INLINE_PEM_THRESHOLD: usize = 500;

/// A single HTTP Basic-Auth principal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Where a PEM certificate or key comes from.
///
/// In a config file the value is either a plain string (classified with
/// [`CertSource::detect`]) or an explicit `{path: ...}` / `{inline: ...}` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertSource {
    /// An existing file on disk. Opened by the TLS listener at start-up.
    Path(PathBuf),
    /// Literal PEM content, written to a temporary file at start-up.
    Inline(String),
}

impl CertSource {
    /// Classify a plain string by length: shorter than
    /// [`INLINE_PEM_THRESHOLD`] characters is a path, anything longer is PEM.
    ///
    /// This is a heuristic, not a format check. Use the tagged config form
    /// when a path is unusually long or a PEM block unusually short.
    pub fn detect(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.chars().count() < INLINE_PEM_THRESHOLD {
            CertSource::Path(PathBuf::from(value))
        } else {
            CertSource::Inline(value)
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            CertSource::Path(path) => path.as_os_str().is_empty(),
            CertSource::Inline(pem) => pem.trim().is_empty(),
        }
    }
}

impl From<&str> for CertSource {
    fn from(value: &str) -> Self {
        CertSource::detect(value)
    }
}

impl From<String> for CertSource {
    fn from(value: String) -> Self {
        CertSource::detect(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CertSetting {
    Tagged(TaggedCertSource),
    Plain(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedCertSource {
    Path(PathBuf),
    Inline(String),
}

impl<'de> Deserialize<'de> for CertSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CertSetting::deserialize(deserializer)? {
            CertSetting::Tagged(TaggedCertSource::Path(path)) => CertSource::Path(path),
            CertSetting::Tagged(TaggedCertSource::Inline(pem)) => CertSource::Inline(pem),
            CertSetting::Plain(value) => CertSource::detect(value),
        })
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Host or interface to bind. Empty binds every interface.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Terminate TLS instead of serving plaintext HTTP.
    #[serde(default)]
    pub tls: bool,

    /// PEM certificate chain. **Required** when `tls` is set.
    #[serde(default)]
    pub certificate: Option<CertSource>,

    /// PEM private key. **Required** when `tls` is set.
    #[serde(default)]
    pub public_key: Option<CertSource>,

    /// Basic-Auth principals. Empty disables authentication.
    #[serde(default)]
    pub http_auth: Vec<Credential>,
}

fn default_hostname() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            tls: false,
            certificate: None,
            public_key: None,
            http_auth: Vec::new(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a YAML file, then apply
    /// `THRUSTER_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the file cannot be read or parsed,
    /// or if validation fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let cfg = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(config::Environment::with_prefix("THRUSTER").try_parsing(true))
            .build()
            .map_err(|e| {
                ServerError::Config(format!("failed to read {}: {e}", path.display()))
            })?;

        let c: Config = cfg.try_deserialize().map_err(|e| {
            ServerError::Config(format!("failed to deserialise {}: {e}", path.display()))
        })?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.tls {
            ensure_present(self.certificate.as_ref(), "certificate")?;
            ensure_present(self.public_key.as_ref(), "public_key")?;
        }
        if self.http_auth.iter().any(|c| c.username.trim().is_empty()) {
            return Err(ServerError::Config(
                "http_auth entries must have a non-empty username".into(),
            ));
        }
        Ok(())
    }

    /// The `host:port` string the listener binds.
    pub fn address(&self) -> String {
        let host = self.hostname.trim();
        if host.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

fn ensure_present(value: Option<&CertSource>, name: &str) -> Result<(), ServerError> {
    match value {
        Some(source) if !source.is_blank() => Ok(()),
        _ => Err(ServerError::Config(format!(
            "{name} is required when tls is enabled"
        ))),
    }
}
