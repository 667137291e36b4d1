use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// How a remote MIME type lands on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub ext: String,
    /// Target MIME type for a server-side export, `None` for a raw download
    #[serde(default)]
    pub export_type: Option<String>,
}

impl Format {
    pub fn new(ext: &str, export_type: Option<&str>) -> Self {
        Self {
            ext: ext.to_string(),
            export_type: export_type.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scopes: Vec<String>,
    pub token_path: PathBuf,
    pub credentials_path: PathBuf,
    pub file_dir: PathBuf,
    pub mime_types: HashMap<String, Format>,
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Array,
    String,
    Object,
    Number,
}

impl Config {
    /// Builds a config from untyped JSON with camelCase keys.
    ///
    /// Keys are checked in declaration order and the first missing, empty
    /// or mistyped one is reported.
    pub fn from_value(value: &Value) -> Result<Self> {
        let config = Self {
            scopes: field(value, "scopes", Kind::Array)?,
            token_path: field(value, "tokenPath", Kind::String)?,
            credentials_path: field(value, "credentialsPath", Kind::String)?,
            file_dir: field(value, "fileDir", Kind::String)?,
            mime_types: field(value, "mimeTypes", Kind::Object)?,
            max_file_size: max_file_size(value)?,
        };

        Ok(config)
    }

    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;
        let value = serde_json::from_slice::<Value>(&content)
            .with_context(|| format!("Config file '{}' is not valid JSON", path.display()))?;

        Ok(Self::from_value(&value)?)
    }

    /// Same checks as [`Config::from_value`] for a config built in Rust.
    pub fn validate(&self) -> Result<()> {
        let empty = |p: &Path| p.as_os_str().is_empty();

        if empty(&self.token_path) {
            return Err(Error::InvalidConfig { key: "tokenPath" });
        }
        if empty(&self.credentials_path) {
            return Err(Error::InvalidConfig {
                key: "credentialsPath",
            });
        }
        if empty(&self.file_dir) {
            return Err(Error::InvalidConfig { key: "fileDir" });
        }
        if self.max_file_size == 0 {
            return Err(Error::InvalidConfig { key: "maxFileSize" });
        }

        Ok(())
    }

    /// Resolves the local extension and optional export type for `mime_type`.
    pub fn format(&self, mime_type: &str) -> Result<&Format> {
        self.mime_types
            .get(mime_type)
            .ok_or_else(|| Error::UnsupportedFormat {
                mime_type: mime_type.to_string(),
            })
    }
}

fn field<T: DeserializeOwned>(value: &Value, key: &'static str, kind: Kind) -> Result<T> {
    let v = value.get(key).ok_or(Error::InvalidConfig { key })?;

    let valid = match (kind, v) {
        (Kind::Array, Value::Array(_)) => true,
        (Kind::Object, Value::Object(_)) => true,
        (Kind::String, Value::String(s)) => !s.is_empty(),
        (Kind::Number, Value::Number(_)) => true,
        _ => false,
    };

    if !valid {
        return Err(Error::InvalidConfig { key });
    }

    T::deserialize(v).map_err(|_| Error::InvalidConfig { key })
}

fn max_file_size(value: &Value) -> Result<u64> {
    const KEY: &str = "maxFileSize";

    let n = field::<serde_json::Number>(value, KEY, Kind::Number)?;
    let size = n
        .as_u64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64))
        .filter(|s| *s > 0);

    size.ok_or(Error::InvalidConfig { key: KEY })
}
