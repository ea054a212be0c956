//! Account configuration read from `*.config.json` files in the working directory.
//!
//! Each file holds a JSON array:
//! ```json
//! [{ "accountId": "12345", "profileId": "678", "currency": "EUR",
//!    "token": "…", "name": "Jane EUR", "privateKeyPath": "jane.pem" }]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.transferwise.com";
pub const CONFIG_GLOB: &str = "*.config.json";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub account_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub profile_id: String,
    pub currency: String,
    pub token: String,
    /// Display name used in logs
    pub name: String,
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

// Keep bearer tokens out of logs.
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("account_id", &self.account_id)
            .field("profile_id", &self.profile_id)
            .field("currency", &self.currency)
            .field("token", &"<redacted>")
            .field("name", &self.name)
            .field("private_key_path", &self.private_key_path)
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(u64),
    }
    Ok(match Id::deserialize(d)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// Parse one config file's contents. Relative key paths resolve against `base_dir`.
pub fn parse_configs(json: &str, base_dir: &Path) -> Result<Vec<RemoteConfig>> {
    let mut configs: Vec<RemoteConfig> = serde_json::from_str(json)?;
    for cfg in &mut configs {
        if let Some(p) = cfg.private_key_path.take() {
            cfg.private_key_path = Some(if p.is_relative() { base_dir.join(p) } else { p });
        }
    }
    Ok(configs)
}

/// Load every `*.config.json` under `dir`, concatenated in filename order.
pub async fn load_configs(dir: &Path) -> Result<Vec<RemoteConfig>> {
    let pattern = dir.join(CONFIG_GLOB);
    let pattern = pattern.to_string_lossy();

    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("bad config pattern {pattern}"))?
        .collect::<Result<_, _>>()?;
    paths.sort();

    let mut configs = Vec::new();
    for path in paths {
        let json = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let parsed = parse_configs(&json, dir)
            .with_context(|| format!("parse {}", path.display()))?;
        debug!(file = %path.display(), accounts = parsed.len(), "loaded config");
        configs.extend(parsed);
    }
    Ok(configs)
}
