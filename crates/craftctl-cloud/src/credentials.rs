use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CloudControlError;

pub const DEFAULT_CREDENTIALS_PATH: &str = "./accesskey.json";

const DEFAULT_REGION_ID: &str = "cn-shenzhen";

fn default_region_id() -> String {
    DEFAULT_REGION_ID.to_string()
}

/// Static access key material plus the target instance, read once at startup
/// and immutable for the life of the process.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub access_secret: String,
    pub instance_id: String,
    #[serde(default = "default_region_id")]
    pub region_id: String,
}

impl Credentials {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CloudControlError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CloudControlError::config(format!(
                "No access key file found at {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|e| {
            CloudControlError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        // serde_json names the missing field in its error, which is exactly
        // what the operator needs to see.
        serde_json::from_str(&raw).map_err(|e| {
            CloudControlError::config(format!("Invalid access key file {}: {}", path.display(), e))
        })
    }
}
