use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha1::Sha1;
use tracing::debug;

use crate::api::InstanceApi;
use crate::credentials::Credentials;
use crate::error::CloudControlError;
use crate::instance::{InstanceStatus, InstanceView};

const ENDPOINT: &str = "https://ecs.aliyuncs.com/";
const API_VERSION: &str = "2014-05-26";

type HmacSha1 = Hmac<Sha1>;

/// Client for the ECS RPC API.
///
/// Every request is a GET against the region endpoint with a canonicalized,
/// HMAC-SHA1-signed query string. There are no retries and no polling; the
/// transport timeouts are the only bound on a call.
pub struct AliyunEcsClient {
    client: Client,
    access_key_id: String,
    access_secret: String,
    region_id: String,
}

impl AliyunEcsClient {
    pub fn new(credentials: &Credentials) -> Result<Self, CloudControlError> {
        // The default reqwest client has no overall timeout; a stalled
        // provider call would hang the console forever.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            access_key_id: credentials.access_key_id.trim().to_string(),
            access_secret: credentials.access_secret.trim().to_string(),
            region_id: credentials.region_id.trim().to_string(),
        })
    }

    fn signed_params(&self, action: &str, action_params: &[(&str, String)]) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("Action".to_string(), action.to_string()),
            ("Version".to_string(), API_VERSION.to_string()),
            ("Format".to_string(), "JSON".to_string()),
            ("AccessKeyId".to_string(), self.access_key_id.clone()),
            ("SignatureMethod".to_string(), "HMAC-SHA1".to_string()),
            ("SignatureVersion".to_string(), "1.0".to_string()),
            (
                "SignatureNonce".to_string(),
                uuid::Uuid::new_v4().to_string(),
            ),
            (
                "Timestamp".to_string(),
                Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            ("RegionId".to_string(), self.region_id.clone()),
        ];
        for (key, value) in action_params {
            params.push(((*key).to_string(), value.clone()));
        }

        let signature = sign(&self.access_secret, &string_to_sign(&params));
        params.push(("Signature".to_string(), signature));
        params
    }

    async fn request(
        &self,
        action: &str,
        action_params: &[(&str, String)],
    ) -> Result<String, CloudControlError> {
        let params = self.signed_params(action, action_params);

        debug!(action, "issuing ECS request");
        let response = self.client.get(ENDPOINT).query(&params).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(action, http_status = status.as_u16(), "ECS request failed");
            return Err(fault(action, status.as_u16(), &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl InstanceApi for AliyunEcsClient {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceView, CloudControlError> {
        let body = self
            .request(
                "DescribeInstances",
                &[("InstanceIds", format!("[\"{}\"]", instance_id))],
            )
            .await?;
        view_from_describe(instance_id, &body)
    }

    async fn start_instance(&self, instance_id: &str) -> Result<(), CloudControlError> {
        self.request("StartInstance", &[("InstanceId", instance_id.to_string())])
            .await?;
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<(), CloudControlError> {
        // StopCharging halts billing while the instance stays stopped.
        self.request(
            "StopInstance",
            &[
                ("InstanceId", instance_id.to_string()),
                ("StoppedMode", "StopCharging".to_string()),
            ],
        )
        .await?;
        Ok(())
    }
}

/// RFC3986 percent-encoding as the signature algorithm expects it: only
/// unreserved characters pass through, space becomes `%20`, `*` becomes
/// `%2A` and `~` stays as-is.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// Builds `GET&%2F&<encoded sorted query>` per the provider's RPC signature
/// scheme. The `Signature` parameter itself must not be part of the input.
fn string_to_sign(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("GET&{}&{}", percent_encode("/"), percent_encode(&canonical))
}

fn sign(access_secret: &str, string_to_sign: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = HmacSha1::new_from_slice(format!("{}&", access_secret).as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
    total_count: u64,
    #[serde(default)]
    instances: InstanceList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceList {
    #[serde(default)]
    instance: Vec<InstanceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceRecord {
    status: String,
    #[serde(default)]
    public_ip_address: IpAddressList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IpAddressList {
    #[serde(default)]
    ip_address: Vec<String>,
}

fn view_from_describe(instance_id: &str, body: &str) -> Result<InstanceView, CloudControlError> {
    let parsed: DescribeInstancesResponse = serde_json::from_str(body)
        .map_err(|e| CloudControlError::api(format!("Failed to parse describe response: {}", e)))?;

    if parsed.total_count == 0 {
        return Err(CloudControlError::NotFound {
            instance_id: instance_id.to_string(),
            response: body.to_string(),
        });
    }

    let record = parsed.instances.instance.first().ok_or_else(|| {
        CloudControlError::api("Describe response contained no instance record")
    })?;

    let status: InstanceStatus = record.status.parse()?;

    // The provider may report addresses in transitional states too; only a
    // Running instance has a usable public IP.
    let public_ip = if status == InstanceStatus::Running {
        record.public_ip_address.ip_address.first().cloned()
    } else {
        None
    };

    Ok(InstanceView { status, public_ip })
}

/// Provider faults come back as JSON with a `Code` field. Start/stop
/// rejections get their dedicated variants so the console can surface the
/// code; anything else stays a generic API error.
fn fault(action: &str, http_status: u16, body: &str) -> CloudControlError {
    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct FaultBody {
        code: String,
    }

    let code = match serde_json::from_str::<FaultBody>(body) {
        Ok(fault) => fault.code,
        Err(_) => {
            return CloudControlError::api(format!(
                "{} failed with HTTP {}: {}",
                action, http_status, body
            ));
        }
    };

    match action {
        "StartInstance" => CloudControlError::Start { code },
        "StopInstance" => CloudControlError::Stop { code },
        _ => CloudControlError::api(format!("{} failed (code {})", action, code)),
    }
}
