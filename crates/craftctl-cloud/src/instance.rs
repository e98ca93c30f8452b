use std::fmt;
use std::str::FromStr;

use crate::error::CloudControlError;

/// Power states the provider reports for an instance.
///
/// `Starting` and `Stopping` are transitional: the instance is reachable for
/// describe calls but has no usable public IP yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl FromStr for InstanceStatus {
    type Err = CloudControlError;

    // Provider status strings are canonical, so no case folding here.
    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status {
            "Starting" => Ok(InstanceStatus::Starting),
            "Running" => Ok(InstanceStatus::Running),
            "Stopping" => Ok(InstanceStatus::Stopping),
            "Stopped" => Ok(InstanceStatus::Stopped),
            other => Err(CloudControlError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceStatus::Starting => "Starting",
            InstanceStatus::Running => "Running",
            InstanceStatus::Stopping => "Stopping",
            InstanceStatus::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Snapshot of the instance as reported by a single describe call.
///
/// `public_ip` is populated only while the instance is `Running` and the
/// provider reported at least one public address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceView {
    pub status: InstanceStatus,
    pub public_ip: Option<String>,
}

impl InstanceView {
    pub fn is_running(&self) -> bool {
        self.status == InstanceStatus::Running
    }

    pub fn is_stopped(&self) -> bool {
        self.status == InstanceStatus::Stopped
    }
}
