use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::api::InstanceApi;
use crate::error::CloudControlError;
use crate::instance::{InstanceStatus, InstanceView};

/// A remote operation the mock saw, so tests can assert which calls were
/// actually issued (a refused `start` must not reach the provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedCall {
    Describe,
    Start,
    Stop,
}

/// In-memory stand-in for the provider API.
///
/// Start and stop do not mutate the stored status: like the real adapter
/// they are fire-and-forget, and tests move the instance between states
/// explicitly with [`MockInstanceApi::set_status`].
#[derive(Clone)]
pub struct MockInstanceApi {
    inner: Arc<RwLock<MockState>>,
}

struct MockState {
    instance_id: String,
    status: InstanceStatus,
    public_ips: Vec<String>,
    start_fault: Option<String>,
    stop_fault: Option<String>,
    calls: Vec<RecordedCall>,
}

impl MockInstanceApi {
    pub fn new(instance_id: &str, status: InstanceStatus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockState {
                instance_id: instance_id.to_string(),
                status,
                public_ips: Vec::new(),
                start_fault: None,
                stop_fault: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_public_ip(self, ip: &str) -> Self {
        self.inner.write().unwrap().public_ips.push(ip.to_string());
        self
    }

    pub fn set_status(&self, status: InstanceStatus) {
        self.inner.write().unwrap().status = status;
    }

    /// Makes the next start requests fail with the given provider code.
    pub fn fail_start_with(&self, code: &str) {
        self.inner.write().unwrap().start_fault = Some(code.to_string());
    }

    /// Makes the next stop requests fail with the given provider code.
    pub fn fail_stop_with(&self, code: &str) {
        self.inner.write().unwrap().stop_fault = Some(code.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.read().unwrap().calls.clone()
    }

    fn record(&self, call: RecordedCall) {
        self.inner.write().unwrap().calls.push(call);
    }

    fn check_id(&self, instance_id: &str) -> Result<(), CloudControlError> {
        let state = self.inner.read().unwrap();
        if state.instance_id == instance_id {
            Ok(())
        } else {
            Err(CloudControlError::NotFound {
                instance_id: instance_id.to_string(),
                response: r#"{"TotalCount":0,"Instances":{"Instance":[]}}"#.to_string(),
            })
        }
    }
}

#[async_trait]
impl InstanceApi for MockInstanceApi {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceView, CloudControlError> {
        self.record(RecordedCall::Describe);
        self.check_id(instance_id)?;

        let state = self.inner.read().unwrap();
        let public_ip = if state.status == InstanceStatus::Running {
            state.public_ips.first().cloned()
        } else {
            None
        };

        Ok(InstanceView {
            status: state.status,
            public_ip,
        })
    }

    async fn start_instance(&self, instance_id: &str) -> Result<(), CloudControlError> {
        self.record(RecordedCall::Start);
        self.check_id(instance_id)?;

        if let Some(code) = self.inner.read().unwrap().start_fault.clone() {
            return Err(CloudControlError::Start { code });
        }
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<(), CloudControlError> {
        self.record(RecordedCall::Stop);
        self.check_id(instance_id)?;

        if let Some(code) = self.inner.read().unwrap().stop_fault.clone() {
            return Err(CloudControlError::Stop { code });
        }
        Ok(())
    }
}
