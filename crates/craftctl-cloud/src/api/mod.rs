pub mod aliyun;
pub mod mock;

use async_trait::async_trait;

use crate::error::CloudControlError;
use crate::instance::InstanceView;

/// The three remote operations the console needs from a provider.
///
/// Implementations are fire-and-forget: `start_instance` and `stop_instance`
/// return as soon as the provider accepts the request, and the eventual state
/// is observed through a later `describe_instance` call. Nothing is cached;
/// every `describe_instance` hits the provider.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    async fn describe_instance(
        &self,
        instance_id: &str,
    ) -> Result<InstanceView, CloudControlError>;

    async fn start_instance(&self, instance_id: &str) -> Result<(), CloudControlError>;

    async fn stop_instance(&self, instance_id: &str) -> Result<(), CloudControlError>;
}

// Re-export useful items
pub use aliyun::AliyunEcsClient;
pub use mock::{MockInstanceApi, RecordedCall};
