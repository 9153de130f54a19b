pub mod autoscaling;
pub mod ecs;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Shared SDK config. Without an explicit region the default provider chain decides.
pub async fn load_aws_config(region: Option<String>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    loader.load().await
}
