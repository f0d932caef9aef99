use super::{DestinationProvider, FirehoseDestination, KinesisDestination, StreamDestination};
use crate::models::StreamKind;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// AWS-backed destinations, one client per stream kind and region.
///
/// Clients outlive a single invocation so warm starts reuse their
/// connection pools.
pub struct AwsDestinations {
    sdk_config: SdkConfig,
    cache: DashMap<(StreamKind, String), Arc<dyn StreamDestination>>,
}

impl AwsDestinations {
    pub async fn new() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_config(sdk_config)
    }

    pub fn from_config(sdk_config: SdkConfig) -> Self {
        Self {
            sdk_config,
            cache: DashMap::new(),
        }
    }

    fn build(&self, kind: StreamKind, region: &str) -> Arc<dyn StreamDestination> {
        // An empty region keeps whatever the environment configured.
        let region = (!region.is_empty()).then(|| Region::new(region.to_string()));

        match kind {
            StreamKind::Kinesis => {
                let mut config = aws_sdk_kinesis::config::Builder::from(&self.sdk_config);
                if let Some(region) = region {
                    config = config.region(region);
                }
                let client = aws_sdk_kinesis::Client::from_conf(config.build());
                Arc::new(KinesisDestination::new(client))
            }
            StreamKind::Firehose => {
                let mut config = aws_sdk_firehose::config::Builder::from(&self.sdk_config);
                if let Some(region) = region {
                    config = config.region(region);
                }
                let client = aws_sdk_firehose::Client::from_conf(config.build());
                Arc::new(FirehoseDestination::new(client))
            }
        }
    }
}

#[async_trait]
impl DestinationProvider for AwsDestinations {
    async fn destination(&self, kind: StreamKind, region: &str) -> Arc<dyn StreamDestination> {
        let key = (kind, region.to_string());

        if let Some(cached) = self.cache.get(&key) {
            debug!(kind = %kind, region = %region, "Using cached stream client");
            return cached.value().clone();
        }

        info!(kind = %kind, region = %region, "Creating stream client");
        let destination = self.build(kind, region);
        self.cache.insert(key, destination.clone());
        destination
    }
}
