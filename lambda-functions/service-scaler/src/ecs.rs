use anyhow::Context;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ecs::operation::update_service::UpdateServiceOutput;
use aws_sdk_ecs::primitives::DateTimeFormat;
use aws_sdk_ecs::types::{Deployment, Service};
use aws_sdk_ecs::Client as EcsClient;
use tracing::debug;

use crate::{DeploymentSnapshot, ScalingTarget, ServiceReport, ServiceSnapshot, ServiceUpdater};

pub struct EcsServiceUpdater {
    client: EcsClient,
}

impl EcsServiceUpdater {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: EcsClient::new(config),
        }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(&config)
    }
}

#[async_trait]
impl ServiceUpdater for EcsServiceUpdater {
    async fn update_desired_count(
        &self,
        target: &ScalingTarget,
        desired_count: i32,
    ) -> anyhow::Result<ServiceReport> {
        debug!("UpdateService {} desiredCount={}", target, desired_count);

        let output = self
            .client
            .update_service()
            .set_cluster(target.cluster.clone())
            .set_service(target.service.clone())
            .desired_count(desired_count)
            .send()
            .await
            .with_context(|| {
                format!(
                    "UpdateService failed for {} (desiredCount={})",
                    target, desired_count
                )
            })?;

        Ok(ServiceReport::from(&output))
    }
}

impl From<&UpdateServiceOutput> for ServiceReport {
    fn from(output: &UpdateServiceOutput) -> Self {
        Self {
            service: output.service().map(ServiceSnapshot::from),
        }
    }
}

impl From<&Service> for ServiceSnapshot {
    fn from(service: &Service) -> Self {
        Self {
            service_arn: service.service_arn().map(str::to_string),
            service_name: service.service_name().map(str::to_string),
            cluster_arn: service.cluster_arn().map(str::to_string),
            status: service.status().map(str::to_string),
            desired_count: service.desired_count(),
            running_count: service.running_count(),
            pending_count: service.pending_count(),
            task_definition: service.task_definition().map(str::to_string),
            launch_type: service.launch_type().map(|t| t.as_str().to_string()),
            created_at: service
                .created_at()
                .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok()),
            deployments: service
                .deployments()
                .iter()
                .map(DeploymentSnapshot::from)
                .collect(),
        }
    }
}

impl From<&Deployment> for DeploymentSnapshot {
    fn from(deployment: &Deployment) -> Self {
        Self {
            id: deployment.id().map(str::to_string),
            status: deployment.status().map(str::to_string),
            rollout_state: deployment
                .rollout_state()
                .map(|s| s.as_str().to_string()),
            desired_count: deployment.desired_count(),
            running_count: deployment.running_count(),
            pending_count: deployment.pending_count(),
        }
    }
}
