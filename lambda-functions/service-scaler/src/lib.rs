use std::fmt;

use async_trait::async_trait;
use bon::Builder;
use lambda_runtime::Error;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

mod ecs;

pub use ecs::EcsServiceUpdater;

pub const CLUSTER_ENV_VAR: &str = "TARGET_CLUSTER_NAME";
pub const SERVICE_ENV_VAR: &str = "TARGET_SERVICE_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAction {
    Create,
    Destroy,
}

impl ScaleAction {
    pub fn desired_count(self) -> i32 {
        match self {
            Self::Create => 1,
            Self::Destroy => 0,
        }
    }
}

impl fmt::Display for ScaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

/// The ECS cluster and service a handler scales.
///
/// Values are passed through to ECS as-is. A missing name stays `None` and it
/// is up to the remote call to reject it.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalingTarget {
    #[builder(into)]
    pub cluster: Option<String>,
    #[builder(into)]
    pub service: Option<String>,
}

impl ScalingTarget {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            cluster: lookup(CLUSTER_ENV_VAR),
            service: lookup(SERVICE_ENV_VAR),
        }
    }

    /// Environment variables that were not set when the target was read.
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.cluster.is_none() {
            missing.push(CLUSTER_ENV_VAR);
        }
        if self.service.is_none() {
            missing.push(SERVICE_ENV_VAR);
        }
        missing
    }
}

impl fmt::Display for ScalingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.cluster.as_deref().unwrap_or("<unset>"),
            self.service.as_deref().unwrap_or("<unset>")
        )
    }
}

/// Serializable copy of the `UpdateService` response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceReport {
    pub service: Option<ServiceSnapshot>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    pub service_arn: Option<String>,
    pub service_name: Option<String>,
    pub cluster_arn: Option<String>,
    pub status: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
    pub task_definition: Option<String>,
    pub launch_type: Option<String>,
    pub created_at: Option<String>,
    pub deployments: Vec<DeploymentSnapshot>,
}

impl ServiceSnapshot {
    /// The deployment ECS is currently converging towards.
    pub fn primary_deployment(&self) -> Option<&DeploymentSnapshot> {
        self.deployments
            .iter()
            .find(|d| d.status.as_deref() == Some("PRIMARY"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSnapshot {
    pub id: Option<String>,
    pub status: Option<String>,
    pub rollout_state: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok<T: Serialize>(payload: &T) -> Result<Self, Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(payload)?,
        })
    }
}

#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ServiceUpdater: Send + Sync {
    /// Sets the service's desired task count and returns the acknowledged service.
    async fn update_desired_count(
        &self,
        target: &ScalingTarget,
        desired_count: i32,
    ) -> anyhow::Result<ServiceReport>;
}

pub struct ScalerService<U> {
    updater: U,
    target: ScalingTarget,
}

impl ScalerService<EcsServiceUpdater> {
    pub async fn from_env() -> Self {
        let updater = EcsServiceUpdater::from_env().await;
        Self::new(updater, ScalingTarget::from_env())
    }
}

impl<U: ServiceUpdater> ScalerService<U> {
    pub fn new(updater: U, target: ScalingTarget) -> Self {
        Self { updater, target }
    }

    pub fn target(&self) -> &ScalingTarget {
        &self.target
    }

    pub fn updater(&self) -> &U {
        &self.updater
    }

    /// Issues a single update for `action` and wraps the result in a 200 response.
    ///
    /// Does not wait for the running count to converge and does not retry.
    pub async fn scale(&self, action: ScaleAction) -> Result<Response, Error> {
        let desired_count = action.desired_count();

        // Without a cluster ECS falls back to its `default` cluster
        let missing = self.target.missing_vars();
        if !missing.is_empty() {
            warn!("Scaling target incomplete, unset: {}", missing.join(", "));
        }

        info!(
            "Running {} on {}: desiredCount={}",
            action, self.target, desired_count
        );

        let report = match self
            .updater
            .update_desired_count(&self.target, desired_count)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to {} {}: {:#}", action, self.target, e);
                return Err(Error::from(e));
            }
        };

        if let Some(service) = &report.service {
            info!(
                "Service acknowledged: desired={} running={} pending={}",
                service.desired_count, service.running_count, service.pending_count
            );
            if let Some(primary) = service.primary_deployment() {
                info!(
                    "Primary deployment rollout={} running={}",
                    primary.rollout_state.as_deref().unwrap_or("UNKNOWN"),
                    primary.running_count
                );
            }
        }

        Response::ok(&report)
    }
}
