use std::sync::Mutex;

use async_trait::async_trait;
use create_instance::create_instance;
use service_scaler::{
    MockServiceUpdater, ScalerService, ScalingTarget, ServiceReport, ServiceSnapshot,
    ServiceUpdater,
};

// In-memory stand-in for a single ECS service.
struct FakeService {
    name: String,
    desired_count: Mutex<i32>,
}

impl FakeService {
    fn new(name: &str, desired_count: i32) -> Self {
        Self {
            name: name.to_string(),
            desired_count: Mutex::new(desired_count),
        }
    }

    fn desired_count(&self) -> i32 {
        *self.desired_count.lock().unwrap()
    }
}

#[async_trait]
impl ServiceUpdater for FakeService {
    async fn update_desired_count(
        &self,
        target: &ScalingTarget,
        desired_count: i32,
    ) -> anyhow::Result<ServiceReport> {
        if target.service.as_deref() != Some(self.name.as_str()) {
            anyhow::bail!("ServiceNotFoundException: Service not found.");
        }
        *self.desired_count.lock().unwrap() = desired_count;

        Ok(ServiceReport {
            service: Some(ServiceSnapshot {
                service_name: Some(self.name.clone()),
                desired_count: self.desired_count(),
                ..Default::default()
            }),
        })
    }
}

fn test_target() -> ScalingTarget {
    ScalingTarget::builder()
        .cluster("test-cluster")
        .service("test-service")
        .build()
}

#[tokio::test]
async fn test_service_desired_count_set_to_1() {
    let service = ScalerService::new(FakeService::new("test-service", 0), test_target());
    assert_eq!(service.updater().desired_count(), 0);

    let response = create_instance(&service).await.unwrap();

    assert_eq!(service.updater().desired_count(), 1);
    assert_eq!(response.status_code, 200);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["service"]["desiredCount"], 1);
}

#[tokio::test]
async fn test_create_calls_update_once() {
    let mut updater = MockServiceUpdater::new();
    updater
        .expect_update_desired_count()
        .withf(|target, count| target.cluster.as_deref() == Some("test-cluster") && *count == 1)
        .times(1)
        .returning(|_, _| Ok(ServiceReport::default()));

    let service = ScalerService::new(updater, test_target());
    create_instance(&service).await.unwrap();
}

#[tokio::test]
async fn test_unknown_service_fails() {
    let target = ScalingTarget::builder()
        .cluster("test-cluster")
        .service("other-service")
        .build();
    let service = ScalerService::new(FakeService::new("test-service", 0), target);

    let err = create_instance(&service).await.unwrap_err();
    assert!(err.to_string().contains("ServiceNotFoundException"));
    assert_eq!(service.updater().desired_count(), 0);
}

#[cfg(test)]
mod integration_tests {
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_create() {
        // Requires AWS credentials and an existing TARGET_CLUSTER_NAME/TARGET_SERVICE_NAME
        let service = service_scaler::ScalerService::from_env().await;
        let response = create_instance::create_instance(&service).await.unwrap();
        assert_eq!(response.status_code, 200);
    }
}
