use super::*;
use crate::testing::MockExecutor;

const REF: &str = "111111111111.dkr.ecr.us-east-1.amazonaws.com/backend:1.0";

fn engine(executor: &Arc<MockExecutor>, sudo: bool) -> ContainerEngine {
    ContainerEngine::new(executor.clone(), sudo)
}

#[tokio::test]
async fn test_image_exists_when_engine_lists_an_id() {
    let executor = Arc::new(MockExecutor::new().on("docker images -q", 0, "4e5021d210f6\n"));

    assert!(engine(&executor, false).image_exists(REF).await);
    assert_eq!(executor.calls(), vec![format!("docker images -q {}", REF)]);
}

#[tokio::test]
async fn test_image_missing_when_output_is_empty() {
    let executor = Arc::new(MockExecutor::new().on("docker images -q", 0, "\n"));
    assert!(!engine(&executor, false).image_exists(REF).await);
}

#[tokio::test]
async fn test_pull_success_and_failure() {
    let executor = Arc::new(MockExecutor::new().on("docker pull", 0, ""));
    assert!(engine(&executor, false).pull(REF).await.is_ok());

    let executor = Arc::new(MockExecutor::new().on("docker pull", 1, ""));
    let err = engine(&executor, false).pull(REF).await.unwrap_err();
    assert!(matches!(err, ScanError::Command { exit_code: Some(1), .. }));
}

#[tokio::test]
async fn test_remove_runs_rmi() {
    let executor = Arc::new(MockExecutor::new().on("docker rmi", 0, ""));

    engine(&executor, false).remove(REF).await.unwrap();

    assert_eq!(executor.calls(), vec![format!("docker rmi {}", REF)]);
}

#[tokio::test]
async fn test_invalid_reference_never_reaches_the_shell() {
    let executor = Arc::new(MockExecutor::new().on("docker", 0, ""));
    let engine = engine(&executor, false);

    let err = engine.pull("backend:1.0; rm -rf /").await.unwrap_err();
    assert!(matches!(err, ScanError::Validation { .. }));
    assert!(engine.pull("").await.is_err());
    assert!(!engine.image_exists("app$(id):1.0").await);
    assert!(executor.calls().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_sudo_prefix() {
    let executor = Arc::new(MockExecutor::new().on("sudo docker pull", 0, ""));

    engine(&executor, true).pull(REF).await.unwrap();

    assert_eq!(executor.calls(), vec![format!("sudo docker pull {}", REF)]);
}
