use super::*;
use crate::config::{Ecr, Pull};
use crate::testing::{MockExecutor, MockService, hex_of, manifest_with_config};

const ACCOUNT: &str = "111111111111";
const LOGIN: &str =
    "docker login -u AWS -p token https://111111111111.dkr.ecr.us-east-1.amazonaws.com";

fn uri(repository: &str) -> String {
    format!("{}.dkr.ecr.us-east-1.amazonaws.com/{}", ACCOUNT, repository)
}

fn remote(pull: Pull) -> Remote {
    Remote {
        enabled: true,
        login_sudo: false,
        pull,
        ecr: Ecr {
            enabled: true,
            registry_ids: vec![ACCOUNT.to_string()],
        },
    }
}

fn service() -> Arc<MockService> {
    Arc::new(
        MockService::new()
            .repository(ACCOUNT, "backend", &uri("backend"))
            .repository(ACCOUNT, "frontend", &uri("frontend"))
            .image(ACCOUNT, ACCOUNT, "backend", &format!("sha256:{}", hex_of('a')), &["1.0"], Some("1.0"), &manifest_with_config(&hex_of('1')))
            .image(ACCOUNT, ACCOUNT, "frontend", &format!("sha256:{}", hex_of('b')), &["2.0"], Some("2.0"), &manifest_with_config(&hex_of('2'))),
    )
}

/// Executor with working tooling, login and pulls, where backend:1.0 is
/// already present locally.
fn executor() -> MockExecutor {
    MockExecutor::new()
        .on("aws --version", 0, "aws-cli/1.29.0")
        .on("aws ecr get-login", 0, LOGIN)
        .on("docker login", 0, "Login Succeeded")
        .on("docker images -q", 0, "")
        .on(&format!("docker images -q {}:1.0", uri("backend")), 0, "4e5021d210f6\n")
        .on("docker pull", 0, "")
        .on("docker rmi", 0, "")
}

fn backend(executor: &Arc<MockExecutor>, pull: Pull) -> EcrBackend {
    EcrBackend::with_service(&remote(pull), executor.clone(), service()).unwrap()
}

#[tokio::test]
async fn test_missing_tooling_blocks_the_backend() {
    let executor = Arc::new(MockExecutor::new().on("aws --version", 127, ""));
    let mut backend = backend(&executor, Pull::default());

    let err = backend.pull().await.unwrap_err();

    assert!(matches!(err, ScanError::ToolingMissing { .. }));
    assert_eq!(executor.calls(), vec![ECR_TOOLING_CHECK.to_string()]);
}

#[tokio::test]
async fn test_pull_skips_images_present_locally() {
    let executor = Arc::new(executor());
    let mut backend = backend(&executor, Pull::default());

    let summary = backend.pull().await.unwrap();

    assert_eq!(
        summary,
        PullSummary {
            found: 2,
            selected: 2,
            pulled: 1,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(backend.pulled(), &[format!("{}:2.0", uri("frontend"))]);
    assert_eq!(
        executor.calls_starting_with("docker pull"),
        vec![format!("docker pull {}:2.0", uri("frontend"))]
    );
}

#[tokio::test]
async fn test_force_pulls_everything() {
    let executor = Arc::new(executor());
    let mut backend = backend(
        &executor,
        Pull {
            force: true,
            ..Pull::default()
        },
    );

    let summary = backend.pull().await.unwrap();

    assert_eq!(summary.pulled, 2);
    assert!(executor.calls_starting_with("docker images").is_empty());
}

#[tokio::test]
async fn test_filter_and_image_limit() {
    let executor = Arc::new(executor());
    let mut backend = backend(
        &executor,
        Pull {
            images: vec!["end$".to_string()],
            max_images: 1,
            force: true,
            ..Pull::default()
        },
    );

    let summary = backend.pull().await.unwrap();

    assert_eq!(summary.found, 2);
    assert_eq!(summary.selected, 1);
    // Selection order is stable: backend sorts before frontend
    assert_eq!(backend.pulled(), &[format!("{}:1.0", uri("backend"))]);
}

#[tokio::test]
async fn test_failed_pulls_are_counted() {
    let executor = Arc::new(executor().on("docker pull", 1, ""));
    let mut backend = backend(
        &executor,
        Pull {
            force: true,
            ..Pull::default()
        },
    );

    let summary = backend.pull().await.unwrap();

    assert_eq!(summary.failed, 2);
    assert!(backend.pulled().is_empty());
}

#[tokio::test]
async fn test_login_failure_does_not_stop_the_pull() {
    let executor = Arc::new(executor().on("aws ecr get-login", 255, ""));
    let mut backend = backend(&executor, Pull::default());

    let summary = backend.pull().await.unwrap();

    assert_eq!(summary.found, 2);
    assert_eq!(summary.pulled, 1);
}

#[tokio::test]
async fn test_remove_deletes_pulled_images_once() {
    let executor = Arc::new(executor());
    let mut backend = backend(
        &executor,
        Pull {
            force: true,
            ..Pull::default()
        },
    );
    backend.pull().await.unwrap();

    assert_eq!(backend.remove().await, 2);
    assert_eq!(executor.calls_starting_with("docker rmi").len(), 2);
    assert!(backend.pulled().is_empty());
    assert_eq!(backend.remove().await, 0);
}

#[tokio::test]
async fn test_login_records_default_registry_for_enumeration() {
    let executor = Arc::new(executor());
    let mut backend = backend(&executor, Pull::default());

    assert!(backend.login().await);
    let images = backend.enumerate().await;

    assert_eq!(images.len(), 2);
    for image in &images {
        assert!(!backend.full_pull_reference(image).is_empty());
    }
}

#[test]
fn test_invalid_pattern_fails_construction() {
    let executor = Arc::new(MockExecutor::new());
    let pull = Pull {
        digests: vec!["[".to_string()],
        ..Pull::default()
    };

    let result = EcrBackend::with_service(&remote(pull), executor, service());
    assert!(matches!(result, Err(ScanError::Config { .. })));
}

#[tokio::test]
async fn test_registry_backend_delegates() {
    let executor = Arc::new(executor());
    let mut backend = RegistryBackend::Ecr(backend(&executor, Pull::default()));

    assert_eq!(backend.name(), "ecr");
    assert!(backend.is_tooling_available().await);
    assert!(backend.login_report().await.succeeded());
    assert_eq!(backend.enumerate_with_report().await.images.len(), 2);
}
