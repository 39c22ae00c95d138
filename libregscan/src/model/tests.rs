use super::*;
use std::collections::HashSet;
use std::str::FromStr;

const HEX: &str = "2c73dd0370e688b915c0814e0a533252f69c0a30d06e62918f61b5df932d4d3a";

fn identity(registry: &str, repository: &str, digest: &str, tag: &str) -> ImageIdentity {
    ImageIdentity {
        registry_id: registry.to_string(),
        repository: repository.to_string(),
        provider_digest: ProviderDigest::new(digest),
        tags: vec![tag.to_string()],
        pushed_at: None,
        size_bytes: None,
        manifest: String::new(),
        primary_tag: Some(tag.to_string()),
        canonical_digest: None,
    }
}

#[test]
fn test_registry_id_from_config() {
    assert_eq!(RegistryId::from_config(""), RegistryId::Default);
    assert_eq!(RegistryId::from_config("  "), RegistryId::Default);
    assert_eq!(RegistryId::from_config("*"), RegistryId::Default);
    assert_eq!(RegistryId::from_config(".*.*"), RegistryId::Default);
    assert_eq!(
        RegistryId::from_config(" 111111111111 "),
        RegistryId::Account("111111111111".to_string())
    );
}

#[test]
fn test_registry_id_display_and_accessors() {
    assert_eq!(RegistryId::Default.to_string(), "default");
    assert!(RegistryId::Default.as_account().is_none());

    let id = RegistryId::Account("222222222222".to_string());
    assert_eq!(id.to_string(), "222222222222");
    assert_eq!(id.as_account(), Some("222222222222"));
    assert!(!id.is_default());
}

#[test]
fn test_identity_dedup_key_ignores_tags() {
    let mut set = HashSet::new();
    set.insert(identity("111", "app", "sha256:aaa", "v1"));
    set.insert(identity("111", "app", "sha256:aaa", "latest"));
    set.insert(identity("111", "app", "sha256:bbb", "v1"));
    set.insert(identity("222", "app", "sha256:aaa", "v1"));

    assert_eq!(set.len(), 3);
}

#[test]
fn test_identity_canonical_digest_str() {
    let mut image = identity("111", "app", "sha256:aaa", "v1");
    assert_eq!(image.canonical_digest_str(), "");

    image.canonical_digest = Some(CanonicalDigest::from_str(HEX).unwrap());
    assert_eq!(image.canonical_digest_str(), HEX);
    assert_eq!(image.label(), "111/app@sha256:aaa");
}

#[test]
fn test_lookup_tables_last_write_wins() {
    let digest = CanonicalDigest::from_str(HEX).unwrap();
    let mut tables = LookupTables::new();

    tables.record_repository("app", "111.dkr.ecr.us-east-1.amazonaws.com/app");
    tables.record_tag(&digest, "v1");
    tables.record_tag(&digest, "v2");

    assert_eq!(
        tables.repository_uri("app"),
        Some("111.dkr.ecr.us-east-1.amazonaws.com/app")
    );
    assert_eq!(tables.tag_for(&digest), Some("v2"));
    assert_eq!(tables.repository_count(), 1);

    tables.clear();
    assert!(tables.repository_uri("app").is_none());
    assert!(tables.tag_for(&digest).is_none());
}

#[test]
fn test_same_repository_name_in_two_registries_keeps_latest_uri() {
    let mut tables = LookupTables::new();

    tables.record_repository("app", "111.dkr.ecr.us-east-1.amazonaws.com/app");
    tables.record_repository("app", "111.dkr.ecr.us-east-1.amazonaws.com/app");
    assert_eq!(
        tables.repository_uri("app"),
        Some("111.dkr.ecr.us-east-1.amazonaws.com/app")
    );

    tables.record_repository("app", "222.dkr.ecr.eu-west-1.amazonaws.com/app");
    assert_eq!(
        tables.repository_uri("app"),
        Some("222.dkr.ecr.eu-west-1.amazonaws.com/app")
    );
    assert_eq!(tables.repository_count(), 1);
}

#[test]
fn test_image_identifier_resolvable() {
    assert!(ImageIdentifier::by_digest("sha256:aaa").is_resolvable());
    assert!(!ImageIdentifier::by_digest(" ").is_resolvable());
    assert!(!ImageIdentifier::default().is_resolvable());

    let tagged = ImageIdentifier {
        image_digest: None,
        image_tag: Some("latest".to_string()),
    };
    assert!(tagged.is_resolvable());
    assert_eq!(tagged.to_string(), "latest");
}

#[test]
fn test_image_detail_deserializes_cli_v2_payload() {
    let json = r#"{
        "registryId": "111111111111",
        "repositoryName": "backend",
        "imageDigest": "sha256:aaa",
        "imageTags": ["v1", "latest"],
        "imageSizeInBytes": 27812345,
        "imagePushedAt": "2019-03-05T10:15:30+00:00"
    }"#;
    let detail: ImageDetail = serde_json::from_str(json).unwrap();

    assert_eq!(detail.registry_id, "111111111111");
    assert_eq!(detail.image_tags, vec!["v1", "latest"]);
    assert_eq!(detail.image_size_in_bytes, Some(27812345));
    assert_eq!(
        detail.image_pushed_at.unwrap().to_rfc3339(),
        "2019-03-05T10:15:30+00:00"
    );
}

#[test]
fn test_image_detail_deserializes_epoch_timestamp() {
    let json = r#"{
        "repositoryName": "backend",
        "imageDigest": "sha256:aaa",
        "imagePushedAt": 1551780930.0
    }"#;
    let detail: ImageDetail = serde_json::from_str(json).unwrap();

    assert_eq!(detail.image_pushed_at.unwrap().timestamp(), 1551780930);
    assert!(detail.image_tags.is_empty());
}

#[test]
fn test_batch_output_with_failures() {
    let json = r#"{
        "images": [],
        "failures": [{
            "imageId": {"imageDigest": "sha256:bbb"},
            "failureCode": "ImageNotFound",
            "failureReason": "Requested image not found"
        }]
    }"#;
    let output: BatchGetImageOutput = serde_json::from_str(json).unwrap();

    assert!(output.images.is_empty());
    assert_eq!(output.failures.len(), 1);
    assert_eq!(
        output.failures[0].to_string(),
        "sha256:bbb: ImageNotFound (Requested image not found)"
    );
}
