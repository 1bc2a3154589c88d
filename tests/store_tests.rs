//! Integration tests for the artifact store: TTL behaviour, strict bundle
//! creation, lenient bundle serving.

use std::time::Duration;

use napkin_mcp_server::store::{ArtifactStore, StoreError};

fn png(store: &ArtifactStore, name: &str, payload: &[u8]) -> String {
    store.put(payload.to_vec(), "image/png", name)
}

#[test]
fn test_artifact_survives_within_ttl() {
    let store = ArtifactStore::with_ttl(Duration::from_millis(200));
    let id = png(&store, "a.png", b"a");
    std::thread::sleep(Duration::from_millis(20));
    store.sweep();
    assert!(store.get(&id).is_some(), "artifact evicted before its TTL");
}

#[test]
fn test_artifact_evicted_after_ttl_once_swept() {
    let store = ArtifactStore::with_ttl(Duration::from_millis(30));
    let id = png(&store, "a.png", b"a");
    std::thread::sleep(Duration::from_millis(60));

    // Eviction is advisory cleanup: before the sweep runs the record is
    // still retrievable.
    assert!(store.get(&id).is_some());

    assert_eq!(store.sweep(), 1);
    assert!(store.get(&id).is_none());
}

#[test]
fn test_lookup_of_unknown_id_is_none() {
    let store = ArtifactStore::new();
    assert!(store.get("nope").is_none());
    assert!(store.serve_bundle("nope").is_none());
}

#[test]
fn test_bundle_creation_rejects_empty_list() {
    let store = ArtifactStore::new();
    assert!(matches!(store.bundle(&[]), Err(StoreError::EmptyBundle)));
}

#[test]
fn test_bundle_creation_is_strict() {
    let store = ArtifactStore::new();
    let a = png(&store, "a.png", b"a");

    let err = store
        .bundle(&[a, "missing".to_string(), "also-missing".to_string()])
        .unwrap_err();
    match err {
        StoreError::MissingArtifact(id) => assert_eq!(id, "missing"),
        other => panic!("expected MissingArtifact, got {other:?}"),
    }

    // No bundle record may exist after a failed creation.
    let (_, bundles) = store.counts();
    assert_eq!(bundles, 0);
}

#[test]
fn test_bundle_serves_members_in_order() {
    let store = ArtifactStore::new();
    let first = png(&store, "first.png", b"111");
    let second = png(&store, "second.png", b"222");

    let bundle_id = store.bundle(&[first, second]).unwrap();
    let members = store.serve_bundle(&bundle_id).unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[0].0, "first.png");
    assert_eq!(members[0].1, b"111");
    assert_eq!(members[1].0, "second.png");
    assert_eq!(members[1].1, b"222");
}

#[test]
fn test_bundle_serving_is_lenient_about_expired_members() {
    // "old" outlives its TTL before "fresh" does; the bundle itself is
    // created late enough to survive the sweep.
    let store = ArtifactStore::with_ttl(Duration::from_millis(100));
    let old = png(&store, "old.png", b"old");
    std::thread::sleep(Duration::from_millis(60));
    let fresh = png(&store, "fresh.png", b"fresh");

    let bundle_id = store.bundle(&[old, fresh]).unwrap();

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(store.sweep(), 1);

    let members = store.serve_bundle(&bundle_id).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].0, "fresh.png");
}

#[test]
fn test_artifact_and_bundle_ids_share_a_namespace() {
    let store = ArtifactStore::new();
    let a = png(&store, "a.png", b"a");
    let bundle_id = store.bundle(&[a.clone()]).unwrap();

    // Same id shape, disambiguated by record kind.
    assert_eq!(a.len(), bundle_id.len());
    assert!(store.get(&bundle_id).is_none());
    assert!(store.serve_bundle(&a).is_none());
}
