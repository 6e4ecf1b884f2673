//! Behavioral tests for the credential store
//!
//! Run against the in-memory binding, which keeps label uniqueness and the
//! fixed sync flag of the native stores.

use credkit_core::{CredentialError, CredentialStore, Credentials, DEFAULT_CREDENTIALS_KEY};
use url::Url;

fn creds(user: &str, password: &str, url: &str) -> Credentials {
    Credentials::new(user, password).with_url(Url::parse(url).unwrap())
}

// ============================================================================
// Keyed operations
// ============================================================================

#[test]
fn test_round_trip_preserves_username_password_url() {
    let store = CredentialStore::in_memory();
    let cases = [
        ("svc1", creds("alice", "secret1", "https://example.com")),
        ("svc2", creds("bob", "p@ss word", "http://10.0.0.1:8080/api/v1")),
        ("svc3", creds("carol", "ünïcødé", "ftp://files.example.org/pub")),
    ];

    for (key, record) in &cases {
        store.set(record, key).unwrap();
    }
    for (key, record) in &cases {
        let fetched = store.get(key).unwrap();
        assert_eq!(fetched.username, record.username);
        assert_eq!(fetched.password, record.password);
        assert_eq!(fetched.url, record.url);
    }
}

#[test]
fn test_policy_flags_are_accepted() {
    // The in-memory binding reports both flags back; macOS `security` does not,
    // so callers must not rely on them round-tripping.
    let store = CredentialStore::in_memory();
    let record = creds("alice", "secret1", "https://example.com")
        .with_cloud_sync(true)
        .with_background_access(true);

    store.set(&record, "svc1").unwrap();
    let fetched = store.get("svc1").unwrap();
    assert_eq!(fetched.password.expose(), "secret1");
}

#[test]
fn test_remove_is_idempotent() {
    let store = CredentialStore::in_memory();
    store
        .set(&creds("alice", "secret1", "https://example.com"), "svc1")
        .unwrap();

    assert!(store.remove("svc1").is_ok());
    assert!(store.remove("svc1").is_ok());
}

#[test]
fn test_get_unknown_key_is_not_found() {
    let store = CredentialStore::in_memory();
    match store.get("never-set") {
        Err(CredentialError::NotFound(key)) => assert_eq!(key, "never-set"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_invalid_arguments() {
    let store = CredentialStore::in_memory();

    assert!(matches!(
        store.set(&Credentials::default(), "svc1"),
        Err(CredentialError::InvalidArgument(_))
    ));
    assert!(matches!(
        store.set(&creds("alice", "secret1", "https://example.com"), ""),
        Err(CredentialError::InvalidArgument(_))
    ));
}

#[test]
fn test_same_login_under_distinct_keys() {
    let store = CredentialStore::in_memory();
    store
        .set(&creds("alice", "secret1", "https://example.com/login"), "work")
        .unwrap();
    store
        .set(&creds("alice", "secret2", "https://example.com/login"), "home")
        .unwrap();

    assert_eq!(store.get("work").unwrap().password.expose(), "secret1");
    assert_eq!(store.get("home").unwrap().password.expose(), "secret2");

    store.remove("work").unwrap();
    assert_eq!(store.get("home").unwrap().password.expose(), "secret2");
}

#[test]
fn test_url_that_cannot_round_trip_is_rejected() {
    let store = CredentialStore::in_memory();
    for raw in ["file:///srv/share", "https://example.com/?next=/home"] {
        assert!(matches!(
            store.set(&creds("alice", "secret1", raw), "svc1"),
            Err(CredentialError::InvalidArgument(_))
        ));
    }
    assert!(store.get("svc1").unwrap_err().is_not_found());

    store
        .set(&creds("alice", "secret1", "file://nas.local/srv/share"), "svc1")
        .unwrap();
    assert_eq!(
        store.get("svc1").unwrap().url.unwrap().as_str(),
        "file://nas.local/srv/share"
    );
}

#[test]
fn test_url_without_path_round_trips() {
    let store = CredentialStore::in_memory();
    store
        .set(&creds("alice", "secret1", "https://example.com"), "svc1")
        .unwrap();

    let url = store.get("svc1").unwrap().url.unwrap();
    assert_eq!(url.as_str(), "https://example.com/");
}

#[test]
fn test_record_without_url() {
    let store = CredentialStore::in_memory();
    store.set(&Credentials::new("alice", "pw"), "svc1").unwrap();
    assert!(store.get("svc1").unwrap().url.is_none());
}

// ============================================================================
// Default slot
// ============================================================================

#[test]
fn test_default_slot_is_independent_of_keys() {
    let store = CredentialStore::in_memory();

    store
        .set(&creds("alice", "secret1", "https://a.example.com"), "A")
        .unwrap();
    assert!(store.get_default().unwrap_err().is_not_found());

    store
        .set_default(&creds("root", "toor", "https://admin.example.com"))
        .unwrap();
    assert_eq!(store.get_default().unwrap().username.as_deref(), Some("root"));
    assert_eq!(store.get("A").unwrap().username.as_deref(), Some("alice"));

    store.remove_default().unwrap();
    store.remove_default().unwrap();
    assert!(store.get_default().unwrap_err().is_not_found());
    assert!(store.get("A").is_ok());
}

#[test]
fn test_default_slot_matches_reserved_key() {
    let store = CredentialStore::in_memory();
    store.set_default(&Credentials::new("root", "toor")).unwrap();

    let via_key = store.get(DEFAULT_CREDENTIALS_KEY).unwrap();
    assert_eq!(via_key, store.get_default().unwrap());
}

// ============================================================================
// Remove all
// ============================================================================

#[test]
fn test_remove_all_clears_every_key_and_default() {
    let store = CredentialStore::in_memory();
    for key in ["svc1", "svc2", "svc3"] {
        store
            .set(&creds("alice", "secret1", "https://example.com"), key)
            .unwrap();
    }
    store.set_default(&Credentials::new("root", "toor")).unwrap();

    store.remove_all().unwrap();

    for key in ["svc1", "svc2", "svc3"] {
        assert!(store.get(key).unwrap_err().is_not_found());
    }
    assert!(store.get_default().unwrap_err().is_not_found());
}

#[test]
fn test_remove_all_with_shared_login() {
    let store = CredentialStore::in_memory();
    for (key, password) in [("svc1", "secret1"), ("svc2", "secret2")] {
        store
            .set(&creds("alice", password, "https://example.com"), key)
            .unwrap();
    }

    store.remove_all().unwrap();
    assert!(store.get("svc1").unwrap_err().is_not_found());
    assert!(store.get("svc2").unwrap_err().is_not_found());
}

#[test]
fn test_remove_all_on_empty_store() {
    let store = CredentialStore::in_memory();
    assert!(store.remove_all().is_ok());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_set_on_new_key() {
    let store = CredentialStore::in_memory();

    for round in 0..50 {
        let key = format!("race-{round}");
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|writer| {
                    let (store, key) = (&store, &key);
                    scope.spawn(move || {
                        let password = format!("secret{writer}");
                        store.set(&creds("alice", &password, "https://example.com"), key)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(Result::is_ok), "{key}: {results:?}");
        let password = store.get(&key).unwrap().password;
        assert!(password.expose().starts_with("secret"));
    }
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_set_get_remove_scenario() {
    let store = CredentialStore::in_memory();
    let record = creds("alice", "secret1", "https://example.com");

    assert!(store.set(&record, "svc1").is_ok());

    let fetched = store.get("svc1").unwrap();
    assert_eq!(fetched.username.as_deref(), Some("alice"));
    assert_eq!(fetched.password.expose(), "secret1");
    assert_eq!(fetched.url, Some(Url::parse("https://example.com").unwrap()));

    assert!(store.remove("svc1").is_ok());
    assert!(matches!(store.get("svc1"), Err(CredentialError::NotFound(_))));
}
