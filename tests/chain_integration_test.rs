//! Integration tests for composed decorator chains.
//!
//! These tests run full agent and user request flows through several
//! decorators at once, including concurrent requests sharing one store.

use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};
use fleet_guard::{
    endpoint_fn, Ctx, Endpoint, EndpointExt, Error, ErrorKind, Host, HostAuthConfig, HostStore,
    MemoryStore, MockClock, SeenFailurePolicy, Session, User, Viewer,
};
use serde::Serialize;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn fleet() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for id in 1..=8 {
        store.enroll_host(
            Host::new(id, format!("host-{}", id), format!("key-{}", id)).with_platform("linux"),
        );
    }
    store
}

#[test]
fn agent_json_flow_records_check_in() {
    init_tracing();

    let store = fleet();
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();

    let distributed_read = endpoint_fn(|ctx: &Ctx, req: serde_json::Value| {
        Ok::<_, Error>(json!({
            "host": ctx.host().map(|h| h.host_name.clone()),
            "queries": req.get("queries").cloned().unwrap_or(json!({})),
        }))
    })
    .authenticated_host(Arc::clone(&store))
    .with_clock(MockClock::new(at));

    let response = distributed_read
        .call(
            &Ctx::new("req-dr"),
            json!({ "node_key": "key-3", "queries": { "q1": "select 1" } }),
        )
        .unwrap();

    assert_eq!(response["host"], "host-3");
    assert_eq!(response["queries"]["q1"], "select 1");
    assert_eq!(store.host_by_id(3).unwrap().seen_time, at);
    assert_eq!(store.host_by_id(4).unwrap().seen_time, chrono::DateTime::<Utc>::UNIX_EPOCH);
}

#[test]
fn revoked_host_is_rejected() {
    let store = fleet();
    let endpoint = fleet_guard::Nop.authenticated_host(Arc::clone(&store));

    assert!(endpoint.call(&Ctx::new("r1"), json!({ "NodeKey": "key-5" })).is_ok());

    store.remove_host(5);

    let err = endpoint
        .call(&Ctx::new("r2"), json!({ "NodeKey": "key-5" }))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceAuthentication);
    assert_eq!(err.status_code(), http::StatusCode::UNAUTHORIZED);
    assert!(err.to_string().starts_with("authentication error:"));
}

#[test]
fn concurrent_agents_see_their_own_host() {
    let store = fleet();
    let endpoint = Arc::new(
        endpoint_fn(|ctx: &Ctx, _req: serde_json::Value| {
            Ok::<_, Error>(ctx.host().map(|h| h.id))
        })
        .authenticated_host(Arc::clone(&store)),
    );
    let root = Ctx::new("shared-parent");

    let handles: Vec<_> = (1..=8u64)
        .map(|id| {
            let endpoint = Arc::clone(&endpoint);
            let root = root.clone();
            thread::spawn(move || {
                let req = json!({ "node_key": format!("key-{}", id) });
                (id, endpoint.call(&root, req))
            })
        })
        .collect();

    for handle in handles {
        let (id, result) = handle.join().unwrap();
        assert_eq!(result.unwrap(), Some(id));
    }
    assert!(root.host().is_none());
}

#[test]
fn user_chain_checks_admin_then_runs_handler() {
    let admin = User::new(1, "admin1").with_admin(true);
    let session = Session::new(1, &admin, "admin1");
    let viewer = Viewer::new(admin, session);

    let delete_user = endpoint_fn(|ctx: &Ctx, user_id: u64| {
        let actor = ctx.viewer().map(|v| v.username().to_string());
        Ok::<_, Error>((actor, user_id))
    })
    .can_modify_user()
    .must_be_admin();

    let ctx = Ctx::new("req-del").with_viewer(viewer).with_target_user(7);
    let (actor, deleted) = delete_user.call(&ctx, 7u64).unwrap();

    assert_eq!(actor.as_deref(), Some("admin1"));
    assert_eq!(deleted, 7);
}

#[test]
fn seen_failure_policy_from_config() {
    struct BrokenSeen(MemoryStore);

    impl HostStore for BrokenSeen {
        fn authenticate_host(&self, node_key: &str) -> Result<Host, fleet_guard::StoreError> {
            self.0.authenticate_host(node_key)
        }

        fn mark_host_seen(
            &self,
            _host: &Host,
            _seen: chrono::DateTime<Utc>,
        ) -> Result<(), fleet_guard::StoreError> {
            Err(fleet_guard::StoreError::backend("read-only replica"))
        }
    }

    let store = BrokenSeen(MemoryStore::new());
    store.0.enroll_host(Host::new(1, "foo!", "goodkey"));

    let config: HostAuthConfig =
        serde_json::from_value(json!({ "seen_failure": "log_and_continue" })).unwrap();
    assert_eq!(config.seen_failure, SeenFailurePolicy::LogAndContinue);

    let tolerant = fleet_guard::authenticated_host(&store, fleet_guard::Nop).with_config(config);
    assert!(tolerant
        .call(&Ctx::new("r1"), json!({ "node_key": "goodkey" }))
        .is_ok());

    let strict = fleet_guard::authenticated_host(&store, fleet_guard::Nop);
    let err = strict
        .call(&Ctx::new("r2"), json!({ "node_key": "goodkey" }))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HostSeenUpdate);
    assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[derive(Serialize)]
struct LabelQuery {
    label: String,
}

impl fleet_guard::ExtractCredential for LabelQuery {
    fn node_key(&self) -> Result<fleet_guard::Credential, fleet_guard::ExtractionError> {
        fleet_guard::extract_node_key(self)
    }
}

#[test]
fn request_without_node_key_is_malformed() {
    let store = fleet();
    let endpoint = fleet_guard::Nop.authenticated_host(store);

    let err = endpoint
        .call(
            &Ctx::new("req-label"),
            LabelQuery {
                label: "all hosts".to_string(),
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CredentialExtraction);
    assert!(err.node_invalid());
}
