//! Endpoint chain demonstration.
//!
//! This example wires the decorators around a few fake endpoints:
//! 1. An agent check-in guarded by node key authentication
//! 2. A user profile update guarded by the write policy
//! 3. An admin-only user listing
//!
//! Run with: `cargo run --example endpoint_chain`

use std::sync::Arc;

use fleet_guard::{
    endpoint_fn, Ctx, Endpoint, EndpointExt, Error, Host, MemoryStore, Session, User, Viewer,
};
use serde_json::json;

fn viewer(user: User) -> Viewer {
    let session = Session::new(user.id, &user, format!("{}-session", user.username));
    Viewer::new(user, session)
}

fn report(label: &str, result: Result<String, Error>) {
    match result {
        Ok(body) => println!("  {}: ✓ {}", label, body),
        Err(e) => println!(
            "  {}: ✗ {} (status {}, kind {})",
            label,
            e,
            e.status_code(),
            e.kind()
        ),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Endpoint Chain Example ===");

    // Agent side: hosts authenticate with their node key
    let store = Arc::new(MemoryStore::new());
    store.enroll_host(Host::new(1, "laptop-01", "goodkey").with_platform("darwin"));

    let check_in = endpoint_fn(|ctx: &Ctx, _req: serde_json::Value| {
        let name = ctx.host().map(|h| h.host_name.clone()).unwrap_or_default();
        Ok::<_, Error>(format!("config for {}", name))
    })
    .authenticated_host(Arc::clone(&store));

    println!("\n--- Agent check-in ---");
    for (label, req) in [
        ("valid key", json!({ "node_key": "goodkey" })),
        ("empty key", json!({ "node_key": "" })),
        ("numeric key", json!({ "node_key": 10 })),
        ("no key", json!({ "enroll_secret": "abc" })),
    ] {
        report(label, check_in.call(&Ctx::new(label), req));
    }

    // User side: viewers and target users come from the context
    let admin = viewer(User::new(1, "admin1").with_admin(true));
    let user1 = viewer(User::new(2, "user1"));

    let update_profile = endpoint_fn(|ctx: &Ctx, name: String| {
        Ok::<_, Error>(format!("user {:?} renamed to {}", ctx.target_user(), name))
    })
    .can_modify_user();

    let list_users = endpoint_fn(|_ctx: &Ctx, _req: ()| Ok::<_, Error>("3 users".to_string()))
        .must_be_admin();

    println!("\n--- User endpoints ---");
    let own = Ctx::new("req-own").with_viewer(user1.clone()).with_target_user(2);
    report("user1 edits self", update_profile.call(&own, "Alice".to_string()));

    let other = own.with_target_user(1);
    report("user1 edits admin1", update_profile.call(&other, "Mallory".to_string()));

    let as_admin = Ctx::new("req-admin").with_viewer(admin);
    report("admin1 lists users", list_users.call(&as_admin, ()));
    report("user1 lists users", list_users.call(&own, ()));
    report("anonymous lists users", list_users.call(&Ctx::new("req-anon"), ()));
}
