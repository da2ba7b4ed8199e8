use schoolportal_api::PortalApi;
use schoolportal_core::db::open_db;
use schoolportal_core::{KeyValueStorage, NoticeDraft, PortalConfig, SqliteStorage};
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

fn config(dir: &TempDir) -> PortalConfig {
    PortalConfig {
        db_path: dir.path().join("portal.sqlite3"),
        ..PortalConfig::default()
    }
}

fn open_demo(dir: &TempDir) -> PortalApi {
    PortalApi::open(&config(dir)).unwrap()
}

#[test]
fn ping_and_version_are_exposed() {
    assert_eq!(PortalApi::ping(), "pong");
    assert!(!PortalApi::core_version().is_empty());
}

#[test]
fn login_success_and_failure_envelopes() {
    let dir = TempDir::new().unwrap();
    let api = open_demo(&dir);

    let bad = api.login("STU001", "wrong");
    assert!(!bad.ok);
    assert!(bad.data.is_none());
    assert_eq!(bad.message, "Invalid id or password.");

    let good = api.login("STU001", "student123");
    assert!(good.ok, "{}", good.message);
    assert_eq!(good.data.unwrap().id, "STU001");

    let json = api.current_user().to_json();
    assert!(json.contains(r#""ok":true"#));
    assert!(!json.contains("student123"));
}

#[test]
fn route_checks_follow_the_session() {
    let dir = TempDir::new().unwrap();
    let api = open_demo(&dir);

    let anonymous = api.check_route(Some("student")).data.unwrap();
    assert_eq!(anonymous.decision, "redirect");
    assert_eq!(anonymous.redirect_to, Some("/login"));

    api.login("STU001", "student123");
    let own = api.check_route(Some("student")).data.unwrap();
    assert_eq!(own.decision, "allow");
    let admin = api.check_route(Some("admin")).data.unwrap();
    assert_eq!(admin.redirect_to, Some("/dashboard"));
    assert!(api.check_route(None).data.unwrap().redirect_to.is_none());

    assert!(!api.check_route(Some("janitor")).ok);

    assert!(api.logout().ok);
    let after = api.check_route(Some("student")).data.unwrap();
    assert_eq!(after.redirect_to, Some("/login"));
}

#[test]
fn tab_session_does_not_leak_into_a_new_api() {
    let dir = TempDir::new().unwrap();
    let first = open_demo(&dir);
    first.login("ADM001", "admin123");

    let second = open_demo(&dir);
    assert!(!second.current_user().ok);
    assert!(first.current_user().ok);
}

#[test]
fn admin_lock_is_seen_by_the_student() {
    let dir = TempDir::new().unwrap();
    let admin = open_demo(&dir);
    admin.login("ADM001", "admin123");
    let status = admin.set_feature_lock("STU001", "fees", true);
    assert!(status.ok, "{}", status.message);
    assert!(status.data.unwrap().locked);

    let student = open_demo(&dir);
    student.login("STU001", "student123");
    let view = student.feature_view("fees").data.unwrap();
    assert!(view.locked);
    assert!(view.message.is_some());
    assert!(!student.feature_view("attendance").data.unwrap().locked);

    assert!(!student.set_feature_lock("STU001", "fees", false).ok);
    assert!(!student.feature_view("canteen").ok);
}

#[test]
fn feature_view_requires_login() {
    let dir = TempDir::new().unwrap();
    let api = open_demo(&dir);
    assert!(!api.feature_view("fees").ok);
}

#[test]
fn notices_flow_through_the_api_and_feed() {
    let dir = TempDir::new().unwrap();
    let api = open_demo(&dir);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _subscription = api.subscribe_notices(move |notices| sink.borrow_mut().push(notices.len()));

    assert!(!api.list_notices().ok);

    api.login("TCH001", "teacher123");
    let created = api.create_notice(NoticeDraft::new("Lab", "Bring aprons.").for_class("9-B"));
    assert!(created.ok, "{}", created.message);
    let id = created.data.unwrap().id;
    assert_eq!(api.list_notices().data.unwrap().len(), 3);

    api.logout();
    api.login("STU001", "student123");
    let visible = api.list_notices().data.unwrap();
    assert!(visible.iter().all(|notice| notice.id != id));
    assert!(!api.create_notice(NoticeDraft::new("Hi", "there")).ok);

    api.logout();
    api.login("ADM001", "admin123");
    assert!(api.delete_notice(id).ok);
    assert!(!api.delete_notice(id).ok);

    assert_eq!(*seen.borrow(), vec![3, 2]);
}

#[test]
fn unseeded_portal_has_no_identities() {
    let dir = TempDir::new().unwrap();
    let api = PortalApi::open(&PortalConfig {
        seed_fixtures: false,
        ..config(&dir)
    })
    .unwrap();
    assert!(!api.login("ADM001", "admin123").ok);
}

fn overwrite_local(dir: &TempDir, key: &str, value: &str) {
    let conn = open_db(dir.path().join("portal.sqlite3")).unwrap();
    SqliteStorage::new(&conn).set_item(key, value).unwrap();
}

#[test]
fn corrupt_collection_is_restored_from_demo_fixtures_on_next_call() {
    let dir = TempDir::new().unwrap();
    let api = open_demo(&dir);
    overwrite_local(&dir, "admins", "{oops");

    let login = api.login("ADM001", "admin123");
    assert!(login.ok, "{}", login.message);

    let reopened = open_demo(&dir);
    assert!(reopened.login("ADM001", "admin123").ok);
}

#[test]
fn legacy_plaintext_accounts_are_replaced_on_open() {
    let dir = TempDir::new().unwrap();
    open_demo(&dir);
    overwrite_local(
        &dir,
        "admins",
        r#"[{"id":"ADM001","name":"Old","role":"admin","password":"admin123"}]"#,
    );

    let api = open_demo(&dir);
    assert!(api.login("TCH001", "teacher123").ok);
    let admin = api.login("ADM001", "admin123");
    assert!(admin.ok, "{}", admin.message);
    assert_eq!(admin.data.unwrap().name, "Vikram Das");
}

#[test]
fn unseeded_portal_repairs_to_empty_collections() {
    let dir = TempDir::new().unwrap();
    let api = PortalApi::open(&PortalConfig {
        seed_fixtures: false,
        ..config(&dir)
    })
    .unwrap();
    overwrite_local(&dir, "notices", "{oops");

    assert!(api.check_route(None).ok);
    let conn = open_db(dir.path().join("portal.sqlite3")).unwrap();
    let notices = SqliteStorage::new(&conn).get_item("notices").unwrap();
    assert_eq!(notices.as_deref(), Some("[]"));
}
