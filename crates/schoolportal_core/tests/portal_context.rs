use schoolportal_core::db::open_db_in_memory;
use schoolportal_core::{
    AccessDecision, AuthError, Feature, FeatureView, Fixtures, MemoryStorage, PortalContext,
    Role, SessionState, SqliteStorage,
};

#[test]
fn routes_report_loading_until_init() {
    let mut context = PortalContext::new(MemoryStorage::new(), MemoryStorage::new());
    assert_eq!(
        context.check_route(Some(Role::Admin)).unwrap(),
        AccessDecision::Loading
    );

    context.init(&Fixtures::demo()).unwrap();
    assert_eq!(context.session_state(), &SessionState::Loaded(None));
    assert_eq!(
        context.check_route(Some(Role::Admin)).unwrap(),
        AccessDecision::RedirectToLogin
    );
}

#[test]
fn session_is_rehydrated_by_a_new_context_sharing_the_tab_area() {
    let conn = open_db_in_memory().unwrap();
    let tab = MemoryStorage::new();

    let mut first = PortalContext::new(SqliteStorage::new(&conn), tab.clone());
    first.init(&Fixtures::demo()).unwrap();
    first.auth().login("TCH001", "teacher123").unwrap();
    first.dispose();

    let mut second = PortalContext::new(SqliteStorage::new(&conn), tab);
    let report = second.init(&Fixtures::demo()).unwrap();
    assert!(report.is_noop());
    let session = second.session_state().session().unwrap();
    assert_eq!(session.id, "TCH001");
    assert_eq!(
        second.check_route(Some(Role::Teacher)).unwrap(),
        AccessDecision::Allow
    );
}

#[test]
fn new_tab_area_starts_logged_out() {
    let conn = open_db_in_memory().unwrap();

    let mut first = PortalContext::new(SqliteStorage::new(&conn), MemoryStorage::new());
    first.init(&Fixtures::demo()).unwrap();
    first.auth().login("ADM001", "admin123").unwrap();

    let mut second = PortalContext::new(SqliteStorage::new(&conn), MemoryStorage::new());
    second.init(&Fixtures::demo()).unwrap();
    assert_eq!(second.session_state(), &SessionState::Loaded(None));
}

#[test]
fn feature_view_follows_admin_locks_for_current_student() {
    let mut context = PortalContext::new(MemoryStorage::new(), MemoryStorage::new());
    context.init(&Fixtures::demo()).unwrap();

    let err = context.feature_view(Feature::Fees).unwrap_err();
    assert!(matches!(err, AuthError::NotAuthenticated));

    context
        .feature_locks()
        .set_locked("STU001", Feature::Fees, true)
        .unwrap();

    context.auth().login("STU001", "student123").unwrap();
    assert!(context.feature_view(Feature::Fees).unwrap().is_locked());

    context.auth().login("STU002", "student123").unwrap();
    assert_eq!(
        context.feature_view(Feature::Fees).unwrap(),
        FeatureView::Available
    );
}

#[test]
fn notices_created_through_context_reach_feed_subscribers() {
    let mut context = PortalContext::new(MemoryStorage::new(), MemoryStorage::new());
    context.init(&Fixtures::demo()).unwrap();
    let admin = context.auth().login("ADM001", "admin123").unwrap();

    let received = std::rc::Rc::new(std::cell::Cell::new(0usize));
    let sink = std::rc::Rc::clone(&received);
    let _subscription = context
        .notice_feed()
        .subscribe(move |notices| sink.set(notices.len()));

    context
        .notices()
        .create_notice(
            &admin,
            schoolportal_core::NoticeDraft::new("PTA meeting", "Saturday, 10am."),
        )
        .unwrap();
    assert_eq!(received.get(), 3);
}
