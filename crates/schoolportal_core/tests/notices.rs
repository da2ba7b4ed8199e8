use chrono::{TimeZone, Utc};
use schoolportal_core::{
    Collection, Fixtures, Identity, MemoryStorage, Notice, NoticeDraft, NoticeFeed,
    NoticeService, NoticeServiceError, Priority, RecordStore, Role, Session, ValidationError,
};
use std::cell::RefCell;
use std::rc::Rc;

fn session(id: &str, role: Role) -> Session {
    Session::from(&Identity::new(id, "Someone", role, "pw"))
}

fn student_in(id: &str, grade_level: &str) -> Session {
    Session::from(
        &Identity::new(id, "Student", Role::Student, "pw")
            .with_profile_field("grade_level", grade_level),
    )
}

fn empty_store() -> RecordStore<MemoryStorage> {
    let store = RecordStore::new(MemoryStorage::new());
    store.initialize(&Fixtures::empty()).unwrap();
    store
}

#[test]
fn create_assigns_id_and_date_and_round_trips() {
    let store = empty_store();
    let service = NoticeService::new(&store);
    let admin = session("ADM001", Role::Admin);
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap();

    let created = service
        .create_notice_at(
            &admin,
            NoticeDraft::new(" Holiday ", "School closed on Friday.").with_priority(Priority::High),
            now,
        )
        .unwrap();

    assert_eq!(created.id, now.timestamp_millis());
    assert_eq!(created.date, "2026-10-14");
    assert_eq!(created.title, "Holiday");
    assert_eq!(created.created_by, "ADM001");

    let loaded = store
        .get_by_id::<Notice>(Collection::Notices, &created.id.to_string())
        .unwrap()
        .unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn ids_stay_unique_within_the_same_millisecond() {
    let store = empty_store();
    let service = NoticeService::new(&store);
    let teacher = session("TCH001", Role::Teacher);
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 30, 0).unwrap();

    let first = service
        .create_notice_at(&teacher, NoticeDraft::new("One", "First body"), now)
        .unwrap();
    let second = service
        .create_notice_at(&teacher, NoticeDraft::new("Two", "Second body"), now)
        .unwrap();

    assert!(second.id > first.id);
    let listed = service.list_notices().unwrap();
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn create_fails_cleanly_when_no_id_is_left() {
    let store = empty_store();
    store
        .add(
            Collection::Notices,
            &Notice {
                id: i64::MAX,
                title: "Last".to_string(),
                content: "Highest possible id.".to_string(),
                date: "2026-10-14".to_string(),
                priority: Priority::Low,
                created_by: "ADM001".to_string(),
                target_class: None,
            },
        )
        .unwrap();

    let err = NoticeService::new(&store)
        .create_notice(&session("ADM001", Role::Admin), NoticeDraft::new("Next", "body"))
        .unwrap_err();
    assert!(matches!(
        err,
        NoticeServiceError::Validation(ValidationError::IdExhausted("notices"))
    ));
    assert_eq!(store.count(Collection::Notices).unwrap(), 1);
}

#[test]
fn students_cannot_post_notices() {
    let store = empty_store();
    let err = NoticeService::new(&store)
        .create_notice(&session("STU001", Role::Student), NoticeDraft::new("Hi", "there"))
        .unwrap_err();
    assert!(matches!(err, NoticeServiceError::Forbidden { .. }));
    assert_eq!(store.count(Collection::Notices).unwrap(), 0);
}

#[test]
fn blank_title_is_rejected() {
    let store = empty_store();
    let err = NoticeService::new(&store)
        .create_notice(&session("ADM001", Role::Admin), NoticeDraft::new("  ", "body"))
        .unwrap_err();
    assert!(matches!(err, NoticeServiceError::Validation(_)));
}

#[test]
fn students_see_school_wide_and_own_class_notices() {
    let store = RecordStore::new(MemoryStorage::new());
    store.initialize(&Fixtures::demo()).unwrap();
    let service = NoticeService::new(&store);

    let in_class = service.list_for(&student_in("STU001", "10-A")).unwrap();
    assert_eq!(in_class.len(), 2);

    let other_class = service.list_for(&student_in("STU002", "9-B")).unwrap();
    assert_eq!(other_class.len(), 1);
    assert!(other_class[0].target_class.is_none());

    let staff = service.list_for(&session("TCH001", Role::Teacher)).unwrap();
    assert_eq!(staff.len(), 2);
}

#[test]
fn teachers_delete_only_their_own_notices() {
    let store = RecordStore::new(MemoryStorage::new());
    store.initialize(&Fixtures::demo()).unwrap();
    let service = NoticeService::new(&store);
    let teacher = session("TCH001", Role::Teacher);

    let notices = service.list_notices().unwrap();
    let by_admin = notices.iter().find(|n| n.created_by == "ADM001").unwrap();
    let by_teacher = notices.iter().find(|n| n.created_by == "TCH001").unwrap();

    let err = service.delete_notice(&teacher, by_admin.id).unwrap_err();
    assert!(matches!(err, NoticeServiceError::Forbidden { .. }));

    service.delete_notice(&teacher, by_teacher.id).unwrap();
    service
        .delete_notice(&session("ADM001", Role::Admin), by_admin.id)
        .unwrap();
    assert_eq!(store.count(Collection::Notices).unwrap(), 0);
}

#[test]
fn deleting_missing_notice_reports_not_found() {
    let store = empty_store();
    let err = NoticeService::new(&store)
        .delete_notice(&session("ADM001", Role::Admin), 123)
        .unwrap_err();
    assert!(matches!(err, NoticeServiceError::NotFound(123)));
}

#[test]
fn feed_delivers_changes_until_unsubscribed() {
    let store = empty_store();
    let feed = NoticeFeed::new();
    let service = NoticeService::new(&store).with_feed(&feed);
    let admin = session("ADM001", Role::Admin);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = feed.subscribe(move |notices| sink.borrow_mut().push(notices.len()));

    let created = service
        .create_notice(&admin, NoticeDraft::new("Fire drill", "At 11am."))
        .unwrap();
    service.delete_notice(&admin, created.id).unwrap();
    subscription.unsubscribe();
    service
        .create_notice(&admin, NoticeDraft::new("Quiet", "Nobody listens."))
        .unwrap();

    assert_eq!(*seen.borrow(), vec![1, 0]);
}
