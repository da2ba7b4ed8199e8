use schoolportal_core::{
    lock_key, Feature, FeatureGate, FeatureLockRegistry, FeatureView, Identity, KeyValueStorage,
    MemoryStorage, RepoError, Role, Session, FEATURE_LOCKS_KEY,
};

fn student(id: &str) -> Session {
    Session::from(&Identity::new(id, "Student", Role::Student, "pw"))
}

#[test]
fn lock_key_joins_subject_and_feature() {
    assert_eq!(lock_key("STU001", Feature::Fees), "STU001_fees");
}

#[test]
fn locks_default_to_unlocked() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    for feature in Feature::ALL {
        assert!(!registry.is_locked("STU001", feature).unwrap());
    }
}

#[test]
fn fees_lock_applies_only_to_its_student() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    registry.set_locked("STU001", Feature::Fees, true).unwrap();
    let gate = FeatureGate::new(&registry);

    let locked = gate.view(&student("STU001"), Feature::Fees).unwrap();
    assert!(locked.is_locked());
    assert!(matches!(
        locked,
        FeatureView::Locked {
            feature: Feature::Fees,
            ..
        }
    ));

    for other in ["STU002", "STU0011", "STU00"] {
        assert_eq!(
            gate.view(&student(other), Feature::Fees).unwrap(),
            FeatureView::Available
        );
    }
    assert_eq!(
        gate.view(&student("STU001"), Feature::Attendance).unwrap(),
        FeatureView::Available
    );
}

#[test]
fn unlocking_restores_normal_view() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    registry.set_locked("STU001", Feature::Timetable, true).unwrap();
    registry.set_locked("STU001", Feature::Timetable, false).unwrap();

    assert!(!registry.is_locked("STU001", Feature::Timetable).unwrap());
}

#[test]
fn staff_sessions_are_never_locked() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    registry.set_locked("TCH001", Feature::Notices, true).unwrap();
    let teacher = Session::from(&Identity::new("TCH001", "Teacher", Role::Teacher, "pw"));

    assert_eq!(
        FeatureGate::new(&registry)
            .view(&teacher, Feature::Notices)
            .unwrap(),
        FeatureView::Available
    );
}

#[test]
fn lock_map_is_a_flat_json_object() {
    let storage = MemoryStorage::new();
    let registry = FeatureLockRegistry::new(storage.clone());
    registry.set_locked("STU001", Feature::Fees, true).unwrap();
    registry.set_locked("STU002", Feature::Results, false).unwrap();

    let raw = storage.get_item(FEATURE_LOCKS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["STU001_fees"], true);
    assert_eq!(json["STU002_results"], false);
}

#[test]
fn locks_for_lists_only_locked_features_of_subject() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    registry.set_locked("STU001", Feature::Tests, true).unwrap();
    registry.set_locked("STU001", Feature::Fees, true).unwrap();
    registry.set_locked("STU001", Feature::Gallery, false).unwrap();
    registry.set_locked("STU002", Feature::Attendance, true).unwrap();

    assert_eq!(
        registry.locks_for("STU001").unwrap(),
        vec![Feature::Fees, Feature::Tests]
    );
}

#[test]
fn corrupt_lock_map_reads_as_unlocked_and_is_replaced_on_write() {
    let storage = MemoryStorage::new();
    storage.set_item(FEATURE_LOCKS_KEY, "[[[").unwrap();
    let registry = FeatureLockRegistry::new(storage.clone());

    assert!(!registry.is_locked("STU001", Feature::Fees).unwrap());
    registry.set_locked("STU001", Feature::Fees, true).unwrap();
    assert!(registry.is_locked("STU001", Feature::Fees).unwrap());
}

#[test]
fn unknown_entries_survive_writes() {
    let storage = MemoryStorage::new();
    storage
        .set_item(FEATURE_LOCKS_KEY, r#"{"STU001_library":true}"#)
        .unwrap();
    let registry = FeatureLockRegistry::new(storage.clone());
    registry.set_locked("STU001", Feature::Fees, true).unwrap();

    let raw = storage.get_item(FEATURE_LOCKS_KEY).unwrap().unwrap();
    assert!(raw.contains("STU001_library"));
}

#[test]
fn set_locked_rejects_subject_ids_with_separator() {
    let registry = FeatureLockRegistry::new(MemoryStorage::new());
    let err = registry
        .set_locked("STU_001", Feature::Fees, true)
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
