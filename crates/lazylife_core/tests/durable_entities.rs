use lazylife_core::{
    AgentIdentity, DeadlineDraft, DeadlinePatch, EntityKind, JournalEntryPatch,
    LectureEventDraft, Level, NotificationPreferences, NotificationPreferencesPatch, Priority,
    QuietHoursPatch, RuntimeStore, ScheduleEventPatch, StoreError, UserContext,
    UserContextPatch,
};
use std::collections::BTreeMap;
use uuid::Uuid;

fn store() -> RuntimeStore {
    RuntimeStore::open_in_memory().unwrap()
}

fn lecture(title: &str, start: &str) -> LectureEventDraft {
    LectureEventDraft {
        title: title.to_string(),
        location: None,
        start_time: start.to_string(),
        duration_minutes: 45,
        workload: Level::Medium,
    }
}

fn deadline(task: &str, due: &str) -> DeadlineDraft {
    DeadlineDraft {
        course: "DAT560".to_string(),
        task: task.to_string(),
        due_date: due.to_string(),
        priority: Priority::Medium,
        completed: false,
    }
}

#[test]
fn context_defaults_and_merge_patch() {
    let store = store();
    assert_eq!(store.get_user_context().unwrap(), UserContext::default());

    store
        .set_user_context(&UserContextPatch {
            stress_level: Some(Level::High),
            ..UserContextPatch::default()
        })
        .unwrap();
    let merged = store
        .set_user_context(&UserContextPatch {
            energy_level: Some(Level::Low),
            ..UserContextPatch::default()
        })
        .unwrap();

    let expected = UserContext {
        stress_level: Level::High,
        energy_level: Level::Low,
        mode: "balanced".to_string(),
    };
    assert_eq!(merged, expected);
    assert_eq!(store.get_user_context().unwrap(), expected);
}

#[test]
fn preferences_defaults_and_merge_patch() {
    let store = store();
    let defaults = store.get_notification_preferences().unwrap();
    assert_eq!(defaults, NotificationPreferences::default());
    assert!(!defaults.quiet_hours.enabled);
    assert_eq!(defaults.minimum_priority, Priority::Low);
    assert!(defaults.allow_critical_in_quiet_hours);
    assert!(AgentIdentity::ALL
        .iter()
        .all(|identity| defaults.category_toggles[identity]));

    store
        .set_notification_preferences(&NotificationPreferencesPatch {
            category_toggles: Some(BTreeMap::from([(AgentIdentity::FoodTracking, false)])),
            ..NotificationPreferencesPatch::default()
        })
        .unwrap();
    let merged = store
        .set_notification_preferences(&NotificationPreferencesPatch {
            allow_critical_in_quiet_hours: Some(false),
            quiet_hours: Some(QuietHoursPatch {
                enabled: Some(true),
                ..QuietHoursPatch::default()
            }),
            ..NotificationPreferencesPatch::default()
        })
        .unwrap();

    assert!(!merged.category_toggles[&AgentIdentity::FoodTracking]);
    assert!(merged.category_toggles[&AgentIdentity::Notes]);
    assert!(merged.quiet_hours.enabled);
    assert_eq!(merged.quiet_hours.start_hour, defaults.quiet_hours.start_hour);
    assert!(!merged.allow_critical_in_quiet_hours);
    assert_eq!(store.get_notification_preferences().unwrap(), merged);
}

#[test]
fn invalid_preferences_are_rejected_and_not_written() {
    let store = store();
    let before = store.get_notification_preferences().unwrap();

    let err = store
        .set_notification_preferences(&NotificationPreferencesPatch {
            minimum_priority: Some(Priority::High),
            quiet_hours: Some(QuietHoursPatch {
                start_hour: Some(25),
                ..QuietHoursPatch::default()
            }),
            ..NotificationPreferencesPatch::default()
        })
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidPreferences(_)));
    assert_eq!(store.get_notification_preferences().unwrap(), before);
}

#[test]
fn schedule_events_crud() {
    let store = store();
    let later = store
        .create_lecture_event(&lecture("Compilers", "2026-02-25T12:00:00Z"))
        .unwrap();
    let sooner = store
        .create_lecture_event(&lecture("Networks", "2026-02-23T08:00:00Z"))
        .unwrap();
    assert_ne!(later.id, sooner.id);

    let titles: Vec<String> = store
        .get_schedule_events()
        .unwrap()
        .into_iter()
        .map(|event| event.title)
        .collect();
    assert_eq!(titles, vec!["Networks", "Compilers"]);

    let moved = store
        .update_schedule_event(
            later.id,
            &ScheduleEventPatch {
                location: Some(Some("Aud 2".to_string())),
                duration_minutes: Some(120),
                ..ScheduleEventPatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.title, "Compilers");
    assert_eq!(moved.location.as_deref(), Some("Aud 2"));
    assert_eq!(moved.duration_minutes, 120);
    assert_eq!(moved.created_at, later.created_at);
    assert_eq!(store.get_schedule_event(later.id).unwrap(), Some(moved));

    let cleared = store
        .update_schedule_event(
            later.id,
            &ScheduleEventPatch {
                location: Some(None),
                ..ScheduleEventPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.location, None);
    assert_eq!(cleared.duration_minutes, 120);
    assert_eq!(
        store.get_schedule_event(later.id).unwrap().unwrap().location,
        None
    );

    store.delete_schedule_event(sooner.id).unwrap();
    assert_eq!(store.get_schedule_events().unwrap().len(), 1);
    assert!(store.get_schedule_event(sooner.id).unwrap().is_none());
}

#[test]
fn deadlines_crud() {
    let store = store();
    let created = store
        .create_deadline(&deadline("Lab 3", "2026-03-10T23:59:00Z"))
        .unwrap();
    assert!(!created.completed);

    let done = store
        .update_deadline(
            created.id,
            &DeadlinePatch {
                completed: Some(true),
                ..DeadlinePatch::default()
            },
        )
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.task, "Lab 3");
    assert_eq!(store.get_deadlines().unwrap(), vec![done]);

    store.delete_deadline(created.id).unwrap();
    assert!(store.get_deadlines().unwrap().is_empty());
}

#[test]
fn journal_entries_crud_newest_first() {
    let store = store();
    let first = store
        .record_journal_entry("Morning run", &["Health".to_string()])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store
        .record_journal_entry("Read two papers", &["study".to_string(), "Study".to_string()])
        .unwrap();
    assert_eq!(second.tags, vec!["study"]);

    let ids: Vec<Uuid> = store
        .get_journal_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let edited = store
        .update_journal_entry(
            first.id,
            &JournalEntryPatch {
                content: Some("Morning run, 5k".to_string()),
                ..JournalEntryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(edited.tags, vec!["health"]);
    assert_eq!(store.get_journal_entry(first.id).unwrap(), Some(edited));

    store.delete_journal_entry(second.id).unwrap();
    assert_eq!(store.get_journal_entries().unwrap().len(), 1);
}

#[test]
fn update_and_delete_of_missing_ids_report_not_found() {
    let store = store();
    let missing = Uuid::new_v4();

    assert!(matches!(
        store.update_schedule_event(missing, &ScheduleEventPatch::default()),
        Err(StoreError::NotFound { kind: EntityKind::ScheduleEvent, id }) if id == missing
    ));
    assert!(matches!(
        store.delete_schedule_event(missing),
        Err(StoreError::NotFound { kind: EntityKind::ScheduleEvent, .. })
    ));
    assert!(matches!(
        store.update_deadline(missing, &DeadlinePatch::default()),
        Err(StoreError::NotFound { kind: EntityKind::Deadline, .. })
    ));
    assert!(matches!(
        store.delete_deadline(missing),
        Err(StoreError::NotFound { kind: EntityKind::Deadline, .. })
    ));
    assert!(matches!(
        store.update_journal_entry(missing, &JournalEntryPatch::default()),
        Err(StoreError::NotFound { kind: EntityKind::JournalEntry, .. })
    ));
    assert!(matches!(
        store.delete_journal_entry(missing),
        Err(StoreError::NotFound { kind: EntityKind::JournalEntry, .. })
    ));
}

#[test]
fn durable_collections_have_no_cap() {
    let store = store();
    for n in 0..150 {
        store
            .create_deadline(&deadline(&format!("task {n}"), "2026-05-01T00:00:00Z"))
            .unwrap();
    }
    assert_eq!(store.get_deadlines().unwrap().len(), 150);
}
