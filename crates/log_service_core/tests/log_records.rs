use log_service_core::db::open_db_in_memory;
use log_service_core::{
    CollectionName, CreateLogRequest, DeleteLogRequest, ListLogsByDateRequest, LogService,
    SqliteLogStore, Timestamp,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn service() -> LogService<SqliteLogStore> {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteLogStore::new(conn, CollectionName::parse("logs").unwrap()).unwrap();
    LogService::new(store)
}

fn create_at(service: &LogService<SqliteLogStore>, name: &str, millis: i64) -> String {
    service
        .create_log(&CreateLogRequest::new(name, "body").created_at(Timestamp::from_millis(millis)))
        .unwrap()
        .log
        .id
}

fn range(service: &LogService<SqliteLogStore>, start: Timestamp, end: Timestamp) -> Vec<String> {
    service
        .list_logs_by_date(&ListLogsByDateRequest {
            start_date: start,
            end_date: end,
        })
        .unwrap()
        .logs
        .into_iter()
        .map(|log| log.name)
        .collect()
}

#[test]
fn create_then_list_roundtrip() {
    let service = service();

    let created = service.create_log(&CreateLogRequest::new("a", "b")).unwrap().log;
    assert!(!created.id.is_empty());

    let listed = service.list_logs().unwrap().logs;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);
    assert_eq!(listed[0].name, "a");
    assert_eq!(listed[0].content, "b");
}

#[test]
fn create_accepts_empty_strings() {
    let service = service();

    let created = service.create_log(&CreateLogRequest::new("", "")).unwrap().log;

    assert_eq!(created.name, "");
    assert_eq!(created.content, "");
    assert_eq!(service.list_logs().unwrap().logs, vec![created]);
}

#[test]
fn create_echoes_supplied_created_at() {
    let service = service();
    let created_at = Timestamp {
        seconds: 1_700_000_000,
        nanos: 250_000_000,
    };

    let created = service
        .create_log(&CreateLogRequest::new("deploy", "ok").created_at(created_at))
        .unwrap()
        .log;

    assert_eq!(created.created_at, created_at);
    assert_eq!(service.list_logs().unwrap().logs[0].created_at, created_at);
}

#[test]
fn create_keeps_nanosecond_precision() {
    let service = service();
    let created_at = Timestamp {
        seconds: 5,
        nanos: 123_456_789,
    };

    let created = service
        .create_log(&CreateLogRequest::new("precise", "ok").created_at(created_at))
        .unwrap()
        .log;

    assert_eq!(created.created_at, created_at);
    assert_eq!(service.list_logs().unwrap().logs[0].created_at, created_at);
    assert_eq!(range(&service, created_at, created_at), vec!["precise"]);
}

#[test]
fn create_normalizes_out_of_range_nanos() {
    let service = service();

    let created = service
        .create_log(&CreateLogRequest::new("carry", "ok").created_at(Timestamp {
            seconds: 5,
            nanos: 1_000_000_001,
        }))
        .unwrap()
        .log;

    let expected = Timestamp {
        seconds: 6,
        nanos: 1,
    };
    assert_eq!(created.created_at, expected);
    assert_eq!(service.list_logs().unwrap().logs[0].created_at, expected);
}

#[test]
fn create_without_created_at_uses_server_clock() {
    let service = service();
    let before = Timestamp::now();

    let created = service.create_log(&CreateLogRequest::new("n", "c")).unwrap().log;

    let after = Timestamp::now();
    assert!(before <= created.created_at && created.created_at <= after);
    assert_eq!(service.list_logs().unwrap().logs[0].created_at, created.created_at);
}

#[test]
fn identifiers_are_pairwise_distinct() {
    let service = service();

    let ids: HashSet<String> = (0..50)
        .map(|i| {
            service
                .create_log(&CreateLogRequest::new(format!("log-{i}"), "x"))
                .unwrap()
                .log
                .id
        })
        .collect();

    assert_eq!(ids.len(), 50);
}

#[test]
fn concurrent_creates_are_all_visible_once() {
    let service = Arc::new(service());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        service
                            .create_log(&CreateLogRequest::new(format!("w{worker}-{i}"), "x"))
                            .unwrap()
                            .log
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut created = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(created.insert(id), "duplicate id returned by create");
        }
    }

    let listed: Vec<String> = service
        .list_logs()
        .unwrap()
        .logs
        .into_iter()
        .map(|log| log.id)
        .collect();
    assert_eq!(listed.len(), 200);
    assert_eq!(listed.into_iter().collect::<HashSet<_>>(), created);
}

#[test]
fn delete_is_idempotent() {
    let service = service();
    let id = create_at(&service, "n", 1);
    let request = DeleteLogRequest { id: id.clone() };

    let first = service.delete_log(&request).unwrap();
    let second = service.delete_log(&request).unwrap();

    assert!(first.success);
    assert!(second.success);
    assert_eq!(second.id, id);
    assert!(service.list_logs().unwrap().logs.is_empty());
}

#[test]
fn delete_of_unknown_id_reports_success() {
    let service = service();
    create_at(&service, "kept", 1);

    let response = service
        .delete_log(&DeleteLogRequest {
            id: "does-not-exist".to_string(),
        })
        .unwrap();

    assert!(response.success);
    assert_eq!(service.list_logs().unwrap().logs.len(), 1);
}

#[test]
fn date_range_bounds_are_inclusive() {
    let service = service();
    create_at(&service, "before", 999);
    create_at(&service, "start", 1_000);
    create_at(&service, "middle", 1_500);
    create_at(&service, "end", 2_000);
    create_at(&service, "after", 2_001);

    let names = range(
        &service,
        Timestamp::from_millis(1_000),
        Timestamp::from_millis(2_000),
    );

    assert_eq!(names, vec!["start", "middle", "end"]);
}

#[test]
fn single_instant_range_matches_exact_timestamp() {
    let service = service();
    create_at(&service, "exact", 42);
    create_at(&service, "other", 43);

    let at = Timestamp::from_millis(42);
    assert_eq!(range(&service, at, at), vec!["exact"]);
}

#[test]
fn sub_second_bounds_are_exact_to_the_nanosecond() {
    let service = service();
    let at = |nanos| Timestamp { seconds: 1, nanos };
    for (name, nanos) in [
        ("below", 499_999),
        ("start", 500_000),
        ("end", 999_999_998),
        ("above", 999_999_999),
    ] {
        service
            .create_log(&CreateLogRequest::new(name, "body").created_at(at(nanos)))
            .unwrap();
    }

    assert_eq!(
        range(&service, at(500_000), at(999_999_998)),
        vec!["start", "end"]
    );
}

#[test]
fn reversed_range_is_empty_not_error() {
    let service = service();
    create_at(&service, "a", 1_000);
    create_at(&service, "b", 2_000);

    let names = range(
        &service,
        Timestamp::from_millis(2_000),
        Timestamp::from_millis(1_000),
    );

    assert!(names.is_empty());
}

#[test]
fn list_returns_every_record_without_duplicates() {
    let service = service();
    let mut created = HashSet::new();
    for i in 0..20 {
        created.insert(create_at(&service, &format!("log-{i}"), i));
    }

    let listed: Vec<String> = service
        .list_logs()
        .unwrap()
        .logs
        .into_iter()
        .map(|log| log.id)
        .collect();

    assert_eq!(listed.len(), 20);
    assert_eq!(listed.into_iter().collect::<HashSet<_>>(), created);
}

#[test]
fn build_failed_lifecycle() {
    let service = service();

    let created = service
        .create_log(&CreateLogRequest::new("build-failed", "exit 1"))
        .unwrap()
        .log;
    assert_eq!(created.name, "build-failed");
    assert_eq!(created.content, "exit 1");

    let deleted = service
        .delete_log(&DeleteLogRequest {
            id: created.id.clone(),
        })
        .unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(deleted.success);

    let remaining = service.list_logs().unwrap().logs;
    assert!(remaining.iter().all(|log| log.id != created.id));
}
