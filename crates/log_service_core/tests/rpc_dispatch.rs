use log_service_core::db::open_db_in_memory;
use log_service_core::{dispatch_line, CollectionName, LogService, RpcResponse, SqliteLogStore};
use serde_json::{json, Value};

fn service() -> LogService<SqliteLogStore> {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteLogStore::new(conn, CollectionName::parse("logs").unwrap()).unwrap();
    LogService::new(store)
}

fn call(service: &LogService<SqliteLogStore>, request: Value) -> Value {
    let response: RpcResponse =
        serde_json::from_str(&dispatch_line(service, &request.to_string())).unwrap();
    assert!(response.ok, "unexpected failure: {:?}", response.error);
    response.result.unwrap()
}

#[test]
fn create_list_delete_over_json() {
    let service = service();

    let created = call(
        &service,
        json!({
            "method": "CreateLog",
            "params": {
                "name": "build-failed",
                "content": "exit 1",
                "created_at": { "seconds": 1_700_000_000, "nanos": 0 }
            }
        }),
    );
    let log = &created["log"];
    let id = log["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(log["name"], "build-failed");
    assert_eq!(log["content"], "exit 1");
    assert_eq!(log["created_at"], json!({ "seconds": 1_700_000_000, "nanos": 0 }));

    let listed = call(&service, json!({ "method": "ListLog" }));
    assert_eq!(listed["logs"].as_array().unwrap().len(), 1);
    assert_eq!(listed["logs"][0]["id"], id.as_str());

    let deleted = call(
        &service,
        json!({ "method": "DeleteLog", "params": { "id": id } }),
    );
    assert_eq!(deleted, json!({ "id": id, "success": true }));

    let listed = call(&service, json!({ "method": "ListLog", "params": {} }));
    assert!(listed["logs"].as_array().unwrap().is_empty());
}

#[test]
fn list_by_date_over_json_is_inclusive() {
    let service = service();
    for (name, seconds) in [("early", 99), ("start", 100), ("end", 200), ("late", 201)] {
        call(
            &service,
            json!({
                "method": "CreateLog",
                "params": {
                    "name": name,
                    "content": "",
                    "created_at": { "seconds": seconds }
                }
            }),
        );
    }

    let result = call(
        &service,
        json!({
            "method": "ListLogByDate",
            "params": {
                "start_date": { "seconds": 100, "nanos": 0 },
                "end_date": { "seconds": 200, "nanos": 0 }
            }
        }),
    );

    let names: Vec<&str> = result["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["start", "end"]);
}

#[test]
fn list_by_date_without_bounds_is_invalid_request() {
    let service = service();

    let response: RpcResponse = serde_json::from_str(&dispatch_line(
        &service,
        r#"{"id": "req-1", "method": "ListLogByDate", "params": {"start_date": {"seconds": 1}}}"#,
    ))
    .unwrap();

    assert!(!response.ok);
    assert_eq!(response.id, Some(json!("req-1")));
    assert_eq!(response.error.unwrap().code, "invalid_request");
}
