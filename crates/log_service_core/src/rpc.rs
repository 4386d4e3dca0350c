//! JSON request dispatch for the log service entry points.
//!
//! # Responsibility
//! - Route `{"method", "params"}` envelopes to `LogService` operations.
//! - Turn every outcome, including malformed input, into a response envelope.
//!
//! # Invariants
//! - Dispatch never panics and never returns a partial result.
//! - Method names are stable: `CreateLog`, `DeleteLog`, `ListLog`,
//!   `ListLogByDate`, `Health`.

use crate::service::log_service::{
    CreateLogRequest, DeleteLogRequest, ListLogsByDateRequest, LogService, LogServiceError,
};
use crate::store::log_store::LogStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HEALTH_SERVING: &str = "SERVING";

/// Incoming request envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RpcRequest {
    /// Caller correlation id, echoed back untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

/// Outgoing response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(RpcError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Parses one JSON envelope, dispatches it and serializes the response.
pub fn dispatch_line<S: LogStore>(service: &LogService<S>, line: &str) -> String {
    let response = match serde_json::from_str::<RpcRequest>(line) {
        Ok(request) => dispatch(service, request),
        Err(err) => RpcResponse::failure(None, "invalid_request", format!("malformed envelope: {err}")),
    };
    encode(&response)
}

/// Dispatches a parsed envelope to the matching service operation.
pub fn dispatch<S: LogStore>(service: &LogService<S>, request: RpcRequest) -> RpcResponse {
    let RpcRequest { id, method, params } = request;

    let outcome = match method.as_str() {
        "CreateLog" => parse_params::<CreateLogRequest>(params)
            .and_then(|req| to_result(service.create_log(&req))),
        "DeleteLog" => parse_params::<DeleteLogRequest>(params)
            .and_then(|req| to_result(service.delete_log(&req))),
        "ListLog" => to_result(service.list_logs()),
        "ListLogByDate" => parse_params::<ListLogsByDateRequest>(params)
            .and_then(|req| to_result(service.list_logs_by_date(&req))),
        "Health" => to_value(&HealthResponse {
            status: HEALTH_SERVING,
            version: crate::core_version(),
        }),
        other => Err(RpcError {
            code: "unknown_method".to_string(),
            message: format!("unknown method `{other}`"),
        }),
    };

    match outcome {
        Ok(result) => RpcResponse::success(id, result),
        Err(err) => RpcResponse::failure(id, err.code, err.message),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|err| RpcError {
        code: "invalid_request".to_string(),
        message: format!("invalid params: {err}"),
    })
}

fn to_result<T: Serialize>(result: Result<T, LogServiceError>) -> Result<Value, RpcError> {
    match result {
        Ok(response) => to_value(&response),
        Err(err) => Err(RpcError {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    }
}

fn to_value<T: Serialize>(response: &T) -> Result<Value, RpcError> {
    serde_json::to_value(response).map_err(|err| RpcError {
        code: "internal".to_string(),
        message: format!("failed to encode response: {err}"),
    })
}

fn encode(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|err| {
        format!(r#"{{"ok":false,"error":{{"code":"internal","message":"failed to encode response: {err}"}}}}"#)
    })
}
