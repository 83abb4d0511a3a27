use serde_json::json;

use crate::import::{ErrorKind, ImportError};

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn import_err(id: &str, e: &ImportError) -> serde_json::Value {
    let kind: ErrorKind = e.kind();
    err(id, kind.code(), e.to_string(), e.details())
}
