use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_db, require_user, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::roster::{distinct_grades, RosterFilter, RosterStats};
use crate::store::{SqliteStudentStore, StoreError};
use crate::student::StudentRecord;
use serde_json::{json, Value};
use tracing::info;

fn store_err(code: &'static str, e: StoreError) -> HandlerErr {
    HandlerErr {
        code,
        message: e.message,
        details: Some(json!({ "table": "students" })),
    }
}

/// Reads `params.student` into a record and rejects rows missing a name.
fn parse_student(params: &Value) -> Result<StudentRecord, HandlerErr> {
    let Some(raw) = params.get("student").filter(|v| v.is_object()) else {
        return Err(HandlerErr::bad_params("student must be an object"));
    };
    let record: StudentRecord = serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid student: {e}")))?;
    let record = record.normalized();
    let errors = record
        .validate()
        .into_iter()
        .filter(|i| i.is_error())
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        return Err(HandlerErr {
            code: "bad_params",
            message: "firstName/lastName must not be empty".to_string(),
            details: Some(json!({ "issues": errors })),
        });
    }
    Ok(record)
}

fn list(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    require_user(state)?;
    let filter = RosterFilter::new(
        get_optional_str(params, "search")?,
        get_optional_str(params, "gradeLevel")?,
    );
    let students = SqliteStudentStore::new(conn)
        .list()
        .map_err(|e| store_err("db_query_failed", e))?;
    let shown = filter.apply(&students);
    Ok(json!({
        "students": shown,
        "shownCount": shown.len(),
        "totalCount": students.len(),
        "grades": distinct_grades(&students),
    }))
}

fn get(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    require_user(state)?;
    let id = get_required_str(params, "id")?;
    match SqliteStudentStore::new(conn)
        .get(&id)
        .map_err(|e| store_err("db_query_failed", e))?
    {
        Some(s) => Ok(json!({ "student": s })),
        None => Err(HandlerErr::new("not_found", "Student not found")),
    }
}

fn create(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    let user = require_user(state)?;
    let mut record = parse_student(params)?;
    record.owner_id = Some(user.id);
    let created = SqliteStudentStore::new(conn)
        .insert(&record)
        .map_err(|e| store_err("db_insert_failed", e))?;
    info!(student = %created.id, "student created");
    Ok(json!({ "student": created }))
}

fn update(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    require_user(state)?;
    let id = get_required_str(params, "id")?;
    let record = parse_student(params)?;
    match SqliteStudentStore::new(conn)
        .update(&id, &record)
        .map_err(|e| store_err("db_update_failed", e))?
    {
        Some(s) => Ok(json!({ "student": s })),
        None => Err(HandlerErr::new("not_found", "Student not found")),
    }
}

fn delete(state: &AppState, params: &Value) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    require_user(state)?;
    let id = get_required_str(params, "id")?;
    let deleted = SqliteStudentStore::new(conn)
        .delete(&id)
        .map_err(|e| store_err("db_update_failed", e))?;
    if !deleted {
        return Err(HandlerErr::new("not_found", "Student not found"));
    }
    info!(student = %id, "student deleted");
    Ok(json!({ "deleted": true }))
}

fn stats(state: &AppState) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    require_user(state)?;
    let students = SqliteStudentStore::new(conn)
        .list()
        .map_err(|e| store_err("db_query_failed", e))?;
    Ok(json!(RosterStats::from_students(&students)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "students.list" => list(state, &req.params),
        "students.get" => get(state, &req.params),
        "students.create" => create(state, &req.params),
        "students.update" => update(state, &req.params),
        "students.delete" => delete(state, &req.params),
        "students.stats" => stats(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
