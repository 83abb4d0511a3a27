use crate::import::{
    persist_batch, CsvDialect, ImportError, ImportPreview, ImportSource, InvalidRowPolicy,
    DEFAULT_PREVIEW_LIMIT,
};
use crate::ipc::error::{import_err, ok};
use crate::ipc::handlers::setup::{load_section, SetupSection};
use crate::ipc::helpers::{get_optional_str, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::SqliteStudentStore;
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::{info, warn};

struct ImportSettings {
    dialect: CsvDialect,
    policy: InvalidRowPolicy,
    preview_limit: usize,
    students_route: String,
    redirect_delay_ms: i64,
}

fn load_settings(conn: &Connection) -> Result<ImportSettings, HandlerErr> {
    let import = load_section(conn, SetupSection::Import)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    let navigation = load_section(conn, SetupSection::Navigation)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    Ok(ImportSettings {
        dialect: import
            .get("csvDialect")
            .and_then(|v| v.as_str())
            .and_then(CsvDialect::parse)
            .unwrap_or_default(),
        policy: import
            .get("invalidRowPolicy")
            .and_then(|v| v.as_str())
            .and_then(InvalidRowPolicy::parse)
            .unwrap_or_default(),
        preview_limit: import
            .get("previewLimit")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_PREVIEW_LIMIT),
        students_route: navigation
            .get("studentsRoute")
            .and_then(|v| v.as_str())
            .unwrap_or("/students")
            .to_string(),
        redirect_delay_ms: navigation
            .get("redirectDelayMs")
            .and_then(|v| v.as_i64())
            .unwrap_or(2000),
    })
}

fn parse_dialect(params: &Value, default: CsvDialect) -> Result<CsvDialect, HandlerErr> {
    match get_optional_str(params, "dialect")? {
        None => Ok(default),
        Some(s) => CsvDialect::parse(s)
            .ok_or_else(|| HandlerErr::bad_params("dialect must be one of: plain, quoted")),
    }
}

fn parse_policy(params: &Value, default: InvalidRowPolicy) -> Result<InvalidRowPolicy, HandlerErr> {
    match get_optional_str(params, "policy")? {
        None => Ok(default),
        Some(s) => InvalidRowPolicy::parse(s).ok_or_else(|| {
            HandlerErr::bad_params("policy must be one of: reject_batch, skip_invalid")
        }),
    }
}

fn handle_preview(state: &mut AppState, req: &Request) -> Value {
    let settings = match require_db(state).and_then(load_settings) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let dialect = match parse_dialect(&req.params, settings.dialect) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let in_path = match get_optional_str(&req.params, "inPath") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let text = match get_optional_str(&req.params, "text") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let Some(source) = ImportSource::select(in_path, text) else {
        return ok(&req.id, json!({ "selected": false }));
    };

    match ImportPreview::build(&source, dialect) {
        Ok(preview) => {
            info!(
                source = %preview.source,
                dialect = preview.dialect.as_str(),
                total = preview.total(),
                "import preview ready"
            );
            let mut result = preview.to_json(settings.preview_limit);
            result["selected"] = json!(true);
            state.preview = Some(preview);
            ok(&req.id, result)
        }
        Err(e) => {
            warn!(source = %source.label(), error = %e, "import preview failed");
            import_err(&req.id, &e)
        }
    }
}

fn handle_apply(state: &mut AppState, req: &Request) -> Value {
    let conn = match require_db(state) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let settings = match load_settings(conn) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let policy = match parse_policy(&req.params, settings.policy) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let Some(preview) = state.preview.as_ref() else {
        return import_err(&req.id, &ImportError::NothingToImport);
    };

    let mut store = SqliteStudentStore::new(conn);
    let outcome = persist_batch(&state.session, &mut store, preview.candidates(), policy);
    match outcome {
        Ok(outcome) => {
            state.preview = None;
            ok(
                &req.id,
                json!({
                    "imported": outcome.imported,
                    "skipped": outcome.skipped,
                    "policy": policy.as_str(),
                    "message": format!("Successfully imported {} students!", outcome.imported),
                    "redirect": {
                        "route": settings.students_route,
                        "afterMs": settings.redirect_delay_ms
                    }
                }),
            )
        }
        // The preview stays so the user can fix the file and retry.
        Err(e) => import_err(&req.id, &e),
    }
}

fn handle_cancel(state: &mut AppState, req: &Request) -> Value {
    let cleared = state.preview.take().is_some();
    ok(&req.id, json!({ "cleared": cleared }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "students.import.preview" => Some(handle_preview(state, req)),
        "students.import.apply" => Some(handle_apply(state, req)),
        "students.import.cancel" => Some(handle_cancel(state, req)),
        _ => None,
    }
}
