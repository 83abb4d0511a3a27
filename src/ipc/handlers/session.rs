use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::session::{SessionProvider, SessionUser};
use serde_json::{json, Value};
use tracing::info;

fn handle_sign_in(state: &mut AppState, req: &Request) -> Value {
    let id = match get_required_str(&req.params, "userId") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let optional = |key: &str| {
        get_optional_str(&req.params, key)
            .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
    };
    let email = match optional("email") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let full_name = match optional("fullName") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let user = SessionUser {
        id,
        email,
        full_name,
    };
    info!(user = %user.id, "signed in");
    let display_name = user.display_name().to_string();
    if state
        .session
        .current_user()
        .is_some_and(|current| current.id != user.id)
    {
        state.preview = None;
    }
    state.session.sign_in(user.clone());
    ok(&req.id, json!({ "user": user, "displayName": display_name }))
}

fn handle_sign_out(state: &mut AppState, req: &Request) -> Value {
    let previous = state.session.sign_out();
    if let Some(u) = &previous {
        info!(user = %u.id, "signed out");
    }
    // Held import candidates belong to the signed-out user.
    state.preview = None;
    ok(&req.id, json!({ "signedOut": previous.is_some() }))
}

fn handle_get(state: &mut AppState, req: &Request) -> Value {
    let user = state.session.current_user();
    let display_name = user.as_ref().map(|u| u.display_name().to_string());
    ok(&req.id, json!({ "user": user, "displayName": display_name }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "session.signIn" => Some(handle_sign_in(state, req)),
        "session.signOut" => Some(handle_sign_out(state, req)),
        "session.get" => Some(handle_get(state, req)),
        _ => None,
    }
}
