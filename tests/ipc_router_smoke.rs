mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir, SAMPLE_CSV};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("eduadmind-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["workspacePath"].is_null());

    let methods = [
        ("2", "workspace.select", json!({ "path": workspace.to_string_lossy() })),
        ("3", "session.signIn", json!({ "userId": "smoke", "fullName": "Smoke Test" })),
        ("4", "session.get", json!({})),
        ("5", "setup.get", json!({ "section": "import" })),
        ("6", "students.import.preview", json!({ "text": SAMPLE_CSV })),
        ("7", "students.import.cancel", json!({})),
        ("8", "students.list", json!({})),
        ("9", "students.stats", json!({})),
        ("10", "session.signOut", json!({})),
    ];
    for (id, method, params) in methods {
        let value = request(&mut stdin, &mut reader, id, method, params);
        assert_ne!(
            error_code(&value),
            Some("not_implemented"),
            "unexpected unknown method for {}",
            method
        );
    }

    let unknown = request(&mut stdin, &mut reader, "11", "classes.list", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn malformed_line_gets_bad_json_and_loop_continues() {
    use std::io::{BufRead, Write};

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read bad_json response");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(error_code(&value), Some("bad_json"));

    let _ = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn roster_methods_need_workspace_then_session() {
    let workspace = temp_dir("eduadmind-router-guards");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let no_ws = request(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(error_code(&no_ws), Some("no_workspace"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let no_user = request(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(error_code(&no_user), Some("not_authenticated"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
