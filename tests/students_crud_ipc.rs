mod test_support;

use serde_json::json;
use test_support::{error_code, open_signed_in, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn students_create_get_update_delete_roundtrip() {
    let workspace = temp_dir("eduadmind-students-crud");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_signed_in(&mut stdin, &mut reader, &workspace, "teacher-1");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({
            "student": {
                "firstName": "Ann",
                "lastName": "Lee",
                "email": "",
                "gender": "Female",
                "gradeLevel": "Grade 3",
                "studentId": "S-10",
                "ownerId": "someone-else"
            }
        }),
    );
    let student = &created["student"];
    let id = student["id"].as_str().expect("id").to_string();
    assert_eq!(student["ownerId"], "teacher-1");
    assert_eq!(student["status"], "active");
    assert!(student["email"].is_null());
    assert!(student["createdAt"].as_str().is_some_and(|s| !s.is_empty()));

    let got = request_ok(&mut stdin, &mut reader, "2", "students.get", json!({ "id": id }));
    assert_eq!(got["student"]["firstName"], "Ann");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.update",
        json!({
            "id": id,
            "student": { "firstName": "Anne", "lastName": "Lee", "gradeLevel": "Grade 4" }
        }),
    );
    assert_eq!(updated["student"]["firstName"], "Anne");
    assert_eq!(updated["student"]["gradeLevel"], "Grade 4");
    assert_eq!(updated["student"]["ownerId"], "teacher-1");
    assert_eq!(updated["student"]["createdAt"], student["createdAt"]);

    let deleted = request_ok(&mut stdin, &mut reader, "4", "students.delete", json!({ "id": id }));
    assert_eq!(deleted["deleted"], true);

    let gone = request(&mut stdin, &mut reader, "5", "students.get", json!({ "id": id }));
    assert_eq!(error_code(&gone), Some("not_found"));
    let gone = request(&mut stdin, &mut reader, "6", "students.delete", json!({ "id": id }));
    assert_eq!(error_code(&gone), Some("not_found"));
}

#[test]
fn students_create_rejects_blank_names() {
    let workspace = temp_dir("eduadmind-students-blank");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_signed_in(&mut stdin, &mut reader, &workspace, "teacher-1");

    let bad = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "student": { "firstName": "  ", "lastName": "Lee" } }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));
    assert_eq!(
        bad.pointer("/error/details/issues/0/field").and_then(|v| v.as_str()),
        Some("first_name")
    );

    let missing = request(&mut stdin, &mut reader, "2", "students.create", json!({}));
    assert_eq!(error_code(&missing), Some("bad_params"));

    let stats = request_ok(&mut stdin, &mut reader, "3", "students.stats", json!({}));
    assert_eq!(stats["total"], 0);
}

#[test]
fn students_list_filters_and_stats() {
    let workspace = temp_dir("eduadmind-students-list");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_signed_in(&mut stdin, &mut reader, &workspace, "teacher-1");

    let roster = [
        json!({ "firstName": "John", "lastName": "Doe", "gender": "Male", "gradeLevel": "Grade 6", "email": "john@student.edu" }),
        json!({ "firstName": "Jane", "lastName": "Smith", "gender": "Female", "gradeLevel": "Grade 5", "studentId": "STD-002" }),
        json!({ "firstName": "Jim", "lastName": "Doyle", "gender": "male", "gradeLevel": "Grade 6" }),
    ];
    for (i, s) in roster.into_iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("c{i}"),
            "students.create",
            json!({ "student": s }),
        );
    }

    let all = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(all["totalCount"], 3);
    assert_eq!(all["shownCount"], 3);
    // Newest first.
    assert_eq!(all["students"][0]["firstName"], "Jim");
    let mut grades = all["grades"]
        .as_array()
        .expect("grades")
        .iter()
        .filter_map(|g| g.as_str().map(str::to_string))
        .collect::<Vec<_>>();
    grades.sort();
    assert_eq!(grades, vec!["Grade 5", "Grade 6"]);

    let by_search = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.list",
        json!({ "search": "DO" }),
    );
    assert_eq!(by_search["shownCount"], 2);
    assert_eq!(by_search["totalCount"], 3);

    let by_code = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.list",
        json!({ "search": "std-002" }),
    );
    assert_eq!(by_code["shownCount"], 1);
    assert_eq!(by_code["students"][0]["firstName"], "Jane");

    let by_grade = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.list",
        json!({ "search": "j", "gradeLevel": "Grade 6" }),
    );
    assert_eq!(by_grade["shownCount"], 2);

    let stats = request_ok(&mut stdin, &mut reader, "5", "students.stats", json!({}));
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["active"], 3);
    // Lowercase "male" is kept as entered but not counted.
    assert_eq!(stats["male"], 1);
    assert_eq!(stats["female"], 1);
}

#[test]
fn sign_out_blocks_roster_writes() {
    let workspace = temp_dir("eduadmind-students-signout");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_signed_in(&mut stdin, &mut reader, &workspace, "teacher-1");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "student": { "firstName": "Ann", "lastName": "Lee" } }),
    );
    let out = request_ok(&mut stdin, &mut reader, "2", "session.signOut", json!({}));
    assert_eq!(out["signedOut"], true);

    let denied = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "student": { "firstName": "Bo", "lastName": "Ng" } }),
    );
    assert_eq!(error_code(&denied), Some("not_authenticated"));

    let who = request_ok(&mut stdin, &mut reader, "4", "session.get", json!({}));
    assert!(who["user"].is_null());
}

#[test]
fn workspace_roster_is_shared_while_codes_are_unique_per_owner() {
    let workspace = temp_dir("eduadmind-students-owners");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_signed_in(&mut stdin, &mut reader, &workspace, "teacher-1");

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "student": { "firstName": "Ann", "lastName": "Lee", "studentId": "S-1" } }),
    );
    let first_id = first["student"]["id"].as_str().expect("id").to_string();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.signIn",
        json!({ "userId": "teacher-2" }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "student": { "firstName": "Bo", "lastName": "Ng", "studentId": "S-1" } }),
    );
    assert_eq!(second["student"]["ownerId"], "teacher-2");

    let listed = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    assert_eq!(listed["totalCount"], 2);
    let got = request_ok(&mut stdin, &mut reader, "5", "students.get", json!({ "id": first_id }));
    assert_eq!(got["student"]["ownerId"], "teacher-1");

    let duplicate = request(
        &mut stdin,
        &mut reader,
        "6",
        "students.create",
        json!({ "student": { "firstName": "Cy", "lastName": "Dee", "studentId": "S-1" } }),
    );
    assert_eq!(error_code(&duplicate), Some("db_insert_failed"));
}
