use axum_test::TestServer;
use http::StatusCode;
use roster_server::Employee;
use serde_json::{json, Value};

mod common;

async fn create_employee(server: &TestServer, first: &str, last: &str, email: &str) -> Value {
    let response = server
        .post("/api/employees")
        .json(&common::create_person_json(first, last, email))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_employee_returns_created_record() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/api/employees")
        .json(&json!({
            "firstName": "Ramesh",
            "lastName": "Fegade",
            "email": "ramesh@gmail.com"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["firstName"], "Ramesh");
    assert_eq!(created["lastName"], "Fegade");
    assert_eq!(created["email"], "ramesh@gmail.com");
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    assert_eq!(
        response.header("location").to_str().unwrap(),
        format!("/api/employees/{}", id)
    );
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let created = create_employee(&server, "Arun", "Prajapati", "arunp@gmail.com").await;
    let id = created["id"].as_i64().unwrap();

    let response = server.get(&format!("/api/employees/{}", id)).await;
    response.assert_status(StatusCode::OK);
    let fetched: Value = response.json();

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_client_supplied_id_is_ignored_on_create() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/api/employees")
        .json(&json!({
            "id": 500,
            "firstName": "Ramesh",
            "lastName": "Fegade",
            "email": "ramesh@gmail.com"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_ne!(created["id"], 500);
}

#[tokio::test]
async fn test_list_employees() {
    let (app, backend) = common::setup_test_app_with_backend().await.unwrap();
    let server = TestServer::new(app).unwrap();

    // Seed through the repository like a fixture would
    let repository = backend.employees();
    for employee in [
        Employee::new("Ramesh", "Fegade", "ramesh@gmail.com"),
        Employee::new("Arun", "Prajapati", "arun@gmail.com"),
        Employee::new("Pankaj", "Sonkar", "pankaj@gmail.com"),
    ] {
        repository.save(&employee).await.unwrap();
    }

    let response = server.get("/api/employees").await;
    response.assert_status(StatusCode::OK);
    let employees: Vec<Value> = response.json();

    assert_eq!(employees.len(), 3);
    assert_eq!(employees[0]["firstName"], "Ramesh");
    assert_eq!(employees[2]["firstName"], "Pankaj");
}

#[tokio::test]
async fn test_list_is_empty_initially() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/employees").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_get_unknown_employee_returns_404_without_body() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    create_employee(&server, "Arun", "Prajapati", "arunp@gmail.com").await;

    let response = server.get("/api/employees/9999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/employees/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_update_employee_replaces_all_fields() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let created = create_employee(&server, "Ramesh", "Suryavanshi", "ramv@gmail.com").await;
    let id = created["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/employees/{}", id))
        .json(&json!({
            "firstName": "Rakesh",
            "lastName": "Suryavanshi_Prajapati",
            "email": "rameshvp@gmail.com"
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["firstName"], "Rakesh");
    assert_eq!(updated["lastName"], "Suryavanshi_Prajapati");
    assert_eq!(updated["email"], "rameshvp@gmail.com");

    let fetched: Value = server.get(&format!("/api/employees/{}", id)).await.json();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_unknown_employee_returns_404() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .put("/api/employees/1")
        .json(&common::create_person_json(
            "Ram",
            "Suryavanshi_Prajapati",
            "rameshvp@gmail.com",
        ))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    create_employee(&server, "Ramesh", "Fegade", "ramesh@gmail.com").await;
    let second = create_employee(&server, "Arun", "Prajapati", "arun@gmail.com").await;

    let response = server
        .put(&format!("/api/employees/{}", second["id"]))
        .json(&common::create_person_json("Arun", "Prajapati", "ramesh@gmail.com"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_employee() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let created = create_employee(&server, "Ramesh", "Suryavanshi", "ramv@gmail.com").await;
    let path = format!("/api/employees/{}", created["id"]);

    let response = server.delete(&path).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "Employee deleted successfully!");

    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);

    // Deleting again is still a success
    let response = server.delete(&path).await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_list_after_creates_and_deletes() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        let created =
            create_employee(&server, "Person", &format!("No{}", i), &format!("p{}@example.com", i))
                .await;
        ids.push(created["id"].as_i64().unwrap());
    }

    for id in &ids[..2] {
        server
            .delete(&format!("/api/employees/{}", id))
            .await
            .assert_status(StatusCode::OK);
    }

    let employees: Vec<Value> = server.get("/api/employees").await.json();
    assert_eq!(employees.len(), 3);
}

#[tokio::test]
async fn test_duplicate_email_returns_409() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    create_employee(&server, "Ramesh", "Fegade", "ramesh@gmail.com").await;

    let response = server
        .post("/api/employees")
        .json(&common::create_person_json("Other", "Person", "ramesh@gmail.com"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["status"], 409);
    assert_eq!(
        body["error"],
        "Employee already exists with given email ramesh@gmail.com"
    );

    let employees: Vec<Value> = server.get("/api/employees").await.json();
    assert_eq!(employees.len(), 1);
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected() {
    let app = common::setup_test_app().await.unwrap();
    let server = TestServer::new(app).unwrap();

    let missing_name = server
        .post("/api/employees")
        .json(&json!({ "lastName": "Fegade", "email": "ramesh@gmail.com" }))
        .await;
    missing_name.assert_status(StatusCode::BAD_REQUEST);

    let bad_email = server
        .post("/api/employees")
        .json(&common::create_person_json("Ramesh", "Fegade", "not-an-email"))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);

    let wrong_type = server
        .post("/api/employees")
        .json(&json!({ "firstName": 1, "lastName": "Fegade", "email": "ramesh@gmail.com" }))
        .await;
    wrong_type.assert_status(StatusCode::BAD_REQUEST);

    let employees: Vec<Value> = server.get("/api/employees").await.json();
    assert!(employees.is_empty());
}
