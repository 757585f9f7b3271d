//! HTTP client tests against a local mock server

use chrono::NaiveDate;
use mockito::{Matcher, Server};
use serde_json::json;

use slotwise::adapters::clinic::{AppointmentApi, HttpClinicApi, LedgerEntry, NewAppointmentRequest};
use slotwise::config::{secret_string, ApiConfig, RetryConfig};
use slotwise::domain::{
    ApiError, AppointmentId, AppointmentStatus, ClockTime, ColorTag, PatientId, VisitType,
};

fn client_for(server: &Server) -> HttpClinicApi {
    let config = ApiConfig {
        base_url: server.url(),
        auth_token: Some(secret_string("test-token".to_string())),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ledger_enabled: true,
    };
    HttpClinicApi::new(&config).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

#[tokio::test]
async fn test_lists_appointments_for_a_date() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/appointments/date/2024-06-10")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "appointments": [
                    {
                        "_id": "a1",
                        "patientId": {"_id": "P1", "fullName": "Ana Silva"},
                        "appointmentDate": "2024-06-10T00:00:00.000Z",
                        "appointmentTime": "10:00",
                        "duration": 30,
                        "visitType": "Regular Visit",
                        "status": "Scheduled"
                    },
                    {
                        "_id": "broken",
                        "appointmentDate": "2024-06-10",
                        "appointmentTime": "25:99"
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = client_for(&server);
    let appointments = api.appointments_on(day()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(appointments.len(), 1);
    let first = &appointments[0];
    assert_eq!(first.id.as_str(), "a1");
    assert_eq!(first.patient_display_name, "Ana Silva");
    assert_eq!(first.time, ClockTime::from_hm(10, 0).unwrap());
    assert_eq!(first.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn test_creates_an_appointment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/appointments")
        .match_body(Matcher::PartialJson(json!({
            "patientId": "P1",
            "appointmentDate": "2024-06-10",
            "appointmentTime": "09:00",
            "duration": 30,
            "visitType": "New Patient",
            "colorTag": "green"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "appointment": {
                    "_id": "new-1",
                    "patientId": "P1",
                    "appointmentDate": "2024-06-10",
                    "appointmentTime": "09:00",
                    "duration": 30
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = client_for(&server);
    let request = NewAppointmentRequest {
        patient_id: PatientId::new("P1").unwrap(),
        appointment_date: "2024-06-10".to_string(),
        appointment_time: "09:00".to_string(),
        duration: 30,
        visit_type: VisitType::NewPatient,
        color_tag: ColorTag::Green,
        notes: String::new(),
        chief_complaint: None,
    };

    let id = api.create_appointment(&request).await.unwrap();
    mock.assert_async().await;
    assert_eq!(id.as_str(), "new-1");
}

#[tokio::test]
async fn test_create_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/appointments")
        .with_status(500)
        .with_body(r#"{"success": false, "message": "database offline"}"#)
        .expect(1)
        .create_async()
        .await;

    let api = client_for(&server);
    let request = NewAppointmentRequest {
        patient_id: PatientId::new("P1").unwrap(),
        appointment_date: "2024-06-10".to_string(),
        appointment_time: "09:00".to_string(),
        duration: 30,
        visit_type: VisitType::RegularVisit,
        color_tag: ColorTag::Green,
        notes: String::new(),
        chief_complaint: None,
    };

    let err = api.create_appointment(&request).await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(
        err,
        ApiError::ServerError { status: 500, ref message } if message == "database offline"
    ));
}

#[tokio::test]
async fn test_rejected_write_is_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PATCH", "/api/appointments/a1/status")
        .match_body(Matcher::Json(json!({"status": "Cancelled"})))
        .with_status(200)
        .with_body(r#"{"success": false, "message": "appointment is locked"}"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let err = api
        .update_status(&AppointmentId::new("a1").unwrap(), AppointmentStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "appointment is locked"));
}

#[tokio::test]
async fn test_missing_appointment_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/appointments/missing")
        .with_status(404)
        .with_body(r#"{"success": false, "message": "Appointment not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let api = client_for(&server);
    let err = api
        .appointment(&AppointmentId::new("missing").unwrap())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_reads_are_retried_on_server_errors() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/appointments/date/2024-06-10")
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create_async()
        .await;

    let api = client_for(&server);
    let err = api.appointments_on(day()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::ServerError { status: 503, .. }));
}

#[tokio::test]
async fn test_patient_search_sends_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/patients")
        .match_query(Matcher::UrlEncoded("search".into(), "ana si".into()))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "patients": [
                    {"_id": "P1", "firstName": "Ana", "lastName": "Silva", "recordNumber": "R-100"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = client_for(&server);
    let patients = api.search_patients("ana si").await.unwrap();

    mock.assert_async().await;
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].display_name, "Ana Silva");
    assert_eq!(patients[0].record_number.as_deref(), Some("R-100"));
}

#[tokio::test]
async fn test_ledger_entry_is_posted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/ledger")
        .match_body(Matcher::PartialJson(json!({
            "appointmentId": "a1",
            "action": "appointment_cancelled"
        })))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let api = client_for(&server);
    let entry = LedgerEntry::new(
        AppointmentId::new("a1").unwrap(),
        None,
        "appointment_cancelled",
        "Cancelled (was Scheduled)",
    );
    api.record_ledger_entry(&entry).await.unwrap();
    mock.assert_async().await;
}
