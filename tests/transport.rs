//! Integration tests for the transport and session layers against a mock
//! backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use httpmock::prelude::*;
use httpmock::Method::PATCH;

use staffhub::api::types::{JobFilters, JobStatus, LoginRequest, ProfileUpdate, StaffFilters};
use staffhub::{Config, MemoryTokenStore, RetryPolicy, Staffhub, TokenStore};

fn hub_for(server: &MockServer) -> (Staffhub, Arc<MemoryTokenStore>) {
  let mut config = Config::default();
  config.api.base_url = format!("{}/api", server.base_url());
  let tokens = Arc::new(MemoryTokenStore::new());
  let hub = Staffhub::with_retry(&config, tokens.clone(), RetryPolicy::none()).unwrap();
  (hub, tokens)
}

fn staff_page_body() -> serde_json::Value {
  serde_json::json!({
    "data": [{
      "id": "s1", "email": "ada@example.com", "name": "Ada", "role": "staff",
      "createdAt": "2024-01-15T10:30:00Z", "updatedAt": "2024-01-15T10:30:00Z",
      "availability": "Available", "completedProjects": 12,
      "successRate": 0.97, "responseTime": "2h",
      "verificationStatus": "verified"
    }],
    "pagination": { "page": 1, "limit": 20, "total": 1, "totalPages": 1 }
  })
}

#[tokio::test]
async fn test_bearer_token_attached_when_present() {
  let server = MockServer::start_async().await;
  let (hub, tokens) = hub_for(&server);
  tokens.store("tok-123", "ref-123").unwrap();

  let mock = server
    .mock_async(|when, then| {
      when
        .method(GET)
        .path("/api/staff")
        .header("authorization", "Bearer tok-123");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(staff_page_body());
    })
    .await;

  let page = hub.staff.list(&StaffFilters::default()).await.unwrap();
  mock.assert_async().await;
  assert_eq!(page.data.len(), 1);
  assert_eq!(page.data[0].user.name, "Ada");
}

#[tokio::test]
async fn test_requests_without_a_session_carry_no_auth_header() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  let mock = server
    .mock_async(|when, then| {
      when
        .method(GET)
        .path("/api/staff")
        .matches(|req| {
          !req
            .headers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        });
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(staff_page_body());
    })
    .await;

  hub.staff.list(&StaffFilters::default()).await.unwrap();
  mock.assert_async().await;
}

#[tokio::test]
async fn test_error_body_message_and_code_surface() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  server
    .mock_async(|when, then| {
      when.method(POST).path("/api/auth/login");
      then
        .status(401)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({
          "message": "Invalid credentials",
          "code": "bad_credentials"
        }));
    })
    .await;

  let err = hub
    .auth
    .login(&LoginRequest {
      email: "ada@example.com".to_string(),
      password: "nope".to_string(),
    })
    .await
    .unwrap_err();

  assert_eq!(err.status, 401);
  assert_eq!(err.message, "Invalid credentials");
  assert_eq!(err.code.as_deref(), Some("bad_credentials"));
}

#[tokio::test]
async fn test_unparseable_error_body_falls_back_to_generic_message() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  server
    .mock_async(|when, then| {
      when.method(GET).path("/api/loans/terms");
      then.status(500).body("<html>oops</html>");
    })
    .await;

  let err = hub.loans.terms().await.unwrap_err();
  assert_eq!(err.status, 500);
  assert_eq!(err.code, None);
  assert_eq!(err.message, "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn test_filter_fields_become_query_parameters() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  let mock = server
    .mock_async(|when, then| {
      when
        .method(GET)
        .path("/api/jobs")
        .query_param("status", "open")
        .query_param("page", "2");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({
          "data": [],
          "pagination": { "page": 2, "limit": 20, "total": 0, "totalPages": 0 }
        }));
    })
    .await;

  let filters = JobFilters {
    status: Some(JobStatus::Open),
    page: Some(2),
    ..JobFilters::default()
  };
  hub.jobs.list(&filters).await.unwrap();
  mock.assert_async().await;
}

#[tokio::test]
async fn test_login_stores_tokens_and_logout_clears_them() {
  let server = MockServer::start_async().await;
  let (hub, tokens) = hub_for(&server);

  server
    .mock_async(|when, then| {
      when.method(POST).path("/api/auth/login");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({
          "user": {
            "id": "u1", "email": "ada@example.com", "name": "Ada",
            "role": "staff",
            "createdAt": "2024-01-15T10:30:00Z",
            "updatedAt": "2024-01-15T10:30:00Z"
          },
          "token": "access-1",
          "refreshToken": "refresh-1"
        }));
    })
    .await;
  server
    .mock_async(|when, then| {
      when.method(POST).path("/api/auth/logout");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({ "success": true }));
    })
    .await;

  let user = hub
    .auth
    .login(&LoginRequest {
      email: "ada@example.com".to_string(),
      password: "pw".to_string(),
    })
    .await
    .unwrap();
  assert_eq!(user.id, "u1");
  assert_eq!(tokens.access_token().as_deref(), Some("access-1"));

  // current_user is served from the seeded cache, no /auth/me mock needed.
  let me = hub.auth.current_user().await.unwrap();
  assert_eq!(me.id, "u1");

  hub.auth.logout().await.unwrap();
  assert_eq!(tokens.access_token(), None);
}

#[tokio::test]
async fn test_profile_update_patches_and_reseeds_the_user_cache() {
  let server = MockServer::start_async().await;
  let (hub, tokens) = hub_for(&server);
  tokens.store("tok", "ref").unwrap();

  let mock = server
    .mock_async(|when, then| {
      when
        .method(PATCH)
        .path("/api/auth/profile")
        .json_body_partial(r#"{ "bio": "Rustacean" }"#);
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({
          "id": "u1", "email": "ada@example.com", "name": "Ada",
          "role": "staff", "bio": "Rustacean",
          "createdAt": "2024-01-15T10:30:00Z",
          "updatedAt": "2024-01-15T10:30:00Z"
        }));
    })
    .await;

  let update = ProfileUpdate {
    bio: Some("Rustacean".to_string()),
    ..ProfileUpdate::default()
  };
  let user = hub.auth.update_profile(&update).await.unwrap();
  mock.assert_async().await;
  assert_eq!(user.bio.as_deref(), Some("Rustacean"));

  // The returned record was written straight into the user slot.
  let me = hub.auth.current_user().await.unwrap();
  assert_eq!(me.bio.as_deref(), Some("Rustacean"));
}

#[tokio::test]
async fn test_failed_logout_leaves_the_session_intact() {
  let server = MockServer::start_async().await;
  let (hub, tokens) = hub_for(&server);
  tokens.store("access-1", "refresh-1").unwrap();

  server
    .mock_async(|when, then| {
      when.method(POST).path("/api/auth/logout");
      then.status(500).body("");
    })
    .await;

  let err = hub.auth.logout().await.unwrap_err();
  assert_eq!(err.status, 500);

  // The write failed, so no reconciliation: tokens survive for a retry.
  assert_eq!(tokens.access_token().as_deref(), Some("access-1"));
  assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-1"));
  assert!(hub.auth.is_signed_in());
}

fn job_page_body(page: u32, total_pages: u32, title: &str) -> serde_json::Value {
  serde_json::json!({
    "data": [{
      "id": format!("j{}", page), "title": title, "description": "",
      "company": "Acme", "companyId": "c1", "budget": "5k",
      "duration": "3mo", "location": "Remote", "remote": true,
      "type": "contract", "status": "open", "applicants": 0,
      "postedAt": "2024-01-15T10:30:00Z"
    }],
    "pagination": { "page": page, "limit": 1, "total": total_pages, "totalPages": total_pages }
  })
}

#[tokio::test]
async fn test_list_all_walks_every_page() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  let first = server
    .mock_async(|when, then| {
      when.method(GET).path("/api/jobs").query_param("page", "1");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(job_page_body(1, 2, "Backend engineer"));
    })
    .await;
  let second = server
    .mock_async(|when, then| {
      when.method(GET).path("/api/jobs").query_param("page", "2");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(job_page_body(2, 2, "Data engineer"));
    })
    .await;

  let jobs = hub.jobs.list_all(&JobFilters::default()).await.unwrap();
  first.assert_async().await;
  second.assert_async().await;
  assert_eq!(jobs.len(), 2);
  assert_eq!(jobs[0].title, "Backend engineer");
  assert_eq!(jobs[1].title, "Data engineer");
}

#[tokio::test]
async fn test_list_all_stops_when_the_reported_page_never_advances() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  // The backend claims five pages but keeps answering with page 1, so the
  // requested page stops advancing after the second call.
  let first = server
    .mock_async(|when, then| {
      when.method(GET).path("/api/jobs").query_param("page", "1");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(job_page_body(1, 5, "Backend engineer"));
    })
    .await;
  let second = server
    .mock_async(|when, then| {
      when.method(GET).path("/api/jobs").query_param("page", "2");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(job_page_body(1, 5, "Backend engineer"));
    })
    .await;

  let jobs = hub.jobs.list_all(&JobFilters::default()).await.unwrap();
  first.assert_hits_async(1).await;
  second.assert_hits_async(1).await;
  assert_eq!(jobs.len(), 2);
}

#[tokio::test]
async fn test_repeated_reads_are_served_from_cache() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  let mock = server
    .mock_async(|when, then| {
      when.method(GET).path("/api/staff");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(staff_page_body());
    })
    .await;

  hub.staff.list(&StaffFilters::default()).await.unwrap();
  hub.staff.list(&StaffFilters::default()).await.unwrap();
  mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_upload_streams_multipart_and_reports_progress() {
  let server = MockServer::start_async().await;
  let (hub, _tokens) = hub_for(&server);

  let mock = server
    .mock_async(|when, then| {
      when
        .method(POST)
        .path("/api/loans/l1/documents")
        .header_exists("content-type");
      then
        .status(200)
        .header("content-type", "application/json")
        .json_body(serde_json::json!({ "success": true }));
    })
    .await;

  // Three 64 KiB chunks plus a remainder.
  let payload = vec![7u8; 200 * 1024];
  let total = payload.len() as u64;
  let reported = Arc::new(AtomicU64::new(0));
  let reported_clone = reported.clone();

  let ack = hub
    .loans
    .upload_document(
      "l1",
      "statement.pdf",
      payload,
      Some(Arc::new(move |sent, expected| {
        assert_eq!(expected, total);
        reported_clone.store(sent, Ordering::SeqCst);
      })),
    )
    .await
    .unwrap();

  mock.assert_async().await;
  assert!(ack.success);
  assert_eq!(reported.load(Ordering::SeqCst), total);
}
