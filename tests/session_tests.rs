use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use crmdesk::model::{RegisterForm, UserProfile};
use crmdesk::session::storage::{LOGGED_USER_SLOT, PROFILE_SLOT, TOKEN_SLOT};
use crmdesk::session::{
    Authenticator, FileStorage, KeyValueStorage, LocalDirectory, MemoryStorage,
    RemoteAuthenticator, RouteDecision, Session, guard_route,
};
use crmdesk::transport::{HttpTransport, Transport};
use crmdesk::{CrmError, SessionStore};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn profile(email: &str) -> UserProfile {
    UserProfile {
        email: email.to_string(),
        first_name: "Jane".into(),
        last_name: "Cooper".into(),
        phone: "078 5432 8505".into(),
        company: "ClientEdge".into(),
        industry: "Legal Services".into(),
        country: "Canada".into(),
        ..UserProfile::default()
    }
}

fn local_store(storage: Arc<dyn KeyValueStorage>) -> (SessionStore, Arc<LocalDirectory>) {
    let directory = Arc::new(LocalDirectory::with_cost(storage, 4));
    (SessionStore::new(directory.clone()), directory)
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let (sessions, _) = local_store(Arc::new(MemoryStorage::new()));
    sessions
        .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
        .await
        .unwrap();

    let session = sessions.login("  JANE@X.com ", "secret").await.unwrap();
    assert_eq!(session.user.email, "jane@x.com");
    assert!(!session.token.is_empty());
    assert!(sessions.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_leaves_session_unchanged() {
    let (sessions, _) = local_store(Arc::new(MemoryStorage::new()));
    sessions
        .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
        .await
        .unwrap();

    let err = sessions.login("jane@x.com", "wrong").await.unwrap_err();
    assert_eq!(err, CrmError::InvalidCredentials);
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(sessions.current_user().is_none());

    let first = sessions.login("jane@x.com", "secret").await.unwrap();
    sessions.login("jane@x.com", "wrong").await.unwrap_err();
    assert_eq!(sessions.current_user().unwrap(), first);
}

#[tokio::test]
async fn test_logout_then_current_user_is_none() {
    let storage = Arc::new(MemoryStorage::new());
    let (sessions, _) = local_store(storage.clone());
    sessions
        .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
        .await
        .unwrap();
    sessions.login("jane@x.com", "secret").await.unwrap();

    let current = sessions.current_user().unwrap();
    assert_eq!(current.user, profile("jane@x.com"));
    let raw = storage.get(LOGGED_USER_SLOT).unwrap().unwrap();
    assert!(!raw.contains("secret"));
    assert!(!raw.contains("passwordHash"));

    sessions.logout();
    assert!(sessions.current_user().is_none());
    assert!(!sessions.is_authenticated());
    assert_eq!(
        guard_route(&sessions),
        RouteDecision::Redirect("/login")
    );

    // logging out twice is harmless
    sessions.logout();
}

#[tokio::test]
async fn test_duplicate_registration_in_any_case_is_rejected() {
    let (sessions, directory) = local_store(Arc::new(MemoryStorage::new()));
    sessions
        .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
        .await
        .unwrap();

    for variant in ["jane@x.com", "JANE@X.COM", "  Jane@x.com  "] {
        let err = sessions
            .register(&RegisterForm::new(profile(variant), "other"))
            .await
            .unwrap_err();
        assert_eq!(err, CrmError::DuplicateEmail("jane@x.com".into()));
        assert_eq!(err.to_string(), "Email already registered");
    }
    assert_eq!(directory.users().len(), 1);
}

#[tokio::test]
async fn test_register_validates_before_touching_storage() {
    let (sessions, directory) = local_store(Arc::new(MemoryStorage::new()));
    let form = RegisterForm {
        confirm_password: "nope".into(),
        ..RegisterForm::new(profile("jane@x.com"), "secret")
    };

    let err = sessions.register(&form).await.unwrap_err();
    assert!(err.is_field_scoped());
    assert!(directory.users().is_empty());
}

/// Local directory that answers slowly, so two submissions overlap.
struct SlowDirectory(LocalDirectory);

#[async_trait]
impl Authenticator for SlowDirectory {
    async fn register(&self, form: &RegisterForm) -> crmdesk::Result<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.0.register(form).await
    }

    async fn login(&self, email: &str, password: &str) -> crmdesk::Result<Session> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.0.login(email, password).await
    }

    fn logout(&self) {
        self.0.logout();
    }

    fn current_user(&self) -> Option<Session> {
        self.0.current_user()
    }
}

#[tokio::test]
async fn test_second_login_while_first_in_flight_is_refused() {
    let directory = LocalDirectory::with_cost(Arc::new(MemoryStorage::new()), 4);
    let sessions = SessionStore::new(Arc::new(SlowDirectory(directory)));
    sessions
        .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        sessions.login("jane@x.com", "secret"),
        sessions.login("jane@x.com", "secret")
    );
    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), CrmError::SubmissionInFlight);

    let ann_form = RegisterForm::new(profile("ann@x.com"), "secret");
    let bob_form = RegisterForm::new(profile("bob@x.com"), "secret");
    let (first, second) = tokio::join!(
        sessions.register(&ann_form),
        sessions.register(&bob_form)
    );
    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), CrmError::SubmissionInFlight);

    // both gates reopen once their first submission settles
    sessions.login("ann@x.com", "secret").await.unwrap();
}

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.json");

    {
        let (sessions, _) = local_store(Arc::new(FileStorage::open(&path).unwrap()));
        sessions
            .register(&RegisterForm::new(profile("jane@x.com"), "secret"))
            .await
            .unwrap();
        sessions.login("jane@x.com", "secret").await.unwrap();
    }

    let (sessions, _) = local_store(Arc::new(FileStorage::open(&path).unwrap()));
    assert_eq!(guard_route(&sessions), RouteDecision::Render);
    assert_eq!(sessions.current_user().unwrap().user.email, "jane@x.com");
}

// ---------------------------------------------------------------------------
// REST generation
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct AuthServer {
    logins: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn login(
    State(server): State<AuthServer>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    server.logins.lock().unwrap().push(form.clone());
    if form.get("password").map(String::as_str) == Some("sparse") {
        return (
            StatusCode::OK,
            Json(json!({"access_token": "tok-7", "user": {"id": 7, "first_name": "Jane"}})),
        );
    }
    if form.get("password").map(String::as_str) == Some("secret") {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": "tok-123",
                "token_type": "bearer",
                "user": {"email": form["username"], "first_name": "Jane", "last_name": "Cooper"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@x.com" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        )
    } else {
        (StatusCode::CREATED, Json(json!({"id": 1})))
    }
}

async fn spawn_auth_server() -> (String, AuthServer) {
    let server = AuthServer::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), server)
}

fn remote_store(base_url: &str) -> (SessionStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_credentials(storage.clone()),
    );
    let sessions = SessionStore::new(Arc::new(RemoteAuthenticator::new(
        transport,
        storage.clone(),
    )));
    (sessions, storage)
}

#[tokio::test]
async fn test_remote_login_stores_token_and_profile() {
    let (base_url, server) = spawn_auth_server().await;
    let (sessions, storage) = remote_store(&base_url);

    let session = sessions.login("Jane@X.com", "secret").await.unwrap();

    assert_eq!(session.token, "tok-123");
    assert_eq!(session.user.first_name, "Jane");
    assert_eq!(storage.get(TOKEN_SLOT).unwrap().as_deref(), Some("tok-123"));
    assert!(storage.get(PROFILE_SLOT).unwrap().is_some());
    assert!(sessions.is_authenticated());

    let sent = server.logins.lock().unwrap()[0].clone();
    assert_eq!(sent["username"], "jane@x.com");

    sessions.logout();
    assert!(!sessions.is_authenticated());
    assert!(storage.get(TOKEN_SLOT).unwrap().is_none());
}

#[tokio::test]
async fn test_remote_profile_without_email_uses_login_email() {
    let (base_url, _) = spawn_auth_server().await;
    let (sessions, storage) = remote_store(&base_url);

    let session = sessions.login("Jane@X.com", "sparse").await.unwrap();

    assert_eq!(session.token, "tok-7");
    assert_eq!(session.user.email, "jane@x.com");
    assert_eq!(session.user.first_name, "Jane");
    assert!(sessions.is_authenticated());
    assert_eq!(storage.get(TOKEN_SLOT).unwrap().as_deref(), Some("tok-7"));
    assert_eq!(sessions.current_user().unwrap(), session);
}

#[tokio::test]
async fn test_remote_rejection_is_invalid_credentials() {
    let (base_url, _) = spawn_auth_server().await;
    let (sessions, storage) = remote_store(&base_url);

    let err = sessions.login("jane@x.com", "wrong").await.unwrap_err();
    assert_eq!(err, CrmError::InvalidCredentials);
    assert!(storage.get(TOKEN_SLOT).unwrap().is_none());
}

#[tokio::test]
async fn test_remote_register_surfaces_server_message_verbatim() {
    let (base_url, _) = spawn_auth_server().await;
    let (sessions, _) = remote_store(&base_url);

    let err = sessions
        .register(&RegisterForm::new(profile("taken@x.com"), "secret"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CrmError::RemoteValidation("Email already registered".into())
    );

    sessions
        .register(&RegisterForm::new(profile("new@x.com"), "secret"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remote_corrupt_profile_reads_as_none() {
    let (base_url, _) = spawn_auth_server().await;
    let (sessions, storage) = remote_store(&base_url);
    storage.set(TOKEN_SLOT, "tok").unwrap();
    storage.set(PROFILE_SLOT, "{broken").unwrap();

    assert!(sessions.is_authenticated());
    assert!(sessions.current_user().is_none());
}
