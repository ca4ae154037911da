#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::TcpListener,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use taskflow_client::{
    client::HttpClient, route::Navigator, session::SessionStore,
};
use url::Url;

#[derive(Default)]
struct Collection {
    items: BTreeMap<i64, Value>,
    next_id: i64,
}

#[derive(Clone, Copy)]
enum Kind {
    Projects,
    Tasks,
}

struct User {
    username: String,
    email: String,
    password: String,
}

// In-process stand-in for the TaskFlow API
#[derive(Default)]
pub struct ServerState {
    users: Mutex<Vec<User>>,
    tokens: Mutex<HashSet<String>>,
    issued: Mutex<usize>,
    seen_auth: Mutex<Vec<Option<String>>>,
    seen_logins: Mutex<Vec<HashMap<String, String>>>,
    projects: Mutex<Collection>,
    tasks: Mutex<Collection>,
}

impl ServerState {
    fn collection(&self, kind: Kind) -> std::sync::MutexGuard<'_, Collection> {
        match kind {
            Kind::Projects => self.projects.lock().unwrap(),
            Kind::Tasks => self.tasks.lock().unwrap(),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        self.seen_auth.lock().unwrap().push(header.clone());

        let token = header.as_deref().and_then(|h| h.strip_prefix("Bearer "));
        match token {
            Some(token) if self.tokens.lock().unwrap().contains(token) => Ok(()),
            _ => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn not_found(kind: Kind) -> Response {
    match kind {
        Kind::Projects => detail(StatusCode::NOT_FOUND, "Project not found"),
        Kind::Tasks => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "TaskFlow API"}))
}

async fn token(
    State(state): State<Arc<ServerState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.seen_logins.lock().unwrap().push(form.clone());
    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();

    let known = state
        .users
        .lock()
        .unwrap()
        .iter()
        .any(|u| (u.username == username || u.email == username) && u.password == password);
    if !known {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }

    let mut issued = state.issued.lock().unwrap();
    *issued += 1;
    let token = format!("T{issued}");
    state.tokens.lock().unwrap().insert(token.clone());
    Json(json!({"access_token": token, "token_type": "bearer"})).into_response()
}

async fn register(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    let field = |name: &str| body[name].as_str().unwrap_or_default().to_string();
    let user = User {
        username: field("username"),
        email: field("email"),
        password: field("password"),
    };

    let mut users = state.users.lock().unwrap();
    if users.iter().any(|u| u.username == user.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    let response = json!({"id": users.len() + 1, "username": user.username, "email": user.email});
    users.push(user);
    Json(response).into_response()
}

fn list(state: &ServerState, headers: &HeaderMap, kind: Kind) -> Response {
    if let Err(response) = state.authorize(headers) {
        return response;
    }
    let items: Vec<Value> = state.collection(kind).items.values().cloned().collect();
    Json(items).into_response()
}

fn read(state: &ServerState, headers: &HeaderMap, kind: Kind, id: i64) -> Response {
    if let Err(response) = state.authorize(headers) {
        return response;
    }
    match state.collection(kind).items.get(&id) {
        Some(item) => Json(item.clone()).into_response(),
        None => not_found(kind),
    }
}

fn create(state: &ServerState, headers: &HeaderMap, kind: Kind, body: Value) -> Response {
    if let Err(response) = state.authorize(headers) {
        return response;
    }
    let mut collection = state.collection(kind);
    collection.next_id += 1;
    let id = collection.next_id;

    let mut item = match kind {
        Kind::Projects => json!({
            "description": null, "status": "Not Started",
            "start_date": null, "end_date": null, "owner_id": 1
        }),
        Kind::Tasks => json!({
            "description": null, "completed": false, "priority": "Medium",
            "due_date": null, "project_id": null, "owner_id": 1
        }),
    };
    if let (Some(item), Value::Object(body)) = (item.as_object_mut(), body) {
        item.extend(body);
        item.insert("id".to_string(), json!(id));
    }
    collection.items.insert(id, item.clone());
    Json(item).into_response()
}

fn update(state: &ServerState, headers: &HeaderMap, kind: Kind, id: i64, body: Value) -> Response {
    if let Err(response) = state.authorize(headers) {
        return response;
    }
    let mut collection = state.collection(kind);
    let Some(item) = collection.items.get_mut(&id) else {
        return not_found(kind);
    };
    if let (Some(item), Value::Object(body)) = (item.as_object_mut(), body) {
        item.extend(body);
    }
    Json(item.clone()).into_response()
}

fn remove(state: &ServerState, headers: &HeaderMap, kind: Kind, id: i64) -> Response {
    if let Err(response) = state.authorize(headers) {
        return response;
    }
    match state.collection(kind).items.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(kind),
    }
}

async fn list_projects(State(s): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    list(&s, &headers, Kind::Projects)
}

async fn create_project(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    create(&s, &headers, Kind::Projects, body)
}

async fn get_project(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    read(&s, &headers, Kind::Projects, id)
}

async fn update_project(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    update(&s, &headers, Kind::Projects, id, body)
}

async fn delete_project(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    remove(&s, &headers, Kind::Projects, id)
}

async fn list_tasks(State(s): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    list(&s, &headers, Kind::Tasks)
}

async fn create_task(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    create(&s, &headers, Kind::Tasks, body)
}

async fn get_task(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    read(&s, &headers, Kind::Tasks, id)
}

async fn update_task(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    update(&s, &headers, Kind::Tasks, id, body)
}

async fn delete_task(
    State(s): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    remove(&s, &headers, Kind::Tasks, id)
}

pub struct FakeApi {
    pub base_url: Url,
    pub state: Arc<ServerState>,
}

impl FakeApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(ServerState::default());

        let app = Router::new()
            .route("/health", get(health))
            .route("/auth/token", post(token))
            .route("/auth/register", post(register))
            .route("/projects", get(list_projects).post(create_project))
            .route(
                "/projects/:id",
                get(get_project).put(update_project).delete(delete_project),
            )
            .route("/tasks", get(list_tasks).post(create_task))
            .route(
                "/tasks/:id",
                get(get_task).put(update_task).delete(delete_task),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service());
        tokio::spawn(server);

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            state,
        }
    }

    pub fn add_user(&self, username: &str, email: &str, password: &str) {
        self.state.users.lock().unwrap().push(User {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Invalidates every issued token, as an expiry would.
    pub fn revoke_tokens(&self) {
        self.state.tokens.lock().unwrap().clear();
    }

    /// Authorization headers of every protected request, in arrival order.
    pub fn seen_auth(&self) -> Vec<Option<String>> {
        self.state.seen_auth.lock().unwrap().clone()
    }

    /// Decoded form bodies posted to the token endpoint.
    pub fn seen_logins(&self) -> Vec<HashMap<String, String>> {
        self.state.seen_logins.lock().unwrap().clone()
    }

    pub fn client(&self, session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> HttpClient {
        HttpClient::new(self.base_url.clone(), session, navigator)
    }
}
