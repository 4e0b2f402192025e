//! In-process stand-in for the voting API, just enough surface for the client
//! flows. Hit counters let tests assert which endpoints were (not) reached.

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct StubState {
    users: Mutex<Vec<StubUser>>,
    votes: Mutex<Vec<StubVote>>,
    next_id: AtomicI64,
    pub save_hits: AtomicUsize,
    pub participate_hits: AtomicUsize,
    pub share_participate_hits: AtomicUsize,
    pub fail_next_publish: AtomicBool,
}

struct StubUser {
    id: i64,
    username: String,
    password: String,
}

#[derive(Clone)]
pub struct StubOption {
    pub id: i64,
    pub text: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct StubVote {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub creator_username: String,
    pub status: String,
    pub permission: String,
    pub share_token: String,
    pub closed_at: Option<String>,
    pub options: Vec<StubOption>,
    pub voters: Vec<i64>,
}

pub struct Stub {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl Stub {
    pub fn seed_user(&self, username: &str, password: &str) -> i64 {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.users.lock().unwrap().push(StubUser {
            id,
            username: username.to_string(),
            password: password.to_string(),
        });
        id
    }

    pub fn token_for(&self, user_id: i64) -> String {
        format!("token-{user_id}")
    }

    pub fn seed_vote(&self, creator_id: i64, title: &str, status: &str, options: &[&str]) -> i64 {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let creator_username = self
            .state
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == creator_id)
            .map(|user| user.username.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let options = options
            .iter()
            .map(|text| StubOption {
                id: self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                text: text.to_string(),
                count: 0,
            })
            .collect();
        self.state.votes.lock().unwrap().push(StubVote {
            id,
            title: title.to_string(),
            description: String::new(),
            creator_id,
            creator_username,
            status: status.to_string(),
            permission: "PUBLIC".to_string(),
            share_token: format!("share-{id}"),
            closed_at: None,
            options,
            voters: Vec::new(),
        });
        id
    }

    pub fn close_seeded_vote(&self, id: i64) {
        let mut votes = self.state.votes.lock().unwrap();
        if let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) {
            vote.closed_at = Some("2026-08-01T12:00:00".to_string());
        }
    }

    pub fn vote_snapshot(&self, id: i64) -> Option<StubVote> {
        self.state
            .votes
            .lock()
            .unwrap()
            .iter()
            .find(|vote| vote.id == id)
            .cloned()
    }

    pub fn share_token(&self, id: i64) -> String {
        format!("share-{id}")
    }
}

pub async fn spawn() -> Stub {
    let state = Arc::new(StubState::default());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    Stub {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

fn router(state: Arc<StubState>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/votes", get(list_votes).post(create_vote))
        .route("/votes/:id", get(get_vote).put(update_vote).delete(delete_vote))
        .route("/votes/:id/publish", post(publish_vote))
        .route("/votes/:id/close", post(close_vote))
        .route("/votes/:id/participate", post(participate))
        .route("/votes/:id/participate-share", post(participate_share))
        .route("/votes/:id/permission", put(set_permission))
        .route("/votes/share/:token", get(share_vote))
        .with_state(state);
    Router::new().nest("/api", api)
}

fn bearer_user(state: &StubState, headers: &HeaderMap) -> Option<i64> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    let id = token.strip_prefix("token-")?.parse::<i64>().ok()?;
    state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|user| user.id == id)
        .map(|user| user.id)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "User not found. Please login again." })),
    )
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
}

fn not_found(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
}

fn dto(vote: &StubVote, viewer: Option<i64>) -> Value {
    let total: i64 = vote.options.iter().map(|option| option.count).sum();
    let options: Vec<Value> = vote
        .options
        .iter()
        .map(|option| {
            json!({
                "id": option.id,
                "text": option.text,
                "voteCount": option.count,
                "percentage": if total > 0 {
                    option.count as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            })
        })
        .collect();

    json!({
        "id": vote.id,
        "title": vote.title,
        "description": if vote.description.is_empty() {
            Value::Null
        } else {
            Value::String(vote.description.clone())
        },
        "status": vote.status,
        "permission": vote.permission,
        "creatorId": vote.creator_id,
        "creatorUsername": vote.creator_username,
        "totalVotes": total,
        "hasVoted": viewer.map(|id| vote.voters.contains(&id)).unwrap_or(false),
        "shareToken": vote.share_token,
        "createdAt": "2026-08-01T10:00:00",
        "publishedAt": Value::Null,
        "closedAt": vote.closed_at,
        "options": options,
    })
}

async fn login(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let users = state.users.lock().unwrap();
    match users
        .iter()
        .find(|user| user.username == username && user.password == password)
    {
        Some(user) => (
            StatusCode::OK,
            Json(json!({
                "token": format!("token-{}", user.id),
                "userId": user.id,
                "username": user.username,
            })),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        ),
    }
}

async fn register(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut users = state.users.lock().unwrap();
    if users.iter().any(|user| user.username == username) {
        return bad_request("Username already exists");
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    users.push(StubUser {
        id,
        username: username.clone(),
        password,
    });
    (
        StatusCode::OK,
        Json(json!({
            "token": format!("token-{id}"),
            "userId": id,
            "username": username,
        })),
    )
}

async fn list_votes(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    let filter = params.get("status").cloned();
    let votes = state.votes.lock().unwrap();
    let body: Vec<Value> = votes
        .iter()
        .filter(|vote| filter.as_deref().is_none_or(|status| vote.status == status))
        .map(|vote| dto(vote, Some(viewer)))
        .collect();
    (StatusCode::OK, Json(Value::Array(body)))
}

async fn get_vote(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    let votes = state.votes.lock().unwrap();
    match votes.iter().find(|vote| vote.id == id) {
        Some(vote) => (StatusCode::OK, Json(dto(vote, Some(viewer)))),
        None => not_found("Vote not found"),
    }
}

async fn create_vote(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    state.save_hits.fetch_add(1, Ordering::SeqCst);
    let creator_username = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|user| user.id == viewer)
        .map(|user| user.username.clone())
        .unwrap_or_default();
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let options = body["options"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|text| StubOption {
            id: state.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            text: text.as_str().unwrap_or_default().to_string(),
            count: 0,
        })
        .collect();
    let vote = StubVote {
        id,
        title: body["title"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().unwrap_or_default().to_string(),
        creator_id: viewer,
        creator_username,
        status: "DRAFT".to_string(),
        permission: body["permission"].as_str().unwrap_or("PUBLIC").to_string(),
        share_token: format!("share-{id}"),
        closed_at: None,
        options,
        voters: Vec::new(),
    };
    let response = dto(&vote, Some(viewer));
    state.votes.lock().unwrap().push(vote);
    (StatusCode::OK, Json(response))
}

async fn update_vote(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    state.save_hits.fetch_add(1, Ordering::SeqCst);
    let new_options: Vec<StubOption> = body["options"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|text| StubOption {
            id: state.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            text: text.as_str().unwrap_or_default().to_string(),
            count: 0,
        })
        .collect();
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    if vote.creator_id != viewer {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "You can only edit your own votes" })),
        );
    }
    vote.title = body["title"].as_str().unwrap_or_default().to_string();
    vote.description = body["description"].as_str().unwrap_or_default().to_string();
    vote.permission = body["permission"].as_str().unwrap_or("PUBLIC").to_string();
    vote.options = new_options;
    (StatusCode::OK, Json(dto(vote, Some(viewer))))
}

async fn publish_vote(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    if state.fail_next_publish.swap(false, Ordering::SeqCst) {
        return bad_request("publish refused");
    }
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    vote.status = "PUBLISHED".to_string();
    (StatusCode::OK, Json(dto(vote, Some(viewer))))
}

async fn close_vote(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    vote.status = "CLOSED".to_string();
    vote.closed_at = Some("2026-08-01T12:00:00".to_string());
    (StatusCode::OK, Json(dto(vote, Some(viewer))))
}

// The real backend answers deletes with an empty 200; keeping that here
// exercises the client's empty-body success path.
async fn delete_vote(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> StatusCode {
    if bearer_user(&state, &headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    let mut votes = state.votes.lock().unwrap();
    match votes.iter_mut().find(|vote| vote.id == id) {
        Some(vote) => {
            vote.status = "DELETED".to_string();
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn participate(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    state.participate_hits.fetch_add(1, Ordering::SeqCst);
    let option_id: i64 = params
        .get("optionId")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    if vote.status != "PUBLISHED" {
        return bad_request("Vote is not published");
    }
    if vote.closed_at.is_some() {
        return bad_request("Vote is closed");
    }
    if vote.voters.contains(&viewer) {
        return bad_request("You have already voted");
    }
    let Some(option) = vote.options.iter_mut().find(|option| option.id == option_id) else {
        return bad_request("Invalid option");
    };
    option.count += 1;
    vote.voters.push(viewer);
    (StatusCode::OK, Json(dto(vote, Some(viewer))))
}

async fn participate_share(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.share_participate_hits.fetch_add(1, Ordering::SeqCst);
    let viewer = bearer_user(&state, &headers);
    let option_id: i64 = params
        .get("optionId")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let token = params.get("token").cloned().unwrap_or_default();
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    if vote.permission == "LINK_ONLY" && vote.share_token != token {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Invalid share token" })),
        );
    }
    if vote.status != "PUBLISHED" {
        return bad_request("Vote is not published");
    }
    if vote.closed_at.is_some() {
        return bad_request("Vote is closed");
    }
    if let Some(viewer) = viewer {
        if vote.voters.contains(&viewer) {
            return bad_request("You have already voted");
        }
    }
    let Some(option) = vote.options.iter_mut().find(|option| option.id == option_id) else {
        return bad_request("Invalid option");
    };
    option.count += 1;
    if let Some(viewer) = viewer {
        vote.voters.push(viewer);
    }
    (StatusCode::OK, Json(dto(vote, viewer)))
}

async fn set_permission(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let Some(viewer) = bearer_user(&state, &headers) else {
        return unauthorized();
    };
    let permission = params.get("permission").cloned().unwrap_or_default();
    if !["PUBLIC", "PRIVATE", "LINK_ONLY"].contains(&permission.as_str()) {
        return bad_request("Invalid permission type");
    }
    let mut votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter_mut().find(|vote| vote.id == id) else {
        return not_found("Vote not found");
    };
    if vote.creator_id != viewer {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "You can only modify your own votes" })),
        );
    }
    vote.permission = permission;
    (StatusCode::OK, Json(dto(vote, Some(viewer))))
}

async fn share_vote(
    State(state): State<Arc<StubState>>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let viewer = bearer_user(&state, &headers);
    let votes = state.votes.lock().unwrap();
    let Some(vote) = votes.iter().find(|vote| vote.share_token == token) else {
        return not_found("Vote not found with the provided share token");
    };
    if vote.status != "PUBLISHED" {
        return bad_request("This vote is not published yet");
    }
    (StatusCode::OK, Json(dto(vote, viewer)))
}
