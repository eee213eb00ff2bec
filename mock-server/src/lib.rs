//! In-memory stand-in for the campus API.
//!
//! Speaks the same envelope as the real backend: successes carry
//! `{ "data": ..., "message": ... }`, failures carry `{ "message": ... }`.
//! Everything except login and the health probe requires a bearer token
//! issued by `POST /api/auth/login`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub created_by: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateClub {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateClub {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Standard success body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

type Reply<T> = Result<Json<Envelope<T>>, Failure>;
type Failure = (StatusCode, Json<Value>);

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data, message: None })
}

fn ok_with<T: Serialize>(data: T, message: &'static str) -> Json<Envelope<T>> {
    Json(Envelope {
        data,
        message: Some(message),
    })
}

fn fail(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

struct Account {
    user: User,
    password: &'static str,
}

#[derive(Default)]
pub struct AppState {
    accounts: Vec<Account>,
    tokens: RwLock<HashMap<String, String>>,
    clubs: RwLock<HashMap<Uuid, Club>>,
}

pub type Db = Arc<AppState>;

impl AppState {
    /// One account per role; passwords are `<role>-pass`.
    pub fn seeded() -> Self {
        let account = |id: &str, name: &str, email: &str, role, password| Account {
            user: User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role,
            },
            password,
        };
        Self {
            accounts: vec![
                account("u-student", "Asha Student", "asha@campus.edu", Role::Student, "student-pass"),
                account("u-faculty", "Dr. Rao", "rao@campus.edu", Role::Faculty, "faculty-pass"),
                account("u-admin", "Campus Admin", "admin@campus.edu", Role::Admin, "admin-pass"),
            ],
            ..Default::default()
        }
    }

    async fn authorize(&self, headers: &HeaderMap) -> Result<User, Failure> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
        let user_id = self
            .tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
        self.accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(AppState::seeded());
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/clubs", get(list_clubs).post(create_club))
        .route(
            "/clubs/{id}",
            get(get_club)
                .put(replace_club)
                .patch(update_club)
                .delete(delete_club),
        )
        .route("/uploads", post(upload));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Reply<Value> {
    let user = db
        .accounts
        .iter()
        .find(|a| a.user.email == input.email && a.password == input.password)
        .map(|a| a.user.clone())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = Uuid::new_v4().simple().to_string();
    db.tokens.write().await.insert(token.clone(), user.id.clone());
    tracing::info!(user = %user.id, "login");
    Ok(ok_with(json!({ "token": token, "user": user }), "Login successful"))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply<User> {
    let user = db.authorize(&headers).await?;
    Ok(ok(user))
}

async fn list_clubs(State(db): State<Db>, headers: HeaderMap) -> Reply<Vec<Club>> {
    db.authorize(&headers).await?;
    let clubs = db.clubs.read().await;
    let mut all: Vec<Club> = clubs.values().cloned().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ok(all))
}

async fn create_club(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateClub>,
) -> Result<(StatusCode, Json<Envelope<Club>>), Failure> {
    let user = db.authorize(&headers).await?;
    if input.name.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Club name is required"));
    }
    let club = Club {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        category: input.category,
        created_by: user.id,
    };
    db.clubs.write().await.insert(club.id, club.clone());
    tracing::info!(club = %club.id, "club created");
    Ok((StatusCode::CREATED, ok_with(club, "Club created")))
}

async fn get_club(State(db): State<Db>, headers: HeaderMap, Path(id): Path<Uuid>) -> Reply<Club> {
    db.authorize(&headers).await?;
    let clubs = db.clubs.read().await;
    clubs
        .get(&id)
        .cloned()
        .map(ok)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Club not found"))
}

async fn replace_club(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateClub>,
) -> Reply<Club> {
    db.authorize(&headers).await?;
    let mut clubs = db.clubs.write().await;
    let club = clubs
        .get_mut(&id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Club not found"))?;
    club.name = input.name;
    club.description = input.description;
    club.category = input.category;
    Ok(ok_with(club.clone(), "Club updated"))
}

async fn update_club(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateClub>,
) -> Reply<Club> {
    db.authorize(&headers).await?;
    let mut clubs = db.clubs.write().await;
    let club = clubs
        .get_mut(&id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Club not found"))?;
    if let Some(name) = input.name {
        club.name = name;
    }
    if let Some(description) = input.description {
        club.description = description;
    }
    if input.category.is_some() {
        club.category = input.category;
    }
    Ok(ok_with(club.clone(), "Club updated"))
}

async fn delete_club(State(db): State<Db>, headers: HeaderMap, Path(id): Path<Uuid>) -> Reply<Value> {
    let user = db.authorize(&headers).await?;
    let mut clubs = db.clubs.write().await;
    let club = clubs
        .get(&id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Club not found"))?;
    if club.created_by != user.id && user.role != Role::Admin {
        return Err(fail(StatusCode::FORBIDDEN, "Only the creator or an admin can delete a club"));
    }
    clubs.remove(&id);
    Ok(ok_with(json!({ "id": id }), "Club deleted"))
}

async fn upload(State(db): State<Db>, headers: HeaderMap, mut multipart: Multipart) -> Reply<Vec<ReceivedPart>> {
    db.authorize(&headers).await?;
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| fail(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| fail(StatusCode::BAD_REQUEST, &e.to_string()))?;
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            size: bytes.len(),
        });
    }
    Ok(ok_with(parts, "Upload received"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_missing_message() {
        let json = serde_json::to_value(Envelope {
            data: 1,
            message: None,
        })
        .unwrap();
        assert_eq!(json, json!({ "data": 1 }));
    }

    #[test]
    fn envelope_includes_message() {
        let json = serde_json::to_value(Envelope {
            data: "x",
            message: Some("done"),
        })
        .unwrap();
        assert_eq!(json, json!({ "data": "x", "message": "done" }));
    }

    #[test]
    fn role_is_lowercase() {
        assert_eq!(serde_json::to_value(Role::Faculty).unwrap(), "faculty");
    }

    #[test]
    fn create_club_defaults_description() {
        let input: CreateClub = serde_json::from_str(r#"{"name":"Chess"}"#).unwrap();
        assert_eq!(input.name, "Chess");
        assert!(input.description.is_empty());
        assert!(input.category.is_none());
    }

    #[test]
    fn create_club_rejects_missing_name() {
        let result: Result<CreateClub, _> = serde_json::from_str(r#"{"description":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_club_all_fields_optional() {
        let input: UpdateClub = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.description.is_none());
        assert!(input.category.is_none());
    }

    #[test]
    fn seeded_state_has_one_account_per_role() {
        let state = AppState::seeded();
        let roles: Vec<Role> = state.accounts.iter().map(|a| a.user.role).collect();
        assert_eq!(roles, vec![Role::Student, Role::Faculty, Role::Admin]);
    }
}
