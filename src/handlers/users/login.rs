// handlers/users/login.rs - /api/v1/users/login handlers

use axum::extract::State;

use crate::api::requests::LoginRequest;
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::{ValidJson, ValidQuery};

/// POST /api/v1/users/login - Check a username and password
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "message": "Login successful", "code": 200, "result": true, "user_info": {...} }
/// ```
///
/// Unknown usernames and wrong passwords both answer 401 with distinct
/// messages. No session or token is issued.
pub async fn post(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Envelope {
    state.users.login(&request.username, &request.password).await
}

/// GET /api/v1/users/login?username=&password=
///
/// Query-string form kept for existing clients. Prefer POST, which keeps
/// the password out of access logs.
pub async fn get(
    State(state): State<AppState>,
    ValidQuery(request): ValidQuery<LoginRequest>,
) -> Envelope {
    state.users.login(&request.username, &request.password).await
}
