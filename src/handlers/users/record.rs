// handlers/users/record.rs - single user CRUD on /api/v1/users

use axum::extract::State;

use crate::api::requests::{CreateUserRequest, UpdateUserRequest, UserIdQuery};
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::{ValidJson, ValidQuery};

/// POST /api/v1/users - Register a user
///
/// Expected Input:
/// ```json
/// {
///   "user_info": {
///     "username": "string",        // Becomes the user id
///     "first_name": "string",
///     "last_name": "string",
///     "birthday": "YYYY-MM-DD",
///     "location": "string",
///     "interests": ["string"],     // Optional
///     "is_admin": false,           // Optional
///     "password": "string"         // Stored as a bcrypt hash
///   }
/// }
/// ```
///
/// A username that is already taken answers 409.
pub async fn post(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Envelope {
    state.users.create_user(request.user_info).await
}

/// PUT /api/v1/users - Merge fields into an existing user
///
/// Expected Input:
/// ```json
/// { "user_id": "string", "user_info": { "location": "string" } }
/// ```
pub async fn put(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> Envelope {
    state.users.update_user(&request.user_id, request.user_info).await
}

/// DELETE /api/v1/users?user_id=
pub async fn delete(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<UserIdQuery>,
) -> Envelope {
    state.users.delete_user(&query.user_id).await
}

/// GET /api/v1/users?user_id=
pub async fn get(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<UserIdQuery>,
) -> Envelope {
    state.users.get_user(&query.user_id).await
}
