use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::{failed, EntityService};
use crate::api::Envelope;
use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::models::{to_document, EntityKind, User, UserPatch};

const USER_INFO: &str = "user_info";
const USER_ID: &str = "user_id";

/// User endpoints: password hashing, 404 normalisation and login on top
/// of the shared entity operations.
pub struct UserService {
    entities: Arc<EntityService>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(entities: Arc<EntityService>, bcrypt_cost: u32) -> Self {
        Self {
            entities,
            bcrypt_cost,
        }
    }

    fn hash(&self, password: &str) -> Result<String, ApiError> {
        hash_password(password, self.bcrypt_cost).map_err(|e| {
            error!("{}", e);
            ApiError::internal_server_error(e.to_string())
        })
    }

    /// Store a new user under its username with the password hashed
    pub async fn create_user(&self, mut user: User) -> Envelope {
        user.password = match self.hash(&user.password) {
            Ok(hash) => hash,
            Err(err) => return failed(err, Some(USER_ID.to_string())),
        };

        let fields = match to_document(&user) {
            Ok(fields) => fields,
            Err(e) => {
                return failed(
                    ApiError::internal_server_error(format!("Invalid user document: {}", e)),
                    Some(USER_ID.to_string()),
                )
            }
        };

        let response = self
            .entities
            .create(EntityKind::User, Some(&user.username), fields)
            .await;
        info!("Create user {}: {}", user.username, response.message);
        response
    }

    /// Merge the provided fields; a new password is hashed first
    pub async fn update_user(&self, user_id: &str, mut patch: UserPatch) -> Envelope {
        if let Some(password) = patch.password.take() {
            match self.hash(&password) {
                Ok(hash) => patch.password = Some(hash),
                Err(err) => return failed(err, None),
            }
        }

        match to_document(&patch) {
            Ok(fields) => self.entities.update(EntityKind::User, user_id, fields).await,
            Err(e) => failed(
                ApiError::internal_server_error(format!("Invalid user document: {}", e)),
                None,
            ),
        }
    }

    pub async fn delete_user(&self, user_id: &str) -> Envelope {
        self.entities.delete(EntityKind::User, user_id).await
    }

    /// Any response without populated user info that is not a dependency
    /// failure is reported as a missing user.
    pub async fn get_user(&self, user_id: &str) -> Envelope {
        let response = self.entities.get(EntityKind::User, user_id).await;
        if response.has_payload(USER_INFO) || response.code == 424 {
            return response;
        }
        Envelope::failure(404, format!("User with id {} not found", user_id))
            .with(USER_INFO, Value::Null)
    }

    pub async fn get_all_users(&self) -> Envelope {
        self.entities.get_all(EntityKind::User).await
    }

    pub async fn get_users_from_list(&self, ids: &[String]) -> Envelope {
        self.entities.get_all_from_list(EntityKind::User, ids).await
    }

    /// Check credentials. Unknown users and wrong passwords are both 401
    /// with different messages; anything unexpected is a 500.
    pub async fn login(&self, username: &str, password: &str) -> Envelope {
        let unauthorized = |message: &str| {
            failed(ApiError::unauthorized(message), Some(USER_INFO.to_string()))
        };

        let user = match self.entities.fetch(EntityKind::User, username).await {
            Ok(user) => user,
            Err(ApiError::NotFound(_)) => {
                warn!("Login attempt for unknown user {}", username);
                return unauthorized("User doesn't exist(invalid username)");
            }
            Err(err) => return login_error(err),
        };

        let Some(stored_hash) = user.get("password").and_then(Value::as_str) else {
            return login_error("stored user has no password hash");
        };

        match verify_password(password, stored_hash) {
            Ok(true) => {
                info!("User {} logged in", username);
                Envelope::success("Login successful").with(USER_INFO, Value::Object(user))
            }
            Ok(false) => {
                warn!("Invalid password for user {}", username);
                unauthorized("Invalid password")
            }
            Err(err) => login_error(err),
        }
    }
}

fn login_error(err: impl std::fmt::Display) -> Envelope {
    let message = format!("Error during login: {}", err);
    error!("{}", message);
    failed(
        ApiError::internal_server_error(message),
        Some(USER_INFO.to_string()),
    )
}
