use axum::extract::State;

use crate::api::requests::GetAllFromList;
use crate::api::Envelope;
use crate::app::AppState;
use crate::middleware::ValidJson;

/// GET /api/v1/users/all
pub async fn all(State(state): State<AppState>) -> Envelope {
    state.users.get_all_users().await
}

/// POST /api/v1/users/list - `{"ids_list": [...]}` to `{"users_info": {id: {...}}}`
pub async fn from_list(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<GetAllFromList>,
) -> Envelope {
    state.users.get_users_from_list(&request.ids_list).await
}
