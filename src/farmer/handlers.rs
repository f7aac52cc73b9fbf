use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    farmer::{
        dto::{CreateProfileRequest, UpdateProfileRequest},
        repo::FarmerProfile,
    },
    state::AppState,
};

pub fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route("/farmer/create", post(create_profile))
        .route("/farmer/me", get(my_profile))
        .route("/farmer/update", put(update_profile))
        .route("/farmer/delete", delete(delete_profile))
}

#[instrument(skip(state, user, payload))]
async fn create_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let profile = FarmerProfile::create(&state.db, user.id, &payload).await?;
    info!(user_id = %user.id, profile_id = %profile.id, "farmer profile created");
    Ok(Json(
        json!({ "message": "Farmer profile created", "id": profile.id }),
    ))
}

#[instrument(skip(state, user))]
async fn my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<FarmerProfile>, ApiError> {
    let profile = FarmerProfile::find_by_user(&state.db, user.id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, user, payload))]
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    FarmerProfile::update(&state.db, user.id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    info!(user_id = %user.id, "farmer profile updated");
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

#[instrument(skip(state, user))]
async fn delete_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    if !FarmerProfile::delete(&state.db, user.id).await? {
        return Err(ApiError::NotFound("Profile"));
    }
    info!(user_id = %user.id, "farmer profile deleted");
    Ok(Json(json!({ "message": "Profile deleted successfully" })))
}
