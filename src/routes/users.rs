use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::User,
    schema::users,
    state::AppState,
    users as provisioning,
    utils::json::double_option,
};

use super::documents::to_iso;

#[derive(Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: String,
    pub last_login: Option<String>,
    pub person_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub person_id: Option<Uuid>,
    #[serde(default)]
    pub superuser: bool,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub person_id: Option<Option<Uuid>>,
}

pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Vec<UserInfo>>> {
    caller.require_staff()?;
    let mut conn = state.db()?;
    let rows: Vec<User> = users::table.order(users::username.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(user_to_info).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<UserInfo>> {
    caller.require_staff()?;
    let mut conn = state.db()?;

    let user = if payload.superuser {
        provisioning::create_superuser(
            &mut conn,
            &payload.username,
            payload.person_id,
            &payload.password,
        )?
    } else {
        provisioning::create_user(
            &mut conn,
            &payload.username,
            payload.person_id,
            &payload.password,
        )?
    };

    Ok(Json(user_to_info(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserInfo>> {
    caller.require_staff()?;
    let mut conn = state.db()?;
    let existing: User = users::table.find(user_id).first(&mut conn)?;

    if payload.is_active.is_none() && payload.person_id.is_none() {
        return Ok(Json(user_to_info(existing)));
    }

    if let Some(active) = payload.is_active {
        diesel::update(users::table.find(user_id))
            .set(users::is_active.eq(active))
            .execute(&mut conn)?;
    }
    if let Some(person_change) = payload.person_id {
        diesel::update(users::table.find(user_id))
            .set(users::person_id.eq(person_change))
            .execute(&mut conn)?;
    }

    let updated: User = users::table.find(user_id).first(&mut conn)?;
    Ok(Json(user_to_info(updated)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    caller.require_staff()?;
    if caller.user_id == user_id {
        return Err(AppError::bad_request("cannot delete your own account"));
    }

    let mut conn = state.db()?;
    let deleted = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn user_to_info(user: User) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
        is_active: user.is_active,
        date_joined: to_iso(user.date_joined),
        last_login: user.last_login.map(to_iso),
        person_id: user.person_id,
    }
}
