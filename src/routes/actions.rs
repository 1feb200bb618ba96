use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use diesel::{dsl::count_star, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Action, NewAction};
use crate::schema::{actions, document_actions};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateActionRequest {
    pub action_type: String,
}

#[derive(Deserialize)]
pub struct UpdateActionRequest {
    pub action_type: String,
}

#[derive(Serialize)]
pub struct ActionCatalogEntry {
    pub id: Uuid,
    pub action_type: String,
    pub usage_count: i64,
}

pub async fn list_actions(State(state): State<AppState>) -> AppResult<Json<Vec<ActionCatalogEntry>>> {
    let mut conn = state.db()?;

    let action_list: Vec<Action> = actions::table
        .order(actions::action_type.asc())
        .load(&mut conn)?;

    let usage_rows: Vec<(Uuid, i64)> = document_actions::table
        .group_by(document_actions::action_id)
        .select((document_actions::action_id, count_star()))
        .load(&mut conn)?;

    let usage_map: HashMap<Uuid, i64> = usage_rows.into_iter().collect();

    let response = action_list
        .into_iter()
        .map(|action| ActionCatalogEntry {
            id: action.id,
            action_type: action.action_type,
            usage_count: *usage_map.get(&action.id).unwrap_or(&0),
        })
        .collect();

    Ok(Json(response))
}

pub async fn create_action(
    State(state): State<AppState>,
    Json(payload): Json<CreateActionRequest>,
) -> AppResult<Json<ActionCatalogEntry>> {
    let action_type = payload.action_type.trim();
    if action_type.is_empty() {
        return Err(AppError::bad_request("action_type must not be empty"));
    }

    let mut conn = state.db()?;
    let new_action = NewAction {
        id: Uuid::new_v4(),
        action_type: action_type.to_string(),
    };

    diesel::insert_into(actions::table)
        .values(&new_action)
        .execute(&mut conn)?;

    let action: Action = actions::table.find(new_action.id).first(&mut conn)?;
    Ok(Json(ActionCatalogEntry {
        id: action.id,
        action_type: action.action_type,
        usage_count: 0,
    }))
}

pub async fn update_action(
    State(state): State<AppState>,
    Path(action_id): Path<Uuid>,
    Json(payload): Json<UpdateActionRequest>,
) -> AppResult<Json<ActionCatalogEntry>> {
    let action_type = payload.action_type.trim();
    if action_type.is_empty() {
        return Err(AppError::bad_request("action_type must not be empty"));
    }

    let mut conn = state.db()?;
    let updated = diesel::update(actions::table.find(action_id))
        .set(actions::action_type.eq(action_type))
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let action: Action = actions::table.find(action_id).first(&mut conn)?;
    let usage_count: i64 = document_actions::table
        .filter(document_actions::action_id.eq(action_id))
        .select(count_star())
        .first(&mut conn)?;

    Ok(Json(ActionCatalogEntry {
        id: action.id,
        action_type: action.action_type,
        usage_count,
    }))
}

/// Reference data is protected: the delete fails while log entries use it.
pub async fn delete_action(
    State(state): State<AppState>,
    Path(action_id): Path<Uuid>,
) -> AppResult<impl axum::response::IntoResponse> {
    let mut conn = state.db()?;

    let usage: i64 = document_actions::table
        .filter(document_actions::action_id.eq(action_id))
        .select(count_star())
        .first(&mut conn)?;

    if usage > 0 {
        return Err(AppError::conflict(
            "cannot delete action that is still referenced by the document log",
        ));
    }

    let deleted = diesel::delete(actions::table.find(action_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
