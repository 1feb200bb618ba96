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
use crate::models::{DocumentType, NewDocumentType};
use crate::schema::{document_types, documents};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateDocumentTypeRequest {
    pub document_type: String,
}

#[derive(Deserialize)]
pub struct UpdateDocumentTypeRequest {
    pub document_type: String,
}

#[derive(Serialize)]
pub struct DocumentTypeCatalogEntry {
    pub id: Uuid,
    pub document_type: String,
    pub usage_count: i64,
}

fn validate_label(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("document_type must not be empty"));
    }
    if trimmed.chars().count() > 20 {
        return Err(AppError::bad_request(
            "document_type must be at most 20 characters",
        ));
    }
    Ok(trimmed)
}

pub async fn list_document_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DocumentTypeCatalogEntry>>> {
    let mut conn = state.db()?;

    let type_list: Vec<DocumentType> = document_types::table
        .order(document_types::document_type.asc())
        .load(&mut conn)?;

    let usage_rows: Vec<(Uuid, i64)> = documents::table
        .group_by(documents::type_id)
        .select((documents::type_id, count_star()))
        .load(&mut conn)?;

    let usage_map: HashMap<Uuid, i64> = usage_rows.into_iter().collect();

    let response = type_list
        .into_iter()
        .map(|doc_type| DocumentTypeCatalogEntry {
            id: doc_type.id,
            document_type: doc_type.document_type,
            usage_count: *usage_map.get(&doc_type.id).unwrap_or(&0),
        })
        .collect();

    Ok(Json(response))
}

pub async fn create_document_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentTypeRequest>,
) -> AppResult<Json<DocumentTypeCatalogEntry>> {
    let label = validate_label(&payload.document_type)?;

    let mut conn = state.db()?;
    let new_type = NewDocumentType {
        id: Uuid::new_v4(),
        document_type: label.to_string(),
    };

    diesel::insert_into(document_types::table)
        .values(&new_type)
        .execute(&mut conn)?;

    let doc_type: DocumentType = document_types::table.find(new_type.id).first(&mut conn)?;
    Ok(Json(DocumentTypeCatalogEntry {
        id: doc_type.id,
        document_type: doc_type.document_type,
        usage_count: 0,
    }))
}

pub async fn update_document_type(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentTypeRequest>,
) -> AppResult<Json<DocumentTypeCatalogEntry>> {
    let label = validate_label(&payload.document_type)?;

    let mut conn = state.db()?;
    let updated = diesel::update(document_types::table.find(type_id))
        .set(document_types::document_type.eq(label))
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(AppError::not_found());
    }

    let doc_type: DocumentType = document_types::table.find(type_id).first(&mut conn)?;
    let usage_count: i64 = documents::table
        .filter(documents::type_id.eq(type_id))
        .select(count_star())
        .first(&mut conn)?;

    Ok(Json(DocumentTypeCatalogEntry {
        id: doc_type.id,
        document_type: doc_type.document_type,
        usage_count,
    }))
}

/// Reference data is protected: the delete fails while documents use it.
pub async fn delete_document_type(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
) -> AppResult<impl axum::response::IntoResponse> {
    let mut conn = state.db()?;

    let usage: i64 = documents::table
        .filter(documents::type_id.eq(type_id))
        .select(count_star())
        .first(&mut conn)?;

    if usage > 0 {
        return Err(AppError::conflict(
            "cannot delete document type that is still in use by documents",
        ));
    }

    let deleted = diesel::delete(document_types::table.find(type_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
