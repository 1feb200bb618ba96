use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{Action, Document, DocumentAction, NewDocument, NewDocumentAction},
    schema::{actions, document_actions, document_types, documents, persons, users},
    state::AppState,
    utils::json::double_option,
};

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub sheet_count: i32,
    pub notice_name: Option<String>,
    pub notice_sheet_count: Option<i32>,
    pub creation_date: String,
    pub creator_id: Uuid,
    pub type_id: Uuid,
    pub document_type: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub sheet_count: i32,
    pub notice_name: Option<String>,
    pub notice_sheet_count: Option<i32>,
    pub creator_id: Uuid,
    pub type_id: Uuid,
    pub phone: Option<String>,
}

// creation_date is deliberately absent: it is fixed at insert time.
#[derive(Deserialize)]
pub struct UpdateDocumentRequest {
    pub name: Option<String>,
    pub sheet_count: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub notice_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notice_sheet_count: Option<Option<i32>>,
    pub creator_id: Option<Uuid>,
    pub type_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = documents)]
struct DocumentChangeset<'a> {
    name: Option<&'a str>,
    sheet_count: Option<i32>,
    notice_name: Option<Option<&'a str>>,
    notice_sheet_count: Option<Option<i32>>,
    creator_id: Option<Uuid>,
    type_id: Option<Uuid>,
    phone: Option<Option<&'a str>>,
}

#[derive(Serialize)]
pub struct DocumentActionEntry {
    pub id: Uuid,
    pub action_date: String,
    pub comment: String,
    pub action_id: Uuid,
    pub action_type: String,
    pub user_id: Uuid,
    pub username: String,
    pub document_id: Uuid,
}

#[derive(Deserialize)]
pub struct RecordActionRequest {
    pub action_id: Uuid,
    #[serde(default)]
    pub comment: Option<String>,
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DocumentResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(Document, String)> = documents::table
        .inner_join(document_types::table)
        .select((documents::all_columns, document_types::document_type))
        .order(documents::creation_date.desc())
        .load(&mut conn)?;

    Ok(Json(
        rows.into_iter()
            .map(|(doc, type_label)| to_document_response(doc, type_label))
            .collect(),
    ))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let (doc, type_label): (Document, String) = documents::table
        .inner_join(document_types::table)
        .filter(documents::id.eq(document_id))
        .select((documents::all_columns, document_types::document_type))
        .first(&mut conn)?;
    Ok(Json(to_document_response(doc, type_label)))
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    if payload.sheet_count < 0 {
        return Err(AppError::bad_request("sheet_count must not be negative"));
    }
    let phone = match payload.phone.as_deref() {
        Some(raw) => Some(validate_phone(raw)?.to_string()),
        None => None,
    };

    let mut conn = state.db()?;

    let creator_exists = persons::table
        .find(payload.creator_id)
        .select(persons::id)
        .first::<Uuid>(&mut conn)
        .optional()?;
    if creator_exists.is_none() {
        return Err(AppError::bad_request("creator does not exist"));
    }

    let type_label: Option<String> = document_types::table
        .find(payload.type_id)
        .select(document_types::document_type)
        .first(&mut conn)
        .optional()?;
    let Some(type_label) = type_label else {
        return Err(AppError::bad_request("document type does not exist"));
    };

    let new_document = NewDocument {
        id: Uuid::new_v4(),
        name: name.to_string(),
        sheet_count: payload.sheet_count,
        notice_name: payload.notice_name,
        notice_sheet_count: payload.notice_sheet_count,
        creator_id: payload.creator_id,
        type_id: payload.type_id,
        phone,
    };

    diesel::insert_into(documents::table)
        .values(&new_document)
        .execute(&mut conn)?;

    let doc: Document = documents::table.find(new_document.id).first(&mut conn)?;
    Ok(Json(to_document_response(doc, type_label)))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let _existing: Document = documents::table.find(document_id).first(&mut conn)?;

    let new_name = match payload.name {
        Some(ref candidate) => {
            let trimmed = candidate.trim();
            if trimmed.is_empty() {
                return Err(AppError::bad_request("name must not be empty"));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };
    if let Some(count) = payload.sheet_count {
        if count < 0 {
            return Err(AppError::bad_request("sheet_count must not be negative"));
        }
    }
    let phone_change: Option<Option<String>> = match payload.phone {
        None => None,
        Some(None) => Some(None),
        Some(Some(ref raw)) => Some(Some(validate_phone(raw)?.to_string())),
    };

    let changeset = DocumentChangeset {
        name: new_name.as_deref(),
        sheet_count: payload.sheet_count,
        notice_name: payload.notice_name.as_ref().map(|opt| opt.as_deref()),
        notice_sheet_count: payload.notice_sheet_count,
        creator_id: payload.creator_id,
        type_id: payload.type_id,
        phone: phone_change.as_ref().map(|opt| opt.as_deref()),
    };

    let has_change = changeset.name.is_some()
        || changeset.sheet_count.is_some()
        || changeset.notice_name.is_some()
        || changeset.notice_sheet_count.is_some()
        || changeset.creator_id.is_some()
        || changeset.type_id.is_some()
        || changeset.phone.is_some();

    if has_change {
        diesel::update(documents::table.find(document_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let (doc, type_label): (Document, String) = documents::table
        .inner_join(document_types::table)
        .filter(documents::id.eq(document_id))
        .select((documents::all_columns, document_types::document_type))
        .first(&mut conn)?;
    Ok(Json(to_document_response(doc, type_label)))
}

/// Cascades to the document's log entries.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(documents::table.find(document_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_document_actions(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<Vec<DocumentActionEntry>>> {
    let mut conn = state.db()?;
    let _doc: Document = documents::table.find(document_id).first(&mut conn)?;

    let rows: Vec<(DocumentAction, String, String)> = document_actions::table
        .inner_join(actions::table)
        .inner_join(users::table)
        .filter(document_actions::document_id.eq(document_id))
        .select((
            document_actions::all_columns,
            actions::action_type,
            users::username,
        ))
        .order(document_actions::action_date.asc())
        .load(&mut conn)?;

    Ok(Json(
        rows.into_iter()
            .map(|(entry, action_type, username)| DocumentActionEntry {
                id: entry.id,
                action_date: to_iso(entry.action_date),
                comment: entry.comment,
                action_id: entry.action_id,
                action_type,
                user_id: entry.user_id,
                username,
                document_id: entry.document_id,
            })
            .collect(),
    ))
}

/// Appends to the audit log. The acting user comes from the access token,
/// never from the payload.
pub async fn record_document_action(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<RecordActionRequest>,
) -> AppResult<Json<DocumentActionEntry>> {
    let mut conn = state.db()?;
    let _doc: Document = documents::table.find(document_id).first(&mut conn)?;
    let action: Action = actions::table
        .find(payload.action_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::bad_request("action does not exist"))?;

    let new_entry = NewDocumentAction {
        id: Uuid::new_v4(),
        comment: payload.comment.unwrap_or_default(),
        action_id: action.id,
        user_id: user.user_id,
        document_id,
    };

    diesel::insert_into(document_actions::table)
        .values(&new_entry)
        .execute(&mut conn)?;

    let entry: DocumentAction = document_actions::table.find(new_entry.id).first(&mut conn)?;
    Ok(Json(DocumentActionEntry {
        id: entry.id,
        action_date: to_iso(entry.action_date),
        comment: entry.comment,
        action_id: entry.action_id,
        action_type: action.action_type,
        user_id: entry.user_id,
        username: user.username,
        document_id: entry.document_id,
    }))
}

// Same constraint as phone_numbers.phone: a short internal number.
fn validate_phone(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("phone must not be empty"));
    }
    if trimmed.chars().count() > 5 {
        return Err(AppError::bad_request(
            "phone must be an internal number of at most 5 digits",
        ));
    }
    Ok(trimmed)
}

fn to_document_response(doc: Document, document_type: String) -> DocumentResponse {
    DocumentResponse {
        id: doc.id,
        name: doc.name,
        sheet_count: doc.sheet_count,
        notice_name: doc.notice_name,
        notice_sheet_count: doc.notice_sheet_count,
        creation_date: to_iso_date(doc.creation_date),
        creator_id: doc.creator_id,
        type_id: doc.type_id,
        document_type,
        phone: doc.phone,
    }
}

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}

fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
