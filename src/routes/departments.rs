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
    error::{AppError, AppResult},
    models::{Department, NewDepartment, NewSite, Site},
    schema::{departments, sites},
    state::AppState,
    utils::json::double_option,
};

#[derive(Serialize)]
pub struct DepartmentInfo {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Serialize)]
pub struct SiteInfo {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub department_id: Option<Uuid>,
}

// Department codes are short identifiers, three characters at most.
fn validate_department_code(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    if trimmed.chars().count() > 3 {
        return Err(AppError::bad_request(
            "department code must be at most 3 characters",
        ));
    }
    Ok(trimmed)
}

pub async fn list_departments(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DepartmentInfo>>> {
    let mut conn = state.db()?;
    let rows: Vec<Department> = departments::table
        .order(departments::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(department_to_info).collect()))
}

pub async fn create_department(
    State(state): State<AppState>,
    Json(payload): Json<CreateDepartmentRequest>,
) -> AppResult<Json<DepartmentInfo>> {
    let name = validate_department_code(&payload.name)?;

    let mut conn = state.db()?;
    let new_department = NewDepartment {
        id: Uuid::new_v4(),
        name: name.to_string(),
        parent_id: payload.parent_id,
    };

    diesel::insert_into(departments::table)
        .values(&new_department)
        .execute(&mut conn)?;

    let department: Department = departments::table.find(new_department.id).first(&mut conn)?;
    Ok(Json(department_to_info(department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentRequest>,
) -> AppResult<Json<DepartmentInfo>> {
    let mut conn = state.db()?;
    let existing: Department = departments::table.find(department_id).first(&mut conn)?;

    let new_name = match payload.name {
        Some(ref candidate) => Some(validate_department_code(candidate)?.to_string()),
        None => None,
    };

    if let Some(Some(parent)) = payload.parent_id {
        if parent == department_id {
            return Err(AppError::bad_request(
                "a department cannot be its own parent",
            ));
        }
    }

    if new_name.is_none() && payload.parent_id.is_none() {
        return Ok(Json(department_to_info(existing)));
    }

    if let Some(ref name) = new_name {
        diesel::update(departments::table.find(department_id))
            .set(departments::name.eq(name))
            .execute(&mut conn)?;
    }
    if let Some(parent_change) = payload.parent_id {
        diesel::update(departments::table.find(department_id))
            .set(departments::parent_id.eq(parent_change))
            .execute(&mut conn)?;
    }

    let updated: Department = departments::table.find(department_id).first(&mut conn)?;
    Ok(Json(department_to_info(updated)))
}

/// Cascades to child departments, sites, persons and their dependents.
pub async fn delete_department(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted =
        diesel::delete(departments::table.find(department_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sites(State(state): State<AppState>) -> AppResult<Json<Vec<SiteInfo>>> {
    let mut conn = state.db()?;
    let rows: Vec<Site> = sites::table.order(sites::name.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(site_to_info).collect()))
}

pub async fn create_site(
    State(state): State<AppState>,
    Json(payload): Json<CreateSiteRequest>,
) -> AppResult<Json<SiteInfo>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let mut conn = state.db()?;
    let new_site = NewSite {
        id: Uuid::new_v4(),
        name: name.to_string(),
        department_id: payload.department_id,
    };

    diesel::insert_into(sites::table)
        .values(&new_site)
        .execute(&mut conn)?;

    let site: Site = sites::table.find(new_site.id).first(&mut conn)?;
    Ok(Json(site_to_info(site)))
}

pub async fn update_site(
    State(state): State<AppState>,
    Path(site_id): Path<Uuid>,
    Json(payload): Json<UpdateSiteRequest>,
) -> AppResult<Json<SiteInfo>> {
    let mut conn = state.db()?;
    let existing: Site = sites::table.find(site_id).first(&mut conn)?;

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

    if new_name.is_none() && payload.department_id.is_none() {
        return Ok(Json(site_to_info(existing)));
    }

    if let Some(ref name) = new_name {
        diesel::update(sites::table.find(site_id))
            .set(sites::name.eq(name))
            .execute(&mut conn)?;
    }
    if let Some(department_id) = payload.department_id {
        diesel::update(sites::table.find(site_id))
            .set(sites::department_id.eq(department_id))
            .execute(&mut conn)?;
    }

    let updated: Site = sites::table.find(site_id).first(&mut conn)?;
    Ok(Json(site_to_info(updated)))
}

pub async fn delete_site(
    State(state): State<AppState>,
    Path(site_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(sites::table.find(site_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn department_to_info(department: Department) -> DepartmentInfo {
    DepartmentInfo {
        id: department.id,
        name: department.name,
        parent_id: department.parent_id,
    }
}

fn site_to_info(site: Site) -> SiteInfo {
    SiteInfo {
        id: site.id,
        name: site.name,
        department_id: site.department_id,
    }
}
