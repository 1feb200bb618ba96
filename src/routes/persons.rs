use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::{dsl::count_star, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewPerson, NewPersonUser, NewPhoneNumber, Person, PersonUser, PhoneNumber},
    schema::{person_users, persons, phone_numbers, users},
    state::AppState,
    utils::json::double_option,
};

#[derive(Serialize)]
pub struct PersonInfo {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub email: Option<String>,
    pub occupation: String,
    pub tab_num: i32,
    pub department_id: Uuid,
    pub site_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreatePersonRequest {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub email: Option<String>,
    pub occupation: String,
    pub tab_num: i32,
    pub department_id: Uuid,
    pub site_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdatePersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub occupation: Option<String>,
    pub tab_num: Option<i32>,
    pub department_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub site_id: Option<Option<Uuid>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = persons)]
struct PersonChangeset<'a> {
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    middle_name: Option<&'a str>,
    email: Option<Option<&'a str>>,
    occupation: Option<&'a str>,
    tab_num: Option<i32>,
    department_id: Option<Uuid>,
    site_id: Option<Option<Uuid>>,
}

#[derive(Serialize)]
pub struct PhoneInfo {
    pub id: Uuid,
    pub phone: String,
    pub person_id: Uuid,
}

#[derive(Deserialize)]
pub struct AddPhoneRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct UsernameMappingInfo {
    pub id: Uuid,
    pub person_id: Uuid,
    pub username: String,
}

#[derive(Deserialize)]
pub struct AddUsernameMappingRequest {
    pub username: String,
}

fn require_name(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub async fn list_persons(State(state): State<AppState>) -> AppResult<Json<Vec<PersonInfo>>> {
    let mut conn = state.db()?;
    let rows: Vec<Person> = persons::table
        .order((persons::last_name.asc(), persons::first_name.asc()))
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(person_to_info).collect()))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
) -> AppResult<Json<PersonInfo>> {
    let mut conn = state.db()?;
    let person: Person = persons::table.find(person_id).first(&mut conn)?;
    Ok(Json(person_to_info(person)))
}

pub async fn create_person(
    State(state): State<AppState>,
    Json(payload): Json<CreatePersonRequest>,
) -> AppResult<Json<PersonInfo>> {
    let first_name = require_name("first_name", &payload.first_name)?;
    let last_name = require_name("last_name", &payload.last_name)?;
    let middle_name = require_name("middle_name", &payload.middle_name)?;
    let occupation = require_name("occupation", &payload.occupation)?;

    let mut conn = state.db()?;
    let new_person = NewPerson {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        middle_name,
        email: payload.email,
        occupation,
        tab_num: payload.tab_num,
        department_id: payload.department_id,
        site_id: payload.site_id,
    };

    diesel::insert_into(persons::table)
        .values(&new_person)
        .execute(&mut conn)?;

    let person: Person = persons::table.find(new_person.id).first(&mut conn)?;
    Ok(Json(person_to_info(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
    Json(payload): Json<UpdatePersonRequest>,
) -> AppResult<Json<PersonInfo>> {
    let mut conn = state.db()?;
    let existing: Person = persons::table.find(person_id).first(&mut conn)?;

    let first_name = payload
        .first_name
        .as_deref()
        .map(|value| require_name("first_name", value))
        .transpose()?;
    let last_name = payload
        .last_name
        .as_deref()
        .map(|value| require_name("last_name", value))
        .transpose()?;
    let middle_name = payload
        .middle_name
        .as_deref()
        .map(|value| require_name("middle_name", value))
        .transpose()?;
    let occupation = payload
        .occupation
        .as_deref()
        .map(|value| require_name("occupation", value))
        .transpose()?;

    let changeset = PersonChangeset {
        first_name: first_name.as_deref(),
        last_name: last_name.as_deref(),
        middle_name: middle_name.as_deref(),
        email: payload.email.as_ref().map(|opt| opt.as_deref()),
        occupation: occupation.as_deref(),
        tab_num: payload.tab_num,
        department_id: payload.department_id,
        site_id: payload.site_id,
    };

    if changeset.first_name.is_none()
        && changeset.last_name.is_none()
        && changeset.middle_name.is_none()
        && changeset.email.is_none()
        && changeset.occupation.is_none()
        && changeset.tab_num.is_none()
        && changeset.department_id.is_none()
        && changeset.site_id.is_none()
    {
        return Ok(Json(person_to_info(existing)));
    }

    diesel::update(persons::table.find(person_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let updated: Person = persons::table.find(person_id).first(&mut conn)?;
    Ok(Json(person_to_info(updated)))
}

/// Phones, username mappings and authored documents cascade; a person
/// still linked from a user account is protected.
pub async fn delete_person(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;

    let linked_accounts: i64 = users::table
        .filter(users::person_id.eq(Some(person_id)))
        .select(count_star())
        .first(&mut conn)?;
    if linked_accounts > 0 {
        return Err(AppError::conflict(
            "cannot delete person that is still linked to a user account",
        ));
    }

    let deleted = diesel::delete(persons::table.find(person_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_phones(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
) -> AppResult<Json<Vec<PhoneInfo>>> {
    let mut conn = state.db()?;
    let _person: Person = persons::table.find(person_id).first(&mut conn)?;
    let rows: Vec<PhoneNumber> = phone_numbers::table
        .filter(phone_numbers::person_id.eq(person_id))
        .order(phone_numbers::phone.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(phone_to_info).collect()))
}

pub async fn add_phone(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
    Json(payload): Json<AddPhoneRequest>,
) -> AppResult<Json<PhoneInfo>> {
    let phone = payload.phone.trim();
    if phone.is_empty() {
        return Err(AppError::bad_request("phone must not be empty"));
    }
    if phone.chars().count() > 5 {
        return Err(AppError::bad_request(
            "phone must be an internal number of at most 5 digits",
        ));
    }

    let mut conn = state.db()?;
    let _person: Person = persons::table.find(person_id).first(&mut conn)?;

    let new_phone = NewPhoneNumber {
        id: Uuid::new_v4(),
        phone: phone.to_string(),
        person_id,
    };
    diesel::insert_into(phone_numbers::table)
        .values(&new_phone)
        .execute(&mut conn)?;

    let row: PhoneNumber = phone_numbers::table.find(new_phone.id).first(&mut conn)?;
    Ok(Json(phone_to_info(row)))
}

pub async fn delete_phone(
    State(state): State<AppState>,
    Path(phone_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(phone_numbers::table.find(phone_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_username_mappings(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
) -> AppResult<Json<Vec<UsernameMappingInfo>>> {
    let mut conn = state.db()?;
    let _person: Person = persons::table.find(person_id).first(&mut conn)?;
    let rows: Vec<PersonUser> = person_users::table
        .filter(person_users::person_id.eq(person_id))
        .order(person_users::username.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(mapping_to_info).collect()))
}

// No uniqueness here: the mapping is a legacy artifact and may repeat.
pub async fn add_username_mapping(
    State(state): State<AppState>,
    Path(person_id): Path<Uuid>,
    Json(payload): Json<AddUsernameMappingRequest>,
) -> AppResult<Json<UsernameMappingInfo>> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("username must not be empty"));
    }

    let mut conn = state.db()?;
    let _person: Person = persons::table.find(person_id).first(&mut conn)?;

    let new_mapping = NewPersonUser {
        id: Uuid::new_v4(),
        person_id,
        username: username.to_string(),
    };
    diesel::insert_into(person_users::table)
        .values(&new_mapping)
        .execute(&mut conn)?;

    let row: PersonUser = person_users::table.find(new_mapping.id).first(&mut conn)?;
    Ok(Json(mapping_to_info(row)))
}

pub async fn delete_username_mapping(
    State(state): State<AppState>,
    Path(mapping_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(person_users::table.find(mapping_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn person_to_info(person: Person) -> PersonInfo {
    PersonInfo {
        id: person.id,
        first_name: person.first_name,
        last_name: person.last_name,
        middle_name: person.middle_name,
        email: person.email,
        occupation: person.occupation,
        tab_num: person.tab_num,
        department_id: person.department_id,
        site_id: person.site_id,
    }
}

fn phone_to_info(phone: PhoneNumber) -> PhoneInfo {
    PhoneInfo {
        id: phone.id,
        phone: phone.phone,
        person_id: phone.person_id,
    }
}

fn mapping_to_info(mapping: PersonUser) -> UsernameMappingInfo {
    UsernameMappingInfo {
        id: mapping.id,
        person_id: mapping.person_id,
        username: mapping.username,
    }
}
