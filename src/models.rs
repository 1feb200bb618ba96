use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = departments)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = sites)]
#[diesel(belongs_to(Department))]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sites)]
pub struct NewSite {
    pub id: Uuid,
    pub name: String,
    pub department_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = persons)]
#[diesel(belongs_to(Department))]
#[diesel(belongs_to(Site))]
pub struct Person {
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

#[derive(Debug, Insertable)]
#[diesel(table_name = persons)]
pub struct NewPerson {
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

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = phone_numbers)]
#[diesel(belongs_to(Person))]
pub struct PhoneNumber {
    pub id: Uuid,
    pub phone: String,
    pub person_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = phone_numbers)]
pub struct NewPhoneNumber {
    pub id: Uuid,
    pub phone: String,
    pub person_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub person_id: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub person_id: Option<Uuid>,
}

/// Legacy person-to-username mapping kept alongside `users.person_id`.
#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = person_users)]
#[diesel(belongs_to(Person))]
pub struct PersonUser {
    pub id: Uuid,
    pub person_id: Uuid,
    pub username: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = person_users)]
pub struct NewPersonUser {
    pub id: Uuid,
    pub person_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = actions)]
pub struct Action {
    pub id: Uuid,
    pub action_type: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = actions)]
pub struct NewAction {
    pub id: Uuid,
    pub action_type: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = document_types)]
pub struct DocumentType {
    pub id: Uuid,
    pub document_type: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_types)]
pub struct NewDocumentType {
    pub id: Uuid,
    pub document_type: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = documents)]
#[diesel(belongs_to(Person, foreign_key = creator_id))]
#[diesel(belongs_to(DocumentType, foreign_key = type_id))]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub sheet_count: i32,
    pub notice_name: Option<String>,
    pub notice_sheet_count: Option<i32>,
    pub creation_date: NaiveDate,
    pub creator_id: Uuid,
    pub type_id: Uuid,
    pub phone: Option<String>,
}

// creation_date is filled by the database default and never updated.
#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub id: Uuid,
    pub name: String,
    pub sheet_count: i32,
    pub notice_name: Option<String>,
    pub notice_sheet_count: Option<i32>,
    pub creator_id: Uuid,
    pub type_id: Uuid,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = document_actions)]
#[diesel(belongs_to(Action))]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Document))]
pub struct DocumentAction {
    pub id: Uuid,
    pub action_date: NaiveDateTime,
    pub comment: String,
    pub action_id: Uuid,
    pub user_id: Uuid,
    pub document_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_actions)]
pub struct NewDocumentAction {
    pub id: Uuid,
    pub comment: String,
    pub action_id: Uuid,
    pub user_id: Uuid,
    pub document_id: Uuid,
}
