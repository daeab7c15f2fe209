use std::{fmt, io::Write, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Deserializes a field that distinguishes "absent" (`None`) from an explicit
/// `null` (`Some(None)`). Pair with `#[serde(default)]`.
pub fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Stores a string-backed enum in a `TEXT`/`VARCHAR` column.
macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                raw.parse::<$ty>().map_err(Into::into)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Only superadmins may manage other admin accounts.
    pub fn can_manage_admins(&self) -> bool {
        matches!(self, Role::Superadmin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

text_column!(Role);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(format!("unknown media type: {other}")),
        }
    }
}

text_column!(MediaType);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
pub enum TrainingMode {
    #[default]
    #[serde(rename = "In-Person")]
    InPerson,
    Online,
    Both,
}

impl TrainingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::InPerson => "In-Person",
            TrainingMode::Online => "Online",
            TrainingMode::Both => "Both",
        }
    }
}

impl FromStr for TrainingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In-Person" => Ok(TrainingMode::InPerson),
            "Online" => Ok(TrainingMode::Online),
            "Both" => Ok(TrainingMode::Both),
            other => Err(format!("unknown training mode: {other}")),
        }
    }
}

text_column!(TrainingMode);

/// Whether a gallery record's tags are mirrored on the remote asset host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsExpression, FromSqlRow, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Synced,
    Pending,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Failed => "failed",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synced" => Ok(SyncStatus::Synced),
            "pending" => Ok(SyncStatus::Pending),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

text_column!(SyncStatus);

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, ToSchema)]
#[diesel(table_name = crate::schema::blog_posts)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    #[schema(example = "Clean water for Kisumu")]
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::blog_posts)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset, ToSchema)]
#[diesel(table_name = crate::schema::blog_posts)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub cover_image: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, ToSchema)]
#[diesel(table_name = crate::schema::projects)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[schema(example = "Community health outreach")]
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub collaborators: Vec<String>,
    pub image_urls: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject {
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub collaborators: Vec<String>,
    pub image_urls: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset, ToSchema)]
#[diesel(table_name = crate::schema::projects)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub collaborators: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<NaiveDate>)]
    pub end_date: Option<Option<NaiveDate>>,
    pub is_ongoing: Option<bool>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, ToSchema)]
#[diesel(table_name = crate::schema::trainings)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: Uuid,
    #[schema(example = "First aid for volunteers")]
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub facilitators: Vec<String>,
    pub target_audience: Option<String>,
    pub resources: Vec<String>,
    pub image_urls: Vec<String>,
    pub certificate_issued: bool,
    pub mode: TrainingMode,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::trainings)]
pub struct NewTraining {
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub facilitators: Vec<String>,
    pub target_audience: Option<String>,
    pub resources: Vec<String>,
    pub image_urls: Vec<String>,
    pub certificate_issued: bool,
    pub mode: TrainingMode,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset, ToSchema)]
#[diesel(table_name = crate::schema::trainings)]
#[serde(rename_all = "camelCase")]
pub struct TrainingChanges {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub facilitators: Option<Vec<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub target_audience: Option<Option<String>>,
    pub resources: Option<Vec<String>>,
    pub image_urls: Option<Vec<String>>,
    pub certificate_issued: Option<bool>,
    pub mode: Option<TrainingMode>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<NaiveDate>)]
    pub end_date: Option<Option<NaiveDate>>,
    pub is_ongoing: Option<bool>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, ToSchema)]
#[diesel(table_name = crate::schema::gallery_items)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: Uuid,
    #[schema(example = "Borehole handover")]
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub media_url: String,
    #[schema(example = "a1b2c3d4")]
    pub asset_id: String,
    pub tags: Vec<String>,
    pub uploaded_by: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::gallery_items)]
pub struct NewGalleryItem {
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub media_url: String,
    pub asset_id: String,
    pub tags: Vec<String>,
    pub uploaded_by: Option<String>,
    pub sync_status: SyncStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::gallery_items)]
pub struct GalleryChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub sync_status: Option<SyncStatus>,
}
