//! HTTP request handlers.

pub mod admins;
pub mod auth;
pub mod blog;
pub mod gallery;
pub mod health;
pub mod pages;
pub mod projects;
pub mod trainings;
pub mod uploads;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Project deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Rejects a present-but-blank text field.
pub(crate) fn reject_blank(value: Option<&str>, field: &str) -> ApiResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ApiError::bad_request(
            format!("{field} cannot be empty"),
            "VALIDATION_ERROR",
        )),
        _ => Ok(()),
    }
}

/// Resolves the stored end date of a dated record: ongoing records have none,
/// and an end date may not precede the start date.
pub(crate) fn effective_end_date(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    is_ongoing: bool,
) -> ApiResult<Option<NaiveDate>> {
    if is_ongoing {
        return Ok(None);
    }

    match end_date {
        Some(end) if end < start_date => Err(ApiError::bad_request(
            "endDate cannot be before startDate",
            "INVALID_DATE_RANGE",
        )),
        other => Ok(other),
    }
}
