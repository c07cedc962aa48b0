use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
}

/// One-shot user-facing message attached to a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectData {
    pub flash: Flash,
    pub redirect_to: String,
}

/// `303 See Other` carrying the flash message in the JSON envelope.
#[derive(Debug)]
pub struct FlashRedirect {
    pub to: String,
    pub flash: Flash,
}

impl FlashRedirect {
    pub fn new(to: impl Into<String>, flash: Flash) -> Self {
        Self {
            to: to.into(),
            flash,
        }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let body = ApiResponse::success(
            self.flash.message.clone(),
            RedirectData {
                flash: self.flash,
                redirect_to: self.to.clone(),
            },
            Some(Meta::empty()),
        );
        (StatusCode::SEE_OTHER, [(header::LOCATION, self.to)], Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_redirect_sets_location_and_status() {
        let response =
            FlashRedirect::new("/api/order-summary", Flash::warning("nope")).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/order-summary"
        );
    }

    #[test]
    fn flash_levels_serialize_snake_case() {
        let value = serde_json::to_value(Flash::success("ok")).unwrap();
        assert_eq!(value["level"], "success");
        assert_eq!(value["message"], "ok");
    }
}
