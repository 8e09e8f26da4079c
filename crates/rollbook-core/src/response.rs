use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// The outbound result shape produced by every operation and consumed by the
/// response layer.
///
/// Single-entity payloads are keyed by entity name (`{"student": {...}}`),
/// lists by its plural (`{"students": [...]}`), deletions as `{"id": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub code: u16,
    pub data: Option<Value>,
    pub errors: Vec<String>,
    pub message: String,
}

impl ApiResponse {
    pub fn success(data: Value, message: &str) -> Self {
        Self::success_with(StatusCode::OK, data, message)
    }

    pub fn success_with(code: StatusCode, data: Value, message: &str) -> Self {
        Self {
            ok: true,
            code: code.as_u16(),
            data: Some(data),
            errors: Vec::new(),
            message: message.to_string(),
        }
    }

    /// Success response for a single entity, keyed by its name.
    pub fn single<T: Serialize>(entity_name: &str, entity: &T, message: &str) -> Self {
        Self::success(keyed(entity_name, entity), message)
    }

    /// Success response for a list of entities, keyed by the plural name.
    pub fn list<T: Serialize>(entity_name: &str, entities: &[T], message: &str) -> Self {
        Self::success(keyed(&format!("{entity_name}s"), &entities), message)
    }

    /// 201 response for a freshly created entity.
    pub fn created<T: Serialize>(entity_name: &str, entity: &T, message: &str) -> Self {
        Self::success_with(StatusCode::CREATED, keyed(entity_name, entity), message)
    }

    /// Success response for a soft-deleted entity.
    pub fn deleted<I: Serialize>(id: &I, message: &str) -> Self {
        Self::success(keyed("id", id), message)
    }

    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            ok: false,
            code: code.as_u16(),
            data: None,
            errors: vec![message.clone()],
            message,
        }
    }

    /// Converts an [`AppError`] at an operation boundary.
    ///
    /// Errors carrying an explicit business status surface their own message;
    /// unexpected errors surface the generic per-operation `fallback` so
    /// internals never leak to the caller.
    pub fn from_app_error(err: &AppError, fallback: &str) -> Self {
        if err.is_unexpected() {
            Self::error(err.status, fallback)
        } else {
            Self::error(err.status, err.error.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn keyed<T: Serialize>(name: &str, value: &T) -> Value {
    let mut data = Map::new();
    data.insert(
        name.to_string(),
        serde_json::to_value(value).unwrap_or(Value::Null),
    );
    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_keys_data_by_entity_name() {
        let resp = ApiResponse::single("school", &json!({"name": "Kings"}), "ok");
        assert!(resp.ok);
        assert_eq!(resp.code, 200);
        assert_eq!(resp.data.unwrap()["school"]["name"], "Kings");
    }

    #[test]
    fn list_pluralizes_entity_name() {
        let resp = ApiResponse::list("student", &[json!({"name": "Ada"})], "ok");
        assert_eq!(resp.data.unwrap()["students"][0]["name"], "Ada");
    }

    #[test]
    fn created_uses_201() {
        let resp = ApiResponse::created("student", &json!({}), "done");
        assert_eq!(resp.code, 201);
    }

    #[test]
    fn business_error_surfaces_its_own_message() {
        let err = AppError::conflict(anyhow::anyhow!("Student already exists in this school"));
        let resp = ApiResponse::from_app_error(&err, "An error occurred");
        assert!(!resp.ok);
        assert_eq!(resp.code, 409);
        assert_eq!(resp.message, "Student already exists in this school");
        assert_eq!(resp.errors, vec![resp.message.clone()]);
    }

    #[test]
    fn unexpected_error_surfaces_generic_message() {
        let err = AppError::internal(anyhow::anyhow!("connection reset by peer"));
        let resp = ApiResponse::from_app_error(&err, "An error occurred while enrolling student");
        assert_eq!(resp.code, 500);
        assert_eq!(resp.message, "An error occurred while enrolling student");
    }
}
