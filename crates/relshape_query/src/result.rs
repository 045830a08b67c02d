//! Safe-parse results.
//!
//! Uses the "errors as values" pattern: a [`SafeParseResult`] is either the
//! reshaped data or the error, never both and never a partial value.

use crate::error::QueryError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The outcome of a `safe_parse` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParseResult<T> {
    Success { data: T },
    Failure { error: QueryError },
}

impl<T> SafeParseResult<T> {
    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true on failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the data on success.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the error on failure.
    #[must_use]
    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Converts into a standard result.
    pub fn into_result(self) -> Result<T, QueryError> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { error } => Err(error),
        }
    }

    /// Maps the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SafeParseResult<U> {
        match self {
            Self::Success { data } => SafeParseResult::Success { data: f(data) },
            Self::Failure { error } => SafeParseResult::Failure { error },
        }
    }
}

impl<T> From<Result<T, QueryError>> for SafeParseResult<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(error) => Self::Failure { error },
        }
    }
}

impl<T: Serialize> Serialize for SafeParseResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Success { data } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            Self::Failure { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntitySource;
    use serde_json::json;

    #[test]
    fn test_success() {
        let result = SafeParseResult::from(Ok::<_, QueryError>(json!({ "id": 1 })));
        assert!(result.is_success());
        assert_eq!(result.data(), Some(&json!({ "id": 1 })));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "success": true, "data": { "id": 1 } })
        );
    }

    #[test]
    fn test_failure() {
        let error = QueryError::UnknownEntity {
            entity: "ghost".into(),
            source_map: EntitySource::RelationGraph,
        };
        let result = SafeParseResult::from(Err::<u32, _>(error.clone()));

        assert!(result.is_failure());
        assert_eq!(result.error(), Some(&error));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], json!(false));
        assert_eq!(json["error"]["code"], json!("UNKNOWN_ENTITY"));
        assert_eq!(result.map(|n| n + 1).into_result(), Err(error));
    }
}
