use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A single todo owned by a user. Serialized as `{id, name, userId}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// An integer that clients may send either as a JSON number or a numeric string.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl IdValue {
    pub fn to_id(&self, field: &str) -> Result<i64, ServiceError> {
        match self {
            IdValue::Number(n) => Ok(*n),
            IdValue::Text(s) => parse_id(field, Some(s)),
        }
    }
}

/// Parse a required integer taken from a query string or path segment.
pub fn parse_id(field: &str, raw: Option<&str>) -> Result<i64, ServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation(format!("{field} is required")))?;
    raw.parse::<i64>()
        .map_err(|_| ServiceError::Validation(format!("{field} must be an integer, got {raw:?}")))
}

fn required_name(name: Option<&str>) -> Result<String, ServiceError> {
    match name {
        Some(n) if !n.trim().is_empty() => Ok(n.to_string()),
        _ => Err(ServiceError::Validation("name is required".into())),
    }
}

/// Body of a create request. Both fields are required.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoInput {
    pub name: Option<String>,
    pub user_id: Option<IdValue>,
}

impl CreateTodoInput {
    pub fn new(name: impl Into<String>, user_id: i64) -> Self {
        Self { name: Some(name.into()), user_id: Some(IdValue::Number(user_id)) }
    }

    /// Returns the validated `(name, user_id)` pair.
    pub fn validate(&self) -> Result<(String, i64), ServiceError> {
        let name = required_name(self.name.as_deref())
            .map_err(|_| ServiceError::Validation("name and userId are required".into()))?;
        let user_id = self
            .user_id
            .as_ref()
            .ok_or_else(|| ServiceError::Validation("name and userId are required".into()))?
            .to_id("userId")?;
        Ok((name, user_id))
    }
}

/// Body of an update request. `name` is required, `userId` is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoInput {
    pub name: Option<String>,
    pub user_id: Option<IdValue>,
}

impl UpdateTodoInput {
    pub fn new(name: impl Into<String>, user_id: Option<i64>) -> Self {
        Self { name: Some(name.into()), user_id: user_id.map(IdValue::Number) }
    }

    pub fn validate(&self) -> Result<(String, Option<i64>), ServiceError> {
        let name = required_name(self.name.as_deref())?;
        let user_id = self.user_id.as_ref().map(|v| v.to_id("userId")).transpose()?;
        Ok((name, user_id))
    }
}

/// How `list_by_name` compares names. Both modes ignore case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameMatch {
    #[default]
    Exact,
    Contains,
}

impl NameMatch {
    pub fn matches(self, candidate: &str, needle_lower: &str) -> bool {
        let candidate = candidate.to_lowercase();
        match self {
            NameMatch::Exact => candidate == needle_lower,
            NameMatch::Contains => candidate.contains(needle_lower),
        }
    }
}

impl FromStr for NameMatch {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "exact" => Ok(NameMatch::Exact),
            "contains" => Ok(NameMatch::Contains),
            other => Err(ServiceError::Validation(format!("match must be exact or contains, got {other:?}"))),
        }
    }
}
