use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{Query, QueryRejection};
use common::types::Confirmation;
use serde::Deserialize;
use service::todo::{parse_id, CreateTodoInput, NameMatch, Todo, UpdateTodoInput};

use crate::errors::JsonApiError;
use crate::routes::AppState;

type ApiResult<T> = Result<T, JsonApiError>;

// Extractors are taken as `Result<_, Rejection>` so a bad query string or body is
// answered with our JSON error body instead of axum's plain-text rejection.
// Ids arrive as strings and go through `parse_id`, which owns the 400 wording for
// both "missing" and "not a number".

#[derive(Debug, Default, Deserialize)]
pub struct TodoIdQuery {
    #[serde(rename = "todoId")]
    pub todo_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserIdQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
    #[serde(rename = "match")]
    pub mode: Option<String>,
}

/// `todoId` may repeat: `?todoId=1&todoId=2`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkDeleteQuery {
    #[serde(rename = "todoId", default)]
    pub todo_ids: Vec<String>,
}

/// GET /todos/all
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.todos.list_all().await)
}

/// GET /todos/byid?todoId=
pub async fn get_by_id(
    State(state): State<AppState>,
    query: Result<Query<TodoIdQuery>, QueryRejection>,
) -> ApiResult<Json<Todo>> {
    let Query(q) = query?;
    let id = parse_id("todoId", q.todo_id.as_deref())?;
    Ok(Json(state.todos.get_by_id(id).await?))
}

/// GET /todos/byuserid?userId=
pub async fn list_by_user(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Todo>>> {
    let Query(q) = query?;
    let user_id = parse_id("userId", q.user_id.as_deref())?;
    Ok(Json(state.todos.list_by_user(user_id).await))
}

/// GET /todos/byname?name=&match=exact|contains
pub async fn list_by_name(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Todo>>> {
    let Query(q) = query?;
    // a missing name becomes "" and the store rejects it as a validation error
    let name = q.name.unwrap_or_default();
    let mode: NameMatch = q.mode.as_deref().unwrap_or_default().parse()?;
    Ok(Json(state.todos.list_by_name(&name, mode).await?))
}

/// POST /todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(input) = body?;
    // the store has already written the file (if enabled) when this returns
    let todo = state.todos.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PUT /todos/update?todoId=
pub async fn update_by_query(
    State(state): State<AppState>,
    query: Result<Query<TodoIdQuery>, QueryRejection>,
    body: Result<Json<UpdateTodoInput>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Query(q) = query?;
    let id = parse_id("todoId", q.todo_id.as_deref())?;
    update(&state, id, body).await
}

/// PUT /todos/:id
pub async fn update_by_path(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateTodoInput>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_id("id", Some(&raw_id))?;
    update(&state, id, body).await
}

async fn update(
    state: &AppState,
    id: i64,
    body: Result<Json<UpdateTodoInput>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Json(input) = body?;
    Ok(Json(state.todos.update(id, input).await?))
}

/// DELETE /todos?todoId=1&todoId=2
pub async fn delete_todos(
    State(state): State<AppState>,
    query: Result<Query<BulkDeleteQuery>, QueryRejection>,
) -> ApiResult<Json<Confirmation>> {
    let Query(q) = query?;
    if q.todo_ids.is_empty() {
        return Err(JsonApiError::bad_request("todoId is required"));
    }
    // one unparsable id fails the whole request; nothing is deleted
    let ids = q
        .todo_ids
        .iter()
        .map(|raw| parse_id("todoId", Some(raw)))
        .collect::<Result<Vec<_>, _>>()?;
    let deleted = state.todos.delete_by_ids(&ids).await?;
    Ok(Json(Confirmation::new("Todos deleted successfully").with_deleted(deleted)))
}

/// DELETE /todos/:id
pub async fn delete_by_path(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Confirmation>> {
    let id = parse_id("id", Some(&raw_id))?;
    let removed = state.todos.delete_by_id(id).await?;
    Ok(Json(Confirmation::new("Todo deleted successfully").with_id(removed.id)))
}

/// DELETE /todos/all
pub async fn delete_all(State(state): State<AppState>) -> ApiResult<Json<Confirmation>> {
    let deleted = state.todos.delete_all().await?;
    Ok(Json(Confirmation::new("All todos deleted").with_deleted(deleted)))
}
