use axum::Json;
use axum::extract::Path;
use axum::routing::{delete, patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::grades::{GradeTable, grade_table};
use crate::models::*;
use crate::services::SessionView;
use crate::state::AppState;

#[derive(Serialize)]
struct CreatedTemplate {
    id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/grades", get(grades))
        .route("/session", post(login).delete(logout))
        .route("/state", get(current_state))
        .route("/template/select", post(select_template))
        .route("/semesters", post(add_semester))
        .route("/semesters/{index}", patch(rename_semester).delete(delete_semester))
        .route("/semesters/{index}/select", post(select_semester))
        .route("/semesters/{index}/courses", post(add_course))
        .route("/semesters/{index}/courses/{course}", patch(edit_course).delete(delete_course))
        .route("/semesters/{index}/courses/{course}/grade", put(set_grade))
        .route("/settings", put(update_settings))
        .route("/sync", post(sync_now))
        .route("/sync/error", delete(clear_sync_error))
        .route("/reset", post(reset))
        .route("/templates", get(list_templates).post(submit_template))
        .route("/templates/pending", get(pending_templates))
        .route("/templates/{id}/approve", post(approve_template))
        .route("/templates/{id}", delete(reject_template))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn grades() -> Json<GradeTable> {
    Json(grade_table())
}

async fn login(
    State(state): State<AppState>,
    Json(user): Json<UserIdentity>,
) -> Result<Json<SessionView>, AppError> {
    let view = state.tracker.login(user).await?;
    Ok(Json(view))
}

async fn logout(State(state): State<AppState>) -> StatusCode {
    state.tracker.logout().await;
    StatusCode::NO_CONTENT
}

async fn current_state(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.view().await?))
}

async fn select_template(
    State(state): State<AppState>,
    Json(choice): Json<TemplateChoice>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.select_template(choice).await?))
}

async fn add_semester(
    State(state): State<AppState>,
    Json(req): Json<NewSemesterRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.add_semester(&req.name).await?))
}

async fn rename_semester(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<NewSemesterRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.rename_semester(index, &req.name).await?))
}

async fn delete_semester(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.delete_semester(index).await?))
}

async fn select_semester(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.select_semester(index).await?))
}

async fn add_course(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.add_course(index, &req.name, &req.credits).await?))
}

async fn edit_course(
    State(state): State<AppState>,
    Path((index, course)): Path<(usize, usize)>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .tracker
        .edit_course(index, course, &req.name, &req.credits)
        .await?;
    Ok(Json(view))
}

async fn delete_course(
    State(state): State<AppState>,
    Path((index, course)): Path<(usize, usize)>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.delete_course(index, course).await?))
}

async fn set_grade(
    State(state): State<AppState>,
    Path((index, course)): Path<(usize, usize)>,
    Json(req): Json<GradeRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.set_grade(index, course, &req.grade).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.update_settings(settings).await?))
}

async fn sync_now(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.save_to_cloud().await?))
}

async fn clear_sync_error(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.clear_sync_error().await?))
}

async fn reset(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.tracker.reset().await?))
}

async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(state.tracker.templates().approved().await?))
}

async fn submit_template(
    State(state): State<AppState>,
    Json(req): Json<SubmitTemplateRequest>,
) -> Result<(StatusCode, Json<CreatedTemplate>), AppError> {
    let id = state
        .tracker
        .submit_template(&req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedTemplate { id })))
}

async fn pending_templates(State(state): State<AppState>) -> Result<Json<Vec<Template>>, AppError> {
    let user = state.tracker.current_user().await?;
    Ok(Json(state.tracker.templates().pending(&user).await?))
}

async fn approve_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = state.tracker.current_user().await?;
    state.tracker.templates().approve(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reject_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = state.tracker.current_user().await?;
    state.tracker.templates().reject(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
