use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::Course;
use crate::render::render_page;
use crate::search::{Permission, ProviderDescriptor, Scope, SearchError, SearchReport};
use crate::state::AppState;
use crate::utils::course_view_url;

use super::ApiResponse;

/// Header carrying the authenticated user id / 已认证用户ID请求头
pub const USER_HEADER: &str = "X-User-Id";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Course id / 课程ID
    pub id: i64,
    #[serde(default)]
    pub search: String,
}

/// Outcome of one search request, before it is shaped into a response / 搜索结果
enum SearchOutcome {
    Found(Course, SearchReport),
    Invalid(Course),
    UnknownCourse,
    Failed,
}

fn user_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Scope for the caller; oracle errors fall back to standard access / 构建调用者范围
async fn caller_scope(state: &AppState, headers: &HeaderMap, course_id: i64) -> Scope {
    let user = user_id(headers);
    let elevated = match state.permissions.has_elevated_access(user, course_id).await {
        Ok(elevated) => elevated,
        Err(e) => {
            tracing::warn!("Permission check failed for course {}: {}", course_id, e);
            false
        }
    };

    let permission = if elevated { Permission::Elevated } else { Permission::Standard };
    let scope = Scope::new(course_id, permission);
    match user {
        Some(id) => scope.with_user(id),
        None => scope,
    }
}

async fn run(state: &AppState, headers: &HeaderMap, query: &SearchQuery) -> SearchOutcome {
    let course = match state.store.find_course(query.id).await {
        Ok(Some(course)) => course,
        Ok(None) => return SearchOutcome::UnknownCourse,
        Err(e) => {
            tracing::error!("Course lookup failed for {}: {}", query.id, e);
            return SearchOutcome::Failed;
        }
    };

    let scope = caller_scope(state, headers, course.id).await;
    tracing::info!(
        course_id = course.id,
        user_id = ?scope.user_id,
        search = %urlencoding::encode(&query.search),
        "Course searched"
    );

    match state
        .engine
        .run_search_with_cancel(&query.search, &scope, state.shutdown.child_token())
        .await
    {
        Ok(report) => SearchOutcome::Found(course, report),
        Err(SearchError::InvalidInput(reason)) => {
            tracing::debug!("Rejected search for course {}: {}", course.id, reason);
            SearchOutcome::Invalid(course)
        }
        Err(e) => {
            tracing::warn!("Search failed for course {}: {}", course.id, e);
            SearchOutcome::Failed
        }
    }
}

/// HTML results page / HTML 结果页
///
/// Empty or too-short input redirects back to the course page.
pub async fn search_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    match run(&state, &headers, &query).await {
        SearchOutcome::Found(course, report) => {
            Html(render_page(&course.fullname, &report, &state.strings)).into_response()
        }
        SearchOutcome::Invalid(course) => {
            Redirect::to(&course_view_url(&state.config.server.wwwroot, course.id)).into_response()
        }
        SearchOutcome::UnknownCourse => (StatusCode::NOT_FOUND, "Course not found").into_response(),
        SearchOutcome::Failed => (StatusCode::INTERNAL_SERVER_ERROR, "Search failed").into_response(),
    }
}

/// JSON search / JSON 搜索
pub async fn search_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Json<ApiResponse<SearchReport>> {
    match run(&state, &headers, &query).await {
        SearchOutcome::Found(_, report) => Json(ApiResponse::success(report)),
        SearchOutcome::Invalid(_) => Json(ApiResponse::error(&format!(
            "Search text must contain a word of at least {} characters",
            state.engine.settings().min_term_length
        ))),
        SearchOutcome::UnknownCourse => Json(ApiResponse::with_code(404, "Course not found")),
        SearchOutcome::Failed => Json(ApiResponse::with_code(500, "Search failed")),
    }
}

/// Categories currently searchable / 当前可搜索的类别
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<ProviderDescriptor>>> {
    Json(ApiResponse::success(state.engine.categories().await))
}
