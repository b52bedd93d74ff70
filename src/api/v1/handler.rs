use super::access::LoginFlow;
use super::error::*;
use crate::application_port::*;
use crate::logger::*;
use crate::migrations::MigrationRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::{StatusCode, header};
use warp::{Reply, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

const LOGIN_FAILED: &str = "1";

fn see_other(location: String) -> warp::reply::Response {
    warp::reply::with_header(
        warp::reply::with_status(warp::reply(), StatusCode::SEE_OTHER),
        header::LOCATION,
        location,
    )
    .into_response()
}

/// Form login. Always answers with a redirect; failures never say which
/// field was wrong.
pub async fn login(
    form: LoginForm,
    auth_service: Arc<dyn AuthService>,
    flow: Arc<LoginFlow>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let login_input = LoginInput {
        username: form.username,
        password: form.password,
    };

    let response = match auth_service.authenticate(login_input).await {
        Ok(session) => {
            let mut response = see_other(flow.success_redirect.clone());
            let cookie = flow.session_cookie(session.token.as_str());
            match header::HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                Err(e) => return Err(reject::custom(ApiErrorCode::internal(e))),
            }
            response
        }
        // One indicator for every failure; storage faults are already logged
        // by the auth service.
        Err(e) => {
            debug!(reason = %e, "login rejected");
            see_other(flow.failure_location(LOGIN_FAILED))
        }
    };

    Ok(response)
}

pub async fn list_migrations(
    registry: Arc<MigrationRegistry>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(registry.names())))
}

#[derive(Debug, Default, Deserialize)]
pub struct MigrationQuery {
    #[serde(default)]
    pub rollback: bool,
}

pub async fn run_migration(
    name: String,
    query: MigrationQuery,
    registry: Arc<MigrationRegistry>,
    schema_evolver: Arc<dyn SchemaEvolver>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let migration = registry
        .find(&name)
        .ok_or_else(|| reject::custom(ApiErrorCode::MigrationNotFound))?;

    let direction = if query.rollback {
        MigrationDirection::Down
    } else {
        MigrationDirection::Up
    };
    info!(migration = %name, ?direction, "running migration");
    let report = schema_evolver.run_migration(migration, direction).await;

    let response = if report.completed {
        ApiResponse::ok(report)
    } else {
        ApiResponse {
            success: false,
            data: Some(report),
            error: Some(ApiError {
                code: ApiErrorCode::MigrationFailed,
                message: ApiErrorCode::MigrationFailed.to_string(),
            }),
        }
    };
    Ok(warp::reply::json(&response))
}
