//! API Middleware
//!
//! Authentication middleware for Axum.
//! Supports both Bearer token (Authorization header) and session cookie authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::auth::auth_service::{extract_bearer_token, AuthService};
use crate::shared::api_common::ApiError;
use crate::shared::authorization_service::{AuthContext, AuthorizationService};

/// Default session cookie name
pub const SESSION_COOKIE_NAME: &str = "rc_session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub authz_service: Arc<AuthorizationService>,
    pub session_cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, authz_service: Arc<AuthorizationService>) -> Self {
        Self {
            auth_service,
            authz_service,
            session_cookie_name: Arc::from(SESSION_COOKIE_NAME),
        }
    }

    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = Arc::from(name.into());
        self
    }
}

/// Authenticated operator extractor
/// Validates JWT and extracts AuthContext from the request
pub struct Authenticated(pub AuthContext);

impl std::ops::Deref for Authenticated {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error response for authentication failures
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiError {
            error: "UNAUTHORIZED".to_string(),
            message: self.message,
            details: None,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Extract token from session cookie
fn extract_session_cookie(parts: &Parts, cookie_name: &str) -> Option<String> {
    parts.headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';')
                .filter_map(|c| c.trim().split_once('='))
                .find(|(name, _)| *name == cookie_name)
                .map(|(_, value)| value.to_string())
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by AuthLayer
        let app_state = parts.extensions.get::<AppState>()
            .cloned()
            .ok_or_else(|| AuthError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Auth service not configured".to_string(),
            })?;

        let token = parts.headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(extract_bearer_token)
            .map(String::from)
            .or_else(|| extract_session_cookie(parts, &app_state.session_cookie_name))
            .ok_or_else(|| AuthError {
                status: StatusCode::UNAUTHORIZED,
                message: "Missing authentication token".to_string(),
            })?;

        let claims = app_state.auth_service.validate_token(&token)
            .map_err(|e| AuthError {
                status: StatusCode::UNAUTHORIZED,
                message: e.to_string(),
            })?;

        Ok(Authenticated(app_state.authz_service.build_context(&claims)))
    }
}

/// Middleware layer that injects AppState into request extensions
/// This enables the Authenticated extractor to work
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());

        let future = self.inner.call(req);
        Box::pin(future)
    }
}
