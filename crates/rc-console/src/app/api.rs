//! Apps Admin API
//!
//! List, show and identity-provider sync of app registrations.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::actions::{index_action_items, show_action_items, ActionItem};
use super::detail::{build_panels, AppRelations, DetailOptions, Panel};
use super::entity::App;
use super::filters::AppListFilters;
use super::repository::{AppDirectory, AppRepository};
use super::sync::{AppSyncService, SyncOutcome};
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::authorization_service::{authorize, Action, CapabilityCheck, Resource};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::Authenticated;

/// App row of the list
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    pub id: i64,
    pub name: String,
    pub display_name: Option<String>,
    pub is_first_party: bool,
    pub source: Option<String>,
    pub auth0_client_id: Option<String>,
    pub database_reference: Option<String>,
    pub created_at: String,
}

impl From<App> for AppSummary {
    fn from(app: App) -> Self {
        Self {
            id: app.id,
            name: app.name,
            display_name: app.display_name,
            is_first_party: app.is_first_party,
            source: app.source,
            auth0_client_id: app.auth0_client_id,
            database_reference: app.database_reference,
            created_at: app.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppListResponse {
    pub apps: PaginatedResponse<AppSummary>,
    pub action_items: Vec<ActionItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppDetailResponse {
    pub id: i64,
    pub name: String,
    pub panels: Vec<Panel>,
    pub action_items: Vec<ActionItem>,
}

/// Apps service state
#[derive(Clone)]
pub struct AppsState {
    pub app_repo: Arc<AppRepository>,
    pub sync_service: Arc<AppSyncService>,
    pub capabilities: Arc<dyn CapabilityCheck>,
    pub detail_options: DetailOptions,
    pub default_page_size: u32,
}

/// List apps
#[utoipa::path(
    get,
    path = "",
    tag = "apps",
    operation_id = "getApiAdminApps",
    params(AppListFilters, PaginationParams),
    responses(
        (status = 200, description = "Page of apps", body = AppListResponse),
        (status = 403, description = "Not allowed to view apps")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_apps(
    State(state): State<AppsState>,
    auth: Authenticated,
    Query(filters): Query<AppListFilters>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<AppListResponse>> {
    authorize(state.capabilities.as_ref(), &auth.0, Action::View, &Resource::AppClass)?;

    let size = pagination.size_or(state.default_page_size);
    let apps = state.app_repo
        .search(&filters, pagination.offset(state.default_page_size), size as i64)
        .await?;
    let total = state.app_repo.count(&filters).await?;

    let data = apps.into_iter().map(AppSummary::from).collect();

    Ok(Json(AppListResponse {
        apps: PaginatedResponse::new(data, pagination.page(), size, total),
        action_items: index_action_items(state.capabilities.as_ref(), &auth.0),
    }))
}

/// Show one app with its panels
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "apps",
    operation_id = "getApiAdminAppsById",
    params(
        ("id" = i64, Path, description = "App ID")
    ),
    responses(
        (status = 200, description = "App found", body = AppDetailResponse),
        (status = 403, description = "Not allowed to view this app"),
        (status = 404, description = "App not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_app(
    State(state): State<AppsState>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<AppDetailResponse>> {
    let app = state.app_repo.find_by_id(id).await?
        .ok_or_else(|| PlatformError::not_found("App", id.to_string()))?;

    authorize(state.capabilities.as_ref(), &auth.0, Action::View, &Resource::App(&app))?;

    let relations = AppRelations {
        identities: state.app_repo.find_identities(id).await?,
        data_stream_apps: state.app_repo.find_data_stream_apps(id).await?,
        mss_telecoms: state.app_repo.find_mss_telecoms(id).await?,
        grants: if app.client_auth() {
            state.app_repo.find_grants(id).await?
        } else {
            vec![]
        },
    };

    let panels = build_panels(&app, &relations, &state.detail_options, state.capabilities.as_ref(), &auth.0);
    let action_items = show_action_items(state.capabilities.as_ref(), &auth.0, &app);

    Ok(Json(AppDetailResponse {
        id: app.id,
        name: app.name,
        panels,
        action_items,
    }))
}

/// Push the app and its grants to the identity provider
///
/// Provider failures are reported in the flash, not as an HTTP error.
#[utoipa::path(
    post,
    path = "/{id}/sync-identity-provider",
    tag = "apps",
    operation_id = "postApiAdminAppsSyncIdentityProvider",
    params(
        ("id" = i64, Path, description = "App ID")
    ),
    responses(
        (status = 200, description = "Sync attempted; see flash", body = SyncOutcome),
        (status = 403, description = "Not allowed to sync this app"),
        (status = 404, description = "App not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn sync_app_on_identity_provider(
    State(state): State<AppsState>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<SyncOutcome>> {
    let outcome = state.sync_service.sync_app(&auth.0, id).await?;
    Ok(Json(outcome))
}

/// Create apps router
pub fn apps_router(state: AppsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_apps))
        .routes(routes!(get_app))
        .routes(routes!(sync_app_on_identity_provider))
        .with_state(state)
}
