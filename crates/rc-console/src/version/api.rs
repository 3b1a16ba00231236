//! Audit Trail Admin API
//!
//! Read-only browsing of the version history.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::display::{display_row, DisplayField};
use super::entity::{EntityRef, FieldChange, Version, VersionEvent};
use super::link::AUDIT_TRAIL_PATH;
use super::query::{parse_lenient_id, VersionFilters};
use super::resolver::AuditTrailResolver;
use crate::shared::api_common::PaginationParams;
use crate::shared::authorization_service::{authorize, Action, CapabilityCheck, Resource};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::Authenticated;

/// Query parameters for the audit trail.
///
/// Search-form filters live under `q[...]`; `class` and `id` are the
/// navigation parameters of a deep link and override every filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditTrailQuery {
    /// User email, app name, or raw actor identifier
    #[serde(rename = "q[whodunnit_eq]")]
    pub whodunnit_eq: Option<String>,

    #[serde(rename = "q[event_eq]")]
    pub event_eq: Option<String>,

    #[serde(rename = "q[item_type_eq]")]
    pub item_type_eq: Option<String>,

    #[serde(rename = "q[item_id_eq]")]
    pub item_id_eq: Option<String>,

    #[serde(rename = "q[source_eq]")]
    pub source_eq: Option<String>,

    #[serde(rename = "q[job_name_eq]")]
    pub job_name_eq: Option<String>,

    #[serde(rename = "q[created_at_gteq]")]
    pub created_at_gteq: Option<String>,

    #[serde(rename = "q[created_at_lteq]")]
    pub created_at_lteq: Option<String>,

    /// Entity type of a deep link
    pub class: Option<String>,

    /// Entity id of a deep link
    pub id: Option<String>,

}

impl AuditTrailQuery {
    /// A non-blank `class` activates the entity filter; a missing or
    /// malformed `id` becomes `0`, which matches nothing
    pub fn explicit_entity(&self) -> Option<EntityRef> {
        let class = non_blank(&self.class)?;
        let id = self.id.as_deref().map_or(0, parse_lenient_id);
        Some(EntityRef::new(class, id))
    }

    pub fn filters(&self) -> Result<VersionFilters> {
        Ok(VersionFilters {
            whodunnit: self.whodunnit_eq.clone(),
            event: match non_blank(&self.event_eq) {
                Some(event) => Some(VersionEvent::parse(event).ok_or_else(|| {
                    PlatformError::validation(format!("Unknown event '{}'", event))
                })?),
                None => None,
            },
            item_type: non_blank(&self.item_type_eq).map(String::from),
            item_id: non_blank(&self.item_id_eq).map(parse_lenient_id),
            source: non_blank(&self.source_eq).map(String::from),
            job_name: non_blank(&self.job_name_eq).map(String::from),
            created_from: parse_date(&self.created_at_gteq)?,
            created_to: parse_date(&self.created_at_lteq)?,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &Option<String>) -> Result<Option<NaiveDate>> {
    non_blank(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| PlatformError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
        })
        .transpose()
}

/// One audit record with its display columns
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub id: i64,
    pub event: VersionEvent,
    pub item_type: String,
    pub item_id: i64,
    pub parent: Option<EntityRef>,
    pub coparent: Option<EntityRef>,
    pub whodunnit: Option<String>,
    pub source: Option<String>,
    pub job_name: Option<String>,
    pub object_changes: BTreeMap<String, FieldChange>,
    pub created_at: String,
    pub display: BTreeMap<DisplayField, String>,
}

impl From<Version> for VersionResponse {
    fn from(version: Version) -> Self {
        let display = display_row(&version);
        let parent = version.parent();
        let coparent = version.coparent();
        Self {
            id: version.id,
            event: version.event,
            item_type: version.item_type,
            item_id: version.item_id,
            parent,
            coparent,
            whodunnit: version.whodunnit,
            source: version.source,
            job_name: version.job_name,
            object_changes: version.object_changes,
            created_at: version.created_at.to_rfc3339(),
            display,
        }
    }
}

/// Marker telling the UI an entity filter outside the search form is active
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HiddenEntityFilter {
    pub entity: EntityRef,
    /// Audit trail without the entity filter
    pub clear_link: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrailResponse {
    pub versions: Vec<VersionResponse>,
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_entity_filter: Option<HiddenEntityFilter>,
}

/// Audit trail service state
#[derive(Clone)]
pub struct AuditTrailState {
    pub resolver: Arc<AuditTrailResolver>,
    pub capabilities: Arc<dyn CapabilityCheck>,
    pub default_page_size: u32,
}

/// List audit records, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "audit-trail",
    operation_id = "getApiAdminAuditTrail",
    params(AuditTrailQuery, PaginationParams),
    responses(
        (status = 200, description = "Audit records", body = AuditTrailResponse),
        (status = 400, description = "Invalid filter value"),
        (status = 403, description = "Not allowed to view the audit trail")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_audit_trail(
    State(state): State<AuditTrailState>,
    auth: Authenticated,
    Query(query): Query<AuditTrailQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<AuditTrailResponse>> {
    authorize(state.capabilities.as_ref(), &auth.0, Action::View, &Resource::AuditTrail)?;

    let explicit_entity = query.explicit_entity();
    let filters = if explicit_entity.is_some() {
        VersionFilters::default()
    } else {
        query.filters()?
    };

    let page = pagination.page();
    let size = pagination.size_or(state.default_page_size);

    let versions = state.resolver
        .resolve(filters, explicit_entity.clone(), pagination.offset(state.default_page_size), size as i64)
        .await?;

    Ok(Json(AuditTrailResponse {
        versions: versions.into_iter().map(VersionResponse::from).collect(),
        page,
        size,
        hidden_entity_filter: explicit_entity.map(|entity| HiddenEntityFilter {
            entity,
            clear_link: AUDIT_TRAIL_PATH.to_string(),
        }),
    }))
}

/// Create audit trail router
pub fn audit_trail_router(state: AuditTrailState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_audit_trail))
        .with_state(state)
}
