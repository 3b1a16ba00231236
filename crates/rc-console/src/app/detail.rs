//! App detail view-model
//!
//! The show page as ordered panels of attributes and tables. Conditional
//! panels follow the app's auth kinds; row and header actions follow the
//! capability check.

use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use super::actions::{ui_app_path, ActionItem};
use super::entity::{App, AppGrant, AppMssTelecom, DataStream, DataStreamApp, Identity, IdentityApp};
use crate::idp::auth0_dashboard_link;
use crate::shared::authorization_service::{Action, AuthContext, CapabilityCheck, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanelKey {
    Details,
    Identities,
    DataStreamApps,
    MssTelecoms,
    AuthConfig,
    BusinessConfig,
    UserAuth,
    AppGrants,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    pub id: i64,
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub key: PanelKey,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<PanelRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionItem>,
}

impl Panel {
    fn attributes(key: PanelKey, attributes: Vec<Attribute>) -> Self {
        Self { key, attributes, rows: vec![], actions: vec![] }
    }

    fn table(key: PanelKey, rows: Vec<PanelRow>, actions: Vec<ActionItem>) -> Self {
        Self { key, attributes: vec![], rows, actions }
    }
}

fn attr(name: &str, value: impl Into<Value>) -> Attribute {
    Attribute { name: name.to_string(), value: value.into() }
}

/// Everything the show page displays about one app
pub struct AppRelations {
    pub identities: Vec<(IdentityApp, Option<Identity>)>,
    pub data_stream_apps: Vec<(DataStreamApp, Option<DataStream>)>,
    pub mss_telecoms: Vec<AppMssTelecom>,
    pub grants: Vec<AppGrant>,
}

/// Display settings coming from configuration
#[derive(Debug, Clone, Default)]
pub struct DetailOptions {
    /// Expose client secrets (non-production only)
    pub show_client_secrets: bool,
    /// `(region, tenant)` of the Auth0 dashboard
    pub auth0_dashboard: Option<(String, String)>,
}

pub fn build_panels(
    app: &App,
    relations: &AppRelations,
    options: &DetailOptions,
    check: &dyn CapabilityCheck,
    actor: &AuthContext,
) -> Vec<Panel> {
    let mut panels = vec![
        details_panel(app),
        identities_panel(app, &relations.identities, check, actor),
        data_stream_apps_panel(&relations.data_stream_apps),
        mss_telecoms_panel(app, &relations.mss_telecoms, check, actor),
        auth_config_panel(app, options),
    ];

    if app.user_auth() {
        panels.push(business_config_panel(app));
        panels.push(user_auth_panel(app));
    }
    if app.client_auth() {
        panels.push(app_grants_panel(&relations.grants));
    }

    panels
}

fn details_panel(app: &App) -> Panel {
    Panel::attributes(PanelKey::Details, vec![
        attr("id", app.id),
        attr("name", app.name.as_str()),
        attr("display_name", app.display_name.clone()),
        attr("url", app.url.clone()),
        attr("icon_url", app.icon_url.clone()),
        attr("is_first_party", app.is_first_party),
        attr("publisher_workspace", app.publisher_workspace.clone()),
        attr("human_purpose", app.human_purpose.clone()),
        attr("support_email", app.support_email.clone()),
        attr("domains", app.domains.clone()),
        attr("fhir_references", app.fhir_references.clone()),
        attr("database_reference", app.database_reference.clone()),
        attr("databases_references", app.databases_references.clone()),
        // Stored as a prohibition, displayed as a permission
        attr("sending_allowed", !app.sending_prohibited),
        attr("for_external_users", app.for_external_users),
        attr("for_internal_users", app.for_internal_users),
        attr("source", app.source.clone()),
        attr("managed_by_alphonse", app.managed_by_alphonse),
        attr("created_at", app.created_at.to_rfc3339()),
        attr("updated_at", app.updated_at.to_rfc3339()),
        attr("lock_version", app.lock_version),
    ])
}

fn identities_panel(
    app: &App,
    identities: &[(IdentityApp, Option<Identity>)],
    check: &dyn CapabilityCheck,
    actor: &AuthContext,
) -> Panel {
    let resource = Resource::IdentityApp { app_id: app.id };
    let can_detach = check.can_perform(actor, Action::Destroy, &resource);

    let rows = identities.iter()
        .map(|(link, identity)| PanelRow {
            id: link.id,
            attributes: vec![
                attr("identity_id", link.identity_id),
                attr("name", identity.as_ref().map(|i| i.name.clone())),
                attr("lifen_reference", identity.as_ref().and_then(|i| i.lifen_reference.clone())),
            ],
            actions: if can_detach {
                vec![ActionItem::delete("detach_identity", format!("{}/identity-apps/{}", ui_app_path(app.id), link.id))]
            } else {
                vec![]
            },
        })
        .collect();

    let mut actions = Vec::new();
    if check.can_perform(actor, Action::Create, &resource) {
        actions.push(ActionItem::get("add_identity", format!("{}/identity-apps/new", ui_app_path(app.id))));
    }

    Panel::table(PanelKey::Identities, rows, actions)
}

fn data_stream_apps_panel(bindings: &[(DataStreamApp, Option<DataStream>)]) -> Panel {
    let rows = bindings.iter()
        .map(|(binding, stream)| PanelRow {
            id: binding.id,
            attributes: vec![
                attr("data_stream_id", binding.data_stream_id),
                attr("type_code", stream.as_ref().map(|s| s.type_code.clone())),
                attr("direction", stream.as_ref().and_then(|s| s.direction.clone())),
                attr("database_reference", binding.database_reference.clone()),
                attr("allowed_uf_codes", binding.allowed_uf_codes_display()),
            ],
            actions: vec![],
        })
        .collect();

    Panel::table(PanelKey::DataStreamApps, rows, vec![])
}

fn mss_telecoms_panel(
    app: &App,
    telecoms: &[AppMssTelecom],
    check: &dyn CapabilityCheck,
    actor: &AuthContext,
) -> Panel {
    let resource = Resource::AppMssTelecom { app_id: app.id };
    let can_destroy = check.can_perform(actor, Action::Destroy, &resource);

    let rows = telecoms.iter()
        .map(|telecom| PanelRow {
            id: telecom.id,
            attributes: vec![
                attr("value", telecom.value.as_str()),
                attr("organization_reference", telecom.organization_reference.clone()),
            ],
            actions: if can_destroy {
                vec![ActionItem::delete("destroy_mss_telecom", format!("{}/mss-telecoms/{}", ui_app_path(app.id), telecom.id))]
            } else {
                vec![]
            },
        })
        .collect();

    let mut actions = Vec::new();
    if check.can_perform(actor, Action::Create, &resource) {
        actions.push(ActionItem::get("add_mss_telecom", format!("{}/mss-telecoms/new", ui_app_path(app.id))));
    }

    Panel::table(PanelKey::MssTelecoms, rows, actions)
}

fn auth_config_panel(app: &App, options: &DetailOptions) -> Panel {
    let mut attributes = vec![attr("auth0_client_id", app.auth0_client_id.clone())];

    if options.show_client_secrets {
        attributes.push(attr("auth0_client_secret", app.auth0_client_secret.clone()));
    }

    let link = match (&app.auth0_client_id, &options.auth0_dashboard) {
        (Some(client_id), Some((region, tenant))) if !client_id.is_empty() => {
            Some(auth0_dashboard_link(region, tenant, client_id))
        }
        _ => None,
    };
    attributes.push(attr("auth0_link", link));
    attributes.push(attr("human_user_auth_type", app.human_user_auth_type.clone()));
    attributes.push(attr("human_client_auth_type", app.human_client_auth_type.clone()));

    Panel::attributes(PanelKey::AuthConfig, attributes)
}

fn business_config_panel(app: &App) -> Panel {
    Panel::attributes(PanelKey::BusinessConfig, vec![
        attr("second_factor_required", app.second_factor_required),
        attr("identity_required", app.identity_required),
        attr("telecom_required", app.telecom_required),
        attr("workspace_required", app.workspace_required),
        attr("email_validation_required", app.email_validation_required),
    ])
}

fn user_auth_panel(app: &App) -> Panel {
    Panel::attributes(PanelKey::UserAuth, vec![
        attr("initiate_login_uri", app.initiate_login_uri.clone()),
        attr("callbacks", app.callbacks.clone()),
        attr("allowed_logout_urls", app.allowed_logout_urls.clone()),
        attr("web_origins", app.web_origins.clone()),
    ])
}

fn app_grants_panel(grants: &[AppGrant]) -> Panel {
    let rows = grants.iter()
        .map(|grant| PanelRow {
            id: grant.id,
            attributes: vec![
                attr("audience", grant.audience.as_str()),
                attr("scopes", json!(grant.scopes)),
            ],
            actions: vec![],
        })
        .collect();

    Panel::table(PanelKey::AppGrants, rows, vec![])
}
