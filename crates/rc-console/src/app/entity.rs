//! App Entity
//!
//! An application registered with the registry, and the records hanging
//! off it: identities, data-stream bindings, MSS telecoms and grants.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source value for apps whose configuration is owned by the registry itself
pub const MANAGED_SOURCE: &str = "alphonse";

/// App registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(rename = "_id")]
    pub id: i64,

    /// Unique technical name
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub icon_url: Option<String>,

    #[serde(default)]
    pub is_first_party: bool,

    #[serde(default)]
    pub publisher_workspace: Option<String>,

    #[serde(default)]
    pub human_purpose: Option<String>,

    #[serde(default)]
    pub support_email: Option<String>,

    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default)]
    pub fhir_references: Vec<String>,

    #[serde(default)]
    pub database_reference: Option<String>,

    #[serde(default)]
    pub databases_references: Vec<String>,

    #[serde(default)]
    pub sending_prohibited: bool,

    #[serde(default)]
    pub for_external_users: bool,

    #[serde(default)]
    pub for_internal_users: bool,

    /// Who owns the configuration (`alphonse` when managed here)
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub managed_by_alphonse: bool,

    // Identity provider
    /// External client identifier, recorded as `whodunnit` for app-made changes
    #[serde(default)]
    pub auth0_client_id: Option<String>,

    #[serde(default)]
    pub auth0_client_secret: Option<String>,

    #[serde(default)]
    pub human_user_auth_type: Option<String>,

    #[serde(default)]
    pub human_client_auth_type: Option<String>,

    #[serde(default)]
    pub initiate_login_uri: Option<String>,

    #[serde(default)]
    pub callbacks: Vec<String>,

    #[serde(default)]
    pub allowed_logout_urls: Vec<String>,

    #[serde(default)]
    pub web_origins: Vec<String>,

    // Business requirements on signing-in users
    #[serde(default)]
    pub second_factor_required: bool,

    #[serde(default)]
    pub identity_required: bool,

    #[serde(default)]
    pub telecom_required: bool,

    #[serde(default)]
    pub workspace_required: bool,

    #[serde(default)]
    pub email_validation_required: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub lock_version: i32,
}

impl App {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            display_name: None,
            url: None,
            icon_url: None,
            is_first_party: false,
            publisher_workspace: None,
            human_purpose: None,
            support_email: None,
            domains: vec![],
            fhir_references: vec![],
            database_reference: None,
            databases_references: vec![],
            sending_prohibited: false,
            for_external_users: false,
            for_internal_users: false,
            source: None,
            managed_by_alphonse: false,
            auth0_client_id: None,
            auth0_client_secret: None,
            human_user_auth_type: None,
            human_client_auth_type: None,
            initiate_login_uri: None,
            callbacks: vec![],
            allowed_logout_urls: vec![],
            web_origins: vec![],
            second_factor_required: false,
            identity_required: false,
            telecom_required: false,
            workspace_required: false,
            email_validation_required: false,
            created_at: now,
            updated_at: now,
            lock_version: 0,
        }
    }

    pub fn first_party(mut self) -> Self {
        self.is_first_party = true;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.auth0_client_id = Some(client_id.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Humans sign in to this app
    pub fn user_auth(&self) -> bool {
        self.human_user_auth_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The app calls APIs on its own behalf
    pub fn client_auth(&self) -> bool {
        self.human_client_auth_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_managed_here(&self) -> bool {
        self.source.as_deref() == Some(MANAGED_SOURCE)
    }
}

/// An identity (organisation) the app serves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub lifen_reference: Option<String>,
}

/// Join between an app and an identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityApp {
    #[serde(rename = "_id")]
    pub id: i64,
    pub app_id: i64,
    pub identity_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStream {
    #[serde(rename = "_id")]
    pub id: i64,
    pub identity_id: i64,
    pub type_code: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Binding of a data stream to an app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStreamApp {
    #[serde(rename = "_id")]
    pub id: i64,
    pub app_id: i64,
    pub data_stream_id: i64,
    #[serde(default)]
    pub database_reference: Option<String>,
    #[serde(default)]
    pub allowed_uf_codes: Vec<String>,
}

impl DataStreamApp {
    /// Comma-separated list, or `all` when unrestricted
    pub fn allowed_uf_codes_display(&self) -> String {
        if self.allowed_uf_codes.is_empty() {
            "all".to_string()
        } else {
            self.allowed_uf_codes.join(", ")
        }
    }
}

/// MSS (secure health messaging) address bound to an app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMssTelecom {
    #[serde(rename = "_id")]
    pub id: i64,
    pub app_id: i64,
    pub value: String,
    #[serde(default)]
    pub organization_reference: Option<String>,
}

/// API access granted to an app's client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppGrant {
    #[serde(rename = "_id")]
    pub id: i64,
    pub app_id: i64,
    pub audience: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}
