//! Action items offered on the app pages, gated by the capability check.

use serde::Serialize;
use utoipa::ToSchema;

use super::entity::App;
use crate::shared::authorization_service::{Action, AuthContext, CapabilityCheck, Resource};
use crate::version::link::audit_trail_link_for;

pub const APPS_PATH: &str = "/api/admin/apps";

/// Admin UI pages (forms, bulk sync) served by the front end, not this API
pub const ADMIN_UI_APPS_PATH: &str = "/admin/apps";

/// A button: what it does and where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub key: String,
    pub method: String,
    pub href: String,
}

impl ActionItem {
    pub fn get(key: &str, href: impl Into<String>) -> Self {
        Self { key: key.to_string(), method: "GET".to_string(), href: href.into() }
    }

    pub fn post(key: &str, href: impl Into<String>) -> Self {
        Self { key: key.to_string(), method: "POST".to_string(), href: href.into() }
    }

    pub fn delete(key: &str, href: impl Into<String>) -> Self {
        Self { key: key.to_string(), method: "DELETE".to_string(), href: href.into() }
    }
}

pub fn app_path(app_id: i64) -> String {
    format!("{}/{}", APPS_PATH, app_id)
}

pub fn ui_app_path(app_id: i64) -> String {
    format!("{}/{}", ADMIN_UI_APPS_PATH, app_id)
}

/// Buttons on the app list
pub fn index_action_items(check: &dyn CapabilityCheck, actor: &AuthContext) -> Vec<ActionItem> {
    let mut items = Vec::new();

    if check.can_perform(actor, Action::Create, &Resource::AppClass) {
        items.push(ActionItem::get("new_third_party_app", format!("{}/new?firstParty=false", ADMIN_UI_APPS_PATH)));
        items.push(ActionItem::get("new_first_party_app", format!("{}/new?firstParty=true", ADMIN_UI_APPS_PATH)));
    }
    if check.can_perform(actor, Action::Sync, &Resource::AppClass) {
        items.push(ActionItem::post("sync_apps", format!("{}/sync", ADMIN_UI_APPS_PATH)));
    }

    items
}

/// Buttons on one app's page
pub fn show_action_items(check: &dyn CapabilityCheck, actor: &AuthContext, app: &App) -> Vec<ActionItem> {
    let mut items = Vec::new();
    let resource = Resource::App(app);

    if check.can_perform(actor, Action::Edit, &resource) {
        if app.is_first_party {
            items.push(ActionItem::get("edit_app", format!("{}/edit", ui_app_path(app.id))));
        } else {
            items.push(ActionItem::get("edit_third_party_app", format!("{}/edit?firstParty=false", ui_app_path(app.id))));
        }
    }
    if app.is_managed_here() && check.can_perform(actor, Action::SyncOnIdentityProvider, &resource) {
        items.push(ActionItem::post("sync_app_on_auth0", format!("{}/sync-identity-provider", app_path(app.id))));
    }
    items.push(ActionItem::get("audit_trail", audit_trail_link_for(app)));

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::entity::MANAGED_SOURCE;
    use crate::shared::authorization_service::PermissionPolicy;
    use crate::shared::permissions;

    fn actor(perms: &[&str]) -> AuthContext {
        AuthContext {
            principal_id: "42".to_string(),
            email: None,
            name: "Ops".to_string(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            roles: vec![],
        }
    }

    fn keys(items: &[ActionItem]) -> Vec<&str> {
        items.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn test_index_items_follow_capabilities() {
        let none = index_action_items(&PermissionPolicy, &actor(&[]));
        assert!(none.is_empty());

        let all = index_action_items(&PermissionPolicy, &actor(&["console:*"]));
        assert_eq!(keys(&all), vec!["new_third_party_app", "new_first_party_app", "sync_apps"]);
    }

    #[test]
    fn test_ui_items_stay_off_the_api_prefix() {
        let admin = actor(&["console:*"]);
        let app = App::new(8, "core").first_party().with_source(MANAGED_SOURCE);

        let index = index_action_items(&PermissionPolicy, &admin);
        assert_eq!(index[0].href, "/admin/apps/new?firstParty=false");
        assert_eq!(index[2], ActionItem::post("sync_apps", "/admin/apps/sync"));

        let show = show_action_items(&PermissionPolicy, &admin, &app);
        assert_eq!(show[0], ActionItem::get("edit_app", "/admin/apps/8/edit"));
        assert_eq!(show[1].href, "/api/admin/apps/8/sync-identity-provider");

        assert!(index.iter().chain(&show[..1]).all(|item| !item.href.starts_with(APPS_PATH)));
    }

    #[test]
    fn test_edit_item_depends_on_party() {
        let editor = actor(&[permissions::apps::EDIT]);

        let first = App::new(1, "core").first_party();
        assert_eq!(keys(&show_action_items(&PermissionPolicy, &editor, &first)), vec!["edit_app", "audit_trail"]);

        let third = App::new(2, "partner");
        assert_eq!(
            keys(&show_action_items(&PermissionPolicy, &editor, &third)),
            vec!["edit_third_party_app", "audit_trail"]
        );
    }

    #[test]
    fn test_sync_item_requires_managed_source() {
        let syncer = actor(&[permissions::apps::SYNC_IDENTITY_PROVIDER]);

        let managed = App::new(3, "managed").with_source(MANAGED_SOURCE);
        let items = show_action_items(&PermissionPolicy, &syncer, &managed);
        assert_eq!(keys(&items), vec!["sync_app_on_auth0", "audit_trail"]);
        assert_eq!(items[0].href, "/api/admin/apps/3/sync-identity-provider");

        let legacy = App::new(4, "legacy").with_source("legacy");
        assert_eq!(keys(&show_action_items(&PermissionPolicy, &syncer, &legacy)), vec!["audit_trail"]);
    }

    #[test]
    fn test_audit_trail_item_always_present() {
        let items = show_action_items(&PermissionPolicy, &actor(&[]), &App::new(5, "x"));
        assert_eq!(items, vec![ActionItem::get("audit_trail", "/api/admin/audit-trail?class=App&id=5")]);
    }
}
