//! Permission strings and code-defined roles.
//!
//! Format: `console:{resource}:{action}`. `console:*` grants every console
//! permission and `*:*` grants everything.

pub const ADMIN_ALL: &str = "*:*";

pub mod audit_trail {
    pub const VIEW: &str = "console:audit-trail:view";
}

pub mod apps {
    pub const VIEW: &str = "console:app:view";
    pub const CREATE: &str = "console:app:create";
    pub const EDIT: &str = "console:app:edit";
    pub const SYNC: &str = "console:app:sync";
    pub const SYNC_IDENTITY_PROVIDER: &str = "console:app:sync-identity-provider";
}

pub mod identity_apps {
    pub const CREATE: &str = "console:identity-app:create";
    pub const DESTROY: &str = "console:identity-app:destroy";
}

pub mod app_mss_telecoms {
    pub const CREATE: &str = "console:app-mss-telecom:create";
    pub const DESTROY: &str = "console:app-mss-telecom:destroy";
}

/// Code-defined roles
pub mod roles {
    pub const ADMIN: &str = "console:admin";
    pub const OPERATOR: &str = "console:operator";
    pub const VIEWER: &str = "console:viewer";
}

/// Permissions granted by a code-defined role. Unknown roles grant nothing.
pub fn permissions_for_role(role: &str) -> &'static [&'static str] {
    match role {
        roles::ADMIN => &["console:*"],
        roles::OPERATOR => &[
            audit_trail::VIEW,
            apps::VIEW,
            apps::SYNC,
            apps::SYNC_IDENTITY_PROVIDER,
            identity_apps::CREATE,
            app_mss_telecoms::CREATE,
        ],
        roles::VIEWER => &[audit_trail::VIEW, apps::VIEW],
        _ => &[],
    }
}
