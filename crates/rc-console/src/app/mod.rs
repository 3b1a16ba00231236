//! App Aggregate
//!
//! App registrations: list filters, detail panels, action items and the
//! sync-with-identity-provider operation.

pub mod entity;
pub mod filters;
pub mod repository;
pub mod actions;
pub mod detail;
pub mod sync;
pub mod api;

pub use entity::{App, AppGrant, AppMssTelecom, DataStream, DataStreamApp, Identity, IdentityApp};
pub use filters::AppListFilters;
pub use repository::{AppDirectory, AppRepository};
pub use actions::ActionItem;
pub use detail::{AppRelations, DetailOptions};
pub use sync::{AppSyncService, Flash, SyncOutcome};
pub use api::{apps_router, AppsState};
