//! App list filters

use bson::{doc, Document};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for the app list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AppListFilters {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub auth0_client_id: Option<String>,
    pub is_first_party: Option<bool>,
    pub source: Option<String>,
    /// First creation day included (YYYY-MM-DD)
    pub created_from: Option<NaiveDate>,
    /// Last creation day included (YYYY-MM-DD)
    pub created_to: Option<NaiveDate>,
    /// Case-insensitive substring of the database reference
    pub database_reference: Option<String>,
}

impl AppListFilters {
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};

        if let Some(name) = non_blank(&self.name) {
            filter.insert("name", contains_ci(name));
        }
        if let Some(client_id) = non_blank(&self.auth0_client_id) {
            filter.insert("auth0ClientId", client_id);
        }
        if let Some(first_party) = self.is_first_party {
            filter.insert("isFirstParty", first_party);
        }
        if let Some(source) = non_blank(&self.source) {
            filter.insert("source", source);
        }
        if let Some(reference) = non_blank(&self.database_reference) {
            filter.insert("databaseReference", contains_ci(reference));
        }

        let mut range = doc! {};
        if let Some(from) = self.created_from.and_then(midnight) {
            range.insert("$gte", from);
        }
        if let Some(to) = self.created_to
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .and_then(midnight)
        {
            range.insert("$lt", to);
        }
        if !range.is_empty() {
            filter.insert("createdAt", range);
        }

        filter
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(fragment: &str) -> Document {
    doc! { "$regex": regex::escape(fragment), "$options": "i" }
}

fn midnight(day: NaiveDate) -> Option<bson::DateTime> {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| bson::DateTime::from_chrono(dt.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        assert!(AppListFilters::default().to_document().is_empty());
    }

    #[test]
    fn test_name_is_escaped_case_insensitive_contains() {
        let filters = AppListFilters {
            name: Some(" billing.v2 ".to_string()),
            is_first_party: Some(true),
            ..Default::default()
        };

        assert_eq!(filters.to_document(), doc! {
            "name": { "$regex": "billing\\.v2", "$options": "i" },
            "isFirstParty": true,
        });
    }

    #[test]
    fn test_blank_values_ignored() {
        let filters = AppListFilters {
            source: Some("   ".to_string()),
            auth0_client_id: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.to_document().is_empty());
    }

    #[test]
    fn test_created_range() {
        let filters = AppListFilters {
            created_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };

        let doc = filters.to_document();
        let range = doc.get_document("createdAt").unwrap();
        assert!(!range.contains_key("$gte"));
        assert_eq!(
            range.get_datetime("$lt").unwrap().to_chrono().date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }
}
