//! Version query model
//!
//! What the resolver hands to the version store: either the ordinary
//! filter set or an explicit entity that replaces it.

use chrono::{DateTime, Days, NaiveDate, Utc};

use super::entity::{EntityRef, Version, VersionEvent};

/// Ordinary audit-trail filters, applied conjunctively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionFilters {
    /// Resolved actor identifier
    pub whodunnit: Option<String>,
    pub event: Option<VersionEvent>,
    pub item_type: Option<String>,
    pub item_id: Option<i64>,
    pub source: Option<String>,
    pub job_name: Option<String>,
    /// First day included
    pub created_from: Option<NaiveDate>,
    /// Last day included
    pub created_to: Option<NaiveDate>,
}

impl VersionFilters {
    /// `[lower, upper)` creation-time bounds in UTC; the upper bound covers the whole last day
    pub fn created_at_bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let lower = self.created_from.and_then(start_of_day);
        let upper = self.created_to
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .and_then(start_of_day);
        (lower, upper)
    }

    pub fn matches(&self, version: &Version) -> bool {
        let (lower, upper) = self.created_at_bounds();

        eq_opt(&self.whodunnit, version.whodunnit.as_ref())
            && self.event.map_or(true, |e| e == version.event)
            && self.item_type.as_ref().map_or(true, |t| *t == version.item_type)
            && self.item_id.map_or(true, |id| id == version.item_id)
            && eq_opt(&self.source, version.source.as_ref())
            && eq_opt(&self.job_name, version.job_name.as_ref())
            && lower.map_or(true, |l| version.created_at >= l)
            && upper.map_or(true, |u| version.created_at < u)
    }
}

fn eq_opt(filter: &Option<String>, value: Option<&String>) -> bool {
    match filter {
        Some(expected) => value == Some(expected),
        None => true,
    }
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc())
}

/// Query executed against the version store
#[derive(Debug, Clone, PartialEq)]
pub enum VersionQuery {
    Filtered(VersionFilters),
    /// Subject, parent or co-parent equals the entity; ignores every other filter
    Entity(EntityRef),
}

impl VersionQuery {
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Filtered(filters) => filters.matches(version),
            Self::Entity(entity) => version.concerns(entity),
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }
}

/// Lenient integer parse for navigation ids.
///
/// Leading whitespace, an optional sign and leading digits are honoured;
/// anything else yields `0`, which matches no record.
pub fn parse_lenient_id(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));

    if negative { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_lenient_id() {
        assert_eq!(parse_lenient_id("7"), 7);
        assert_eq!(parse_lenient_id("  12abc"), 12);
        assert_eq!(parse_lenient_id("-3"), -3);
        assert_eq!(parse_lenient_id("+5"), 5);
        assert_eq!(parse_lenient_id("abc"), 0);
        assert_eq!(parse_lenient_id(""), 0);
        assert_eq!(parse_lenient_id("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_date_upper_bound_covers_whole_day() {
        let filters = VersionFilters {
            created_from: NaiveDate::from_ymd_opt(2024, 3, 1),
            created_to: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };

        let late = Version::new(1, VersionEvent::Update, "App", 1)
            .with_created_at(Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());
        let next_day = Version::new(2, VersionEvent::Update, "App", 1)
            .with_created_at(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

        assert!(filters.matches(&late));
        assert!(!filters.matches(&next_day));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let filters = VersionFilters {
            whodunnit: Some("42".to_string()),
            item_type: Some("App".to_string()),
            ..Default::default()
        };

        let hit = Version::new(1, VersionEvent::Update, "App", 1).with_whodunnit("42");
        let wrong_type = Version::new(2, VersionEvent::Update, "User", 1).with_whodunnit("42");
        let no_actor = Version::new(3, VersionEvent::Update, "App", 1);

        assert!(filters.matches(&hit));
        assert!(!filters.matches(&wrong_type));
        assert!(!filters.matches(&no_actor));
    }

    #[test]
    fn test_entity_query_ignores_filters() {
        let query = VersionQuery::Entity(EntityRef::new("Invoice", 7));
        let version = Version::new(1, VersionEvent::Create, "Line", 1)
            .with_coparent("Invoice", 7)
            .with_whodunnit("anyone");
        assert!(query.matches(&version));
        assert!(query.is_entity());
    }
}
