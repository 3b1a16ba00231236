//! Audit Trail Resolver Integration Tests
//!
//! Tests for:
//! - Actor search resolution (user email, app name, raw text)
//! - Explicit entity scoping over subject, parent and co-parent
//! - Newest-first ordering

mod common;

use std::sync::Arc;

use rc_console::version::{VersionFilters, VersionQuery};
use rc_console::{App, AuditTrailResolver, EntityRef, User, Version, VersionEvent};

use common::{at, InMemoryApps, InMemoryUsers, InMemoryVersions};

fn actor_filter(search: &str) -> VersionFilters {
    VersionFilters {
        whodunnit: Some(search.to_string()),
        ..Default::default()
    }
}

fn ids(versions: &[Version]) -> Vec<i64> {
    versions.iter().map(|v| v.id).collect()
}

fn sample_versions() -> Vec<Version> {
    vec![
        Version::new(1, VersionEvent::Create, "App", 3)
            .with_whodunnit("42")
            .with_created_at(at(1, 9)),
        Version::new(2, VersionEvent::Update, "App", 3)
            .with_whodunnit("client-xyz")
            .with_created_at(at(2, 9)),
        Version::new(3, VersionEvent::Update, "App", 4)
            .with_whodunnit("nobody@example.com")
            .with_created_at(at(3, 9)),
        Version::new(4, VersionEvent::Destroy, "App", 5)
            .with_whodunnit("42")
            .with_created_at(at(4, 9)),
    ]
}

fn resolver(users: Vec<User>, apps: Vec<App>, versions: Arc<InMemoryVersions>) -> AuditTrailResolver {
    AuditTrailResolver::new(InMemoryUsers::with(users), InMemoryApps::with(apps), versions)
}

mod actor_resolution {
    use super::*;

    #[tokio::test]
    async fn test_user_email_resolves_to_actor_id() {
        let store = InMemoryVersions::with(sample_versions());
        let resolver = resolver(
            vec![User::new(1, "alice@example.com").with_actor_id("42")],
            vec![],
            store.clone(),
        );

        let found = resolver.resolve(actor_filter("alice@example.com"), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![4, 1]);
        assert_eq!(store.last_query(), Some(VersionQuery::Filtered(actor_filter("42"))));
    }

    #[tokio::test]
    async fn test_app_name_resolves_to_client_id() {
        let store = InMemoryVersions::with(sample_versions());
        let resolver = resolver(
            vec![],
            vec![App::new(7, "billing").with_client_id("client-xyz")],
            store.clone(),
        );

        let found = resolver.resolve(actor_filter("billing"), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![2]);
    }

    #[tokio::test]
    async fn test_unmatched_search_is_used_verbatim() {
        let store = InMemoryVersions::with(sample_versions());
        let resolver = resolver(vec![], vec![], store.clone());

        let found = resolver.resolve(actor_filter("nobody@example.com"), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![3]);
        assert_eq!(store.last_query(), Some(VersionQuery::Filtered(actor_filter("nobody@example.com"))));
    }

    #[tokio::test]
    async fn test_user_wins_over_app_with_same_text() {
        let store = InMemoryVersions::with(sample_versions());
        let resolver = resolver(
            vec![User::new(1, "shared").with_actor_id("42")],
            vec![App::new(7, "shared").with_client_id("client-xyz")],
            store.clone(),
        );

        let found = resolver.resolve(actor_filter("shared"), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![4, 1]);
    }

    #[tokio::test]
    async fn test_actor_combines_with_other_filters() {
        let store = InMemoryVersions::with(sample_versions());
        let resolver = resolver(
            vec![User::new(1, "alice@example.com").with_actor_id("42")],
            vec![],
            store,
        );

        let filters = VersionFilters {
            event: Some(VersionEvent::Create),
            ..actor_filter("alice@example.com")
        };
        let found = resolver.resolve(filters, None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![1]);
    }
}

mod entity_scope {
    use super::*;

    fn invoice_versions() -> Vec<Version> {
        vec![
            Version::new(10, VersionEvent::Update, "Invoice", 7)
                .with_created_at(at(1, 8)),
            Version::new(11, VersionEvent::Create, "Line", 1)
                .with_parent("Invoice", 7)
                .with_created_at(at(2, 8)),
            Version::new(12, VersionEvent::Create, "Payment", 9)
                .with_parent("Customer", 3)
                .with_coparent("Invoice", 7)
                .with_created_at(at(3, 8)),
            Version::new(13, VersionEvent::Update, "Invoice", 8)
                .with_created_at(at(4, 8)),
            Version::new(14, VersionEvent::Update, "Line", 7)
                .with_parent("Order", 7)
                .with_created_at(at(5, 8)),
        ]
    }

    #[tokio::test]
    async fn test_entity_matches_subject_parent_and_coparent() {
        let store = InMemoryVersions::with(invoice_versions());
        let resolver = resolver(vec![], vec![], store);

        let found = resolver
            .resolve(VersionFilters::default(), Some(EntityRef::new("Invoice", 7)), 0, 30)
            .await
            .unwrap();

        assert_eq!(ids(&found), vec![12, 11, 10]);
    }

    #[tokio::test]
    async fn test_entity_overrides_other_filters() {
        let store = InMemoryVersions::with(invoice_versions());
        let resolver = resolver(
            vec![User::new(1, "alice@example.com").with_actor_id("42")],
            vec![],
            store.clone(),
        );

        let filters = VersionFilters {
            event: Some(VersionEvent::Destroy),
            item_type: Some("Order".to_string()),
            ..actor_filter("alice@example.com")
        };
        let found = resolver
            .resolve(filters, Some(EntityRef::new("Invoice", 7)), 0, 30)
            .await
            .unwrap();

        assert_eq!(ids(&found), vec![12, 11, 10]);
        assert_eq!(store.last_query(), Some(VersionQuery::Entity(EntityRef::new("Invoice", 7))));
    }

    #[tokio::test]
    async fn test_unknown_entity_yields_nothing() {
        let store = InMemoryVersions::with(invoice_versions());
        let resolver = resolver(vec![], vec![], store);

        let found = resolver
            .resolve(VersionFilters::default(), Some(EntityRef::new("Invoice", 0)), 0, 30)
            .await
            .unwrap();

        assert!(found.is_empty());
    }
}

mod ordering {
    use super::*;

    #[tokio::test]
    async fn test_results_are_newest_first() {
        let store = InMemoryVersions::with(vec![
            Version::new(1, VersionEvent::Update, "App", 1).with_created_at(at(3, 0)),
            Version::new(2, VersionEvent::Update, "App", 1).with_created_at(at(1, 0)),
            Version::new(3, VersionEvent::Update, "App", 1).with_created_at(at(2, 0)),
        ]);
        let resolver = resolver(vec![], vec![], store);

        let found = resolver.resolve(VersionFilters::default(), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![1, 3, 2]);
        assert!(found.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_timestamp_ties_break_on_id() {
        let store = InMemoryVersions::with(vec![
            Version::new(5, VersionEvent::Update, "App", 1).with_created_at(at(1, 0)),
            Version::new(6, VersionEvent::Update, "App", 1).with_created_at(at(1, 0)),
        ]);
        let resolver = resolver(vec![], vec![], store);

        let found = resolver.resolve(VersionFilters::default(), None, 0, 30).await.unwrap();

        assert_eq!(ids(&found), vec![6, 5]);
    }

    #[tokio::test]
    async fn test_pages_follow_the_ordering() {
        let store = InMemoryVersions::with(
            (1..=5)
                .map(|i| Version::new(i, VersionEvent::Update, "App", 1).with_created_at(at(i as u32, 0)))
                .collect(),
        );
        let resolver = resolver(vec![], vec![], store);

        let second_page = resolver.resolve(VersionFilters::default(), None, 2, 2).await.unwrap();

        assert_eq!(ids(&second_page), vec![3, 2]);
    }
}
