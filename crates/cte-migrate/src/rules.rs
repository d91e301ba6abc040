//! Business rule mapping backfill.

use std::collections::HashMap;

use cte_migrate_store::{ConfigurationKind, Store};
use serde_json::Value;

use crate::error::Result;

/// What the mapping backfill changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Business rules rewritten.
    pub rules_rewritten: u64,
    /// Queue items given a mapping list.
    pub items_backfilled: u64,
    /// Queue items left alone because their configuration does not exist.
    pub items_unresolved: u64,
}

/// Copy each ticket orchestrator configuration's mappings into the business
/// rule queue items that route to it and lack a mapping list.
///
/// Every rule's `queues` field is rewritten, including rules with nothing
/// to backfill.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn backfill_rule_mappings<S: Store + ?Sized>(store: &S) -> Result<RuleOutcome> {
    let mut outcome = RuleOutcome::default();
    // Queue name -> mappings of the configuration, `None` if it does not exist.
    let mut mappings: HashMap<String, Option<Vec<Value>>> = HashMap::new();

    for mut rule in store.list_business_rules().await? {
        for (queue, items) in &mut rule.queues {
            if items.iter().all(|item| item.has_mappings()) {
                continue;
            }

            if !mappings.contains_key(queue) {
                let found = store
                    .get_configuration(ConfigurationKind::Itsm, queue)
                    .await?
                    .map(|configuration| configuration.mappings.unwrap_or_default());
                mappings.insert(queue.clone(), found);
            }

            for item in items.iter_mut().filter(|item| !item.has_mappings()) {
                match mappings.get(queue).and_then(Option::as_ref) {
                    Some(list) => {
                        item.set_mappings(list.clone());
                        outcome.items_backfilled += 1;
                    }
                    None => {
                        tracing::warn!(
                            rule = %rule.name,
                            queue = %queue,
                            "No ticket orchestrator configuration for queue, item left without mappings"
                        );
                        outcome.items_unresolved += 1;
                    }
                }
            }
        }

        if store
            .set_business_rule_queues(&rule.name, &rule.queues)
            .await?
        {
            outcome.rules_rewritten += 1;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_migrate_store::{BusinessRule, Configuration, QueueItem};
    use cte_migrate_store::MemoryStore;
    use serde_json::json;

    fn rule(json: &str) -> BusinessRule {
        serde_json::from_str(json).unwrap()
    }

    fn itsm_config(name: &str, mappings: Option<Vec<Value>>) -> Configuration {
        let mut config = Configuration::new(name, "servicenow", json!({}));
        config.mappings = mappings;
        config
    }

    async fn stored_rule(store: &MemoryStore, name: &str) -> BusinessRule {
        store
            .list_business_rules()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn copies_configuration_mappings_into_items() {
        let store = MemoryStore::new();
        store.insert_configuration(
            ConfigurationKind::Itsm,
            itsm_config("snow", Some(vec![json!({"extracted_field": "id"})])),
        );
        store.insert_business_rule(rule(
            r#"{"name": "All", "queues": {"snow": [{"label": "Incidents", "value": "inc"}]}}"#,
        ));

        let outcome = backfill_rule_mappings(&store).await.unwrap();
        assert_eq!(outcome.items_backfilled, 1);
        assert_eq!(outcome.rules_rewritten, 1);

        let stored = stored_rule(&store, "All").await;
        let item = &stored.queues["snow"][0];
        assert_eq!(
            item.0.get(QueueItem::MAPPINGS),
            Some(&json!([{"extracted_field": "id"}]))
        );
        assert_eq!(item.0.get("label"), Some(&json!("Incidents")));
    }

    #[tokio::test]
    async fn configuration_without_mappings_yields_empty_list() {
        let store = MemoryStore::new();
        store.insert_configuration(ConfigurationKind::Itsm, itsm_config("jira", None));
        store.insert_business_rule(rule(r#"{"name": "R", "queues": {"jira": [{}]}}"#));

        backfill_rule_mappings(&store).await.unwrap();

        let stored = stored_rule(&store, "R").await;
        assert_eq!(stored.queues["jira"][0].0.get("mappings"), Some(&json!([])));
    }

    #[tokio::test]
    async fn existing_mappings_are_kept() {
        let store = MemoryStore::new();
        store.insert_configuration(
            ConfigurationKind::Itsm,
            itsm_config("snow", Some(vec![json!("new")])),
        );
        store.insert_business_rule(rule(
            r#"{"name": "R", "queues": {"snow": [{"mappings": ["old"]}, {"value": 2}]}}"#,
        ));

        let outcome = backfill_rule_mappings(&store).await.unwrap();
        assert_eq!(outcome.items_backfilled, 1);

        let stored = stored_rule(&store, "R").await;
        assert_eq!(stored.queues["snow"][0].0.get("mappings"), Some(&json!(["old"])));
        assert_eq!(stored.queues["snow"][1].0.get("mappings"), Some(&json!(["new"])));
    }

    #[tokio::test]
    async fn missing_configuration_leaves_item_unchanged() {
        let store = MemoryStore::new();
        store.insert_business_rule(rule(r#"{"name": "R", "queues": {"gone": [{"value": 1}]}}"#));

        let outcome = backfill_rule_mappings(&store).await.unwrap();
        assert_eq!(outcome.items_unresolved, 1);
        assert_eq!(outcome.rules_rewritten, 1);

        let stored = stored_rule(&store, "R").await;
        assert!(!stored.queues["gone"][0].has_mappings());
    }

    #[tokio::test]
    async fn queue_order_is_preserved() {
        let store = MemoryStore::new();
        store.insert_business_rule(rule(
            r#"{"name": "R", "queues": {"zeta": [], "alpha": [], "mid": []}}"#,
        ));

        backfill_rule_mappings(&store).await.unwrap();

        let stored = stored_rule(&store, "R").await;
        let keys: Vec<&str> = stored.queues.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
