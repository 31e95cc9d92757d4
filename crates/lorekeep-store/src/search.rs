//! Semantic search, single-domain and fan-out.
//!
//! | Request              | Targets                         | On per-domain failure      |
//! |----------------------|---------------------------------|----------------------------|
//! | `domain: Some(name)` | that domain                     | error returned to caller   |
//! | `domain: None`       | snapshot of `table_names()`     | inline [`PartialFailure`]  |
//!
//! `limit` applies per domain, so a fan-out over N domains yields up to
//! N × `limit` hits. Results are grouped by domain in snapshot order and
//! sorted by distance only within each group; distances from different
//! domains are never compared.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use lorekeep_core::{Error, Result};

use crate::config::StoreConfig;
use crate::engine::StorageEngine;
use crate::registry;
use crate::types::{Hit, PartialFailure, SearchItem, SearchRequest};

/// Run `request` against `engine`.
pub async fn search(
    engine: &dyn StorageEngine,
    config: &StoreConfig,
    request: &SearchRequest,
) -> Result<Vec<SearchItem>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(Error::invalid_input("search query must not be empty"));
    }
    let limit = resolve_limit(request.limit, config.default_limit)?;
    let timeout = config.search_timeout();

    match request.domain.as_deref() {
        Some(domain) => {
            let hits = search_domain(engine, domain, query, limit, timeout).await?;
            Ok(hits.into_iter().map(SearchItem::Hit).collect())
        }
        None => fan_out(engine, query, limit, timeout, config.fan_out_width()).await,
    }
}

fn resolve_limit(requested: Option<usize>, default_limit: usize) -> Result<usize> {
    match requested {
        Some(0) => Err(Error::invalid_input("limit must be a positive integer")),
        Some(n) => Ok(n),
        None if default_limit == 0 => Err(Error::config("store.default_limit must be positive")),
        None => Ok(default_limit),
    }
}

async fn fan_out(
    engine: &dyn StorageEngine,
    query: &str,
    limit: usize,
    timeout: Option<Duration>,
    width: usize,
) -> Result<Vec<SearchItem>> {
    let domains = registry::list(engine).await?;
    log::debug!(
        "Fanning out search over {} domain(s), width {width}",
        domains.len()
    );

    let outcomes: Vec<(String, Result<Vec<Hit>>)> = stream::iter(domains)
        .map(move |domain| async move {
            let outcome = search_domain(engine, &domain, query, limit, timeout).await;
            (domain, outcome)
        })
        .buffered(width)
        .collect()
        .await;

    let mut items = Vec::new();
    for (domain, outcome) in outcomes {
        match outcome {
            Ok(hits) => items.extend(hits.into_iter().map(SearchItem::Hit)),
            Err(err) => {
                log::warn!("Search of domain '{domain}' failed: {err}");
                items.push(SearchItem::PartialFailure(PartialFailure::new(&domain, &err)));
            }
        }
    }
    Ok(items)
}

async fn search_domain(
    engine: &dyn StorageEngine,
    domain: &str,
    query: &str,
    limit: usize,
    timeout: Option<Duration>,
) -> Result<Vec<Hit>> {
    if !lorekeep_core::names::is_valid_domain_name(domain) {
        return Err(registry::unknown_domain(domain));
    }

    let lookup = engine.nearest(domain, query, limit);
    let matches = match timeout {
        Some(deadline) => tokio::time::timeout(deadline, lookup).await.map_err(|_| {
            Error::storage(format!(
                "search of domain '{domain}' timed out after {}ms",
                deadline.as_millis()
            ))
        })??,
        None => lookup.await?,
    };

    matches
        .into_iter()
        .map(|stored| Hit::from_match(domain, stored))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingProvider, MockEmbeddingProvider};
    use crate::engine::MemoryEngine;
    use async_trait::async_trait;
    use lorekeep_core::{Document, DocumentRecord, ErrorKind, StoredMatch};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    const DIM: usize = 256;

    fn memory() -> MemoryEngine {
        MemoryEngine::new(Arc::new(MockEmbeddingProvider::new(DIM)))
    }

    fn config() -> StoreConfig {
        StoreConfig::in_memory(DIM)
    }

    async fn seed(engine: &dyn StorageEngine, domain: &str, texts: &[&str]) {
        registry::create(engine, domain).await.unwrap();
        for text in texts {
            engine
                .add(domain, Document::new(*text).into_record().unwrap())
                .await
                .unwrap();
        }
    }

    fn hits(items: &[SearchItem]) -> Vec<&Hit> {
        items.iter().filter_map(SearchItem::as_hit).collect()
    }

    fn failures(items: &[SearchItem]) -> Vec<&PartialFailure> {
        items.iter().filter_map(SearchItem::as_failure).collect()
    }

    // ------------------------------------------------------------------------
    // Fault-injecting engines
    // ------------------------------------------------------------------------

    /// Wraps a memory engine and misbehaves for one table.
    struct FaultyEngine {
        inner: MemoryEngine,
        victim: String,
        fault: Fault,
    }

    enum Fault {
        /// Drop the victim right after reporting it in `table_names`.
        VanishAfterListing,
        /// Fail every `nearest` on the victim.
        BrokenTable,
        /// Hang on `nearest` for the victim.
        Stall,
        /// Corrupt the victim's stored metadata.
        CorruptMetadata,
    }

    impl FaultyEngine {
        fn new(victim: &str, fault: Fault) -> Self {
            Self {
                inner: memory(),
                victim: victim.to_string(),
                fault,
            }
        }
    }

    #[async_trait]
    impl StorageEngine for FaultyEngine {
        async fn create_table(&self, name: &str) -> Result<()> {
            self.inner.create_table(name).await
        }

        async fn drop_table(&self, name: &str) -> Result<()> {
            self.inner.drop_table(name).await
        }

        async fn table_names(&self) -> Result<Vec<String>> {
            let names = self.inner.table_names().await?;
            if matches!(self.fault, Fault::VanishAfterListing) {
                self.inner.drop_table(&self.victim).await?;
            }
            Ok(names)
        }

        async fn has_table(&self, name: &str) -> Result<bool> {
            self.inner.has_table(name).await
        }

        async fn add(&self, table: &str, record: DocumentRecord) -> Result<()> {
            self.inner.add(table, record).await
        }

        async fn nearest(&self, table: &str, query: &str, limit: usize) -> Result<Vec<StoredMatch>> {
            if table == self.victim {
                match self.fault {
                    Fault::BrokenTable => return Err(Error::storage("corrupt fragment file")),
                    Fault::Stall => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Fault::CorruptMetadata => {
                        let mut matches = self.inner.nearest(table, query, limit).await?;
                        for m in &mut matches {
                            m.metadata = Some("{not json".to_string());
                        }
                        return Ok(matches);
                    }
                    Fault::VanishAfterListing => {}
                }
            }
            self.inner.nearest(table, query, limit).await
        }

        fn name(&self) -> &str {
            "faulty"
        }
    }

    /// Every `nearest` waits until all domains are being searched at once.
    struct RendezvousEngine {
        inner: MemoryEngine,
        barrier: Barrier,
    }

    #[async_trait]
    impl StorageEngine for RendezvousEngine {
        async fn create_table(&self, name: &str) -> Result<()> {
            self.inner.create_table(name).await
        }

        async fn drop_table(&self, name: &str) -> Result<()> {
            self.inner.drop_table(name).await
        }

        async fn table_names(&self) -> Result<Vec<String>> {
            self.inner.table_names().await
        }

        async fn add(&self, table: &str, record: DocumentRecord) -> Result<()> {
            self.inner.add(table, record).await
        }

        async fn nearest(&self, table: &str, query: &str, limit: usize) -> Result<Vec<StoredMatch>> {
            self.barrier.wait().await;
            self.inner.nearest(table, query, limit).await
        }

        fn name(&self) -> &str {
            "rendezvous"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::upstream("rate limited"))
        }

        fn dimension(&self) -> usize {
            DIM
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    // ------------------------------------------------------------------------
    // Input validation
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let engine = memory();
        let err = search(&engine, &config(), &SearchRequest::new("  "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let engine = memory();
        seed(&engine, "notes", &["text"]).await;
        let request = SearchRequest::new("text").with_limit(0);
        let err = search(&engine, &config(), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 5).unwrap(), 5);
        assert_eq!(resolve_limit(Some(3), 5).unwrap(), 3);
        assert!(resolve_limit(Some(0), 5).unwrap_err().is_invalid_input());
        assert_eq!(resolve_limit(None, 0).unwrap_err().kind(), ErrorKind::Config);
    }

    // ------------------------------------------------------------------------
    // Single domain
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_single_domain_hit() {
        let engine = memory();
        registry::create(&engine, "notes").await.unwrap();
        let doc = Document::new("The sky is blue")
            .with_source("obs1")
            .with_metadata(json!({"confidence": 0.9}));
        engine.add("notes", doc.into_record().unwrap()).await.unwrap();

        let request = SearchRequest::new("sky color").in_domain("notes").with_limit(5);
        let items = search(&engine, &config(), &request).await.unwrap();

        assert_eq!(items.len(), 1);
        let hit = items[0].as_hit().unwrap();
        assert_eq!(hit.text, "The sky is blue");
        assert_eq!(hit.source.as_deref(), Some("obs1"));
        assert_eq!(hit.metadata, Some(json!({"confidence": 0.9})));
        assert_eq!(hit.domain, "notes");
        assert!(hit.distance >= 0.0);
    }

    #[tokio::test]
    async fn test_single_domain_isolation() {
        let engine = memory();
        seed(&engine, "a", &["apples are red"]).await;
        seed(&engine, "b", &["bananas are yellow"]).await;

        let request = SearchRequest::new("bananas").in_domain("a");
        let items = search(&engine, &config(), &request).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|i| i.domain() == "a"));
    }

    #[tokio::test]
    async fn test_single_domain_missing_is_hard_error() {
        let engine = memory();
        let request = SearchRequest::new("anything").in_domain("ghost");
        let err = search(&engine, &config(), &request).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_single_domain_failure_is_hard_error() {
        let engine = FaultyEngine::new("a", Fault::BrokenTable);
        seed(&engine, "a", &["text"]).await;
        let request = SearchRequest::new("text").in_domain("a");
        let err = search(&engine, &config(), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFault);
    }

    #[tokio::test]
    async fn test_single_domain_within_domain_ordering() {
        let engine = memory();
        seed(
            &engine,
            "notes",
            &["rust borrow checker", "the color of the sky", "sky"],
        )
        .await;

        let request = SearchRequest::new("sky color").in_domain("notes");
        let items = search(&engine, &config(), &request).await.unwrap();
        let hits = hits(&items);
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(hits[2].text, "rust borrow checker");
    }

    // ------------------------------------------------------------------------
    // Fan-out
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fan_out_limit_is_per_domain() {
        let engine = memory();
        let texts: Vec<String> = (0..10).map(|i| format!("sky note {i}")).collect();
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        seed(&engine, "a", &texts).await;
        seed(&engine, "b", &texts).await;

        let request = SearchRequest::new("sky").with_limit(3);
        let items = search(&engine, &config(), &request).await.unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items.iter().filter(|i| i.domain() == "a").count(), 3);
        assert_eq!(items.iter().filter(|i| i.domain() == "b").count(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_groups_by_domain_in_order() {
        let engine = memory();
        seed(&engine, "beta", &["one", "two"]).await;
        seed(&engine, "alpha", &["three", "four"]).await;

        let items = search(&engine, &config(), &SearchRequest::new("one"))
            .await
            .unwrap();
        let domains: Vec<&str> = items.iter().map(SearchItem::domain).collect();
        assert_eq!(domains, vec!["alpha", "alpha", "beta", "beta"]);
    }

    #[tokio::test]
    async fn test_fan_out_no_domains() {
        let engine = memory();
        let items = search(&engine, &config(), &SearchRequest::new("anything"))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_default_limit() {
        let engine = memory();
        let texts: Vec<String> = (0..8).map(|i| format!("note {i}")).collect();
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        seed(&engine, "notes", &texts).await;

        let items = search(&engine, &config(), &SearchRequest::new("note"))
            .await
            .unwrap();
        assert_eq!(items.len(), config().default_limit);
    }

    #[tokio::test]
    async fn test_fan_out_domain_deleted_after_snapshot() {
        let engine = FaultyEngine::new("a", Fault::VanishAfterListing);
        seed(&engine, "a", &["apples"]).await;
        seed(&engine, "b", &["apples too"]).await;

        let items = search(&engine, &config(), &SearchRequest::new("apples"))
            .await
            .unwrap();

        let failures = failures(&items);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].domain, "a");
        assert_eq!(failures[0].error, ErrorKind::NotFound);

        let hits = hits(&items);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "b");
    }

    #[tokio::test]
    async fn test_fan_out_broken_domain_is_isolated() {
        let engine = FaultyEngine::new("b", Fault::BrokenTable);
        seed(&engine, "a", &["alpha text"]).await;
        seed(&engine, "b", &["beta text"]).await;
        seed(&engine, "c", &["gamma text"]).await;

        let items = search(&engine, &config(), &SearchRequest::new("text"))
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_hit().unwrap().domain, "a");
        let failure = items[1].as_failure().unwrap();
        assert_eq!(failure.domain, "b");
        assert_eq!(failure.error, ErrorKind::StorageFault);
        assert!(failure.message.contains("corrupt fragment file"));
        assert_eq!(items[2].as_hit().unwrap().domain, "c");
    }

    #[tokio::test]
    async fn test_fan_out_corrupt_metadata_is_partial_failure() {
        let engine = FaultyEngine::new("a", Fault::CorruptMetadata);
        seed(&engine, "a", &["text"]).await;
        seed(&engine, "b", &["text"]).await;

        let items = search(&engine, &config(), &SearchRequest::new("text"))
            .await
            .unwrap();
        assert_eq!(failures(&items).len(), 1);
        assert_eq!(failures(&items)[0].error, ErrorKind::StorageFault);
        assert_eq!(hits(&items).len(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_timeout_is_partial_failure() {
        let engine = FaultyEngine::new("slow", Fault::Stall);
        seed(&engine, "fast", &["text"]).await;
        seed(&engine, "slow", &["text"]).await;
        let config = StoreConfig {
            search_timeout_ms: Some(50),
            ..config()
        };

        let items = search(&engine, &config, &SearchRequest::new("text"))
            .await
            .unwrap();
        assert_eq!(hits(&items).len(), 1);
        let failures = failures(&items);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].domain, "slow");
        assert!(failures[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_fan_out_every_domain_fails_upstream() {
        let engine = MemoryEngine::new(Arc::new(FailingProvider));
        registry::create(&engine, "a").await.unwrap();
        registry::create(&engine, "b").await.unwrap();

        let items = search(&engine, &config(), &SearchRequest::new("text"))
            .await
            .unwrap();
        let failures = failures(&items);
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.error == ErrorKind::UpstreamFault));
    }

    #[tokio::test]
    async fn test_fan_out_runs_domains_concurrently() {
        let engine = RendezvousEngine {
            inner: memory(),
            barrier: Barrier::new(3),
        };
        for domain in ["a", "b", "c"] {
            seed(&engine, domain, &["text"]).await;
        }

        let items = tokio::time::timeout(
            Duration::from_secs(5),
            search(&engine, &config(), &SearchRequest::new("text")),
        )
        .await
        .expect("fan-out searches did not overlap")
        .unwrap();
        assert_eq!(hits(&items).len(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_width_one_still_completes() {
        let engine = memory();
        for domain in ["a", "b", "c"] {
            seed(&engine, domain, &["text"]).await;
        }
        let config = StoreConfig {
            max_concurrent_searches: 1,
            ..config()
        };

        let items = search(&engine, &config, &SearchRequest::new("text"))
            .await
            .unwrap();
        let domains: Vec<&str> = items.iter().map(SearchItem::domain).collect();
        assert_eq!(domains, vec!["a", "b", "c"]);
    }
}
