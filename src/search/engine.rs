//! Search engine - the per-request orchestrator / 搜索引擎
//!
//! normalize → resolve categories → fan out to providers → apply policy →
//! reassemble groups in registration order.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::SearchSettings;
use crate::oracle::InstallationOracle;
use crate::providers::ProviderRegistry;

use super::error::SearchError;
use super::policy::decide;
use super::schema::{ProviderDescriptor, ResultGroup, ResultHit, Scope, SearchReport, SearchTerm};
use super::tokenizer::normalize;

/// Search engine / 搜索引擎
///
/// Stateless between requests; safe to share behind an `Arc`.
pub struct SearchEngine {
    registry: Arc<ProviderRegistry>,
    oracle: Arc<dyn InstallationOracle>,
    settings: SearchSettings,
}

impl SearchEngine {
    pub fn new(registry: Arc<ProviderRegistry>, oracle: Arc<dyn InstallationOracle>, settings: SearchSettings) -> Self {
        Self {
            registry,
            oracle,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Categories as they resolve right now / 当前可用的类别
    pub async fn categories(&self) -> Vec<ProviderDescriptor> {
        self.registry
            .resolve(self.oracle.as_ref())
            .await
            .into_iter()
            .map(|c| c.descriptor)
            .collect()
    }

    /// Run one search / 执行一次搜索
    pub async fn run_search(&self, raw: &str, scope: &Scope) -> Result<SearchReport, SearchError> {
        self.run_search_with_cancel(raw, scope, CancellationToken::new()).await
    }

    /// Run one search that the caller may abandon / 可取消的搜索
    ///
    /// On cancellation every in-flight provider future is dropped and no
    /// partial report is returned.
    pub async fn run_search_with_cancel(
        &self,
        raw: &str,
        scope: &Scope,
        cancel: CancellationToken,
    ) -> Result<SearchReport, SearchError> {
        let term = normalize(raw, self.settings.min_term_length)?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Search cancelled for course {}", scope.course_id);
                Err(SearchError::Cancelled)
            }
            report = self.collect(&term, scope) => Ok(report),
        }
    }

    async fn collect(&self, term: &SearchTerm, scope: &Scope) -> SearchReport {
        let registry = self.registry.as_ref();
        let oracle = self.oracle.as_ref();
        let timeout = self.settings.provider_timeout();

        // Resolution runs inside each category's budget so a slow oracle
        // holds back only its own category
        let mut groups: Vec<(usize, ResultGroup)> = stream::iter(0..registry.len())
            .map(move |index| async move {
                let outcome = tokio::time::timeout(timeout, search_category(registry, index, oracle, term, scope)).await;
                let group = match outcome {
                    Ok(group) => group,
                    Err(_) => registry.descriptor_at(index).map(|descriptor| {
                        tracing::warn!("Category {} timed out after {:?}", descriptor.key, timeout);
                        let mut group = ResultGroup::empty(&descriptor);
                        group.degraded = true;
                        group
                    }),
                };
                group.map(|g| (index, g))
            })
            .buffer_unordered(self.settings.concurrency())
            .filter_map(|group| async move { group })
            .collect()
            .await;

        // Completion order is arbitrary
        groups.sort_by_key(|(index, _)| *index);

        SearchReport {
            phrase: term.phrase(),
            scope: scope.clone(),
            groups: groups.into_iter().map(|(_, group)| group).collect(),
        }
    }
}

/// Resolve and search one category, then apply the policy to its hits / 搜索单个类别
///
/// `None` when the category's module is not installed.
async fn search_category(
    registry: &ProviderRegistry,
    index: usize,
    oracle: &dyn InstallationOracle,
    term: &SearchTerm,
    scope: &Scope,
) -> Option<ResultGroup> {
    let category = registry.resolve_at(index, oracle).await?;
    let mut group = ResultGroup::empty(&category.descriptor);
    let key = category.descriptor.key.as_str();

    if let Some(reason) = &category.failure {
        tracing::warn!("Category {} degraded: {}", key, reason);
        group.degraded = true;
        return Some(group);
    }

    // Policy would suppress every hit anyway
    if !category.descriptor.visible {
        tracing::debug!("Category {} hidden platform-wide, not queried", key);
        return Some(group);
    }

    let hits = match category.provider.search(term, scope).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!("Provider {} failed: {}", key, e);
            group.degraded = true;
            return Some(group);
        }
    };

    let found = hits.len();
    for hit in hits {
        if let Some(style) = decide(hit.visibility, scope.permission, category.descriptor.visible).style() {
            group.hits.push(ResultHit {
                label: hit.label,
                link: hit.link,
                style,
            });
        }
    }

    tracing::debug!("Provider {}: {} found, {} kept", key, found, group.hits.len());
    Some(group)
}
