use std::collections::HashSet;

use crate::oracle::InstallationOracle;
use crate::search::{ProviderDescriptor, SearchError};

use super::ProviderBox;

struct RegistryEntry {
    key: String,
    provider: ProviderBox,
}

/// A registered category resolved for one request / 为单次请求解析的类别
#[derive(Clone)]
pub struct ResolvedCategory {
    pub descriptor: ProviderDescriptor,
    pub provider: ProviderBox,
    /// Oracle failure while resolving; the category degrades to no hits / 解析失败原因
    pub failure: Option<String>,
}

/// Provider registry (filled at startup, read-only afterwards) / 提供者注册表
///
/// Registration order is the category order of every report.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
    keys: HashSet<String>,
    /// Categories that skip the platform-wide visibility gate / 忽略全局可见性的类别
    ignore_global_visibility: HashSet<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the global visibility check for these categories / 设置忽略全局可见性的类别
    pub fn with_ignored_visibility<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_global_visibility = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Register a provider under a category key / 注册提供者
    pub fn register(&mut self, key: &str, provider: ProviderBox) -> Result<(), SearchError> {
        if !self.keys.insert(key.to_string()) {
            return Err(SearchError::DuplicateCategory(key.to_string()));
        }
        self.entries.push(RegistryEntry {
            key: key.to_string(),
            provider,
        });

        tracing::info!("Search provider registered: {}", key);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in order / 按注册顺序的类别键
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Descriptor before any oracle check / 未经判定的类别描述
    pub fn descriptor_at(&self, index: usize) -> Option<ProviderDescriptor> {
        self.entries.get(index).map(|entry| ProviderDescriptor {
            key: entry.key.clone(),
            label: entry.provider.label().to_string(),
            icon: entry.provider.module().map(str::to_string),
            visible: true,
        })
    }

    /// Resolve one category / 解析单个类别
    ///
    /// `None` when the index is out of range or the module is not installed.
    /// Installed but globally hidden categories come back with
    /// `visible = false` so the policy can decide.
    pub async fn resolve_at(&self, index: usize, oracle: &dyn InstallationOracle) -> Option<ResolvedCategory> {
        let entry = self.entries.get(index)?;
        let mut descriptor = self.descriptor_at(index)?;
        let provider = entry.provider.clone();

        let module = match entry.provider.module() {
            Some(m) => m,
            None => {
                return Some(ResolvedCategory {
                    descriptor,
                    provider,
                    failure: None,
                })
            }
        };

        match oracle.is_installed(module).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Skipping category {}: module {} not installed", entry.key, module);
                return None;
            }
            Err(e) => {
                tracing::warn!("Installation check failed for {}: {}", entry.key, e);
                return Some(ResolvedCategory {
                    descriptor,
                    provider,
                    failure: Some(e.to_string()),
                });
            }
        }

        let mut failure = None;
        if !self.ignore_global_visibility.contains(&entry.key) {
            match oracle.is_globally_visible(module).await {
                Ok(visible) => descriptor.visible = visible,
                Err(e) => {
                    tracing::warn!("Visibility check failed for {}: {}", entry.key, e);
                    failure = Some(e.to_string());
                }
            }
        }

        Some(ResolvedCategory {
            descriptor,
            provider,
            failure,
        })
    }

    /// Resolve every category in registration order / 按注册顺序解析所有类别
    pub async fn resolve(&self, oracle: &dyn InstallationOracle) -> Vec<ResolvedCategory> {
        let mut resolved = Vec::with_capacity(self.entries.len());
        for index in 0..self.entries.len() {
            if let Some(category) = self.resolve_at(index, oracle).await {
                resolved.push(category);
            }
        }
        resolved
    }
}
