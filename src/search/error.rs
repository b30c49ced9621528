//! Search errors / 搜索错误

/// Errors raised along the search path / 搜索路径上的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Empty or too-short search text; callers redirect instead of searching / 无效输入
    #[error("Invalid search input: {0}")]
    InvalidInput(String),

    /// Two providers registered under one key (startup only) / 类别重复注册
    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    /// A provider could not run; the orchestrator degrades it to zero hits / 提供者不可用
    #[error("Provider {category} unavailable: {reason}")]
    ProviderUnavailable { category: String, reason: String },

    /// The whole request was cancelled before collection finished / 请求已取消
    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    pub fn unavailable(category: &str, reason: impl std::fmt::Display) -> Self {
        SearchError::ProviderUnavailable {
            category: category.to_string(),
            reason: reason.to_string(),
        }
    }
}
