//! Search data model / 搜索数据模型
//!
//! Everything here lives for one request only: built by the orchestrator,
//! handed to the renderer, then dropped.

use serde::{Deserialize, Serialize};

/// Normalized search term / 规范化后的搜索词
///
/// Invariant: at least one token, no token empty or shorter than the
/// minimum length it was built with. Only `tokenizer::normalize` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    tokens: Vec<String>,
}

impl SearchTerm {
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        debug_assert!(!tokens.is_empty());
        Self { tokens }
    }

    /// Tokens in input order / 按输入顺序的词
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens re-joined with single spaces / 用单个空格重新拼接
    pub fn phrase(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Caller's permission tier / 调用者权限级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Standard,
    /// May see hidden content, dimmed / 可以看到隐藏内容（灰显）
    Elevated,
}

/// Container being searched plus the caller's permission / 搜索范围
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub course_id: i64,
    pub permission: Permission,
    /// Requesting user, only used for the search log / 请求用户
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Scope {
    pub fn new(course_id: i64, permission: Permission) -> Self {
        Self {
            course_id,
            permission,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// One searchable category as resolved for a request / 已解析的类别描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub key: String,
    /// Human label, e.g. "forum posts" / 显示名称
    pub label: String,
    /// Module / icon key, `None` for course-level categories / 模块名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Globally visible (after per-category overrides) / 全局可见
    pub visible: bool,
}

/// Visibility of a single matched record / 单条记录的可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// A match before policy is applied / 应用策略前的命中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub label: String,
    pub link: String,
    pub visibility: Visibility,
    pub category: String,
}

/// Outcome of the visibility policy / 可见性策略结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Show,
    ShowDimmed,
    Suppress,
}

/// How a kept hit is rendered / 渲染样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyle {
    Normal,
    Dimmed,
}

/// A hit that survived the policy / 通过策略的命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHit {
    pub label: String,
    pub link: String,
    pub style: RenderStyle,
}

/// Hits for one category, in provider order / 单个类别的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultGroup {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub hits: Vec<ResultHit>,
    /// Provider failed or timed out / 提供者失败或超时
    pub degraded: bool,
}

impl ResultGroup {
    pub fn empty(descriptor: &ProviderDescriptor) -> Self {
        Self {
            key: descriptor.key.clone(),
            label: descriptor.label.clone(),
            icon: descriptor.icon.clone(),
            hits: Vec::new(),
            degraded: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// The whole answer for one request / 单次请求的搜索报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Normalized phrase that was searched / 实际搜索的短语
    pub phrase: String,
    pub scope: Scope,
    /// Groups in registration order / 按注册顺序排列
    pub groups: Vec<ResultGroup>,
}

impl SearchReport {
    pub fn group(&self, key: &str) -> Option<&ResultGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn total_hits(&self) -> usize {
        self.groups.iter().map(|g| g.hits.len()).sum()
    }
}
