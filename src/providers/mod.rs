//! Content providers / 内容提供者
//!
//! One provider per searchable category. Built-in categories are all served
//! by the table-driven `TableProvider`; the per-category differences live in
//! `CategorySpec` data rather than code.

use async_trait::async_trait;
use std::sync::Arc;

use crate::search::{RawHit, Scope, SearchError, SearchTerm};

pub mod builtin;
pub mod registry;
pub mod table;

pub use registry::{ProviderRegistry, ResolvedCategory};
pub use table::{ProviderSettings, TableProvider};

pub type ProviderBox = Arc<dyn ContentProvider>;

/// Search interface for one content category / 内容类别搜索接口
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Category key, e.g. "forum_posts" / 类别键
    fn key(&self) -> &str;

    /// Human label, e.g. "forum posts" / 显示名称
    fn label(&self) -> &str;

    /// Host module backing the category, `None` for course-level data / 所属模块
    fn module(&self) -> Option<&str> {
        None
    }

    /// Find matching records within the scope / 在范围内查找匹配记录
    ///
    /// Any store failure must come back as `SearchError::ProviderUnavailable`.
    async fn search(&self, term: &SearchTerm, scope: &Scope) -> Result<Vec<RawHit>, SearchError>;
}

/// How a hit label is built from a row / 标签生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Row label as-is / 直接使用标题
    Title,
    /// Prepared body text / 正文摘要
    Content,
    /// "label: prepared body" / 标题加摘要
    TitleAndContent,
    /// Labels have no title of their own; point at the section / 标签所在章节
    Section,
}

/// How a hit link is built from a row / 链接生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTemplate {
    /// `{path}?{param}={target}`
    Query { path: &'static str, param: &'static str },
    /// `{path}?{param}={target}&{sub_param}={anchor}`
    SubQuery {
        path: &'static str,
        param: &'static str,
        sub_param: &'static str,
    },
    /// `{path}?{param}={target}#{fragment}{anchor}`
    Fragment {
        path: &'static str,
        param: &'static str,
        fragment: &'static str,
    },
    /// `/course/view.php?id={course}#section-{target}`
    Section,
}

/// Static description of one built-in category / 内置类别描述
///
/// `select` must alias exactly these columns: `instance_id`, `label`,
/// `detail`, `target_id`, `anchor_id`, `hidden`. `scope` binds the course id
/// as `?1`; match patterns are bound from `?2` on.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub key: &'static str,
    pub label: &'static str,
    pub module: Option<&'static str>,
    pub select: &'static str,
    pub scope: &'static str,
    /// Columns searched with LIKE / 匹配的字段
    pub fields: &'static [&'static str],
    pub order_by: &'static str,
    pub label_style: LabelStyle,
    pub link: LinkTemplate,
}
