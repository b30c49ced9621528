use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub fullname: String,
    pub shortname: String,
}

/// One matched row of a category query / 类别查询的一行结果
///
/// Column names match the aliases every `CategorySpec::select` produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    /// Module instance the row belongs to, `None` for course-level rows / 所属模块实例
    pub instance_id: Option<i64>,
    pub label: String,
    /// Body text, prepared before display / 正文
    pub detail: Option<String>,
    /// Id placed in the link / 链接目标ID
    pub target_id: i64,
    /// Secondary id (anchor or sub-parameter) / 锚点ID
    pub anchor_id: Option<i64>,
    /// Row-level hidden flag (hidden chapter, hidden section, unapproved entry) / 行级隐藏
    pub hidden: bool,
}
