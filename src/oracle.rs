//! Host platform oracles / 宿主平台判定接口
//!
//! - `InstallationOracle`: is a module installed, globally visible, is one
//!   instance visible
//! - `PermissionOracle`: may this user see hidden course content
//!
//! `SqliteOracle` answers both from the course database.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Roles that may edit a course / 具有课程编辑权限的角色
pub const ELEVATED_ROLES: &[&str] = &["editingteacher", "manager"];

#[async_trait]
pub trait InstallationOracle: Send + Sync {
    async fn is_installed(&self, module: &str) -> Result<bool>;

    async fn is_globally_visible(&self, module: &str) -> Result<bool>;

    /// Instance shown to students (module and its section both visible) / 实例是否可见
    async fn is_instance_visible(&self, module: &str, instance_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Computed once per request; anonymous callers are never elevated / 是否具有编辑权限
    async fn has_elevated_access(&self, user_id: Option<i64>, course_id: i64) -> Result<bool>;
}

/// Oracles backed by the course database / 基于课程数据库的判定
#[derive(Clone)]
pub struct SqliteOracle {
    db: SqlitePool,
}

impl SqliteOracle {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstallationOracle for SqliteOracle {
    async fn is_installed(&self, module: &str) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM modules WHERE name = ?")
            .bind(module)
            .fetch_optional(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn is_globally_visible(&self, module: &str) -> Result<bool> {
        let visible: Option<(bool,)> = sqlx::query_as("SELECT visible FROM modules WHERE name = ?")
            .bind(module)
            .fetch_optional(&self.db)
            .await?;
        Ok(visible.map(|(v,)| v).unwrap_or(false))
    }

    async fn is_instance_visible(&self, module: &str, instance_id: i64) -> Result<bool> {
        let row: Option<(bool, bool)> = sqlx::query_as(
            r#"
            SELECT cm.visible, COALESCE(cs.visible, 1)
            FROM course_modules cm
            JOIN modules m ON m.id = cm.module
            LEFT JOIN course_sections cs ON cs.id = cm.section
            WHERE m.name = ? AND cm.instance = ?
            "#,
        )
        .bind(module)
        .bind(instance_id)
        .fetch_optional(&self.db)
        .await?;

        // An instance without a course module is not reachable by students
        Ok(matches!(row, Some((true, true))))
    }
}

#[async_trait]
impl PermissionOracle for SqliteOracle {
    async fn has_elevated_access(&self, user_id: Option<i64>, course_id: i64) -> Result<bool> {
        let user_id = match user_id {
            Some(id) => id,
            None => return Ok(false),
        };

        let is_admin: Option<(bool,)> = sqlx::query_as("SELECT is_admin FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        if is_admin.map(|(a,)| a).unwrap_or(false) {
            return Ok(true);
        }

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM role_assignments WHERE userid = ? AND courseid = ? AND role IN (?, ?)",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(ELEVATED_ROLES[0])
        .bind(ELEVATED_ROLES[1])
        .fetch_one(&self.db)
        .await?;

        Ok(count > 0)
    }
}
