use anyhow::Result;
use sqlx::SqlitePool;

use crate::providers::builtin;

/// Course content schema / 课程内容表结构
const SCHEMA: &[&str] = &[
    // Platform tables / 平台表
    r#"
    CREATE TABLE IF NOT EXISTS course (
        id INTEGER PRIMARY KEY,
        fullname TEXT NOT NULL,
        shortname TEXT NOT NULL DEFAULT '',
        summary TEXT,
        visible INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course INTEGER NOT NULL,
        section INTEGER NOT NULL,
        name TEXT,
        summary TEXT,
        visible INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS modules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        visible INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_modules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course INTEGER NOT NULL,
        module INTEGER NOT NULL,
        instance INTEGER NOT NULL,
        section INTEGER,
        visible INTEGER NOT NULL DEFAULT 1
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_course_modules_instance ON course_modules(module, instance)",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        firstname TEXT NOT NULL DEFAULT '',
        lastname TEXT NOT NULL DEFAULT '',
        is_admin INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_assignments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        userid INTEGER NOT NULL,
        courseid INTEGER NOT NULL,
        role TEXT NOT NULL
    )
    "#,
    // Activity modules / 活动模块
    "CREATE TABLE IF NOT EXISTS assign (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS book (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    r#"
    CREATE TABLE IF NOT EXISTS book_chapters (
        id INTEGER PRIMARY KEY,
        bookid INTEGER NOT NULL,
        pagenum INTEGER NOT NULL DEFAULT 0,
        title TEXT NOT NULL,
        content TEXT,
        hidden INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE TABLE IF NOT EXISTS chat (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS chat_messages (id INTEGER PRIMARY KEY, chatid INTEGER NOT NULL, userid INTEGER, message TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS checklist (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS choice (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS choice_options (id INTEGER PRIMARY KEY, choiceid INTEGER NOT NULL, text TEXT)",
    "CREATE TABLE IF NOT EXISTS data (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS data_fields (id INTEGER PRIMARY KEY, dataid INTEGER NOT NULL, name TEXT NOT NULL, description TEXT)",
    "CREATE TABLE IF NOT EXISTS data_records (id INTEGER PRIMARY KEY, dataid INTEGER NOT NULL, userid INTEGER)",
    "CREATE TABLE IF NOT EXISTS data_content (id INTEGER PRIMARY KEY, fieldid INTEGER NOT NULL, recordid INTEGER NOT NULL, content TEXT)",
    "CREATE TABLE IF NOT EXISTS feedback (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS feedback_item (id INTEGER PRIMARY KEY, feedback INTEGER NOT NULL, name TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS feedback_value (id INTEGER PRIMARY KEY, item INTEGER NOT NULL, value TEXT)",
    "CREATE TABLE IF NOT EXISTS folder (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS forum (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS forum_discussions (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, forum INTEGER NOT NULL, name TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS forum_posts (id INTEGER PRIMARY KEY, discussion INTEGER NOT NULL, subject TEXT NOT NULL, message TEXT)",
    "CREATE TABLE IF NOT EXISTS glossary (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    r#"
    CREATE TABLE IF NOT EXISTS glossary_entries (
        id INTEGER PRIMARY KEY,
        glossaryid INTEGER NOT NULL,
        concept TEXT NOT NULL,
        definition TEXT,
        approved INTEGER NOT NULL DEFAULT 1
    )
    "#,
    "CREATE TABLE IF NOT EXISTS label (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS lesson (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS lesson_pages (id INTEGER PRIMARY KEY, lessonid INTEGER NOT NULL, title TEXT NOT NULL, contents TEXT)",
    "CREATE TABLE IF NOT EXISTS lesson_answers (id INTEGER PRIMARY KEY, lessonid INTEGER NOT NULL, pageid INTEGER NOT NULL, answer TEXT)",
    "CREATE TABLE IF NOT EXISTS page (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT, content TEXT)",
    "CREATE TABLE IF NOT EXISTS resource (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS slideshow (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS slideshow_captions (id INTEGER PRIMARY KEY, slideshow INTEGER NOT NULL, title TEXT, caption TEXT)",
    "CREATE TABLE IF NOT EXISTS url (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT, externalurl TEXT)",
    "CREATE TABLE IF NOT EXISTS wiki (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL, intro TEXT)",
    "CREATE TABLE IF NOT EXISTS wiki_subwikis (id INTEGER PRIMARY KEY, wikiid INTEGER NOT NULL)",
    "CREATE TABLE IF NOT EXISTS wiki_pages (id INTEGER PRIMARY KEY, subwikiid INTEGER NOT NULL, title TEXT NOT NULL, cachedcontent TEXT)",
    "CREATE TABLE IF NOT EXISTS wiki_versions (id INTEGER PRIMARY KEY, pageid INTEGER NOT NULL, content TEXT)",
];

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    // Built-in modules start installed and visible / 内置模块默认已安装且可见
    for module in builtin::module_names() {
        sqlx::query("INSERT OR IGNORE INTO modules (name, visible) VALUES (?, 1)")
            .bind(module)
            .execute(pool)
            .await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Seeding helpers shared by the test modules / 测试数据辅助函数
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Migrated in-memory database / 已迁移的内存数据库
    pub async fn memory_pool() -> SqlitePool {
        // One connection: every new in-memory connection is a new database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn insert_course(pool: &SqlitePool, id: i64, fullname: &str) {
        sqlx::query("INSERT INTO course (id, fullname, shortname, summary) VALUES (?, ?, ?, '')")
            .bind(id)
            .bind(fullname)
            .bind(format!("C{}", id))
            .execute(pool)
            .await
            .unwrap();
    }

    /// Returns the section row id / 返回章节行ID
    pub async fn insert_section(pool: &SqlitePool, course: i64, section: i64, name: &str, visible: bool) -> i64 {
        let result = sqlx::query("INSERT INTO course_sections (course, section, name, visible) VALUES (?, ?, ?, ?)")
            .bind(course)
            .bind(section)
            .bind(name)
            .bind(visible)
            .execute(pool)
            .await
            .unwrap();
        result.last_insert_rowid()
    }

    pub async fn set_module_visible(pool: &SqlitePool, module: &str, visible: bool) {
        sqlx::query("UPDATE modules SET visible = ? WHERE name = ?")
            .bind(visible)
            .bind(module)
            .execute(pool)
            .await
            .unwrap();
    }

    /// Course module row for an instance, returns the course module id / 添加课程模块
    pub async fn add_module_instance(
        pool: &SqlitePool,
        course: i64,
        module: &str,
        instance: i64,
        visible: bool,
        section: Option<i64>,
    ) -> i64 {
        let result = sqlx::query(
            "INSERT INTO course_modules (course, module, instance, section, visible) SELECT ?, id, ?, ?, ? FROM modules WHERE name = ?",
        )
        .bind(course)
        .bind(instance)
        .bind(section)
        .bind(visible)
        .bind(module)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    pub async fn insert_user(pool: &SqlitePool, id: i64, firstname: &str, lastname: &str, is_admin: bool) {
        sqlx::query("INSERT INTO users (id, firstname, lastname, is_admin) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(firstname)
            .bind(lastname)
            .bind(is_admin)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn assign_role(pool: &SqlitePool, userid: i64, courseid: i64, role: &str) {
        sqlx::query("INSERT INTO role_assignments (userid, courseid, role) VALUES (?, ?, ?)")
            .bind(userid)
            .bind(courseid)
            .bind(role)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn insert_page(pool: &SqlitePool, id: i64, course: i64, name: &str, intro: &str) {
        sqlx::query("INSERT INTO page (id, course, name, intro, content) VALUES (?, ?, ?, ?, '')")
            .bind(id)
            .bind(course)
            .bind(name)
            .bind(intro)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn insert_forum(pool: &SqlitePool, id: i64, course: i64, name: &str, intro: &str) {
        sqlx::query("INSERT INTO forum (id, course, name, intro) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(course)
            .bind(name)
            .bind(intro)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn insert_label(pool: &SqlitePool, id: i64, course: i64, intro: &str) {
        sqlx::query("INSERT INTO label (id, course, name, intro) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(course)
            .bind(intro)
            .bind(intro)
            .execute(pool)
            .await
            .unwrap();
    }

    /// The "Midterm FAQ" course: a visible forum and a label in a hidden
    /// section / 期中问答示例课程
    pub async fn seed_midterm_course(pool: &SqlitePool) {
        insert_course(pool, 2, "Biology 101").await;
        let week1 = insert_section(pool, 2, 1, "Week 1", true).await;
        let week4 = insert_section(pool, 2, 4, "Week 4", false).await;

        insert_forum(pool, 5, 2, "Midterm FAQ", "Questions about the midterm").await;
        add_module_instance(pool, 2, "forum", 5, true, Some(week1)).await;

        insert_label(pool, 9, 2, "<p>Midterm FAQ answers are posted here</p>").await;
        add_module_instance(pool, 2, "label", 9, true, Some(week4)).await;

        insert_user(pool, 1, "Ada", "Teacher", false).await;
        insert_user(pool, 2, "Sam", "Student", false).await;
        assign_role(pool, 1, 2, "editingteacher").await;
        assign_role(pool, 2, 2, "student").await;
    }
}
