//! Course data store access / 课程数据访问
//!
//! Every category query is assembled from static fragments in its
//! `CategorySpec`; user text only ever reaches SQLite as bound parameters.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::config::MatchMode;
use crate::models::{ContentRow, Course};
use crate::providers::CategorySpec;
use crate::search::tokenizer::{like_pattern, LIKE_ESCAPE};
use crate::search::{Scope, SearchTerm};

/// LIKE patterns a category query must satisfy (AND across patterns) / 匹配条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPredicate {
    patterns: Vec<String>,
}

impl MatchPredicate {
    pub fn new(term: &SearchTerm, mode: MatchMode) -> Self {
        let patterns = match mode {
            MatchMode::Phrase => vec![like_pattern(&term.phrase())],
            MatchMode::AllTokens => term.tokens().iter().map(|t| like_pattern(t)).collect(),
        };
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Read-only access to course content / 课程内容只读访问
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Rows of one category matching the predicate within the scope / 查询单个类别
    async fn query_category(
        &self,
        spec: &CategorySpec,
        predicate: &MatchPredicate,
        scope: &Scope,
    ) -> Result<Vec<ContentRow>>;

    async fn find_course(&self, course_id: i64) -> Result<Option<Course>>;
}

/// Build the SQL text for a category / 生成类别查询语句
///
/// `?1` is the course id, `?2..` the patterns; each pattern must match at
/// least one of the category's fields.
pub fn build_category_sql(spec: &CategorySpec, pattern_count: usize) -> String {
    let clauses: Vec<String> = (0..pattern_count)
        .map(|i| {
            let param = i + 2;
            let fields: Vec<String> = spec
                .fields
                .iter()
                .map(|f| format!("{} LIKE ?{} ESCAPE '{}'", f, param, LIKE_ESCAPE))
                .collect();
            format!("({})", fields.join(" OR "))
        })
        .collect();

    format!(
        "{} WHERE {} AND {} ORDER BY {}",
        spec.select,
        spec.scope,
        clauses.join(" AND "),
        spec.order_by
    )
}

/// SQLite implementation / SQLite 实现
#[derive(Clone)]
pub struct SqliteCourseStore {
    db: SqlitePool,
}

impl SqliteCourseStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn query_category(
        &self,
        spec: &CategorySpec,
        predicate: &MatchPredicate,
        scope: &Scope,
    ) -> Result<Vec<ContentRow>> {
        let sql = build_category_sql(spec, predicate.patterns().len());

        let mut query = sqlx::query(&sql).bind(scope.course_id);
        for pattern in predicate.patterns() {
            query = query.bind(pattern.as_str());
        }

        let rows = query.fetch_all(&self.db).await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            results.push(ContentRow {
                instance_id: row.try_get("instance_id")?,
                label: row.try_get::<Option<String>, _>("label")?.unwrap_or_default(),
                detail: row.try_get("detail")?,
                target_id: row.try_get("target_id")?,
                anchor_id: row.try_get("anchor_id")?,
                hidden: row.try_get::<Option<i64>, _>("hidden")?.unwrap_or(0) != 0,
            });
        }
        Ok(results)
    }

    async fn find_course(&self, course_id: i64) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, fullname, shortname FROM course WHERE id = ?",
        )
        .bind(course_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::providers::{LabelStyle, LinkTemplate};
    use crate::search::tokenizer::normalize;
    use crate::search::Permission;

    const PAGE_TITLES: CategorySpec = CategorySpec {
        key: "page_titles",
        label: "page titles",
        module: Some("page"),
        select: "SELECT p.id AS instance_id, p.name AS label, NULL AS detail, p.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM page p",
        scope: "p.course = ?1",
        fields: &["p.name", "p.intro"],
        order_by: "p.id",
        label_style: LabelStyle::Title,
        link: LinkTemplate::Query { path: "/mod/page/view.php", param: "p" },
    };

    #[test]
    fn test_build_sql_phrase() {
        let sql = build_category_sql(&PAGE_TITLES, 1);
        assert!(sql.ends_with(
            "WHERE p.course = ?1 AND (p.name LIKE ?2 ESCAPE '\\' OR p.intro LIKE ?2 ESCAPE '\\') ORDER BY p.id"
        ));
    }

    #[test]
    fn test_build_sql_all_tokens() {
        let sql = build_category_sql(&PAGE_TITLES, 2);
        assert!(sql.contains("(p.name LIKE ?2 ESCAPE '\\' OR p.intro LIKE ?2 ESCAPE '\\') AND (p.name LIKE ?3"));
    }

    #[test]
    fn test_predicate_modes() {
        let term = normalize("final exam", 3).unwrap();
        let phrase = MatchPredicate::new(&term, MatchMode::Phrase);
        assert_eq!(phrase.patterns(), &["%final exam%".to_string()]);

        let tokens = MatchPredicate::new(&term, MatchMode::AllTokens);
        assert_eq!(tokens.patterns(), &["%final%".to_string(), "%exam%".to_string()]);
    }

    async fn seed_pages(pool: &SqlitePool) {
        fixtures::insert_course(pool, 2, "Biology 101").await;
        fixtures::insert_course(pool, 3, "Chemistry").await;
        fixtures::insert_page(pool, 1, 2, "Exam revision", "Final notes").await;
        fixtures::insert_page(pool, 2, 2, "Final reading list", "Exam prep").await;
        fixtures::insert_page(pool, 3, 3, "Final exam", "other course").await;
        fixtures::insert_page(pool, 4, 2, "100% attendance", "").await;
    }

    #[tokio::test]
    async fn test_query_is_scoped_to_course() {
        let pool = fixtures::memory_pool().await;
        seed_pages(&pool).await;
        let store = SqliteCourseStore::new(pool);
        let scope = Scope::new(2, Permission::Standard);

        let term = normalize("final", 3).unwrap();
        let rows = store
            .query_category(&PAGE_TITLES, &MatchPredicate::new(&term, MatchMode::Phrase), &scope)
            .await
            .unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Exam revision", "Final reading list"]);
        assert_eq!(rows[0].instance_id, Some(1));
        assert!(!rows[0].hidden);
    }

    #[tokio::test]
    async fn test_all_tokens_matches_across_fields() {
        let pool = fixtures::memory_pool().await;
        seed_pages(&pool).await;
        let store = SqliteCourseStore::new(pool);
        let scope = Scope::new(2, Permission::Standard);

        let term = normalize("exam final", 3).unwrap();
        let phrase = store
            .query_category(&PAGE_TITLES, &MatchPredicate::new(&term, MatchMode::Phrase), &scope)
            .await
            .unwrap();
        assert!(phrase.is_empty());

        let tokens = store
            .query_category(&PAGE_TITLES, &MatchPredicate::new(&term, MatchMode::AllTokens), &scope)
            .await
            .unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[tokio::test]
    async fn test_wildcards_in_input_are_literal() {
        let pool = fixtures::memory_pool().await;
        seed_pages(&pool).await;
        let store = SqliteCourseStore::new(pool);
        let scope = Scope::new(2, Permission::Standard);

        let term = normalize("100%", 3).unwrap();
        let rows = store
            .query_category(&PAGE_TITLES, &MatchPredicate::new(&term, MatchMode::Phrase), &scope)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        // "%%%" would match everything if it were not escaped
        let term = normalize("%%%", 3).unwrap();
        let rows = store
            .query_category(&PAGE_TITLES, &MatchPredicate::new(&term, MatchMode::Phrase), &scope)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_find_course() {
        let pool = fixtures::memory_pool().await;
        fixtures::insert_course(&pool, 2, "Biology 101").await;
        let store = SqliteCourseStore::new(pool);

        let course = store.find_course(2).await.unwrap().unwrap();
        assert_eq!(course.fullname, "Biology 101");
        assert!(store.find_course(9).await.unwrap().is_none());
    }
}
