//! Table-driven provider / 表驱动的提供者
//!
//! Serves any category described by a `CategorySpec`: runs the category
//! query through the store, decides each row's visibility, then builds the
//! label and deep link.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{MatchMode, SearchSettings};
use crate::models::ContentRow;
use crate::oracle::InstallationOracle;
use crate::render::Strings;
use crate::search::tokenizer::prepare_content;
use crate::search::{RawHit, Scope, SearchError, SearchTerm, Visibility};
use crate::store::{CourseStore, MatchPredicate};
use crate::utils::join_url;

use super::{CategorySpec, ContentProvider, LabelStyle, LinkTemplate};

/// Deployment settings shared by all table providers / 提供者共享设置
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub wwwroot: String,
    pub summary_length: usize,
    pub match_mode: MatchMode,
    /// Label prefix for section hits / 章节标签前缀
    pub label_in_section: String,
}

impl ProviderSettings {
    pub fn new(wwwroot: &str, search: &SearchSettings, strings: &Strings) -> Self {
        Self {
            wwwroot: wwwroot.to_string(),
            summary_length: search.summary_length,
            match_mode: search.match_mode,
            label_in_section: strings.label_in_section.clone(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        let search = SearchSettings::default();
        Self::new("", &search, &Strings::new(&search))
    }
}

pub struct TableProvider {
    spec: CategorySpec,
    store: Arc<dyn CourseStore>,
    oracle: Arc<dyn InstallationOracle>,
    settings: ProviderSettings,
}

impl TableProvider {
    pub fn new(
        spec: CategorySpec,
        store: Arc<dyn CourseStore>,
        oracle: Arc<dyn InstallationOracle>,
        settings: ProviderSettings,
    ) -> Self {
        Self { spec, store, oracle, settings }
    }

    fn build_label(&self, row: &ContentRow) -> String {
        let cap = self.settings.summary_length;
        let detail = row.detail.as_deref().unwrap_or("");
        match self.spec.label_style {
            LabelStyle::Title => row.label.clone(),
            LabelStyle::Content => {
                let prepared = prepare_content(detail, cap);
                if prepared.is_empty() {
                    row.label.clone()
                } else {
                    prepared
                }
            }
            LabelStyle::TitleAndContent => {
                let prepared = prepare_content(detail, cap);
                if prepared.is_empty() {
                    row.label.clone()
                } else {
                    format!("{}: {}", row.label, prepared)
                }
            }
            LabelStyle::Section => {
                let prepared = prepare_content(detail, cap);
                let mut label = format!("{} {}", self.settings.label_in_section, row.target_id);
                if !prepared.is_empty() {
                    label.push_str(": ");
                    label.push_str(&prepared);
                }
                label
            }
        }
    }

    fn build_link(&self, row: &ContentRow, scope: &Scope) -> String {
        let anchor = row.anchor_id.unwrap_or_default();
        let path = match self.spec.link {
            LinkTemplate::Query { path, param } => format!("{}?{}={}", path, param, row.target_id),
            LinkTemplate::SubQuery { path, param, sub_param } => {
                format!("{}?{}={}&{}={}", path, param, row.target_id, sub_param, anchor)
            }
            LinkTemplate::Fragment { path, param, fragment } => {
                format!("{}?{}={}#{}{}", path, param, row.target_id, fragment, anchor)
            }
            LinkTemplate::Section => {
                format!("/course/view.php?id={}#section-{}", scope.course_id, row.target_id)
            }
        };
        join_url(&self.settings.wwwroot, &path)
    }
}

#[async_trait]
impl ContentProvider for TableProvider {
    fn key(&self) -> &str {
        self.spec.key
    }

    fn label(&self) -> &str {
        self.spec.label
    }

    fn module(&self) -> Option<&str> {
        self.spec.module
    }

    async fn search(&self, term: &SearchTerm, scope: &Scope) -> Result<Vec<RawHit>, SearchError> {
        let predicate = MatchPredicate::new(term, self.settings.match_mode);
        let rows = self
            .store
            .query_category(&self.spec, &predicate, scope)
            .await
            .map_err(|e| SearchError::unavailable(self.spec.key, e))?;

        // Rows of one instance share its visibility
        let mut instance_visible: HashMap<i64, bool> = HashMap::new();
        let mut hits = Vec::with_capacity(rows.len());

        for row in &rows {
            let mut visible = !row.hidden;
            if visible {
                if let (Some(module), Some(instance)) = (self.spec.module, row.instance_id) {
                    visible = match instance_visible.get(&instance) {
                        Some(v) => *v,
                        None => {
                            let v = self
                                .oracle
                                .is_instance_visible(module, instance)
                                .await
                                .map_err(|e| SearchError::unavailable(self.spec.key, e))?;
                            instance_visible.insert(instance, v);
                            v
                        }
                    };
                }
            }

            hits.push(RawHit {
                label: self.build_label(row),
                link: self.build_link(row, scope),
                visibility: if visible { Visibility::Visible } else { Visibility::Hidden },
                category: self.spec.key.to_string(),
            });
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use crate::oracle::testing::StaticOracle;
    use crate::search::tokenizer::normalize;
    use crate::search::Permission;

    /// Store that hands back canned rows / 返回固定行的存储
    struct RowStore {
        rows: Vec<ContentRow>,
        fail: bool,
    }

    #[async_trait]
    impl CourseStore for RowStore {
        async fn query_category(
            &self,
            _spec: &CategorySpec,
            _predicate: &MatchPredicate,
            _scope: &Scope,
        ) -> anyhow::Result<Vec<ContentRow>> {
            if self.fail {
                anyhow::bail!("database is locked");
            }
            Ok(self.rows.clone())
        }

        async fn find_course(&self, _course_id: i64) -> anyhow::Result<Option<Course>> {
            Ok(None)
        }
    }

    const POSTS: CategorySpec = CategorySpec {
        key: "forum_posts",
        label: "forum posts",
        module: Some("forum"),
        select: "",
        scope: "",
        fields: &[],
        order_by: "",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::Fragment { path: "/mod/forum/discuss.php", param: "d", fragment: "p" },
    };

    fn row(instance: i64, label: &str, detail: &str, target: i64, anchor: i64) -> ContentRow {
        ContentRow {
            instance_id: Some(instance),
            label: label.to_string(),
            detail: Some(detail.to_string()),
            target_id: target,
            anchor_id: Some(anchor),
            hidden: false,
        }
    }

    fn provider(spec: CategorySpec, rows: Vec<ContentRow>, oracle: StaticOracle, fail: bool) -> TableProvider {
        TableProvider::new(
            spec,
            Arc::new(RowStore { rows, fail }),
            Arc::new(oracle),
            ProviderSettings {
                wwwroot: "https://lms.example.com".to_string(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_hits_keep_row_order_and_links() {
        let rows = vec![
            row(1, "Re: Midterm", "<p>Is the <b>midterm</b> open book?</p>", 12, 34),
            row(1, "Midterm date", "Thursday", 12, 35),
        ];
        let p = provider(POSTS, rows, StaticOracle::new(), false);
        let term = normalize("midterm", 3).unwrap();
        let hits = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].label, "Re: Midterm: Is the midterm open book?");
        assert_eq!(hits[0].link, "https://lms.example.com/mod/forum/discuss.php?d=12#p34");
        assert_eq!(hits[1].label, "Midterm date: Thursday");
        assert!(hits.iter().all(|h| h.visibility == Visibility::Visible));
        assert!(hits.iter().all(|h| h.category == "forum_posts"));
    }

    #[tokio::test]
    async fn test_hidden_instance_and_hidden_row() {
        let mut hidden_row = row(2, "Draft", "notes", 20, 1);
        hidden_row.hidden = true;
        let rows = vec![row(1, "Open", "notes", 10, 1), row(3, "Secret", "notes", 30, 1), hidden_row];
        let oracle = StaticOracle::new().hidden_instance("forum", 3);
        let p = provider(POSTS, rows, oracle, false);

        let term = normalize("notes", 3).unwrap();
        let hits = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap();
        let visibility: Vec<Visibility> = hits.iter().map(|h| h.visibility).collect();
        assert_eq!(visibility, vec![Visibility::Visible, Visibility::Hidden, Visibility::Hidden]);
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let p = provider(POSTS, Vec::new(), StaticOracle::new(), true);
        let term = normalize("midterm", 3).unwrap();
        let err = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap_err();
        assert!(matches!(err, SearchError::ProviderUnavailable { ref category, .. } if category == "forum_posts"));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_unavailable() {
        let p = provider(POSTS, vec![row(1, "Open", "x", 1, 1)], StaticOracle::new().failing(), false);
        let term = normalize("open", 3).unwrap();
        let err = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap_err();
        assert!(matches!(err, SearchError::ProviderUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_section_label_and_link() {
        let spec = CategorySpec {
            key: "labels",
            label: "labels",
            module: Some("label"),
            label_style: LabelStyle::Section,
            link: LinkTemplate::Section,
            ..POSTS
        };
        let p = provider(spec, vec![row(5, "", "Midterm is in week 4", 4, 0)], StaticOracle::new(), false);
        let term = normalize("midterm", 3).unwrap();
        let hits = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap();
        assert_eq!(hits[0].label, "Search term found in a label in section 4: Midterm is in week 4");
        assert_eq!(hits[0].link, "https://lms.example.com/course/view.php?id=2#section-4");
    }

    #[tokio::test]
    async fn test_section_label_uses_configured_text() {
        let spec = CategorySpec {
            key: "labels",
            label: "labels",
            module: Some("label"),
            label_style: LabelStyle::Section,
            link: LinkTemplate::Section,
            ..POSTS
        };
        let p = TableProvider::new(
            spec,
            Arc::new(RowStore { rows: vec![row(5, "", "", 7, 0)], fail: false }),
            Arc::new(StaticOracle::new()),
            ProviderSettings {
                label_in_section: "Label match in section".to_string(),
                ..Default::default()
            },
        );
        let term = normalize("week", 3).unwrap();
        let hits = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap();
        assert_eq!(hits[0].label, "Label match in section 7");
        assert_eq!(hits[0].link, "/course/view.php?id=2#section-7");
    }

    #[tokio::test]
    async fn test_content_label_is_capped() {
        let spec = CategorySpec {
            label_style: LabelStyle::Content,
            link: LinkTemplate::SubQuery { path: "/mod/book/view.php", param: "id", sub_param: "chapterid" },
            ..POSTS
        };
        let long = "x".repeat(120);
        let p = provider(spec, vec![row(1, "Chapter", &long, 7, 9)], StaticOracle::new(), false);
        let term = normalize("xxx", 3).unwrap();
        let hits = p.search(&term, &Scope::new(2, Permission::Standard)).await.unwrap();
        assert_eq!(hits[0].label.chars().count(), 78);
        assert_eq!(hits[0].link, "https://lms.example.com/mod/book/view.php?id=7&chapterid=9");
    }
}
