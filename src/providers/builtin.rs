//! Built-in content categories / 内置内容类别
//!
//! One `CategorySpec` per category; the array order is the order of the
//! groups in every report.

use std::sync::Arc;

use crate::config::SearchSettings;
use crate::oracle::InstallationOracle;
use crate::search::SearchError;
use crate::store::CourseStore;

use super::{CategorySpec, LabelStyle, LinkTemplate, ProviderRegistry, ProviderSettings, TableProvider};

/// SELECT over a module table joined to its course module row.
/// `target_id` is the course module id, used by every `view.php?id=` link.
macro_rules! module_select {
    ($module:literal, $table:literal, $alias:literal, $label:literal, $detail:literal) => {
        concat!(
            "SELECT ", $alias, ".id AS instance_id, ", $label, " AS label, ", $detail,
            " AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM ",
            $table, " ", $alias,
            " JOIN course_modules cm ON cm.instance = ", $alias, ".id",
            " JOIN modules m ON m.id = cm.module AND m.name = '", $module, "'"
        )
    };
}

/// Course module join for child tables whose parent alias is given / 子表的课程模块关联
macro_rules! cm_join {
    ($module:literal, $parent:literal) => {
        concat!(
            " JOIN course_modules cm ON cm.instance = ", $parent, ".id",
            " JOIN modules m ON m.id = cm.module AND m.name = '", $module, "'"
        )
    };
}

const fn view(path: &'static str) -> LinkTemplate {
    LinkTemplate::Query { path, param: "id" }
}

pub const CATEGORIES: &[CategorySpec] = &[
    // Forums
    CategorySpec {
        key: "forum_titles",
        label: "forum titles",
        module: Some("forum"),
        select: "SELECT f.id AS instance_id, f.name AS label, f.intro AS detail, f.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM forum f",
        scope: "f.course = ?1",
        fields: &["f.name", "f.intro"],
        order_by: "f.id",
        label_style: LabelStyle::Title,
        link: LinkTemplate::Query { path: "/mod/forum/view.php", param: "f" },
    },
    CategorySpec {
        key: "forum_discussions",
        label: "forum discussions",
        module: Some("forum"),
        select: "SELECT d.forum AS instance_id, d.name AS label, NULL AS detail, d.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM forum_discussions d",
        scope: "d.course = ?1",
        fields: &["d.name"],
        order_by: "d.id",
        label_style: LabelStyle::Title,
        link: LinkTemplate::Query { path: "/mod/forum/discuss.php", param: "d" },
    },
    CategorySpec {
        key: "forum_posts",
        label: "forum posts",
        module: Some("forum"),
        select: "SELECT d.forum AS instance_id, p.subject AS label, p.message AS detail, d.id AS target_id, p.id AS anchor_id, 0 AS hidden FROM forum_posts p JOIN forum_discussions d ON d.id = p.discussion",
        scope: "d.course = ?1",
        fields: &["p.subject", "p.message"],
        order_by: "p.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::Fragment { path: "/mod/forum/discuss.php", param: "d", fragment: "p" },
    },
    // Glossaries
    CategorySpec {
        key: "glossary_titles",
        label: "glossaries",
        module: Some("glossary"),
        select: module_select!("glossary", "glossary", "g", "g.name", "g.intro"),
        scope: "g.course = ?1",
        fields: &["g.name", "g.intro"],
        order_by: "g.id",
        label_style: LabelStyle::Title,
        link: view("/mod/glossary/view.php"),
    },
    CategorySpec {
        key: "glossary_entries",
        label: "glossary entries",
        module: Some("glossary"),
        select: "SELECT g.id AS instance_id, e.concept AS label, e.definition AS detail, e.id AS target_id, NULL AS anchor_id, CASE WHEN e.approved = 0 THEN 1 ELSE 0 END AS hidden FROM glossary_entries e JOIN glossary g ON g.id = e.glossaryid",
        scope: "g.course = ?1",
        fields: &["e.concept", "e.definition"],
        order_by: "e.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::Query { path: "/mod/glossary/showentry.php", param: "eid" },
    },
    // Labels
    CategorySpec {
        key: "labels",
        label: "labels",
        module: Some("label"),
        select: concat!(
            "SELECT l.id AS instance_id, l.name AS label, l.intro AS detail, COALESCE(cs.section, 0) AS target_id, NULL AS anchor_id, 0 AS hidden FROM label l",
            cm_join!("label", "l"),
            " LEFT JOIN course_sections cs ON cs.id = cm.section"
        ),
        scope: "l.course = ?1",
        fields: &["l.name", "l.intro"],
        order_by: "l.id",
        label_style: LabelStyle::Section,
        link: LinkTemplate::Section,
    },
    // Checklists
    CategorySpec {
        key: "checklist_titles",
        label: "checklist titles",
        module: Some("checklist"),
        select: module_select!("checklist", "checklist", "c", "c.name", "c.intro"),
        scope: "c.course = ?1",
        fields: &["c.name", "c.intro"],
        order_by: "c.id",
        label_style: LabelStyle::Title,
        link: view("/mod/checklist/view.php"),
    },
    // URLs
    CategorySpec {
        key: "url_titles",
        label: "URL titles",
        module: Some("url"),
        select: module_select!("url", "url", "u", "u.name", "u.intro"),
        scope: "u.course = ?1",
        fields: &["u.name", "u.intro"],
        order_by: "u.id",
        label_style: LabelStyle::Title,
        link: view("/mod/url/view.php"),
    },
    CategorySpec {
        key: "urls",
        label: "URLs",
        module: Some("url"),
        select: module_select!("url", "url", "u", "u.name", "u.externalurl"),
        scope: "u.course = ?1",
        fields: &["u.externalurl"],
        order_by: "u.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/url/view.php"),
    },
    // Pages
    CategorySpec {
        key: "page_titles",
        label: "page titles",
        module: Some("page"),
        select: module_select!("page", "page", "p", "p.name", "p.intro"),
        scope: "p.course = ?1",
        fields: &["p.name", "p.intro"],
        order_by: "p.id",
        label_style: LabelStyle::Title,
        link: view("/mod/page/view.php"),
    },
    CategorySpec {
        key: "page_content",
        label: "page content",
        module: Some("page"),
        select: module_select!("page", "page", "p", "p.name", "p.content"),
        scope: "p.course = ?1",
        fields: &["p.content"],
        order_by: "p.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/page/view.php"),
    },
    // Books
    CategorySpec {
        key: "book_titles",
        label: "book titles",
        module: Some("book"),
        select: module_select!("book", "book", "b", "b.name", "b.intro"),
        scope: "b.course = ?1",
        fields: &["b.name", "b.intro"],
        order_by: "b.id",
        label_style: LabelStyle::Title,
        link: view("/mod/book/view.php"),
    },
    CategorySpec {
        key: "book_content",
        label: "book content",
        module: Some("book"),
        select: concat!(
            "SELECT b.id AS instance_id, bc.title AS label, bc.content AS detail, cm.id AS target_id, bc.id AS anchor_id, bc.hidden AS hidden FROM book_chapters bc JOIN book b ON b.id = bc.bookid",
            cm_join!("book", "b")
        ),
        scope: "b.course = ?1",
        fields: &["bc.title", "bc.content"],
        order_by: "b.id, bc.pagenum",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::SubQuery { path: "/mod/book/view.php", param: "id", sub_param: "chapterid" },
    },
    // Assignments
    CategorySpec {
        key: "assignment_titles",
        label: "assignment titles",
        module: Some("assign"),
        select: module_select!("assign", "assign", "a", "a.name", "a.intro"),
        scope: "a.course = ?1",
        fields: &["a.name"],
        order_by: "a.id",
        label_style: LabelStyle::Title,
        link: view("/mod/assign/view.php"),
    },
    CategorySpec {
        key: "assignment_content",
        label: "assignment content",
        module: Some("assign"),
        select: module_select!("assign", "assign", "a", "a.name", "a.intro"),
        scope: "a.course = ?1",
        fields: &["a.intro"],
        order_by: "a.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/assign/view.php"),
    },
    // Chats
    CategorySpec {
        key: "chat_titles",
        label: "chat titles",
        module: Some("chat"),
        select: module_select!("chat", "chat", "c", "c.name", "c.intro"),
        scope: "c.course = ?1",
        fields: &["c.name", "c.intro"],
        order_by: "c.id",
        label_style: LabelStyle::Title,
        link: view("/mod/chat/view.php"),
    },
    CategorySpec {
        key: "chat_conversations",
        label: "chat conversations",
        module: Some("chat"),
        select: concat!(
            "SELECT c.id AS instance_id, c.name AS label, cmsg.message AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM chat_messages cmsg JOIN chat c ON c.id = cmsg.chatid",
            cm_join!("chat", "c")
        ),
        scope: "c.course = ?1",
        fields: &["cmsg.message"],
        order_by: "cmsg.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/chat/view.php"),
    },
    // Choices
    CategorySpec {
        key: "choice_titles",
        label: "choice titles",
        module: Some("choice"),
        select: module_select!("choice", "choice", "c", "c.name", "c.intro"),
        scope: "c.course = ?1",
        fields: &["c.name", "c.intro"],
        order_by: "c.id",
        label_style: LabelStyle::Title,
        link: view("/mod/choice/view.php"),
    },
    CategorySpec {
        key: "choice_options",
        label: "choice options",
        module: Some("choice"),
        select: concat!(
            "SELECT c.id AS instance_id, c.name AS label, o.text AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM choice_options o JOIN choice c ON c.id = o.choiceid",
            cm_join!("choice", "c")
        ),
        scope: "c.course = ?1",
        fields: &["o.text"],
        order_by: "o.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/choice/view.php"),
    },
    // Course
    CategorySpec {
        key: "course_names",
        label: "course names",
        module: None,
        select: "SELECT NULL AS instance_id, c.fullname AS label, c.shortname AS detail, c.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM course c",
        scope: "c.id = ?1",
        fields: &["c.fullname", "c.shortname"],
        order_by: "c.id",
        label_style: LabelStyle::Title,
        link: view("/course/view.php"),
    },
    CategorySpec {
        key: "course_summary",
        label: "course summary",
        module: None,
        select: "SELECT NULL AS instance_id, c.fullname AS label, c.summary AS detail, c.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM course c",
        scope: "c.id = ?1",
        fields: &["c.summary"],
        order_by: "c.id",
        label_style: LabelStyle::Content,
        link: view("/course/view.php"),
    },
    CategorySpec {
        key: "course_topic_titles",
        label: "course topic titles",
        module: None,
        select: "SELECT NULL AS instance_id, cs.name AS label, cs.summary AS detail, cs.section AS target_id, NULL AS anchor_id, CASE WHEN cs.visible = 0 THEN 1 ELSE 0 END AS hidden FROM course_sections cs",
        scope: "cs.course = ?1",
        fields: &["cs.name", "cs.summary"],
        order_by: "cs.section",
        label_style: LabelStyle::Title,
        link: LinkTemplate::Section,
    },
    // Databases
    CategorySpec {
        key: "database_titles",
        label: "database titles",
        module: Some("data"),
        select: module_select!("data", "data", "d", "d.name", "d.intro"),
        scope: "d.course = ?1",
        fields: &["d.name", "d.intro"],
        order_by: "d.id",
        label_style: LabelStyle::Title,
        link: view("/mod/data/view.php"),
    },
    CategorySpec {
        key: "database_fields",
        label: "database fields",
        module: Some("data"),
        select: concat!(
            "SELECT d.id AS instance_id, df.name AS label, df.description AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM data_fields df JOIN data d ON d.id = df.dataid",
            cm_join!("data", "d")
        ),
        scope: "d.course = ?1",
        fields: &["df.name", "df.description"],
        order_by: "df.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/data/view.php"),
    },
    CategorySpec {
        key: "database_content",
        label: "database content",
        module: Some("data"),
        select: "SELECT d.id AS instance_id, d.name AS label, dc.content AS detail, d.id AS target_id, dc.recordid AS anchor_id, 0 AS hidden FROM data_content dc JOIN data_fields df ON df.id = dc.fieldid JOIN data d ON d.id = df.dataid",
        scope: "d.course = ?1",
        fields: &["dc.content"],
        order_by: "dc.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::SubQuery { path: "/mod/data/view.php", param: "d", sub_param: "rid" },
    },
    // Feedback
    CategorySpec {
        key: "feedback_names",
        label: "feedback names",
        module: Some("feedback"),
        select: module_select!("feedback", "feedback", "f", "f.name", "f.intro"),
        scope: "f.course = ?1",
        fields: &["f.name", "f.intro"],
        order_by: "f.id",
        label_style: LabelStyle::Title,
        link: view("/mod/feedback/view.php"),
    },
    CategorySpec {
        key: "feedback_questions",
        label: "feedback questions",
        module: Some("feedback"),
        select: concat!(
            "SELECT f.id AS instance_id, fi.name AS label, NULL AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM feedback_item fi JOIN feedback f ON f.id = fi.feedback",
            cm_join!("feedback", "f")
        ),
        scope: "f.course = ?1",
        fields: &["fi.name"],
        order_by: "fi.id",
        label_style: LabelStyle::Title,
        link: view("/mod/feedback/view.php"),
    },
    CategorySpec {
        key: "feedback_answers",
        label: "feedback answers",
        module: Some("feedback"),
        select: concat!(
            "SELECT f.id AS instance_id, fi.name AS label, fv.value AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM feedback_value fv JOIN feedback_item fi ON fi.id = fv.item JOIN feedback f ON f.id = fi.feedback",
            cm_join!("feedback", "f")
        ),
        scope: "f.course = ?1",
        fields: &["fv.value"],
        order_by: "fv.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/feedback/view.php"),
    },
    // Files and folders
    CategorySpec {
        key: "file_titles",
        label: "file titles",
        module: Some("resource"),
        select: module_select!("resource", "resource", "r", "r.name", "r.intro"),
        scope: "r.course = ?1",
        fields: &["r.name", "r.intro"],
        order_by: "r.id",
        label_style: LabelStyle::Title,
        link: view("/mod/resource/view.php"),
    },
    CategorySpec {
        key: "folder_names",
        label: "folder names",
        module: Some("folder"),
        select: module_select!("folder", "folder", "fo", "fo.name", "fo.intro"),
        scope: "fo.course = ?1",
        fields: &["fo.name", "fo.intro"],
        order_by: "fo.id",
        label_style: LabelStyle::Title,
        link: view("/mod/folder/view.php"),
    },
    // Lessons
    CategorySpec {
        key: "lesson_titles",
        label: "lesson titles",
        module: Some("lesson"),
        select: module_select!("lesson", "lesson", "l", "l.name", "NULL"),
        scope: "l.course = ?1",
        fields: &["l.name"],
        order_by: "l.id",
        label_style: LabelStyle::Title,
        link: view("/mod/lesson/view.php"),
    },
    CategorySpec {
        key: "lesson_pages",
        label: "lesson pages",
        module: Some("lesson"),
        select: concat!(
            "SELECT l.id AS instance_id, lp.title AS label, lp.contents AS detail, cm.id AS target_id, lp.id AS anchor_id, 0 AS hidden FROM lesson_pages lp JOIN lesson l ON l.id = lp.lessonid",
            cm_join!("lesson", "l")
        ),
        scope: "l.course = ?1",
        fields: &["lp.title", "lp.contents"],
        order_by: "lp.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::SubQuery { path: "/mod/lesson/view.php", param: "id", sub_param: "pageid" },
    },
    CategorySpec {
        key: "lesson_answers",
        label: "lesson answers",
        module: Some("lesson"),
        select: concat!(
            "SELECT l.id AS instance_id, lp.title AS label, la.answer AS detail, cm.id AS target_id, lp.id AS anchor_id, 0 AS hidden FROM lesson_answers la JOIN lesson_pages lp ON lp.id = la.pageid JOIN lesson l ON l.id = la.lessonid",
            cm_join!("lesson", "l")
        ),
        scope: "l.course = ?1",
        fields: &["la.answer"],
        order_by: "la.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::SubQuery { path: "/mod/lesson/view.php", param: "id", sub_param: "pageid" },
    },
    // Slideshows
    CategorySpec {
        key: "slideshow_names",
        label: "slideshow names",
        module: Some("slideshow"),
        select: module_select!("slideshow", "slideshow", "s", "s.name", "NULL"),
        scope: "s.course = ?1",
        fields: &["s.name"],
        order_by: "s.id",
        label_style: LabelStyle::Title,
        link: view("/mod/slideshow/view.php"),
    },
    CategorySpec {
        key: "slideshow_captions",
        label: "slideshow captions",
        module: Some("slideshow"),
        select: concat!(
            "SELECT s.id AS instance_id, sc.title AS label, sc.caption AS detail, cm.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM slideshow_captions sc JOIN slideshow s ON s.id = sc.slideshow",
            cm_join!("slideshow", "s")
        ),
        scope: "s.course = ?1",
        fields: &["sc.title", "sc.caption"],
        order_by: "sc.id",
        label_style: LabelStyle::TitleAndContent,
        link: view("/mod/slideshow/view.php"),
    },
    // Wikis
    CategorySpec {
        key: "wiki_titles",
        label: "wiki titles",
        module: Some("wiki"),
        select: module_select!("wiki", "wiki", "w", "w.name", "w.intro"),
        scope: "w.course = ?1",
        fields: &["w.name", "w.intro"],
        order_by: "w.id",
        label_style: LabelStyle::Title,
        link: view("/mod/wiki/view.php"),
    },
    CategorySpec {
        key: "wiki_pages",
        label: "wiki pages",
        module: Some("wiki"),
        select: "SELECT w.id AS instance_id, wp.title AS label, wp.cachedcontent AS detail, wp.id AS target_id, NULL AS anchor_id, 0 AS hidden FROM wiki_pages wp JOIN wiki_subwikis sw ON sw.id = wp.subwikiid JOIN wiki w ON w.id = sw.wikiid",
        scope: "w.course = ?1",
        fields: &["wp.title", "wp.cachedcontent"],
        order_by: "wp.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::Query { path: "/mod/wiki/view.php", param: "pageid" },
    },
    CategorySpec {
        key: "wiki_versions",
        label: "wiki versions",
        module: Some("wiki"),
        select: "SELECT w.id AS instance_id, wp.title AS label, wv.content AS detail, wp.id AS target_id, wv.id AS anchor_id, 0 AS hidden FROM wiki_versions wv JOIN wiki_pages wp ON wp.id = wv.pageid JOIN wiki_subwikis sw ON sw.id = wp.subwikiid JOIN wiki w ON w.id = sw.wikiid",
        scope: "w.course = ?1",
        fields: &["wv.content"],
        order_by: "wv.id",
        label_style: LabelStyle::TitleAndContent,
        link: LinkTemplate::SubQuery { path: "/mod/wiki/viewversion.php", param: "pageid", sub_param: "versionid" },
    },
];

/// Distinct host modules used by the built-in categories / 内置类别使用的模块
pub fn module_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for spec in CATEGORIES {
        if let Some(module) = spec.module {
            if !names.contains(&module) {
                names.push(module);
            }
        }
    }
    names
}

/// Register all built-in categories / 注册所有内置类别
///
/// Categories listed in `disabled_categories` are left out entirely.
pub fn register_all(
    registry: &mut ProviderRegistry,
    settings: &SearchSettings,
    provider_settings: &ProviderSettings,
    store: Arc<dyn CourseStore>,
    oracle: Arc<dyn InstallationOracle>,
) -> Result<(), SearchError> {
    for spec in CATEGORIES {
        if settings.is_disabled(spec.key) {
            tracing::info!("Search category disabled by configuration: {}", spec.key);
            continue;
        }
        let provider = TableProvider::new(*spec, store.clone(), oracle.clone(), provider_settings.clone());
        registry.register(spec.key, Arc::new(provider))?;
    }
    Ok(())
}

/// Build a registry with every enabled built-in category / 构建内置类别注册表
pub fn build_registry(
    settings: &SearchSettings,
    provider_settings: &ProviderSettings,
    store: Arc<dyn CourseStore>,
    oracle: Arc<dyn InstallationOracle>,
) -> Result<ProviderRegistry, SearchError> {
    let mut registry = ProviderRegistry::new().with_ignored_visibility(settings.ignore_global_visibility.iter().cloned());
    register_all(&mut registry, settings, provider_settings, store, oracle)?;
    Ok(registry)
}
