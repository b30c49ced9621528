//! HTML rendering of a search report / 搜索报告的 HTML 渲染

use crate::config::SearchSettings;
use crate::search::{RenderStyle, ResultGroup, SearchReport};
use crate::utils::escape_html;

/// User-facing text / 界面文本
#[derive(Debug, Clone)]
pub struct Strings {
    pub plugin_name: String,
    pub heading: String,
    pub strapline: String,
    /// Raw HTML, shown above the results / 说明（HTML）
    pub explanation: String,
    /// Followed by the group label and a colon / 后接类别名称
    pub found: String,
    /// Appended to the group label / 追加在类别名称之后
    pub not_found: String,
    pub enter_keyword: String,
    pub min_chars: String,
    /// Prefix of a label hit, followed by the section number / 标签命中前缀
    pub label_in_section: String,
}

impl Strings {
    /// Text for the configured search settings / 按搜索设置生成文本
    pub fn new(settings: &SearchSettings) -> Self {
        let plugin_name = "SearchThisCourse".to_string();
        Self {
            heading: format!("{} results", plugin_name),
            plugin_name,
            strapline: "The deep-search results are as follows.".to_string(),
            explanation: "Note that if any results are found in hidden resources, they will \
                <span class=\"dimmed_text\">appear greyed out</span> and are only visible to \
                those users with course editing capability."
                .to_string(),
            found: "Found the following".to_string(),
            not_found: ": not found.".to_string(),
            enter_keyword: "Enter keyword/s:".to_string(),
            min_chars: format!("(minimum of {} characters)", settings.min_term_length),
            label_in_section: "Search term found in a label in section".to_string(),
        }
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::new(&SearchSettings::default())
    }
}

/// Render the report body / 渲染报告正文
///
/// Every group produces output: a list when it has hits, a "not found" line
/// otherwise (degraded groups included).
pub fn render_report(report: &SearchReport, strings: &Strings) -> String {
    let mut html = String::new();
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(&strings.heading)));
    html.push_str(&format!("<p>{}</p>\n", escape_html(&strings.strapline)));
    html.push_str(&format!("<p>{}</p>\n", strings.explanation));
    html.push_str("<hr>\n");

    for group in &report.groups {
        render_group(&mut html, group, strings);
    }
    html
}

fn render_group(html: &mut String, group: &ResultGroup, strings: &Strings) {
    let label = escape_html(&group.label);
    if group.is_empty() {
        html.push_str(&format!("<p>{}{}</p>\n", label, escape_html(&strings.not_found)));
        return;
    }

    html.push_str("<div class=\"generalbox\">\n");
    html.push_str(&format!("<p>{} {}:</p>\n<ol>\n", escape_html(&strings.found), label));
    for hit in &group.hits {
        let class = match hit.style {
            RenderStyle::Normal => "",
            RenderStyle::Dimmed => " class=\"dimmed_text\"",
        };
        html.push_str(&format!(
            "<li><a{} href=\"{}\">{}</a></li>\n",
            class,
            escape_html(&hit.link),
            escape_html(&hit.label)
        ));
    }
    html.push_str("</ol>\n</div>\n");
}

/// Course search form / 课程搜索表单
pub fn render_search_form(course_id: i64, search: &str, strings: &Strings) -> String {
    format!(
        "<form method=\"get\" action=\"/search\">\n\
         <input type=\"hidden\" name=\"id\" value=\"{}\">\n\
         <label for=\"searchthiscourse\">{}</label>\n\
         <input type=\"text\" id=\"searchthiscourse\" name=\"search\" value=\"{}\">\n\
         <input type=\"submit\" value=\"Search\">\n\
         <small>{}</small>\n\
         </form>\n",
        course_id,
        escape_html(&strings.enter_keyword),
        escape_html(search),
        escape_html(&strings.min_chars)
    )
}

/// Full results page / 完整结果页面
pub fn render_page(course_name: &str, report: &SearchReport, strings: &Strings) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}: {}</title>\n</head>\n<body>\n{}{}</body>\n</html>\n",
        escape_html(&strings.plugin_name),
        escape_html(course_name),
        render_search_form(report.scope.course_id, &report.phrase, strings),
        render_report(report, strings)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Permission, ResultHit, Scope};

    fn group(key: &str, label: &str, hits: Vec<ResultHit>) -> ResultGroup {
        ResultGroup {
            key: key.to_string(),
            label: label.to_string(),
            icon: None,
            hits,
            degraded: false,
        }
    }

    fn report() -> SearchReport {
        SearchReport {
            phrase: "midterm".to_string(),
            scope: Scope::new(2, Permission::Elevated),
            groups: vec![
                group(
                    "forum_titles",
                    "forum titles",
                    vec![ResultHit {
                        label: "Midterm <FAQ>".to_string(),
                        link: "/mod/forum/view.php?f=5".to_string(),
                        style: RenderStyle::Normal,
                    }],
                ),
                group(
                    "labels",
                    "labels",
                    vec![ResultHit {
                        label: "Search term found in a label in section 4".to_string(),
                        link: "/course/view.php?id=2#section-4".to_string(),
                        style: RenderStyle::Dimmed,
                    }],
                ),
                group("urls", "URLs", Vec::new()),
            ],
        }
    }

    #[test]
    fn test_render_groups_in_order() {
        let html = render_report(&report(), &Strings::default());
        assert!(html.contains("<h2>SearchThisCourse results</h2>"));

        let forums = html.find("Found the following forum titles:").unwrap();
        let labels = html.find("Found the following labels:").unwrap();
        let urls = html.find("<p>URLs: not found.</p>").unwrap();
        assert!(forums < labels && labels < urls);
    }

    #[test]
    fn test_render_escapes_and_dims() {
        let html = render_report(&report(), &Strings::default());
        assert!(html.contains("<li><a href=\"/mod/forum/view.php?f=5\">Midterm &lt;FAQ&gt;</a></li>"));
        assert!(html.contains(
            "<li><a class=\"dimmed_text\" href=\"/course/view.php?id=2#section-4\">Search term found in a label in section 4</a></li>"
        ));
    }

    #[test]
    fn test_degraded_group_renders_as_not_found() {
        let mut failed = group("pages", "page titles", Vec::new());
        failed.degraded = true;
        let report = SearchReport {
            phrase: "midterm".to_string(),
            scope: Scope::new(2, Permission::Standard),
            groups: vec![failed],
        };
        let html = render_report(&report, &Strings::default());
        assert!(html.contains("<p>page titles: not found.</p>"));
        assert!(!html.to_lowercase().contains("error"));
    }

    #[test]
    fn test_page_includes_form_with_phrase() {
        let html = render_page("Biology 101", &report(), &Strings::default());
        assert!(html.contains("<title>SearchThisCourse: Biology 101</title>"));
        assert!(html.contains("name=\"id\" value=\"2\""));
        assert!(html.contains("name=\"search\" value=\"midterm\""));
        assert!(html.contains("<small>(minimum of 3 characters)</small>"));
    }

    #[test]
    fn test_form_hint_follows_minimum_length() {
        let settings = SearchSettings {
            min_term_length: 4,
            ..Default::default()
        };
        let html = render_search_form(2, "", &Strings::new(&settings));
        assert!(html.contains("<small>(minimum of 4 characters)</small>"));
    }
}
