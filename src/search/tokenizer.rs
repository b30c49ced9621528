//! Term normalizer and text helpers / 搜索词规范化与文本工具
//!
//! - `normalize`: raw input -> `SearchTerm` (whitespace split + minimum length)
//! - `prepare_content`: markup stripping + soft-cap truncation for body text
//! - `like_pattern`: escaped `%...%` pattern for bound LIKE parameters

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::SearchError;
use super::schema::SearchTerm;

/// Ellipsis appended to truncated content / 截断后追加的省略号
pub const ELLIPSIS: &str = "...";

/// Escape character used in every generated LIKE clause / LIKE 转义字符
pub const LIKE_ESCAPE: char = '\\';

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// Turn raw user input into a search term / 将原始输入转换为搜索词
///
/// Splits on whitespace and drops tokens shorter than `min_len` characters.
/// Fails when the trimmed input is empty or nothing survives the filter.
pub fn normalize(raw: &str, min_len: usize) -> Result<SearchTerm, SearchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidInput("search text is empty".to_string()));
    }

    let tokens: Vec<String> = trimmed
        .split_whitespace()
        .filter(|t| t.chars().count() >= min_len)
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return Err(SearchError::InvalidInput(format!(
            "no search word has at least {} characters",
            min_len
        )));
    }

    Ok(SearchTerm::from_tokens(tokens))
}

/// Remove markup tags and decode common entities / 去除标签并解码常见实体
pub fn strip_tags(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    let decoded = decode_entities(&without_tags);
    SPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        // last, so "&amp;lt;" stays "&lt;"
        .replace("&amp;", "&")
}

/// Prepare body text for use as a label / 准备正文摘要
///
/// Strips markup, then cuts to exactly `soft_cap` characters followed by
/// `ELLIPSIS` when longer. Shorter text comes back unchanged apart from
/// tag stripping.
pub fn prepare_content(text: &str, soft_cap: usize) -> String {
    let plain = strip_tags(text);
    if plain.chars().count() <= soft_cap {
        return plain;
    }
    let mut cut: String = plain.chars().take(soft_cap).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Build a `%token%` LIKE pattern with wildcards escaped / 构建转义后的 LIKE 模式
pub fn like_pattern(token: &str) -> String {
    let mut pattern = String::with_capacity(token.len() + 2);
    pattern.push('%');
    for c in token.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let term = normalize("cat   dog", 3).unwrap();
        assert_eq!(term.tokens(), &["cat".to_string(), "dog".to_string()]);
        assert_eq!(term.phrase(), "cat dog");
    }

    #[test]
    fn test_normalize_drops_short_tokens() {
        let term = normalize("cat dg", 3).unwrap();
        assert_eq!(term.tokens(), &["cat".to_string()]);
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(normalize("", 3), Err(SearchError::InvalidInput(_))));
        assert!(matches!(normalize("   \t\n", 3), Err(SearchError::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_rejects_all_short() {
        for raw in ["a", "ab cd", " x  yz ", "to be"] {
            assert!(
                matches!(normalize(raw, 3), Err(SearchError::InvalidInput(_))),
                "expected InvalidInput for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_normalize_respects_min_len() {
        let term = normalize("ab cd", 2).unwrap();
        assert_eq!(term.tokens().len(), 2);
    }

    #[test]
    fn test_normalize_counts_characters() {
        // 2 chars, 6 bytes
        assert!(normalize("测试", 3).is_err());
        assert_eq!(normalize("测试中", 3).unwrap().phrase(), "测试中");
    }

    #[test]
    fn test_prepare_content_truncates() {
        let text = "a".repeat(200);
        let prepared = prepare_content(&text, 75);
        assert!(prepared.ends_with(ELLIPSIS));
        let body = prepared.trim_end_matches(ELLIPSIS);
        assert_eq!(body.chars().count(), 75);
        assert_eq!(prepared.chars().count(), 75 + ELLIPSIS.len());
    }

    #[test]
    fn test_prepare_content_short_text_unchanged() {
        let text = "The midterm covers chapters one through four only.";
        assert_eq!(text.chars().count(), 50);
        assert_eq!(prepare_content(text, 75), text);
    }

    #[test]
    fn test_prepare_content_strips_markup() {
        let html = "<p>Read <strong>chapter&nbsp;3</strong></p><p>before class</p>";
        assert_eq!(prepare_content(html, 75), "Read chapter 3 before class");
    }

    #[test]
    fn test_strip_tags_decodes_entities_once() {
        assert_eq!(strip_tags("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(strip_tags("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("midterm"), "%midterm%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }
}
