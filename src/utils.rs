/// Join the site root and an absolute path / 拼接站点根地址与路径
pub fn join_url(wwwroot: &str, path: &str) -> String {
    let root = wwwroot.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", root, path)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Course home page, where empty searches are sent / 课程主页地址
pub fn course_view_url(wwwroot: &str, course_id: i64) -> String {
    join_url(wwwroot, &format!("/course/view.php?id={}", course_id))
}

/// Escape text for HTML element and attribute content / HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
