// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本规范化模块
//!
//! 将页面上提取到的标题和正文片段清理为可直接入库的文本。
//! 所有函数都是纯函数，对任意输入都不会失败。

use once_cell::sync::Lazy;
use regex::Regex;

/// HTML换行标记以及字面量 `\n`、`\t` 转义序列
static HEADER_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|\\n|\\t").unwrap());

/// 正文允许保留的字符之外的所有字符
static CONTENT_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_äöÄÖ.:+/\-]").unwrap());

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text, " ").trim().to_string()
}

/// 规范化职位标题
///
/// 换行标记和转义序列替换为空格，连续空白压缩为单个空格，去掉首尾空白。
/// 替换重复进行，直到结果中不再出现换行标记。
///
/// # 示例
///
/// ```rust
/// use vacancy_crawler::domain::services::text_normalizer::normalize_header;
///
/// assert_eq!(normalize_header("Senior  Engineer<br/>Remote\\n"), "Senior Engineer Remote");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let mut header = strip_breaks(raw);
    // Replacing an escape inside a tag can expose a new break, e.g. `<br\t>` becomes `<br >`
    while HEADER_BREAKS.is_match(&header) {
        header = strip_breaks(&header);
    }
    header
}

fn strip_breaks(text: &str) -> String {
    collapse_whitespace(&HEADER_BREAKS.replace_all(text, " "))
}

/// 规范化职位正文
///
/// 缺失的片段按空字符串处理，所有片段以单个空格连接；
/// 随后把单词字符、`. : - + /` 以及 ä、ö 之外的字符替换为空格，
/// 最后压缩空白并去掉首尾空白。过滤必须先于空白压缩执行。
pub fn normalize_content<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let joined = fragments
        .into_iter()
        .map(|fragment| {
            fragment
                .map(|text| text.as_ref().to_owned())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ");

    let filtered = CONTENT_DISALLOWED.replace_all(&joined, " ");
    collapse_whitespace(&filtered)
}
