// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::page_extractor::PageExtractor;
use crate::engines::traits::{BrowserError, BrowserSession};
use serde::{Deserialize, Serialize};
use url::Url;

/// 职位来源站点
///
/// 进程启动时定义、运行期间不可变的站点配置，
/// 描述入口页面、三个查询表达式以及可选的URL规范化和入口钩子。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// 站点标识，在注册表内唯一
    pub id: String,
    /// 入口URL
    pub url: String,
    /// 职位链接列表查询
    pub link_query: String,
    /// 标题查询
    pub header_query: String,
    /// 正文片段列表查询
    pub content_query: String,
    /// URL规范化方式
    #[serde(default)]
    pub canonicalizer: UrlCanonicalizer,
    /// 入口页面加载后执行的钩子
    #[serde(default)]
    pub entry_hook: EntryHook,
}

impl Source {
    /// 创建不带规范化和入口钩子的站点配置
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        link_query: impl Into<String>,
        header_query: impl Into<String>,
        content_query: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            link_query: link_query.into(),
            header_query: header_query.into(),
            content_query: content_query.into(),
            canonicalizer: UrlCanonicalizer::Identity,
            entry_hook: EntryHook::None,
        }
    }

    pub fn with_canonicalizer(mut self, canonicalizer: UrlCanonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    pub fn with_entry_hook(mut self, entry_hook: EntryHook) -> Self {
        self.entry_hook = entry_hook;
        self
    }
}

/// URL规范化方式
///
/// 纯函数式的字符串变换。无法解析的URL原样返回。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UrlCanonicalizer {
    /// 不做变换
    #[default]
    Identity,
    /// 去掉整个查询字符串和片段
    StripQuery,
    /// 只去掉片段
    StripFragment,
    /// 去掉指定的查询参数（例如跟踪参数）
    DropParams { names: Vec<String> },
    /// 只保留指定的查询参数
    KeepParams { names: Vec<String> },
}

impl UrlCanonicalizer {
    /// 对单个URL执行规范化
    pub fn canonicalize(&self, raw: &str) -> String {
        if matches!(self, UrlCanonicalizer::Identity) {
            return raw.to_string();
        }

        let Ok(mut url) = Url::parse(raw) else {
            return raw.to_string();
        };

        match self {
            UrlCanonicalizer::Identity => {}
            UrlCanonicalizer::StripQuery => {
                url.set_query(None);
                url.set_fragment(None);
            }
            UrlCanonicalizer::StripFragment => url.set_fragment(None),
            UrlCanonicalizer::DropParams { names } => {
                retain_params(&mut url, |key| !names.iter().any(|name| name == key))
            }
            UrlCanonicalizer::KeepParams { names } => {
                retain_params(&mut url, |key| names.iter().any(|name| name == key))
            }
        }

        url.to_string()
    }
}

fn retain_params(url: &mut Url, keep: impl Fn(&str) -> bool) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| keep(key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

/// 入口页面钩子
///
/// 在导航到入口页面之后、提取链接之前对会话执行一次，
/// 例如关闭Cookie提示或等待异步加载的列表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryHook {
    /// 无钩子
    #[default]
    None,
    /// 等待并点击第一个匹配元素
    Click { query: String },
    /// 在页面中执行脚本
    Evaluate { script: String },
    /// 等待查询出现匹配
    WaitFor { query: String },
}

impl EntryHook {
    /// 对会话执行钩子
    pub async fn run(
        &self,
        session: &dyn BrowserSession,
        extractor: &PageExtractor,
    ) -> Result<(), BrowserError> {
        match self {
            EntryHook::None => Ok(()),
            EntryHook::Click { query } => {
                extractor.wait_for(session, query).await?;
                session.click(query).await
            }
            EntryHook::Evaluate { script } => session.evaluate_script(script).await,
            EntryHook::WaitFor { query } => extractor.wait_for(session, query).await.map(|_| ()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EntryHook::None)
    }
}
