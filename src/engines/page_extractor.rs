// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{BrowserError, BrowserSession, ElementProperty};
use std::time::Duration;
use tokio::time::Instant;

/// 默认的查询轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 页面提取器
///
/// 在已定位到目标页面的会话上执行站点查询表达式，
/// 提取链接列表、标题字符串或正文片段列表。
/// 除了隐式等待之外不会修改页面状态。
#[derive(Debug, Clone, Copy)]
pub struct PageExtractor {
    poll_interval: Duration,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl PageExtractor {
    /// 创建页面提取器
    ///
    /// # 参数
    ///
    /// * `poll_interval` - 等待匹配时两次查询之间的间隔
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// 提取所有匹配元素的链接地址
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 按匹配顺序排列的链接
    /// * `Err(BrowserError::NotFound)` - 超时前没有任何匹配
    /// * `Err(BrowserError::Evaluation)` - 任一匹配元素没有链接地址
    pub async fn extract_links(
        &self,
        session: &dyn BrowserSession,
        query: &str,
    ) -> Result<Vec<String>, BrowserError> {
        let values = self
            .wait_for_matches(session, query, ElementProperty::Href)
            .await?;

        values
            .into_iter()
            .enumerate()
            .map(|(index, href)| {
                href.ok_or_else(|| {
                    BrowserError::Evaluation(format!(
                        "match #{} of `{}` has no href",
                        index, query
                    ))
                })
            })
            .collect()
    }

    /// 提取第一个匹配元素的文本内容
    pub async fn extract_header(
        &self,
        session: &dyn BrowserSession,
        query: &str,
    ) -> Result<String, BrowserError> {
        let values = self
            .wait_for_matches(session, query, ElementProperty::TextContent)
            .await?;

        values.into_iter().next().flatten().ok_or_else(|| {
            BrowserError::Evaluation(format!("first match of `{}` has no text content", query))
        })
    }

    /// 提取所有匹配元素的文本内容
    ///
    /// 没有文本的匹配元素返回 `None`，不会导致整个操作失败。
    pub async fn extract_content_fragments(
        &self,
        session: &dyn BrowserSession,
        query: &str,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        self.wait_for_matches(session, query, ElementProperty::TextContent)
            .await
    }

    /// 等待查询表达式至少出现一个匹配，返回匹配数量
    pub async fn wait_for(
        &self,
        session: &dyn BrowserSession,
        query: &str,
    ) -> Result<usize, BrowserError> {
        self.wait_for_matches(session, query, ElementProperty::TextContent)
            .await
            .map(|values| values.len())
    }

    /// 轮询查询表达式，直到至少有一个匹配或会话超时
    async fn wait_for_matches(
        &self,
        session: &dyn BrowserSession,
        query: &str,
        property: ElementProperty,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        let timeout = session.timeout();
        let deadline = Instant::now() + timeout;

        loop {
            let values = session.evaluate_query(query, property).await?;
            if !values.is_empty() {
                return Ok(values);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::NotFound {
                    query: query.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
