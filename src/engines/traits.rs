// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 浏览器引擎错误类型
#[derive(Error, Debug)]
pub enum BrowserError {
    /// 浏览器启动或连接失败
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    /// 浏览器引擎尚未启动或已关闭
    #[error("Browser is not running")]
    Closed,
    /// 隔离上下文或页面创建失败
    #[error("Failed to create browser context: {0}")]
    Context(String),
    /// 页面导航失败
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    /// 单个操作超时
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    /// 查询表达式在超时时间内没有任何匹配
    #[error("No element matched query `{query}` within {timeout:?}")]
    NotFound { query: String, timeout: Duration },
    /// 元素属性读取失败
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
    /// 页面脚本执行失败
    #[error("Script failed: {0}")]
    Script(String),
}

/// 从匹配元素上读取的属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementProperty {
    /// 链接地址（`href`）
    Href,
    /// 文本内容（`textContent`）
    TextContent,
}

impl ElementProperty {
    /// 对应的 DOM 属性名
    pub fn dom_name(&self) -> &'static str {
        match self {
            ElementProperty::Href => "href",
            ElementProperty::TextContent => "textContent",
        }
    }
}

/// 浏览会话特质
///
/// 一个会话对应一个隔离的浏览器上下文和其中的单个页面，
/// Cookie、DOM 状态和导航历史都不会与其他会话共享。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// 导航到指定URL，导航失败时返回错误
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// 对当前页面执行查询表达式，按匹配顺序返回每个元素的属性值
    ///
    /// 没有匹配时返回空列表；属性不存在的元素对应 `None`。
    async fn evaluate_query(
        &self,
        query: &str,
        property: ElementProperty,
    ) -> Result<Vec<Option<String>>, BrowserError>;

    /// 点击查询表达式的第一个匹配元素
    async fn click(&self, query: &str) -> Result<(), BrowserError>;

    /// 在页面中执行脚本
    async fn evaluate_script(&self, script: &str) -> Result<(), BrowserError>;

    /// 会话创建时绑定的单操作超时
    fn timeout(&self) -> Duration;

    /// 关闭会话并释放隔离上下文
    async fn close(&self) -> Result<(), BrowserError>;
}

/// 浏览器引擎特质
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// 启动浏览器引擎，每次爬取只调用一次
    async fn launch(&self) -> Result<(), BrowserError>;

    /// 创建新的隔离会话，并绑定单操作超时
    async fn new_session(&self, timeout: Duration) -> Result<Box<dyn BrowserSession>, BrowserError>;

    /// 关闭浏览器引擎
    async fn close(&self) -> Result<(), BrowserError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
