// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{BrowserEngine, BrowserError, BrowserSession, ElementProperty};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 运行中的浏览器实例及其事件处理任务
struct RunningBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

type SharedBrowser = Arc<RwLock<Option<RunningBrowser>>>;

/// Chromium引擎
///
/// 基于chromiumoxide的无头浏览器引擎。每个会话使用独立的
/// 隐身浏览器上下文，会话之间不共享Cookie和导航状态。
pub struct ChromiumEngine {
    settings: BrowserSettings,
    state: SharedBrowser,
}

impl ChromiumEngine {
    /// 创建新的Chromium引擎，此时浏览器尚未启动
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            state: Arc::new(RwLock::new(None)),
        }
    }

    async fn start_browser(&self) -> Result<(Browser, chromiumoxide::Handler), BrowserError> {
        if let Some(url) = &self.settings.remote_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            return Browser::connect(url.as_str())
                .await
                .map_err(|e| BrowserError::Launch(format!("Failed to connect to remote Chrome: {}", e)));
        }

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.settings.timeout())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(BrowserError::Launch)?;
        Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self) -> Result<(), BrowserError> {
        let mut state = self.state.write().await;
        if state.is_some() {
            warn!("Browser already launched, reusing running instance");
            return Ok(());
        }

        let (browser, mut handler) = self.start_browser().await?;

        // The handler stream must be polled for the browser connection to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        *state = Some(RunningBrowser { browser, handler });
        info!("Chromium browser started");
        Ok(())
    }

    async fn new_session(&self, timeout: Duration) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let state = self.state.read().await;
        let running = state.as_ref().ok_or(BrowserError::Closed)?;

        let context_id = bounded(timeout, async {
            running
                .browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map(|response| response.result.browser_context_id)
                .map_err(|e| BrowserError::Context(e.to_string()))
        })
        .await?;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(BrowserError::Context)?;

        let page = bounded(timeout, async {
            running
                .browser
                .new_page(target)
                .await
                .map_err(|e| BrowserError::Context(e.to_string()))
        })
        .await?;

        debug!(context = ?context_id, "Created isolated browser context");

        Ok(Box::new(ChromiumSession {
            page,
            context_id,
            timeout,
            browser: self.state.clone(),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let running = self.state.write().await.take();
        let Some(mut running) = running else {
            return Ok(());
        };

        let result = running
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Launch(format!("Failed to close browser: {}", e)));
        if let Err(e) = running.browser.wait().await {
            warn!("Failed to wait for browser process exit: {}", e);
        }
        running.handler.abort();

        info!("Chromium browser stopped");
        result
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// Chromium会话，持有一个隔离上下文中的页面
pub struct ChromiumSession {
    page: Page,
    context_id: BrowserContextId,
    timeout: Duration,
    browser: SharedBrowser,
}

/// XPath查询脚本，按匹配顺序返回每个节点的属性值
fn query_script(query: &str, property: ElementProperty) -> String {
    let query = serde_json::Value::String(query.to_string());
    let property = serde_json::Value::String(property.dom_name().to_string());
    format!(
        r#"(() => {{
    const snapshot = document.evaluate({query}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const values = [];
    for (let i = 0; i < snapshot.snapshotLength; i++) {{
        const value = snapshot.snapshotItem(i)[{property}];
        values.push(value === undefined || value === null ? null : String(value));
    }}
    return values;
}})()"#
    )
}

fn click_script(query: &str) -> String {
    let query = serde_json::Value::String(query.to_string());
    format!(
        r#"(() => {{
    const node = document.evaluate({query}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
    if (!node) {{
        return false;
    }}
    node.click();
    return true;
}})()"#
    )
}

/// 以表达式方式求值，结果按值返回
fn expression(script: String) -> Result<EvaluateParams, String> {
    EvaluateParams::builder()
        .expression(script)
        .return_by_value(true)
        .build()
}

/// 为单个浏览器操作施加超时
async fn bounded<T, F>(timeout: Duration, operation: F) -> Result<T, BrowserError>
where
    F: Future<Output = Result<T, BrowserError>>,
{
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| BrowserError::Timeout(timeout))?
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        bounded(self.timeout, async {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
        })
        .await
    }

    async fn evaluate_query(
        &self,
        query: &str,
        property: ElementProperty,
    ) -> Result<Vec<Option<String>>, BrowserError> {
        bounded(self.timeout, async {
            let params = expression(query_script(query, property)).map_err(BrowserError::Evaluation)?;
            self.page
                .evaluate_expression(params)
                .await
                .map_err(|e| BrowserError::Evaluation(e.to_string()))?
                .into_value::<Vec<Option<String>>>()
                .map_err(|e| BrowserError::Evaluation(e.to_string()))
        })
        .await
    }

    async fn click(&self, query: &str) -> Result<(), BrowserError> {
        let clicked = bounded(self.timeout, async {
            let params = expression(click_script(query)).map_err(BrowserError::Script)?;
            self.page
                .evaluate_expression(params)
                .await
                .map_err(|e| BrowserError::Script(e.to_string()))?
                .into_value::<bool>()
                .map_err(|e| BrowserError::Script(e.to_string()))
        })
        .await?;

        if clicked {
            Ok(())
        } else {
            Err(BrowserError::NotFound {
                query: query.to_string(),
                timeout: self.timeout,
            })
        }
    }

    async fn evaluate_script(&self, script: &str) -> Result<(), BrowserError> {
        bounded(self.timeout, async {
            let params = expression(script.to_string()).map_err(BrowserError::Script)?;
            self.page
                .evaluate_expression(params)
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::Script(e.to_string()))
        })
        .await
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let state = self.browser.read().await;
        let Some(running) = state.as_ref() else {
            // Closing the browser already tore down every context
            return Ok(());
        };

        bounded(self.timeout, async {
            running
                .browser
                .execute(DisposeBrowserContextParams::new(self.context_id.clone()))
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::Context(e.to_string()))
        })
        .await
    }
}
