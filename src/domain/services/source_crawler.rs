// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::Source;
use crate::domain::models::vacancy::Vacancy;
use crate::domain::repositories::vacancy_repository::VacancyRepository;
use crate::domain::services::text_normalizer::{normalize_content, normalize_header};
use crate::engines::page_extractor::PageExtractor;
use crate::engines::traits::{BrowserEngine, BrowserSession};
use crate::infrastructure::metrics;
use crate::utils::errors::CrawlError;
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 单站点爬取器
///
/// 按固定顺序驱动一个站点的完整流程：导航入口页、执行入口钩子、
/// 发现链接、规范化、按存储过滤已知URL、逐个提取详情页。
/// 入口阶段的失败使该站点返回空结果；单个链接的失败只跳过该链接。
pub struct SourceCrawler {
    engine: Arc<dyn BrowserEngine>,
    repository: Arc<dyn VacancyRepository>,
    extractor: PageExtractor,
    timeout: Duration,
}

impl SourceCrawler {
    /// 创建单站点爬取器
    ///
    /// # 参数
    ///
    /// * `engine` - 共享的浏览器引擎
    /// * `repository` - 职位仓库
    /// * `extractor` - 页面提取器
    /// * `timeout` - 每个等待或导航操作的超时
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        repository: Arc<dyn VacancyRepository>,
        extractor: PageExtractor,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            repository,
            extractor,
            timeout,
        }
    }

    /// 爬取一个站点
    ///
    /// 不会返回错误：所有阶段失败都会被记录，并转换为空结果或部分结果。
    pub async fn crawl(&self, source: &Source) -> Vec<Vacancy> {
        info!(source = %source.id, url = %source.url, "Crawling source");

        let session = match self.engine.new_session(self.timeout).await {
            Ok(session) => session,
            Err(cause) => {
                report(&CrawlError::Navigation {
                    target: source.id.clone(),
                    cause,
                });
                return Vec::new();
            }
        };

        let result = AssertUnwindSafe(self.crawl_with_session(session.as_ref(), source))
            .catch_unwind()
            .await;

        if let Err(e) = session.close().await {
            warn!(source = %source.id, error = %e, "Failed to close browser context");
        }

        let result = match result {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        match result {
            Ok(vacancies) => {
                info!(source = %source.id, count = vacancies.len(), "Source crawl finished");
                metrics::record_drafts(&source.id, vacancies.len());
                vacancies
            }
            Err(e) => {
                report(&e);
                Vec::new()
            }
        }
    }

    async fn crawl_with_session(
        &self,
        session: &dyn BrowserSession,
        source: &Source,
    ) -> Result<Vec<Vacancy>, CrawlError> {
        session
            .goto(&source.url)
            .await
            .map_err(|cause| CrawlError::Navigation {
                target: source.id.clone(),
                cause,
            })?;

        if !source.entry_hook.is_none() {
            debug!(source = %source.id, hook = ?source.entry_hook, "Running entry hook");
        }
        source
            .entry_hook
            .run(session, &self.extractor)
            .await
            .map_err(|cause| CrawlError::Hook {
                target: source.id.clone(),
                cause,
            })?;

        let discovered = self
            .extractor
            .extract_links(session, &source.link_query)
            .await
            .map_err(|cause| CrawlError::Extraction {
                target: source.id.clone(),
                cause,
            })?;
        metrics::record_links_discovered(&source.id, discovered.len());

        let links = canonical_links(source, discovered);
        if links.is_empty() {
            info!(source = %source.id, "No links discovered");
            return Ok(Vec::new());
        }

        let unparsed = self
            .repository
            .get_unparsed_urls(&source.id, &links)
            .await
            .map_err(|cause| CrawlError::Filter {
                target: source.id.clone(),
                cause,
            })?;
        info!(
            source = %source.id,
            discovered = links.len(),
            unparsed = unparsed.len(),
            "Filtered known vacancy urls"
        );

        let mut vacancies = Vec::with_capacity(unparsed.len());
        for link in unparsed {
            match self.parse_vacancy(session, source, &link).await {
                Ok(vacancy) => vacancies.push(vacancy),
                Err(e) => report(&e),
            }
        }

        Ok(vacancies)
    }

    /// 导航到详情页并提取一条职位草稿
    async fn parse_vacancy(
        &self,
        session: &dyn BrowserSession,
        source: &Source,
        link: &str,
    ) -> Result<Vacancy, CrawlError> {
        session
            .goto(link)
            .await
            .map_err(|cause| CrawlError::Navigation {
                target: link.to_string(),
                cause,
            })?;

        let extraction = |cause| CrawlError::Extraction {
            target: link.to_string(),
            cause,
        };
        let header = self
            .extractor
            .extract_header(session, &source.header_query)
            .await
            .map_err(extraction)?;
        let fragments = self
            .extractor
            .extract_content_fragments(session, &source.content_query)
            .await
            .map_err(extraction)?;

        debug!(url = %link, "Parsed vacancy");
        Ok(Vacancy::new(
            normalize_header(&header),
            normalize_content(fragments),
            link,
            source.id.as_str(),
        ))
    }
}

/// 规范化并去重链接，保留首次出现的顺序，丢弃空链接
fn canonical_links(source: &Source, discovered: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    discovered
        .into_iter()
        .map(|link| source.canonicalizer.canonicalize(&link))
        .filter(|link| !link.trim().is_empty())
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

fn report(err: &CrawlError) {
    metrics::record_stage_failure(err.stage());
    error!(stage = err.stage(), error = %err, "Crawl stage failed");
}
