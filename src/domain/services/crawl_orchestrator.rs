// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vacancy::Vacancy;
use crate::domain::repositories::vacancy_repository::VacancyRepository;
use crate::domain::services::source_crawler::SourceCrawler;
use crate::domain::services::source_registry::SourceRegistry;
use crate::engines::page_extractor::PageExtractor;
use crate::engines::traits::BrowserEngine;
use crate::infrastructure::metrics;
use crate::utils::errors::CrawlError;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// 单个站点的爬取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub source_id: String,
    pub drafts: usize,
}

/// 一次爬取运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// 按注册表顺序排列的站点结果
    pub sources: Vec<SourceOutcome>,
    /// 提交给存储的职位数量
    pub batch_size: usize,
    /// 存储报告的写入行数
    pub inserted: u64,
    /// 写入失败时的错误信息
    pub insert_error: Option<String>,
}

/// 爬取编排器
///
/// 启动一次浏览器引擎，为每个站点并发运行一个爬取任务，
/// 汇总所有职位后只调用一次存储写入，最后无论结果如何都关闭引擎。
pub struct CrawlOrchestrator {
    engine: Arc<dyn BrowserEngine>,
    repository: Arc<dyn VacancyRepository>,
    registry: SourceRegistry,
    extractor: PageExtractor,
    timeout: Duration,
}

impl CrawlOrchestrator {
    /// 创建爬取编排器
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        repository: Arc<dyn VacancyRepository>,
        registry: SourceRegistry,
        extractor: PageExtractor,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            repository,
            registry,
            extractor,
            timeout,
        }
    }

    /// 执行一次完整的爬取
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlSummary)` - 爬取完成，写入失败也记录在汇总中
    /// * `Err(CrawlError::Launch)` - 浏览器引擎无法启动
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        info!(
            engine = self.engine.name(),
            sources = self.registry.len(),
            "Starting crawl"
        );

        if let Err(cause) = self.engine.launch().await {
            let err = CrawlError::Launch(cause);
            metrics::record_stage_failure(err.stage());
            error!(error = %err, "Browser engine failed to start");
            self.shutdown().await;
            return Err(err);
        }

        let outcome = AssertUnwindSafe(self.crawl_and_store()).catch_unwind().await;
        self.shutdown().await;

        match outcome {
            Ok(summary) => Ok(summary),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn crawl_and_store(&self) -> CrawlSummary {
        let per_source = self.crawl_sources().await;

        let mut summary = CrawlSummary::default();
        let mut batch: Vec<Vacancy> = Vec::new();
        for (source, vacancies) in self.registry.iter().zip(per_source) {
            summary.sources.push(SourceOutcome {
                source_id: source.id.clone(),
                drafts: vacancies.len(),
            });
            batch.extend(vacancies);
        }
        summary.batch_size = batch.len();

        if batch.is_empty() {
            info!("No new vacancies found");
            return summary;
        }

        match self.repository.insert(&batch).await {
            Ok(inserted) => {
                metrics::record_inserted(inserted);
                info!(inserted, "Vacancies stored");
                summary.inserted = inserted;
            }
            Err(cause) => {
                let err = CrawlError::Insert {
                    count: batch.len(),
                    cause,
                };
                metrics::record_stage_failure(err.stage());
                error!(error = %err, "Failed to insert vacancies to database");
                summary.insert_error = Some(err.to_string());
            }
        }

        summary
    }

    /// 并发运行所有站点，按注册表顺序返回每个站点的职位
    async fn crawl_sources(&self) -> Vec<Vec<Vacancy>> {
        let crawler = Arc::new(SourceCrawler::new(
            self.engine.clone(),
            self.repository.clone(),
            self.extractor,
            self.timeout,
        ));

        let mut tasks = JoinSet::new();
        for (index, source) in self.registry.iter().enumerate() {
            let crawler = crawler.clone();
            let source = source.clone();
            tasks.spawn(async move { (index, crawler.crawl(&source).await) });
        }

        let mut results: Vec<Vec<Vacancy>> = vec![Vec::new(); self.registry.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, vacancies)) => results[index] = vacancies,
                Err(e) => error!(error = %e, "Source crawl task aborted"),
            }
        }
        results
    }

    async fn shutdown(&self) {
        match self.engine.close().await {
            Ok(()) => info!("Browser engine stopped"),
            Err(e) => warn!(error = %e, "Failed to stop browser engine"),
        }
    }
}
