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

use std::sync::Arc;
use tracing::{error, info};
use vacancy_crawler::config::settings::Settings;
use vacancy_crawler::domain::services::crawl_orchestrator::CrawlOrchestrator;
use vacancy_crawler::domain::services::source_registry::SourceRegistry;
use vacancy_crawler::engines::chromium_engine::ChromiumEngine;
use vacancy_crawler::engines::page_extractor::PageExtractor;
use vacancy_crawler::infrastructure::database::connection;
use vacancy_crawler::infrastructure::metrics;
use vacancy_crawler::infrastructure::repositories::vacancy_repo_impl::VacancyRepositoryImpl;
use vacancy_crawler::utils::telemetry;

/// 主函数
///
/// 执行一次完整的爬取后退出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.logging)?;
    metrics::init_metrics();
    info!(timeout_ms = settings.browser.timeout_ms, "Starting vacancy crawler");

    // 3. Connect to database and apply migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Build sources and engine
    let registry = SourceRegistry::from_config(settings.sources.clone())?;
    let engine = Arc::new(ChromiumEngine::new(settings.browser.clone()));
    let repository = Arc::new(VacancyRepositoryImpl::new(db));

    // 5. Run one crawl
    let orchestrator = CrawlOrchestrator::new(
        engine,
        repository,
        registry,
        PageExtractor::new(settings.browser.poll_interval()),
        settings.timeout(),
    );
    let summary = orchestrator.run().await?;

    for outcome in &summary.sources {
        info!(source = %outcome.source_id, drafts = outcome.drafts, "Source summary");
    }
    match &summary.insert_error {
        Some(e) => error!(batch = summary.batch_size, error = %e, "Crawl finished without storing vacancies"),
        None => info!(batch = summary.batch_size, inserted = summary.inserted, "Crawl finished"),
    }

    Ok(())
}
