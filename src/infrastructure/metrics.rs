// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter};

pub const LINKS_DISCOVERED: &str = "vacancy_crawler_links_discovered_total";
pub const DRAFTS: &str = "vacancy_crawler_drafts_total";
pub const STAGE_FAILURES: &str = "vacancy_crawler_stage_failures_total";
pub const INSERTED: &str = "vacancy_crawler_inserted_total";

/// 注册指标描述
///
/// 爬取进程是一次性运行的，不安装导出器；指标写入当前安装的记录器（如果有）。
pub fn init_metrics() {
    describe_counter!(LINKS_DISCOVERED, "Links discovered on source entry pages");
    describe_counter!(DRAFTS, "Vacancy drafts produced per source");
    describe_counter!(STAGE_FAILURES, "Crawl stage failures by stage");
    describe_counter!(INSERTED, "Vacancies inserted into the store");
}

pub fn record_links_discovered(source: &str, count: usize) {
    counter!(LINKS_DISCOVERED, "source" => source.to_string()).increment(count as u64);
}

pub fn record_drafts(source: &str, count: usize) {
    counter!(DRAFTS, "source" => source.to_string()).increment(count as u64);
}

pub fn record_stage_failure(stage: &'static str) {
    counter!(STAGE_FAILURES, "stage" => stage).increment(1);
}

pub fn record_inserted(count: u64) {
    counter!(INSERTED).increment(count);
}
