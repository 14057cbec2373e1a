// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    capture_logs, orchestrator, source, FakeEngine, FakePage, FakeWeb, RecordingRepository,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use vacancy_crawler::domain::models::source::{EntryHook, UrlCanonicalizer};
use vacancy_crawler::domain::models::vacancy::Vacancy;
use vacancy_crawler::utils::errors::CrawlError;

const DUUNITORI: &str = "https://duunitori.example/tyopaikat";
const OIKOTIE: &str = "https://oikotie.example/tyopaikat";

fn job(site: &str, n: u32) -> String {
    format!("https://{}.example/job/{}", site, n)
}

/// 测试端到端爬取
///
/// 所有URL都未知时，一次运行只调用一次写入，
/// 并且每个成功处理的链接恰好对应一条带正确站点标识的职位。
#[tokio::test]
async fn test_end_to_end_single_insert_with_source_tagging() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1), job("duunitori", 2)]))
        .page(&job("duunitori", 1), FakePage::detail("Rust  Developer<br/>Helsinki", &[Some("Pay: 50-60k!"), None, Some("Apply now.")]))
        .page(&job("duunitori", 2), FakePage::detail("Go Developer\\n", &[Some("Remote")]))
        .page(OIKOTIE, FakePage::listing(&[job("oikotie", 1)]))
        .page(&job("oikotie", 1), FakePage::detail("\tData Engineer ", &[Some("Tampere; hybrid")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(
        engine.clone(),
        repository.clone(),
        vec![source("duunitori", DUUNITORI), source("oikotie", OIKOTIE)],
    )
    .run()
    .await
    .unwrap();

    let inserts = repository.insert_calls();
    assert_eq!(inserts.len(), 1);
    assert_eq!(
        inserts[0],
        vec![
            Vacancy::new("Rust Developer Helsinki", "Pay: 50-60k Apply now.", job("duunitori", 1), "duunitori"),
            Vacancy::new("Go Developer", "Remote", job("duunitori", 2), "duunitori"),
            Vacancy::new("Data Engineer", "Tampere hybrid", job("oikotie", 1), "oikotie"),
        ]
    );
    assert_eq!(summary.batch_size, 3);
    assert_eq!(summary.inserted, 3);
    assert_eq!(engine.sessions_opened.load(Ordering::SeqCst), 2);
    assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 2);
    assert_eq!(engine.close_count(), 1);
}

/// 测试入口导航失败的站点不影响其他站点
#[tokio::test]
async fn test_entry_navigation_failure_is_isolated() {
    let web = FakeWeb::new()
        .page(OIKOTIE, FakePage::listing(&[job("oikotie", 1)]))
        .page(&job("oikotie", 1), FakePage::detail("Data Engineer", &[Some("Tampere")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(
        engine.clone(),
        repository.clone(),
        vec![source("duunitori", DUUNITORI), source("oikotie", OIKOTIE)],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.sources[0].source_id, "duunitori");
    assert_eq!(summary.sources[0].drafts, 0);
    assert_eq!(summary.sources[1].drafts, 1);

    let filtered: Vec<String> = repository.filter_calls().into_iter().map(|(s, _)| s).collect();
    assert_eq!(filtered, vec!["oikotie"]);
    assert_eq!(repository.insert_calls()[0][0].source, "oikotie");
}

/// 测试单个链接失败只跳过该链接
///
/// 三个链接中一个详情页没有标题，站点仍然产出另外两条职位，
/// 并且只为失败的链接记录一条错误日志。
#[tokio::test]
async fn test_failing_link_is_skipped() {
    let (logs, _guard) = capture_logs();
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1), job("duunitori", 2), job("duunitori", 3)]))
        .page(&job("duunitori", 1), FakePage::detail("First", &[Some("a")]))
        .page(&job("duunitori", 2), FakePage::default())
        .page(&job("duunitori", 3), FakePage::detail("Third", &[Some("c")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert_eq!(summary.sources[0].drafts, 2);
    let urls: Vec<String> = repository.insert_calls()[0].iter().map(|v| v.url.clone()).collect();
    assert_eq!(urls, vec![job("duunitori", 1), job("duunitori", 3)]);

    let errors = logs.lines_at("ERROR");
    assert_eq!(errors.len(), 1, "unexpected error logs: {:?}", errors);
    assert!(errors[0].contains(&job("duunitori", 2)));
    assert!(!errors[0].contains(&job("duunitori", 1)));
    assert!(!errors[0].contains(&job("duunitori", 3)));
}

/// 测试详情页导航失败时保留之前的结果
#[tokio::test]
async fn test_link_navigation_failure_keeps_partial_results() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1), job("duunitori", 404)]))
        .page(&job("duunitori", 1), FakePage::detail("First", &[Some("a")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert_eq!(summary.sources[0].drafts, 1);
    assert_eq!(engine.visits(), vec![DUUNITORI.to_string(), job("duunitori", 1), job("duunitori", 404)]);
}

/// 测试规范化后没有链接时不访问存储
#[tokio::test]
async fn test_no_links_skip_store_lookup() {
    let web = FakeWeb::new().page(DUUNITORI, FakePage::listing(&["", " "]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert!(repository.filter_calls().is_empty());
    assert!(repository.insert_calls().is_empty());
    assert_eq!(summary.batch_size, 0);
}

/// 测试链接查询超时没有匹配时站点结果为空
#[tokio::test]
async fn test_listing_without_matches_yields_empty() {
    let web = FakeWeb::new().page(DUUNITORI, FakePage::default());
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert_eq!(summary.sources[0].drafts, 0);
    assert!(repository.filter_calls().is_empty());
}

/// 测试已记录的URL不会被再次访问
#[tokio::test]
async fn test_known_urls_are_not_revisited() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1), job("duunitori", 2)]))
        .page(&job("duunitori", 1), FakePage::detail("Old", &[Some("a")]))
        .page(&job("duunitori", 2), FakePage::detail("New", &[Some("b")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new().with_known("duunitori", &job("duunitori", 1)));

    orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert!(!engine.visits().contains(&job("duunitori", 1)));
    assert_eq!(repository.insert_calls()[0].len(), 1);
    assert_eq!(repository.insert_calls()[0][0].header, "New");
}

/// 测试同一次运行中重复发现的链接只处理一次
///
/// 列表页两次返回同一URL（规范化后相同），详情页只访问一次。
#[tokio::test]
async fn test_duplicate_links_are_processed_once() {
    let web = FakeWeb::new()
        .page(
            DUUNITORI,
            FakePage::listing(&[
                format!("{}?ref=top", job("duunitori", 1)),
                job("duunitori", 1),
                format!("{}?ref=list", job("duunitori", 1)),
            ]),
        )
        .page(&job("duunitori", 1), FakePage::detail("Only once", &[Some("a")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());
    let duunitori = source("duunitori", DUUNITORI).with_canonicalizer(UrlCanonicalizer::StripQuery);

    orchestrator(engine.clone(), repository.clone(), vec![duunitori])
        .run()
        .await
        .unwrap();

    assert_eq!(repository.filter_calls()[0].1, vec![job("duunitori", 1)]);
    assert_eq!(repository.insert_calls()[0].len(), 1);
    let detail_visits = engine.visits().iter().filter(|u| **u == job("duunitori", 1)).count();
    assert_eq!(detail_visits, 1);
}

/// 测试存储过滤失败只影响对应站点
#[tokio::test]
async fn test_filter_failure_is_isolated() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1)]))
        .page(&job("duunitori", 1), FakePage::detail("A", &[Some("a")]))
        .page(OIKOTIE, FakePage::listing(&[job("oikotie", 1)]))
        .page(&job("oikotie", 1), FakePage::detail("B", &[Some("b")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new().failing_filter_for("duunitori"));

    let summary = orchestrator(
        engine.clone(),
        repository.clone(),
        vec![source("duunitori", DUUNITORI), source("oikotie", OIKOTIE)],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.sources[0].drafts, 0);
    assert_eq!(summary.sources[1].drafts, 1);
    assert!(!engine.visits().contains(&job("duunitori", 1)));
}

/// 测试写入失败时仍然关闭浏览器引擎
#[tokio::test]
async fn test_insert_failure_still_shuts_down_engine() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1)]))
        .page(&job("duunitori", 1), FakePage::detail("A", &[Some("a")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new().failing_insert());

    let summary = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await
        .unwrap();

    assert_eq!(repository.insert_calls().len(), 1);
    assert!(summary.insert_error.unwrap().contains("disk full"));
    assert_eq!(summary.inserted, 0);
    assert_eq!(engine.close_count(), 1);
}

/// 测试浏览器启动失败
#[tokio::test]
async fn test_launch_failure_closes_engine_and_returns_error() {
    let engine = Arc::new(FakeEngine::new(FakeWeb::new()).failing_launch());
    let repository = Arc::new(RecordingRepository::new());

    let result = orchestrator(engine.clone(), repository.clone(), vec![source("duunitori", DUUNITORI)])
        .run()
        .await;

    assert!(matches!(result, Err(CrawlError::Launch(_))));
    assert_eq!(engine.close_count(), 1);
    assert_eq!(engine.sessions_opened.load(Ordering::SeqCst), 0);
}

/// 测试入口钩子在提取链接之前执行
#[tokio::test]
async fn test_click_hook_runs_before_discovery() {
    const CONSENT: &str = "//button[@id='consent']";
    let web = FakeWeb::new()
        .page(
            DUUNITORI,
            FakePage::listing(&[job("duunitori", 1)])
                .with_matches(CONSENT, vec![Some("Hyväksy".to_string())]),
        )
        .page(&job("duunitori", 1), FakePage::detail("A", &[Some("a")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());
    let duunitori = source("duunitori", DUUNITORI).with_entry_hook(EntryHook::Click {
        query: CONSENT.to_string(),
    });

    let summary = orchestrator(engine.clone(), repository.clone(), vec![duunitori])
        .run()
        .await
        .unwrap();

    assert_eq!(engine.clicks.lock().unwrap().clone(), vec![CONSENT.to_string()]);
    assert_eq!(summary.sources[0].drafts, 1);
}

/// 测试入口钩子失败只影响对应站点
#[tokio::test]
async fn test_hook_failure_is_isolated() {
    let web = FakeWeb::new()
        .page(DUUNITORI, FakePage::listing(&[job("duunitori", 1)]))
        .page(&job("duunitori", 1), FakePage::detail("A", &[Some("a")]))
        .page(OIKOTIE, FakePage::listing(&[job("oikotie", 1)]))
        .page(&job("oikotie", 1), FakePage::detail("B", &[Some("b")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());
    let duunitori = source("duunitori", DUUNITORI).with_entry_hook(EntryHook::Evaluate {
        script: "throw new Error('consent dialog changed')".to_string(),
    });

    let summary = orchestrator(
        engine.clone(),
        repository.clone(),
        vec![duunitori, source("oikotie", OIKOTIE)],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.sources[0].drafts, 0);
    assert_eq!(summary.sources[1].drafts, 1);
    assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 2);
}

/// 测试爬取任务 panic 时按空结果处理
#[tokio::test]
async fn test_panicking_source_counts_as_empty() {
    let web = FakeWeb::new()
        .panicking(DUUNITORI)
        .page(OIKOTIE, FakePage::listing(&[job("oikotie", 1)]))
        .page(&job("oikotie", 1), FakePage::detail("B", &[Some("b")]));
    let engine = Arc::new(FakeEngine::new(web));
    let repository = Arc::new(RecordingRepository::new());

    let summary = orchestrator(
        engine.clone(),
        repository.clone(),
        vec![source("duunitori", DUUNITORI), source("oikotie", OIKOTIE)],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.sources[0].drafts, 0);
    assert_eq!(summary.sources[1].drafts, 1);
    assert_eq!(repository.insert_calls().len(), 1);
    assert_eq!(engine.sessions_opened.load(Ordering::SeqCst), 2);
    assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 2);
    assert_eq!(engine.close_count(), 1);
}
