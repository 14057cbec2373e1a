// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取编排（crawl_orchestrator）：启动引擎、并发运行所有站点并写入结果
/// - 单站点爬取（source_crawler）：按阶段处理一个站点，失败只影响该站点或该链接
/// - 站点注册表（source_registry）：静态站点列表
/// - 文本规范化（text_normalizer）：标题和正文的清洗
pub mod crawl_orchestrator;
pub mod source_crawler;
pub mod source_registry;
pub mod text_normalizer;
