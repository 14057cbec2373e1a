// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含职位和站点模型、仓库接口以及爬取服务
pub mod domain;

/// 引擎模块
///
/// 无头浏览器抽象及其实现
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、仓库实现和指标
pub mod infrastructure;

/// 工具模块
///
/// 提供错误类型和日志初始化
pub mod utils;
