// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：职位草稿和站点定义
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：文本规范化、站点注册表、单站点爬取和爬取编排
///
/// 领域层只依赖浏览器引擎和仓库的抽象接口。
pub mod models;
pub mod repositories;
pub mod services;
