// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 职位（vacancy）：一次爬取中提取并规范化的职位草稿
/// - 站点（source）：目标网站的导航与查询规则
pub mod source;
pub mod vacancy;
