// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 职位草稿实体
///
/// 每个成功解析的详情页生成一条草稿。草稿只在一次爬取运行中存在，
/// 运行结束时要么被写入存储，要么被丢弃，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    /// 规范化后的标题
    pub header: String,
    /// 规范化后的正文
    pub content: String,
    /// 规范URL，同一站点内唯一，用作去重的自然键
    pub url: String,
    /// 来源站点标识
    pub source: String,
}

impl Vacancy {
    /// 创建一个新的职位草稿
    pub fn new(
        header: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            content: content.into(),
            url: url.into(),
            source: source.into(),
        }
    }
}
