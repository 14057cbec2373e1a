// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::BrowserError;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("无效参数: {0}")]
    InvalidParameter(String),
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        RepositoryError::DatabaseError(err.to_string())
    }
}

/// 爬取阶段错误类型
///
/// 每个变体携带用于日志的标签（站点标识或URL）以及底层原因。
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("unable to start browser engine: {0}")]
    Launch(#[source] BrowserError),

    #[error("unable to go to {target}: {cause}")]
    Navigation {
        target: String,
        #[source]
        cause: BrowserError,
    },

    #[error("unable to execute entry hook for {target}: {cause}")]
    Hook {
        target: String,
        #[source]
        cause: BrowserError,
    },

    #[error("unable to extract from {target}: {cause}")]
    Extraction {
        target: String,
        #[source]
        cause: BrowserError,
    },

    #[error("failed to get unparsed urls from store for {target}: {cause}")]
    Filter {
        target: String,
        #[source]
        cause: RepositoryError,
    },

    #[error("failed to insert {count} vacancies: {cause}")]
    Insert {
        count: usize,
        #[source]
        cause: RepositoryError,
    },
}

impl CrawlError {
    /// 失败阶段名称，用于日志和指标标签
    pub fn stage(&self) -> &'static str {
        match self {
            CrawlError::Launch(_) => "launch",
            CrawlError::Navigation { .. } => "navigation",
            CrawlError::Hook { .. } => "hook",
            CrawlError::Extraction { .. } => "extraction",
            CrawlError::Filter { .. } => "filter",
            CrawlError::Insert { .. } => "insert",
        }
    }
}
