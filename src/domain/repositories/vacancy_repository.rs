// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vacancy::Vacancy;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 职位仓库特质
///
/// 定义爬取流程对持久化存储的全部要求。两个操作彼此独立，
/// 不存在跨站点的事务。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacancyRepository: Send + Sync {
    /// 返回给定URL中该站点尚未记录的子集，保持输入顺序
    async fn get_unparsed_urls(
        &self,
        source: &str,
        urls: &[String],
    ) -> Result<Vec<String>, RepositoryError>;

    /// 批量写入职位，返回写入的行数
    async fn insert(&self, vacancies: &[Vacancy]) -> Result<u64, RepositoryError>;
}
