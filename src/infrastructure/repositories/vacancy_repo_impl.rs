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

use crate::domain::models::vacancy::Vacancy;
use crate::domain::repositories::vacancy_repository::VacancyRepository;
use crate::infrastructure::database::entities::vacancy as vacancy_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 单次 `IN` 查询携带的最大URL数量
const LOOKUP_CHUNK_SIZE: usize = 500;

/// 职位仓库实现
pub struct VacancyRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl VacancyRepositoryImpl {
    /// 创建新的职位仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VacancyRepository for VacancyRepositoryImpl {
    async fn get_unparsed_urls(
        &self,
        source: &str,
        urls: &[String],
    ) -> Result<Vec<String>, RepositoryError> {
        if source.is_empty() {
            return Err(RepositoryError::InvalidParameter(
                "source must not be empty".to_string(),
            ));
        }

        let mut known = HashSet::new();
        for chunk in urls.chunks(LOOKUP_CHUNK_SIZE) {
            let stored: Vec<String> = vacancy_entity::Entity::find()
                .select_only()
                .column(vacancy_entity::Column::Url)
                .filter(vacancy_entity::Column::Source.eq(source))
                .filter(vacancy_entity::Column::Url.is_in(chunk.iter().cloned()))
                .into_tuple()
                .all(self.db.as_ref())
                .await?;
            known.extend(stored);
        }

        debug!(source, checked = urls.len(), known = known.len(), "Looked up stored urls");

        Ok(urls
            .iter()
            .filter(|url| !known.contains(*url))
            .cloned()
            .collect())
    }

    async fn insert(&self, vacancies: &[Vacancy]) -> Result<u64, RepositoryError> {
        if vacancies.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let models = vacancies.iter().map(|vacancy| vacancy_entity::ActiveModel {
            id: Set(Uuid::new_v4()),
            header: Set(vacancy.header.clone()),
            content: Set(vacancy.content.clone()),
            url: Set(vacancy.url.clone()),
            source: Set(vacancy.source.clone()),
            created_at: Set(now.into()),
        });

        // 已存在的 (source, url) 保持原记录
        let inserted = vacancy_entity::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    vacancy_entity::Column::Source,
                    vacancy_entity::Column::Url,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(inserted)
    }
}
