// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::source::{EntryHook, Source, UrlCanonicalizer};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// 站点注册表错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate source id: {0}")]
    DuplicateSource(String),

    #[error("Invalid source {id}: {reason}")]
    InvalidSource { id: String, reason: String },
}

/// 站点注册表
///
/// 进程启动时构建的静态站点列表，只支持枚举和按标识查找。
/// 新增站点只需修改配置，不需要改动爬取逻辑。
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Arc<Source>>,
}

impl SourceRegistry {
    /// 创建注册表并校验站点配置
    ///
    /// # 返回值
    ///
    /// * `Ok(SourceRegistry)` - 所有站点标识唯一且查询表达式非空
    /// * `Err(RegistryError)` - 存在重复标识或缺失字段
    pub fn new(sources: Vec<Source>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for source in &sources {
            validate(source)?;
            if !seen.insert(source.id.clone()) {
                return Err(RegistryError::DuplicateSource(source.id.clone()));
            }
        }

        Ok(Self {
            sources: sources.into_iter().map(Arc::new).collect(),
        })
    }

    /// 内置站点列表
    pub fn builtin() -> Self {
        Self {
            sources: builtin_sources().into_iter().map(Arc::new).collect(),
        }
    }

    /// 配置中提供了站点列表时使用配置，否则使用内置站点
    pub fn from_config(sources: Option<Vec<Source>>) -> Result<Self, RegistryError> {
        match sources {
            Some(sources) => Self::new(sources),
            None => Ok(Self::builtin()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Source>> {
        self.sources.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Source>> {
        self.sources.iter().find(|source| source.id == id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn validate(source: &Source) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidSource {
        id: source.id.clone(),
        reason: reason.to_string(),
    };

    if source.id.trim().is_empty() {
        return Err(invalid("id is empty"));
    }
    if source.url.trim().is_empty() {
        return Err(invalid("entry url is empty"));
    }
    if source.link_query.trim().is_empty()
        || source.header_query.trim().is_empty()
        || source.content_query.trim().is_empty()
    {
        return Err(invalid("query expressions must not be empty"));
    }
    Ok(())
}

fn builtin_sources() -> Vec<Source> {
    vec![
        Source::new(
            "duunitori",
            "https://duunitori.fi/tyopaikat?order_by=date_posted",
            "//div[contains(@class,'grid--middle')]//a[contains(@class,'job-box__hover')]",
            "//h1[contains(@class,'header__title')]",
            "//div[contains(@class,'description-box')]//*[self::p or self::li]",
        )
        .with_canonicalizer(UrlCanonicalizer::StripQuery),
        Source::new(
            "oikotie",
            "https://tyopaikat.oikotie.fi/tyopaikat",
            "//article//a[contains(@class,'job-ad-list-item-link')]",
            "//h1",
            "//div[contains(@class,'job-ad-description')]//*[self::p or self::li or self::h2]",
        )
        .with_entry_hook(EntryHook::Click {
            query: "//button[contains(., 'Hyväksy')]".to_string(),
        }),
        Source::new(
            "monster",
            "https://www.monster.fi/tyopaikat",
            "//section[@id='jobs']//h2/a",
            "//h1[contains(@class,'job-title')]",
            "//div[@id='jobDescription']//text()[normalize-space()]",
        )
        .with_canonicalizer(UrlCanonicalizer::DropParams {
            names: vec![
                "utm_source".to_string(),
                "utm_medium".to_string(),
                "utm_campaign".to_string(),
            ],
        }),
        Source::new(
            "tyomarkkinatori",
            "https://tyomarkkinatori.fi/henkiloasiakkaat/avoimet-tyopaikat",
            "//ul[contains(@class,'search-results')]//a[contains(@href,'/avoimet-tyopaikat/')]",
            "//main//h1",
            "//div[contains(@class,'job-description')]//*[self::p or self::li]",
        )
        .with_canonicalizer(UrlCanonicalizer::StripFragment)
        .with_entry_hook(EntryHook::WaitFor {
            query: "//ul[contains(@class,'search-results')]".to_string(),
        }),
    ]
}
