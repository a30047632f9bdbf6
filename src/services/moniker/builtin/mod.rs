//! Варианты, стоящие за id из таблицы быстрых префиксов.

mod cache;
mod item;
mod oaf;
mod query;

pub use cache::{CacheMoniker, ResolvedCache};
pub use item::ItemMoniker;
pub use oaf::OafMoniker;
pub use query::QueryMoniker;

use super::Moniker;
use crate::mappings::prefix_table::{
    CACHE_MONIKER_IID, ITEM_MONIKER_IID, OAF_MONIKER_IID, QUERY_MONIKER_IID,
};
use crate::object::{ObjectRef, MONIKER_REPO_ID};
use crate::services::activation::{ComponentRegistry, ServerInfo};
use std::sync::Arc;
use tracing::info;

const MONIKER_PROPERTY: &str = "matecomponent:moniker";

fn moniker_server(iid: &str, prefixes: &[&str]) -> ServerInfo {
    ServerInfo::new(iid)
        .with_repo_id(MONIKER_REPO_ID)
        .with_property(MONIKER_PROPERTY, prefixes)
}

/// Зарегистрировать встроенные варианты во внутрипроцессном реестре.
///
/// Каждая активация даёт новый узел; cache-моникеры делят один кэш.
pub fn register_builtin_monikers(registry: &ComponentRegistry) -> ResolvedCache {
    let cache = ResolvedCache::default();

    registry.register(moniker_server(OAF_MONIKER_IID, &["OAFIID:", "OAFAID:"]), || {
        Ok(Some(Arc::new(Moniker::with_prefix("OAFIID:", OafMoniker)) as ObjectRef))
    });

    registry.register(moniker_server(QUERY_MONIKER_IID, &["query:"]), || {
        Ok(Some(Arc::new(Moniker::with_prefix("query:(", QueryMoniker)) as ObjectRef))
    });

    let shared = cache.clone();
    registry.register(moniker_server(CACHE_MONIKER_IID, &["cache:"]), move || {
        let kind = CacheMoniker::new(shared.clone());
        Ok(Some(Arc::new(Moniker::with_prefix("cache:", kind).case_insensitive()) as ObjectRef))
    });

    registry.register(moniker_server(ITEM_MONIKER_IID, &["!"]), || {
        Ok(Some(Arc::new(Moniker::with_prefix("!", ItemMoniker)) as ObjectRef))
    });

    info!("Встроенные моникеры зарегистрированы");
    cache
}
