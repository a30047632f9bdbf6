use crate::error::Result;
use crate::moniker_error;
use crate::object::{ObjectRef, ResolveOptions};
use crate::services::moniker::{Moniker, MonikerKind};
use crate::services::Resolver;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Объекты, разрешённые через сегменты `cache:`, по ключу (имя родителя,
/// интерфейс). Общий для всех cache-моникеров одного реестра.
///
/// Сами записи не истекают: они живут до `remove`/`clear` или пока не
/// освобождены реестр и все хэндлы, возвращённые `register_builtin_monikers`.
#[derive(Clone, Default)]
pub struct ResolvedCache {
    entries: Arc<DashMap<(String, String), ObjectRef>>,
}

impl ResolvedCache {
    pub fn get(&self, parent_name: &str, repo_id: &str) -> Option<ObjectRef> {
        self.entries
            .get(&(parent_name.to_string(), repo_id.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, parent_name: String, repo_id: String, object: ObjectRef) {
        self.entries.insert((parent_name, repo_id), object);
    }

    /// Вытеснить одну запись, вернув закэшированную ссылку.
    pub fn remove(&self, parent_name: &str, repo_id: &str) -> Option<ObjectRef> {
        self.entries
            .remove(&(parent_name.to_string(), repo_id.to_string()))
            .map(|(_, object)| object)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Освободить все закэшированные ссылки.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// `cache:` разрешает родителя один раз и дальше отдаёт тот же объект.
pub struct CacheMoniker {
    cache: ResolvedCache,
}

impl CacheMoniker {
    pub fn new(cache: ResolvedCache) -> Self {
        Self { cache }
    }

    fn parent_of(moniker: &Moniker) -> Result<Arc<Moniker>> {
        moniker
            .parent()
            .ok_or_else(|| moniker_error!(general, "'{}': нет родителя для кэширования", moniker.name()))
    }
}

#[async_trait::async_trait]
impl MonikerKind for CacheMoniker {
    fn resolve(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let parent = Self::parent_of(moniker)?;
        let parent_name = parent.name();
        if let Some(hit) = self.cache.get(&parent_name, repo_id) {
            debug!("Попадание в кэш для '{}'", parent_name);
            return Ok(Some(hit));
        }

        let object = parent.resolve(resolver, options, repo_id)?;
        self.cache.insert(parent_name, repo_id.to_string(), Arc::clone(&object));
        Ok(Some(object))
    }

    async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let parent = Self::parent_of(moniker)?;
        let parent_name = parent.name();
        if let Some(hit) = self.cache.get(&parent_name, repo_id) {
            debug!("Попадание в кэш для '{}'", parent_name);
            return Ok(Some(hit));
        }

        let object = parent.resolve_async(resolver, options, repo_id).await?;
        self.cache.insert(parent_name, repo_id.to_string(), Arc::clone(&object));
        Ok(Some(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::testing::StubObject;
    use crate::services::activation::ComponentRegistry;
    use crate::services::moniker::register_builtin_monikers;

    const STREAM: &str = "IDL:MateComponent/Stream:1.0";

    #[test]
    fn remove_releases_the_entry() {
        let cache = ResolvedCache::default();
        let stub = StubObject::new("iso", &[STREAM]);
        cache.insert("file:/big.iso".into(), STREAM.into(), stub.clone());
        assert_eq!(Arc::strong_count(&stub), 2);

        assert!(cache.remove("file:/big.iso", STREAM).is_some());
        assert_eq!(Arc::strong_count(&stub), 1);
        assert!(cache.is_empty());
        assert!(cache.remove("file:/big.iso", STREAM).is_none());
    }

    #[test]
    fn entries_live_as_long_as_the_registry() {
        let registry = ComponentRegistry::new(false);
        let handle = register_builtin_monikers(&registry);
        let stub = StubObject::new("iso", &[STREAM]);
        handle.insert("file:/big.iso".into(), STREAM.into(), stub.clone());

        drop(handle);
        // фабрика cache: всё ещё держит карту
        assert_eq!(Arc::strong_count(&stub), 2);

        drop(registry);
        assert_eq!(Arc::strong_count(&stub), 1);
    }
}
