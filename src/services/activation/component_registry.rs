use super::query::ActivationQuery;
use super::r#trait::{ActivationError, ActivationFlags, ActivationResult, ActivationService};
use crate::object::ObjectRef;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Создаёт новый экземпляр зарегистрированного сервера.
pub type ComponentFactory = Arc<dyn Fn() -> ActivationResult<Option<ObjectRef>> + Send + Sync>;

/// Статическое описание активируемого сервера для сопоставления с запросами.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    iid: String,
    repo_ids: Vec<String>,
    properties: HashMap<String, Vec<String>>,
}

impl ServerInfo {
    pub fn new(iid: impl Into<String>) -> Self {
        Self {
            iid: iid.into(),
            repo_ids: Vec::new(),
            properties: HashMap::new(),
        }
    }

    pub fn with_repo_id(mut self, repo_id: impl Into<String>) -> Self {
        self.repo_ids.push(repo_id.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.properties
            .entry(name.into())
            .or_default()
            .extend(values.iter().map(|v| v.to_string()));
        self
    }

    pub fn iid(&self) -> &str {
        &self.iid
    }

    /// Значения поля запроса; `repo_ids` - список интерфейсов.
    pub fn values(&self, field: &str) -> &[String] {
        if field == "repo_ids" {
            return &self.repo_ids;
        }
        self.properties.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

struct Registration {
    info: ServerInfo,
    factory: ComponentFactory,
}

/// Внутрипроцессный сервис активации: упорядоченная таблица серверов.
pub struct ComponentRegistry {
    servers: RwLock<Vec<Registration>>,
    // текст запроса -> iid первого подходящего сервера
    query_cache: Option<DashMap<String, String>>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ComponentRegistry {
    pub fn new(query_cache: bool) -> Self {
        info!("Инициализация реестра компонентов (кэш запросов: {})", query_cache);
        Self {
            servers: RwLock::new(Vec::new()),
            query_cache: query_cache.then(DashMap::new),
        }
    }

    /// Зарегистрировать сервер; повторная регистрация с тем же iid заменяет прежнюю.
    pub fn register<F>(&self, info: ServerInfo, factory: F)
    where
        F: Fn() -> ActivationResult<Option<ObjectRef>> + Send + Sync + 'static,
    {
        debug!("Регистрация сервера {}", info.iid);
        let mut servers = self.servers.write();
        let registration = Registration { info, factory: Arc::new(factory) };
        match servers.iter_mut().find(|r| r.info.iid == registration.info.iid) {
            Some(existing) => *existing = registration,
            None => servers.push(registration),
        }
        drop(servers);
        self.invalidate_cache();
    }

    pub fn unregister(&self, iid: &str) -> bool {
        let mut servers = self.servers.write();
        let before = servers.len();
        servers.retain(|r| r.info.iid != iid);
        let removed = servers.len() != before;
        drop(servers);
        if removed {
            self.invalidate_cache();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }

    pub fn server_infos(&self) -> Vec<ServerInfo> {
        self.servers.read().iter().map(|r| r.info.clone()).collect()
    }

    fn invalidate_cache(&self) {
        if let Some(cache) = &self.query_cache {
            cache.clear();
        }
    }

    fn factory_for_id(&self, iid: &str) -> Option<ComponentFactory> {
        self.servers
            .read()
            .iter()
            .find(|r| r.info.iid == iid)
            .map(|r| Arc::clone(&r.factory))
    }

    fn first_match(&self, query: &str) -> ActivationResult<Option<String>> {
        if let Some(iid) = self.query_cache.as_ref().and_then(|c| c.get(query).map(|e| e.value().clone())) {
            debug_if_enabled!("Попадание в кэш запросов: '{}' -> {}", query, iid);
            return Ok(Some(iid));
        }

        let parsed = ActivationQuery::parse(query)?;
        let iid = self
            .servers
            .read()
            .iter()
            .find(|r| parsed.matches(&r.info))
            .map(|r| r.info.iid.clone());

        if let (Some(cache), Some(iid)) = (&self.query_cache, &iid) {
            cache.insert(query.to_string(), iid.clone());
        }
        Ok(iid)
    }
}

#[async_trait::async_trait]
impl ActivationService for ComponentRegistry {
    fn activate_from_id(&self, iid: &str, flags: ActivationFlags) -> ActivationResult<Option<ObjectRef>> {
        debug_if_enabled!("Активация {} (флаги {:#x})", iid, flags);
        let factory = self
            .factory_for_id(iid)
            .ok_or_else(|| ActivationError::NotFound(iid.to_string()))?;
        // Фабрики вызываются вне блокировки таблицы: им можно активировать другие серверы
        factory()
    }

    fn activate(&self, query: &str, flags: ActivationFlags) -> ActivationResult<Option<ObjectRef>> {
        match self.first_match(query)? {
            Some(iid) => self.activate_from_id(&iid, flags),
            None => {
                debug!("Ни один сервер не подходит под '{}'", query);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::testing::StubObject;
    use crate::object::MONIKER_REPO_ID;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stub_factory(label: &'static str) -> impl Fn() -> ActivationResult<Option<ObjectRef>> {
        move || Ok(Some(StubObject::new(label, &[MONIKER_REPO_ID]) as ObjectRef))
    }

    fn moniker_server(iid: &str, prefix: &str) -> ServerInfo {
        ServerInfo::new(iid)
            .with_repo_id(MONIKER_REPO_ID)
            .with_property("matecomponent:moniker", &[prefix])
    }

    #[test]
    fn activate_from_id_runs_factory() {
        let registry = ComponentRegistry::new(false);
        registry.register(moniker_server("OAFIID:File", "file:"), stub_factory("file"));
        let object = registry.activate_from_id("OAFIID:File", 0).unwrap().unwrap();
        assert!(object.implements(MONIKER_REPO_ID));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = ComponentRegistry::default();
        assert_eq!(
            registry.activate_from_id("OAFIID:Missing", 0).unwrap_err(),
            ActivationError::NotFound("OAFIID:Missing".into())
        );
    }

    #[test]
    fn query_selects_first_registration() {
        let registry = ComponentRegistry::new(false);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        registry.register(moniker_server("OAFIID:First", "file:"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(StubObject::new("first", &[MONIKER_REPO_ID]) as ObjectRef))
        });
        registry.register(moniker_server("OAFIID:Second", "file:"), stub_factory("second"));

        let query = crate::mappings::query_from_name("file:/tmp/a");
        assert!(registry.activate(&query, 0).unwrap().is_some());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn query_without_match_yields_nothing() {
        let registry = ComponentRegistry::default();
        registry.register(moniker_server("OAFIID:File", "file:"), stub_factory("file"));
        let query = crate::mappings::query_from_name("http://example.org");
        assert!(registry.activate(&query, 0).unwrap().is_none());
    }

    #[test]
    fn cache_is_invalidated_on_register() {
        let registry = ComponentRegistry::new(true);
        let query = crate::mappings::query_from_name("file:");
        assert!(registry.activate(&query, 0).unwrap().is_none());

        registry.register(moniker_server("OAFIID:File", "file:"), stub_factory("file"));
        assert!(registry.activate(&query, 0).unwrap().is_some());

        assert!(registry.unregister("OAFIID:File"));
        assert!(registry.activate(&query, 0).unwrap().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn re_registration_replaces_in_place() {
        let registry = ComponentRegistry::new(false);
        registry.register(moniker_server("OAFIID:File", "file:"), stub_factory("a"));
        registry.register(moniker_server("OAFIID:File", "path:"), stub_factory("b"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.server_infos()[0].values("matecomponent:moniker"), &["path:".to_string()]);
    }
}
