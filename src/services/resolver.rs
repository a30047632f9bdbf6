use crate::error::{MonikerError, Result};
use crate::mappings::{full_interface_name, ActivationTarget};
use crate::moniker_error;
use crate::name::parse_name;
use crate::object::{query_interface, ObjectRef, ResolveOptions, MONIKER_REPO_ID};
use crate::services::activation::ActivationService;
use crate::services::async_context::AsyncResolutionContext;
use crate::services::moniker::Moniker;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Превращает имена моникеров в цепочки, а цепочки в объекты.
///
/// Клонирование дешёвое; клоны делят сервис активации.
#[derive(Clone)]
pub struct Resolver {
    activation: Arc<dyn ActivationService>,
    // используется только вызовами `*_configured`
    configured_options: ResolveOptions,
}

impl Resolver {
    pub fn new(activation: Arc<dyn ActivationService>) -> Self {
        info!("Инициализация резолвера моникеров");
        Self {
            activation,
            configured_options: ResolveOptions::default(),
        }
    }

    pub fn with_configured_options(mut self, options: ResolveOptions) -> Self {
        self.configured_options = options;
        self
    }

    pub fn activation(&self) -> &Arc<dyn ActivationService> {
        &self.activation
    }

    pub fn configured_options(&self) -> ResolveOptions {
        self.configured_options
    }

    fn target_for(name: &str) -> Result<ActivationTarget> {
        if name.is_empty() {
            return Err(moniker_error!(invalid_argument, "пустое имя моникера"));
        }
        let parsed = parse_name(name);
        let target = ActivationTarget::for_segment(parsed.segment);
        debug!("Сегмент '{}' имени '{}' активируется через {}", parsed.segment, name, target);
        Ok(target)
    }

    /// Сузить только что активированный объект до узла моникера. Ссылка
    /// активации освобождается в обеих ветках.
    fn narrow(
        name: &str,
        target: &ActivationTarget,
        activated: std::result::Result<Option<ObjectRef>, crate::services::activation::ActivationError>,
    ) -> Result<Arc<Moniker>> {
        let object = activated.map_err(|e| MonikerError::from_activation(name, e))?;
        let object = object.ok_or_else(|| {
            warn!("Активация {} ничего не вернула", target);
            moniker_error!(unknown_prefix, "{}", name)
        })?;

        let moniker = query_interface(&object, MONIKER_REPO_ID).and_then(|m| m.as_moniker());
        drop(object);
        moniker.ok_or_else(|| {
            warn!("Объект моникера {} не реализует интерфейс Moniker", target);
            moniker_error!(interface_not_found, "{}", MONIKER_REPO_ID)
        })
    }

    /// Разобрать `name` (например `file:/tmp/a.tar.gz#gzip:#tar:`) в цепочку.
    pub fn new_from_name(&self, name: &str) -> Result<Arc<Moniker>> {
        let target = Self::target_for(name)?;
        let activated = match &target {
            ActivationTarget::Id(iid) => self.activation.activate_from_id(iid, 0),
            ActivationTarget::Query(query) => self.activation.activate(query, 0),
        };
        let moniker = Self::narrow(name, &target, activated)?;
        moniker.set_name(self, name)?;
        Ok(moniker)
    }

    /// Асинхронный `new_from_name`: уступает управление только на время активации.
    pub fn new_from_name_async<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Arc<Moniker>>> {
        Box::pin(async move {
            let target = Self::target_for(name)?;
            let activated = match &target {
                ActivationTarget::Id(iid) => self.activation.activate_from_id_async(iid, 0).await,
                ActivationTarget::Query(query) => self.activation.activate_async(query, 0).await,
            };
            let moniker = Self::narrow(name, &target, activated)?;
            moniker.set_name_async(self, name).await?;
            Ok(moniker)
        })
    }

    pub fn resolve(&self, moniker: &Arc<Moniker>, options: &ResolveOptions, interface: &str) -> Result<ObjectRef> {
        moniker.resolve(self, options, interface)
    }

    /// Разрешить с `{flags: 0, timeout: -1}`; `interface` может быть коротким
    /// именем `Namespace/Interface`.
    pub fn resolve_default(&self, moniker: &Arc<Moniker>, interface: &str) -> Result<ObjectRef> {
        let repo_id = full_interface_name(interface);
        moniker.resolve(self, &ResolveOptions::default(), &repo_id)
    }

    /// Как `resolve_default`, но с опциями из `with_configured_options`.
    pub fn resolve_configured(&self, moniker: &Arc<Moniker>, interface: &str) -> Result<ObjectRef> {
        let repo_id = full_interface_name(interface);
        moniker.resolve(self, &self.configured_options, &repo_id)
    }

    /// Асинхронный resolve; неотрицательный таймаут ограничивает весь вызов.
    pub async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        options: &ResolveOptions,
        interface: &str,
    ) -> Result<ObjectRef> {
        let resolution = moniker.resolve_async(self, options, interface);
        match options.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, resolution).await.map_err(|_| {
                moniker_error!(general, "таймаут разрешения '{}' ({:?})", moniker.name(), deadline)
            })?,
            None => resolution.await,
        }
    }

    pub async fn resolve_async_default(&self, moniker: &Arc<Moniker>, interface: &str) -> Result<ObjectRef> {
        let repo_id = full_interface_name(interface);
        self.resolve_async(moniker, &ResolveOptions::default(), &repo_id).await
    }

    pub async fn resolve_async_configured(&self, moniker: &Arc<Moniker>, interface: &str) -> Result<ObjectRef> {
        let repo_id = full_interface_name(interface);
        let options = self.configured_options;
        self.resolve_async(moniker, &options, &repo_id).await
    }

    /// Разбор и разрешение за один шаг; временная цепочка освобождается
    /// до возврата.
    pub fn get_object(&self, name: &str, interface: &str) -> Result<ObjectRef> {
        let moniker = self.new_from_name(name)?;
        self.resolve_default(&moniker, interface)
    }

    pub async fn get_object_async(&self, name: &str, interface: &str) -> Result<ObjectRef> {
        let moniker = self.new_from_name_async(name).await?;
        self.resolve_async_default(&moniker, interface).await
    }

    /// Совпадает ли цепочка с `name`; засчитывается совпадение любой длины.
    pub fn client_equal(moniker: &Moniker, name: &str) -> bool {
        !name.is_empty() && moniker.equal(name) != 0
    }

    /// Callback-вариант `new_from_name_async`; требует рантайм Tokio.
    /// `callback` вызывается ровно один раз.
    pub fn new_from_name_with<F>(&self, name: &str, callback: F)
    where
        F: FnOnce(Result<Arc<Moniker>>) + Send + 'static,
    {
        let ctx = AsyncResolutionContext::new(name, callback);
        let resolver = self.clone();
        tokio::spawn(async move {
            let result = resolver.new_from_name_async(ctx.name()).await;
            ctx.complete(result);
        });
    }

    /// Callback-вариант `resolve_async`; моникер удерживается до вызова callback.
    pub fn resolve_with<F>(&self, moniker: &Arc<Moniker>, options: ResolveOptions, interface: &str, callback: F)
    where
        F: FnOnce(Result<ObjectRef>) + Send + 'static,
    {
        let ctx = AsyncResolutionContext::new(moniker.name(), callback);
        let resolver = self.clone();
        let moniker = Arc::clone(moniker);
        let interface = interface.to_string();
        tokio::spawn(async move {
            let result = resolver.resolve_async(&moniker, &options, &interface).await;
            ctx.complete(result);
            drop(moniker);
        });
    }

    /// Callback-вариант `get_object_async`.
    pub fn get_object_with<F>(&self, name: &str, interface: &str, callback: F)
    where
        F: FnOnce(Result<ObjectRef>) + Send + 'static,
    {
        let ctx = AsyncResolutionContext::new(name, callback);
        let resolver = self.clone();
        let repo_id = full_interface_name(interface);
        tokio::spawn(async move {
            let result = match resolver.new_from_name_async(ctx.name()).await {
                Ok(moniker) => resolver.resolve_async_default(&moniker, &repo_id).await,
                Err(e) => Err(e),
            };
            ctx.complete(result);
        });
    }
}
