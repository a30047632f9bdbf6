//! Запасное разрешение через расширители, зарегистрированные для префикса моникера.

use crate::error::Result;
use crate::mappings::extender_query;
use crate::object::{query_interface, ObjectRef, ResolveOptions, MONIKER_EXTENDER_REPO_ID};
use crate::services::activation::ActivationResult;
use crate::services::moniker::Moniker;
use crate::services::Resolver;
use std::sync::Arc;
use tracing::{debug, warn};

/// Разрешает моникеры, с которыми не справился их собственный вариант.
#[async_trait::async_trait]
pub trait MonikerExtender: Send + Sync {
    /// `name` - неэкранированный локальный сегмент `moniker`.
    fn resolve(
        &self,
        resolver: &Resolver,
        moniker: &Arc<Moniker>,
        options: &ResolveOptions,
        name: &str,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>>;

    async fn resolve_async(
        &self,
        resolver: &Resolver,
        moniker: &Arc<Moniker>,
        options: &ResolveOptions,
        name: &str,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        self.resolve(resolver, moniker, options, name, repo_id)
    }
}

fn narrow(prefix: &str, activated: ActivationResult<Option<ObjectRef>>) -> Option<Arc<dyn MonikerExtender>> {
    match activated {
        Ok(Some(object)) => {
            let extender = query_interface(&object, MONIKER_EXTENDER_REPO_ID).and_then(|e| e.as_extender());
            if extender.is_none() {
                warn!("Расширитель для '{}' не реализует интерфейс расширителя", prefix);
            }
            extender
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Поиск расширителя для '{}' не удался: {}", prefix, e);
            None
        }
    }
}

/// Первый расширитель, зарегистрированный для `prefix`, если есть.
pub fn find_extender(resolver: &Resolver, prefix: &str) -> Option<Arc<dyn MonikerExtender>> {
    narrow(prefix, resolver.activation().activate(&extender_query(prefix), 0))
}

pub async fn find_extender_async(resolver: &Resolver, prefix: &str) -> Option<Arc<dyn MonikerExtender>> {
    let query = extender_query(prefix);
    narrow(prefix, resolver.activation().activate_async(&query, 0).await)
}

pub fn resolve_with_extender(
    resolver: &Resolver,
    moniker: &Arc<Moniker>,
    prefix: &str,
    options: &ResolveOptions,
    repo_id: &str,
) -> Result<Option<ObjectRef>> {
    match find_extender(resolver, prefix) {
        Some(extender) => {
            debug!("Передача '{}' расширителю для '{}'", moniker.name(), prefix);
            extender.resolve(resolver, moniker, options, &moniker.local_name(), repo_id)
        }
        None => Ok(None),
    }
}

pub async fn resolve_with_extender_async(
    resolver: &Resolver,
    moniker: &Arc<Moniker>,
    prefix: &str,
    options: &ResolveOptions,
    repo_id: &str,
) -> Result<Option<ObjectRef>> {
    match find_extender_async(resolver, prefix).await {
        Some(extender) => {
            debug!("Передача '{}' расширителю для '{}'", moniker.name(), prefix);
            let name = moniker.local_name();
            extender.resolve_async(resolver, moniker, options, &name, repo_id).await
        }
        None => Ok(None),
    }
}
