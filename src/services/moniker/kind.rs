use super::Moniker;
use crate::error::Result;
use crate::object::{ObjectRef, ResolveOptions};
use crate::services::Resolver;
use std::sync::Arc;

/// Поведение конкретного варианта моникера (file, item, cache и т.д.).
///
/// `Ok(None)` из `resolve` означает "не я": узел пробует расширитель
/// для своего префикса, прежде чем вернуть ошибку.
#[async_trait::async_trait]
pub trait MonikerKind: Send + Sync {
    fn resolve(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>>;

    async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        self.resolve(moniker, resolver, options, repo_id)
    }

    /// Локальное имя без зарегистрированного префикса.
    fn internal_name(&self, moniker: &Moniker) -> String {
        let local = moniker.local_name();
        local.get(moniker.prefix_len()..).unwrap_or("").to_string()
    }

    fn set_internal_name(&self, moniker: &Moniker, unescaped: &str) -> Result<()> {
        let prefix = moniker.prefix().unwrap_or("");
        moniker.store_local_name(format!("{}{}", prefix, unescaped))
    }
}
