use crate::error::{MonikerError, Result};
use crate::object::{qi_return, ObjectRef, ResolveOptions};
use crate::services::moniker::{Moniker, MonikerKind};
use crate::services::Resolver;
use std::sync::Arc;

/// `query:(<requirements>)`: активировать первый сервер, удовлетворяющий запросу.
pub struct QueryMoniker;

#[async_trait::async_trait]
impl MonikerKind for QueryMoniker {
    fn resolve(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        _options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let query = self.internal_name(moniker);
        let object = resolver
            .activation()
            .activate(&query, 0)
            .map_err(|e| MonikerError::from_activation(&query, e))?;
        qi_return(object, repo_id).map(Some)
    }

    async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        _options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let query = self.internal_name(moniker);
        let object = resolver
            .activation()
            .activate_async(&query, 0)
            .await
            .map_err(|e| MonikerError::from_activation(&query, e))?;
        qi_return(object, repo_id).map(Some)
    }

    fn internal_name(&self, moniker: &Moniker) -> String {
        let local = moniker.local_name();
        let body = local.get(moniker.prefix_len()..).unwrap_or("");
        body.strip_suffix(')').unwrap_or(body).to_string()
    }

    fn set_internal_name(&self, moniker: &Moniker, unescaped: &str) -> Result<()> {
        moniker.store_local_name(format!("query:({})", unescaped))
    }
}
