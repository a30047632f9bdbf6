use crate::error::{MonikerError, Result};
use crate::object::{qi_return, ObjectRef, ResolveOptions};
use crate::services::moniker::{Moniker, MonikerKind};
use crate::services::Resolver;
use std::sync::Arc;

/// `OAFIID:<id>` / `OAFAID:[<id>,user,host]`: активировать указанный сервер.
pub struct OafMoniker;

/// Id сервера из сегмента `OAFIID:` или `OAFAID:`.
pub fn activation_iid(local: &str) -> &str {
    let is_aid = local.get(..8).is_some_and(|p| p.eq_ignore_ascii_case("OAFAID:["));
    if is_aid {
        if let Some(body) = local.get(8..).and_then(|rest| rest.strip_suffix(']')) {
            return body.split(',').next().unwrap_or(body).trim();
        }
    }
    local
}

#[async_trait::async_trait]
impl MonikerKind for OafMoniker {
    fn resolve(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        _options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let local = moniker.local_name();
        let iid = activation_iid(&local);
        let object = resolver
            .activation()
            .activate_from_id(iid, 0)
            .map_err(|e| MonikerError::from_activation(iid, e))?;
        qi_return(object, repo_id).map(Some)
    }

    async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        _options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let local = moniker.local_name();
        let iid = activation_iid(&local);
        let object = resolver
            .activation()
            .activate_from_id_async(iid, 0)
            .await
            .map_err(|e| MonikerError::from_activation(iid, e))?;
        qi_return(object, repo_id).map(Some)
    }
}
