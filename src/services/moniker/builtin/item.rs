use crate::error::Result;
use crate::moniker_error;
use crate::object::{qi_return, ObjectRef, ResolveOptions, ITEM_CONTAINER_REPO_ID};
use crate::services::moniker::{Moniker, MonikerKind};
use crate::services::Resolver;
use std::sync::Arc;

/// `!<item>`: найти элемент в контейнере, в который разрешается родитель.
pub struct ItemMoniker;

impl ItemMoniker {
    fn lookup(moniker: &Moniker, container: ObjectRef, repo_id: &str) -> Result<Option<ObjectRef>> {
        let container = container
            .as_item_container()
            .ok_or_else(|| moniker_error!(interface_not_found, "{}", ITEM_CONTAINER_REPO_ID))?;

        match container.get_object_by_name(&moniker.internal_name()) {
            Some(object) => qi_return(Some(object), repo_id).map(Some),
            None => Ok(None),
        }
    }

    fn parent_of(moniker: &Moniker) -> Result<Arc<Moniker>> {
        moniker
            .parent()
            .ok_or_else(|| moniker_error!(general, "у элемента '{}' нет контейнера", moniker.name()))
    }
}

#[async_trait::async_trait]
impl MonikerKind for ItemMoniker {
    fn resolve(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let parent = Self::parent_of(moniker)?;
        let container = parent.resolve(resolver, options, ITEM_CONTAINER_REPO_ID)?;
        Self::lookup(moniker, container, repo_id)
    }

    async fn resolve_async(
        &self,
        moniker: &Arc<Moniker>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<Option<ObjectRef>> {
        let parent = Self::parent_of(moniker)?;
        let container = parent.resolve_async(resolver, options, ITEM_CONTAINER_REPO_ID).await?;
        Self::lookup(moniker, container, repo_id)
    }
}
