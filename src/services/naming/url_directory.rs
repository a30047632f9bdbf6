use super::{parse_path, ContextRef, NamingError, NamingService, PathComponent};
use crate::error::Result;
use crate::object::ObjectRef;
use std::sync::Arc;
use tracing::debug;

/// Привязывает объекты в URL-контекстах сервисов, например `MATE/URL/<service>`.
///
/// Промежуточные контексты создаются при первом обращении. Ссылки на
/// контексты, взятые при обходе, освобождаются до возврата из вызова.
pub struct UrlDirectory {
    naming: Arc<dyn NamingService>,
    root: Vec<String>,
}

impl UrlDirectory {
    pub fn new(naming: Arc<dyn NamingService>, root: Vec<String>) -> Self {
        Self { naming, root }
    }

    fn url_to_name(url: &str, kind: Option<&str>) -> [PathComponent; 1] {
        [PathComponent::new(url, kind.unwrap_or(""))]
    }

    /// Пройти `path` от корневого контекста, один раз создавая недостающие.
    pub fn lookup_context<S: AsRef<str>>(&self, path: &[S]) -> std::result::Result<ContextRef, NamingError> {
        if path.is_empty() {
            return Err(NamingError::InvalidName("пустой путь контекста".to_string()));
        }

        let mut ctx = self.naming.root_context()?;
        for element in path {
            let name = parse_path(element.as_ref())?;
            let next = match ctx.resolve_context(&name) {
                Ok(next) => next,
                Err(NamingError::NotFound(_)) => {
                    debug!("Создание контекста имён '{}'", element.as_ref());
                    ctx.bind_new_context(&name)?
                }
                Err(e) => return Err(e),
            };
            ctx = next;
        }
        Ok(ctx)
    }

    pub fn bind<S: AsRef<str>>(&self, path: &[S], url: &str, kind: Option<&str>, object: ObjectRef) -> Result<()> {
        let ctx = self.lookup_context(path)?;
        ctx.bind(&Self::url_to_name(url, kind), object)?;
        Ok(())
    }

    pub fn unbind<S: AsRef<str>>(&self, path: &[S], url: &str) -> Result<()> {
        let ctx = self.lookup_context(path)?;
        ctx.unbind(&Self::url_to_name(url, None))?;
        Ok(())
    }

    pub fn resolve<S: AsRef<str>>(&self, path: &[S], url: &str) -> Result<ObjectRef> {
        let ctx = self.lookup_context(path)?;
        Ok(ctx.resolve_object(&Self::url_to_name(url, None))?)
    }

    fn service_path(&self, service_id: &str) -> Vec<String> {
        let mut path = self.root.clone();
        path.push(service_id.to_string());
        path
    }

    pub fn register(&self, service_id: &str, url: &str, kind: Option<&str>, object: ObjectRef) -> Result<()> {
        self.bind(self.service_path(service_id).as_slice(), url, kind, object)
    }

    pub fn unregister(&self, service_id: &str, url: &str) -> Result<()> {
        self.unbind(self.service_path(service_id).as_slice(), url)
    }

    pub fn lookup(&self, service_id: &str, url: &str) -> Result<ObjectRef> {
        self.resolve(self.service_path(service_id).as_slice(), url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonikerError;
    use crate::object::{same_object, testing::StubObject};
    use crate::services::naming::{MemoryNamingService, NamingContext};

    fn directory() -> (MemoryNamingService, UrlDirectory) {
        let service = MemoryNamingService::new();
        let directory = UrlDirectory::new(Arc::new(service.clone()), vec!["MATE".into(), "URL".into()]);
        (service, directory)
    }

    #[test]
    fn register_then_lookup() {
        let (_service, directory) = directory();
        let object: ObjectRef = StubObject::new("viewer", &[]);
        directory.register("OAFIID:Viewer", "file:/tmp/a.txt", None, object.clone()).unwrap();

        let found = directory.lookup("OAFIID:Viewer", "file:/tmp/a.txt").unwrap();
        assert!(same_object(&found, &object));
    }

    #[test]
    fn contexts_are_created_once() {
        let (service, directory) = directory();
        directory.register("svc", "a", None, StubObject::new("a", &[])).unwrap();
        directory.register("svc", "b", None, StubObject::new("b", &[])).unwrap();
        directory.register("other", "a", None, StubObject::new("c", &[])).unwrap();

        assert_eq!(service.root().len(), 1);
        let url_ctx = service.root().resolve_context(&parse_path("MATE/URL").unwrap()).unwrap();
        let services = url_ctx.resolve_context(&parse_path("svc").unwrap()).unwrap();
        assert!(services.resolve_object(&parse_path("a").unwrap()).is_ok());
        assert!(services.resolve_object(&parse_path("b").unwrap()).is_ok());
    }

    #[test]
    fn unregister_removes_binding() {
        let (_service, directory) = directory();
        directory.register("svc", "a", None, StubObject::new("a", &[])).unwrap();
        directory.unregister("svc", "a").unwrap();
        assert!(matches!(
            directory.lookup("svc", "a"),
            Err(MonikerError::Naming(NamingError::NotFound(_)))
        ));
    }

    #[test]
    fn kind_is_part_of_the_binding() {
        let (_service, directory) = directory();
        directory.register("svc", "doc", Some("text/html"), StubObject::new("d", &[])).unwrap();
        assert!(directory.lookup("svc", "doc").is_err());
    }

    #[test]
    fn walk_releases_context_references() {
        let (service, directory) = directory();
        let baseline = Arc::strong_count(service.root());
        directory.register("svc", "a", None, StubObject::new("a", &[])).unwrap();
        let _ = directory.lookup("svc", "missing");
        assert_eq!(Arc::strong_count(service.root()), baseline);
    }

    #[test]
    fn object_bound_mid_path_stops_the_walk() {
        let (service, directory) = directory();
        service.root().bind(&parse_path("MATE").unwrap(), StubObject::new("x", &[])).unwrap();
        assert!(matches!(
            directory.register("svc", "a", None, StubObject::new("a", &[])),
            Err(MonikerError::Naming(NamingError::NotContext(_)))
        ));
    }
}
