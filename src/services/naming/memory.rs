use super::r#trait::display_name;
use super::{Binding, ContextRef, NamingContext, NamingError, NamingService, PathComponent};
use crate::object::ObjectRef;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Узел каталога в памяти процесса.
#[derive(Default)]
pub struct MemoryNamingContext {
    bindings: DashMap<PathComponent, Binding>,
}

impl MemoryNamingContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn split(name: &[PathComponent]) -> Result<(&PathComponent, &[PathComponent]), NamingError> {
        name.split_first()
            .ok_or_else(|| NamingError::InvalidName("пустое имя".to_string()))
    }

    fn child_context(&self, first: &PathComponent) -> Result<ContextRef, NamingError> {
        // Клонируем из карты, чтобы не держать блокировку шарда при рекурсии
        let binding = self.bindings.get(first).map(|b| b.value().clone());
        match binding {
            Some(Binding::Context(ctx)) => Ok(ctx),
            Some(Binding::Object(_)) => Err(NamingError::NotContext(first.to_string())),
            None => Err(NamingError::NotFound(first.to_string())),
        }
    }

    fn bind_here(&self, first: &PathComponent, binding: Binding) -> Result<(), NamingError> {
        match self.bindings.entry(first.clone()) {
            Entry::Occupied(_) => Err(NamingError::AlreadyBound(first.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(binding);
                Ok(())
            }
        }
    }
}

impl NamingContext for MemoryNamingContext {
    fn resolve(&self, name: &[PathComponent]) -> Result<Binding, NamingError> {
        let (first, rest) = Self::split(name)?;
        if rest.is_empty() {
            return self
                .bindings
                .get(first)
                .map(|b| b.value().clone())
                .ok_or_else(|| NamingError::NotFound(display_name(name)));
        }
        self.child_context(first)?.resolve(rest)
    }

    fn bind(&self, name: &[PathComponent], object: ObjectRef) -> Result<(), NamingError> {
        let (first, rest) = Self::split(name)?;
        if rest.is_empty() {
            return self.bind_here(first, Binding::Object(object));
        }
        self.child_context(first)?.bind(rest, object)
    }

    fn bind_new_context(&self, name: &[PathComponent]) -> Result<ContextRef, NamingError> {
        let (first, rest) = Self::split(name)?;
        if rest.is_empty() {
            let ctx: ContextRef = MemoryNamingContext::new();
            self.bind_here(first, Binding::Context(Arc::clone(&ctx)))?;
            return Ok(ctx);
        }
        self.child_context(first)?.bind_new_context(rest)
    }

    fn unbind(&self, name: &[PathComponent]) -> Result<(), NamingError> {
        let (first, rest) = Self::split(name)?;
        if rest.is_empty() {
            return self
                .bindings
                .remove(first)
                .map(|_| ())
                .ok_or_else(|| NamingError::NotFound(display_name(name)));
        }
        self.child_context(first)?.unbind(rest)
    }
}

/// Сервис имён с корнем в памяти.
#[derive(Clone, Default)]
pub struct MemoryNamingService {
    root: Arc<MemoryNamingContext>,
}

impl MemoryNamingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Arc<MemoryNamingContext> {
        &self.root
    }
}

impl NamingService for MemoryNamingService {
    fn root_context(&self) -> Result<ContextRef, NamingError> {
        Ok(Arc::clone(&self.root) as ContextRef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::testing::StubObject;
    use crate::services::naming::parse_path;

    #[test]
    fn bind_and_resolve_nested() {
        let root = MemoryNamingContext::new();
        root.bind_new_context(&parse_path("a").unwrap()).unwrap();
        root.bind_new_context(&parse_path("a/b").unwrap()).unwrap();

        let object: ObjectRef = StubObject::new("leaf", &[]);
        root.bind(&parse_path("a/b/leaf.txt").unwrap(), object).unwrap();

        let found = root.resolve_object(&parse_path("a/b/leaf.txt").unwrap()).unwrap();
        assert!(format!("{:?}", found).contains("leaf"));
        assert!(root.resolve_context(&parse_path("a/b").unwrap()).is_ok());
    }

    #[test]
    fn double_bind_is_rejected() {
        let root = MemoryNamingContext::new();
        let name = parse_path("x").unwrap();
        root.bind(&name, StubObject::new("one", &[])).unwrap();
        assert_eq!(
            root.bind(&name, StubObject::new("two", &[])).unwrap_err(),
            NamingError::AlreadyBound("x".into())
        );
    }

    #[test]
    fn missing_and_non_context_names() {
        let root = MemoryNamingContext::new();
        root.bind(&parse_path("obj").unwrap(), StubObject::new("o", &[])).unwrap();

        assert!(matches!(root.resolve(&parse_path("nope").unwrap()), Err(NamingError::NotFound(_))));
        assert!(matches!(
            root.resolve_context(&parse_path("obj").unwrap()),
            Err(NamingError::NotContext(_))
        ));
        assert!(matches!(root.resolve(&parse_path("obj/x").unwrap()), Err(NamingError::NotContext(_))));
        assert!(matches!(root.resolve(&[]), Err(NamingError::InvalidName(_))));
    }

    #[test]
    fn unbind_releases_the_object() {
        let root = MemoryNamingContext::new();
        let stub = StubObject::new("o", &[]);
        let name = parse_path("obj").unwrap();
        root.bind(&name, stub.clone()).unwrap();
        assert_eq!(Arc::strong_count(&stub), 2);

        root.unbind(&name).unwrap();
        assert_eq!(Arc::strong_count(&stub), 1);
        assert!(root.is_empty());
        assert!(matches!(root.unbind(&name), Err(NamingError::NotFound(_))));
    }
}
