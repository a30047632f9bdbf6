use super::PathComponent;
use crate::object::ObjectRef;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("Имя не найдено: {0}")]
    NotFound(String),

    #[error("Имя уже привязано: {0}")]
    AlreadyBound(String),

    #[error("Неверное имя: {0}")]
    InvalidName(String),

    #[error("Не контекст имён: {0}")]
    NotContext(String),
}

pub type ContextRef = Arc<dyn NamingContext>;

/// К чему привязано имя.
#[derive(Clone)]
pub enum Binding {
    Object(ObjectRef),
    Context(ContextRef),
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Binding::Context(_) => f.write_str("Context"),
        }
    }
}

pub(crate) fn display_name(name: &[PathComponent]) -> String {
    name.iter().map(ToString::to_string).collect::<Vec<_>>().join("/")
}

/// Узел каталога. Составные имена обходятся начиная с этого узла.
pub trait NamingContext: Send + Sync {
    fn resolve(&self, name: &[PathComponent]) -> Result<Binding, NamingError>;

    fn bind(&self, name: &[PathComponent], object: ObjectRef) -> Result<(), NamingError>;

    fn bind_new_context(&self, name: &[PathComponent]) -> Result<ContextRef, NamingError>;

    fn unbind(&self, name: &[PathComponent]) -> Result<(), NamingError>;

    /// Разрешить `name` и потребовать, чтобы там был контекст.
    fn resolve_context(&self, name: &[PathComponent]) -> Result<ContextRef, NamingError> {
        match self.resolve(name)? {
            Binding::Context(ctx) => Ok(ctx),
            Binding::Object(_) => Err(NamingError::NotContext(display_name(name))),
        }
    }

    fn resolve_object(&self, name: &[PathComponent]) -> Result<ObjectRef, NamingError> {
        match self.resolve(name)? {
            Binding::Object(object) => Ok(object),
            Binding::Context(_) => Err(NamingError::NotFound(format!("{} - это контекст", display_name(name)))),
        }
    }
}

/// Выдаёт корневой контекст каталога.
pub trait NamingService: Send + Sync {
    fn root_context(&self) -> Result<ContextRef, NamingError>;
}
