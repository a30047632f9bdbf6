use crate::object::ObjectRef;
use thiserror::Error;

pub type ActivationFlags = u32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("Нет сервера для '{0}'")]
    NotFound(String),

    #[error("Неверный запрос активации: {0}")]
    InvalidQuery(String),

    #[error("Сервер '{iid}' не запустился: {reason}")]
    Failed { iid: String, reason: String },
}

pub type ActivationResult<T> = std::result::Result<T, ActivationError>;

/// Создаёт объекты по запросу резолвера.
///
/// `Ok(None)` - сервер запустился, но ничего не вернул. Async-варианты по
/// умолчанию вызывают блокирующие; удалённые реализации переопределяют их,
/// чтобы отдавать управление на время запроса.
#[async_trait::async_trait]
pub trait ActivationService: Send + Sync {
    fn activate_from_id(&self, iid: &str, flags: ActivationFlags) -> ActivationResult<Option<ObjectRef>>;

    fn activate(&self, query: &str, flags: ActivationFlags) -> ActivationResult<Option<ObjectRef>>;

    async fn activate_from_id_async(
        &self,
        iid: &str,
        flags: ActivationFlags,
    ) -> ActivationResult<Option<ObjectRef>> {
        self.activate_from_id(iid, flags)
    }

    async fn activate_async(&self, query: &str, flags: ActivationFlags) -> ActivationResult<Option<ObjectRef>> {
        self.activate(query, flags)
    }
}
