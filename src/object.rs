//! Модель возможностей (capabilities), общая для активированных объектов и моникеров.
//!
//! Хэндлы - это `Arc`: clone захватывает ссылку, drop её освобождает.
//! Функции, принимающие `ObjectRef` по значению, забирают ссылку вызывающего
//! на любом пути; функции с `&ObjectRef` только заимствуют её.

use crate::error::{MonikerError, Result};
use crate::services::extender::MonikerExtender;
use crate::services::moniker::Moniker;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const UNKNOWN_REPO_ID: &str = "IDL:MateComponent/Unknown:1.0";
pub const MONIKER_REPO_ID: &str = "IDL:MateComponent/Moniker:1.0";
pub const MONIKER_EXTENDER_REPO_ID: &str = "IDL:MateComponent/MonikerExtender:1.0";
pub const ITEM_CONTAINER_REPO_ID: &str = "IDL:MateComponent/ItemContainer:1.0";

/// Базовая возможность любого объекта, выданного сервисом активации.
pub trait Unknown: fmt::Debug + Send + Sync {
    /// Реализует ли объект интерфейс `repo_id`.
    fn implements(&self, repo_id: &str) -> bool;

    fn as_moniker(self: Arc<Self>) -> Option<Arc<Moniker>> {
        None
    }

    fn as_extender(self: Arc<Self>) -> Option<Arc<dyn MonikerExtender>> {
        None
    }

    fn as_item_container(self: Arc<Self>) -> Option<Arc<dyn ItemContainer>> {
        None
    }
}

pub type ObjectRef = Arc<dyn Unknown>;

/// Объекты с именованными под-объектами, доступными через сегменты `!item`.
pub trait ItemContainer: Send + Sync {
    fn get_object_by_name(&self, item_name: &str) -> Option<ObjectRef>;
}

/// Запрос интерфейса без захвата: новая ссылка, если возможность есть.
pub fn query_interface(object: &ObjectRef, repo_id: &str) -> Option<ObjectRef> {
    if repo_id == UNKNOWN_REPO_ID || object.implements(repo_id) {
        Some(Arc::clone(object))
    } else {
        None
    }
}

/// Финальный шаг resolve у варианта: сузить `object` до `repo_id`.
///
/// Забирает `object`; отсутствие объекта - ошибка активации,
/// отсутствие возможности - `InterfaceNotFound`.
pub fn qi_return(object: Option<ObjectRef>, repo_id: &str) -> Result<ObjectRef> {
    let object = object
        .ok_or_else(|| MonikerError::GeneralResolution("Failed to activate object".to_string()))?;

    query_interface(&object, repo_id)
        .ok_or_else(|| MonikerError::InterfaceNotFound(repo_id.to_string()))
}

/// Сравнение двух хэндлов по идентичности (без учёта vtable).
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Флаги и дедлайн, передаваемые вниз по вызову resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    pub flags: u32,
    /// Миллисекунды; отрицательное значение - без таймаута.
    pub timeout: i32,
}

impl ResolveOptions {
    pub const NO_TIMEOUT: i32 = -1;

    pub fn new(flags: u32, timeout: i32) -> Self {
        Self { flags, timeout }
    }

    pub fn deadline(&self) -> Option<std::time::Duration> {
        u64::try_from(self.timeout).ok().map(std::time::Duration::from_millis)
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { flags: 0, timeout: Self::NO_TIMEOUT }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Простой объект с фиксированным набором интерфейсов.
    #[derive(Debug)]
    pub struct StubObject {
        pub label: String,
        pub repo_ids: Vec<String>,
    }

    impl StubObject {
        pub fn new(label: &str, repo_ids: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                repo_ids: repo_ids.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    impl Unknown for StubObject {
        fn implements(&self, repo_id: &str) -> bool {
            self.repo_ids.iter().any(|id| id == repo_id)
        }
    }
}
