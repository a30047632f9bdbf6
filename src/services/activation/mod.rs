//! Граница сервиса активации: создать объект по id или по запросу
//! возможностей.
//!
//! Резолвер видит только трейт `ActivationService`; `ComponentRegistry` -
//! внутрипроцессная реализация для бинарника и тестов.

mod component_registry;
mod query;
mod r#trait;

pub use self::component_registry::{ComponentFactory, ComponentRegistry, ServerInfo};
pub use self::query::{ActivationQuery, Requirement};
pub use self::r#trait::{ActivationError, ActivationFlags, ActivationResult, ActivationService};
