//! Иерархические имена моникеров: разбор и экранирование, построение цепочек
//! через сервис активации, разрешение с запасными расширителями и
//! URL-реестр поверх каталога имён.

#[macro_use]
pub mod utils;

pub mod config;
pub mod error;
pub mod mappings;
pub mod name;
pub mod object;
pub mod services;

pub use config::Config;
pub use error::{MonikerError, Result};
pub use object::{ObjectRef, ResolveOptions, Unknown};
pub use services::activation::{ActivationService, ComponentRegistry};
pub use services::naming::UrlDirectory;
pub use services::{register_builtin_monikers, Moniker, Resolver};
