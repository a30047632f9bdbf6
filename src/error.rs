use thiserror::Error;

use crate::services::activation::ActivationError;
use crate::services::naming::NamingError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonikerError {
    #[error("Неизвестный префикс моникера: {0}")]
    UnknownPrefix(String),

    #[error("Интерфейс не найден: {0}")]
    InterfaceNotFound(String),

    #[error("{0}")]
    GeneralResolution(String),

    #[error("Неверный аргумент: {0}")]
    InvalidArgument(String),

    #[error("Ошибка каталога имён: {0}")]
    Naming(#[from] NamingError),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl MonikerError {
    pub fn general<T>(msg: impl Into<String>) -> Result<T> {
        Err(MonikerError::GeneralResolution(msg.into()))
    }

    /// Ошибки активации на границе моникера превращаются в неизвестный префикс.
    pub fn from_activation(name: &str, err: ActivationError) -> Self {
        MonikerError::UnknownPrefix(format!("{}: {}", name, err))
    }

    pub fn is_unknown_prefix(&self) -> bool {
        matches!(self, MonikerError::UnknownPrefix(_))
    }

    pub fn is_interface_not_found(&self) -> bool {
        matches!(self, MonikerError::InterfaceNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, MonikerError>;

#[macro_export]
macro_rules! moniker_error {
    (unknown_prefix, $($arg:tt)*) => {
        $crate::error::MonikerError::UnknownPrefix(format!($($arg)*))
    };
    (interface_not_found, $($arg:tt)*) => {
        $crate::error::MonikerError::InterfaceNotFound(format!($($arg)*))
    };
    (general, $($arg:tt)*) => {
        $crate::error::MonikerError::GeneralResolution(format!($($arg)*))
    };
    (invalid_argument, $($arg:tt)*) => {
        $crate::error::MonikerError::InvalidArgument(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::MonikerError::Internal(format!($($arg)*))
    };
}
