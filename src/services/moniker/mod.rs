//! Узел цепочки моникеров, трейт разрешения для вариантов и встроенные
//! варианты из таблицы быстрых префиксов.

pub mod builtin;
mod kind;
mod moniker;

pub use builtin::register_builtin_monikers;
pub use kind::MonikerKind;
pub use moniker::Moniker;
