//! Иерархический каталог имён: грамматика путей, контракт каталога,
//! каталог в памяти и URL-клиент для сервисов.

mod memory;
mod path;
mod r#trait;
mod url_directory;

pub use self::memory::{MemoryNamingContext, MemoryNamingService};
pub use self::path::{parse_path, Path, PathComponent};
pub use self::r#trait::{Binding, ContextRef, NamingContext, NamingError, NamingService};
pub use self::url_directory::UrlDirectory;
