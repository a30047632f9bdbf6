pub mod activation;
pub mod async_context;
pub mod extender;
pub mod moniker;
pub mod naming;
pub mod resolver;

pub use extender::MonikerExtender;
pub use moniker::{register_builtin_monikers, Moniker, MonikerKind};
pub use resolver::Resolver;
