pub mod interface_name;
pub mod prefix_table;

pub use interface_name::full_interface_name;
pub use prefix_table::{
    extender_query, moniker_id_from_nickname, query_from_name, ActivationTarget, PrefixEntry,
    FAST_PREFIXES,
};
