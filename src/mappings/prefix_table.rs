use crate::object::{MONIKER_EXTENDER_REPO_ID, MONIKER_REPO_ID};

/// Буквальный префикс моникера и известный id активации, который его обслуживает.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixEntry {
    pub prefix: &'static str,
    pub iid: &'static str,
}

pub const ITEM_MONIKER_IID: &str = "OAFIID:MateComponent_Moniker_Item";
pub const OAF_MONIKER_IID: &str = "OAFIID:MateComponent_Moniker_Oaf";
pub const CACHE_MONIKER_IID: &str = "OAFIID:MateComponent_Moniker_Cache";
pub const QUERY_MONIKER_IID: &str = "OAFIID:MateComponent_Moniker_Query";
pub const NEW_MONIKER_IID: &str = "OAFIID:MateComponent_Moniker_New";
pub const CONFIG_MONIKER_IID: &str = "OAFIID:MATE_Moniker_Config";

// Порядок важен: побеждает первое совпадение префикса без учёта регистра
pub const FAST_PREFIXES: &[PrefixEntry] = &[
    PrefixEntry { prefix: "!", iid: ITEM_MONIKER_IID },
    PrefixEntry { prefix: "OAFIID:", iid: OAF_MONIKER_IID },
    PrefixEntry { prefix: "OAFAID:", iid: OAF_MONIKER_IID },
    PrefixEntry { prefix: "cache:", iid: CACHE_MONIKER_IID },
    PrefixEntry { prefix: "query:(", iid: QUERY_MONIKER_IID },
    PrefixEntry { prefix: "new:", iid: NEW_MONIKER_IID },
    PrefixEntry { prefix: "conf:", iid: CONFIG_MONIKER_IID },
];

/// Как активируется сегмент: по id из быстрой таблицы или запросом
/// возможностей с префиксом схемы сегмента.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationTarget {
    Id(&'static str),
    Query(String),
}

impl ActivationTarget {
    pub fn for_segment(segment: &str) -> Self {
        match moniker_id_from_nickname(segment) {
            Some(iid) => ActivationTarget::Id(iid),
            None => {
                trace_if_enabled!("Нет быстрого префикса для '{}', используем запрос", segment);
                ActivationTarget::Query(query_from_name(segment))
            }
        }
    }
}

impl std::fmt::Display for ActivationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationTarget::Id(iid) => write!(f, "{}", iid),
            ActivationTarget::Query(query) => write!(f, "query \"{}\"", query),
        }
    }
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Быстрый путь: id активации для буквального префикса сегмента.
pub fn moniker_id_from_nickname(segment: &str) -> Option<&'static str> {
    FAST_PREFIXES
        .iter()
        .find(|entry| has_prefix_ignore_case(segment, entry.prefix))
        .map(|entry| entry.iid)
}

/// Префикс схемы сегмента: до первого `:` включительно, либо весь сегмент,
/// если двоеточия нет.
pub fn scheme_prefix(segment: &str) -> &str {
    match segment.find(':') {
        Some(idx) => &segment[..=idx],
        None => segment,
    }
}

/// Медленный путь: запрос любого компонента-моникера, объявившего префикс.
pub fn query_from_name(segment: &str) -> String {
    format!(
        "repo_ids.has ('{}') AND matecomponent:moniker.has ('{}')",
        MONIKER_REPO_ID,
        scheme_prefix(segment)
    )
}

/// Запрос расширителей, зарегистрированных для префикса моникера.
pub fn extender_query(prefix: &str) -> String {
    format!(
        "repo_ids.has ('{}') AND matecomponent:moniker_extender.has ('{}')",
        MONIKER_EXTENDER_REPO_ID, prefix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_prefixes() {
        assert_eq!(moniker_id_from_nickname("new:"), Some(NEW_MONIKER_IID));
        assert_eq!(moniker_id_from_nickname("!item"), Some(ITEM_MONIKER_IID));
        assert_eq!(moniker_id_from_nickname("query:(repo_ids.has('x'))"), Some(QUERY_MONIKER_IID));
        assert_eq!(moniker_id_from_nickname("OAFAID:[a,b]"), Some(OAF_MONIKER_IID));
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(moniker_id_from_nickname("CACHE:"), Some(CACHE_MONIKER_IID));
        assert_eq!(moniker_id_from_nickname("oafiid:Foo"), Some(OAF_MONIKER_IID));
    }

    #[test]
    fn partial_prefix_does_not_match() {
        assert_eq!(moniker_id_from_nickname("query:"), None);
        assert_eq!(moniker_id_from_nickname("ne"), None);
    }

    #[test]
    fn unmatched_segment_builds_query() {
        let target = ActivationTarget::for_segment("myscheme:foo");
        match target {
            ActivationTarget::Query(q) => {
                assert!(q.contains("matecomponent:moniker.has ('myscheme:')"));
                assert!(q.contains(MONIKER_REPO_ID));
            }
            other => panic!("expected a query, got {:?}", other),
        }
        assert_eq!(ActivationTarget::for_segment("new:"), ActivationTarget::Id(NEW_MONIKER_IID));
    }

    #[test]
    fn scheme_prefix_without_colon_is_whole_segment() {
        assert_eq!(scheme_prefix("plainname"), "plainname");
        assert_eq!(scheme_prefix("file:/a:b"), "file:");
    }
}
