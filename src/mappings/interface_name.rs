const IDL_PREFIX: &str = "IDL:";
const DEFAULT_VERSION: &str = ":1.0";

/// Развернуть `MateComponent/Control` в `IDL:MateComponent/Control:1.0`.
///
/// Префикс `IDL:` не дублируется; версия добавляется, только если после
/// префикса нет `:`.
pub fn full_interface_name(name: &str) -> String {
    let bare = name.strip_prefix(IDL_PREFIX).unwrap_or(name);
    let mut full = String::with_capacity(IDL_PREFIX.len() + bare.len() + DEFAULT_VERSION.len());
    full.push_str(IDL_PREFIX);
    full.push_str(bare);
    if !bare.contains(':') {
        full.push_str(DEFAULT_VERSION);
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_gets_prefix_and_version() {
        assert_eq!(full_interface_name("MateComponent/Control"), "IDL:MateComponent/Control:1.0");
    }

    #[test]
    fn qualified_name_is_unchanged() {
        assert_eq!(
            full_interface_name("IDL:MateComponent/Stream:2.0"),
            "IDL:MateComponent/Stream:2.0"
        );
    }

    #[test]
    fn prefixed_name_without_version_gets_version() {
        assert_eq!(full_interface_name("IDL:Foo/Bar"), "IDL:Foo/Bar:1.0");
        assert_eq!(full_interface_name("Foo/Bar:3.1"), "IDL:Foo/Bar:3.1");
    }
}
