use super::is_separator;

/// Крайний правый сегмент имени моникера и длина его родителя.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName<'a> {
    /// Экранированный локальный сегмент. Разделитель `!` остаётся в сегменте,
    /// `#` - нет.
    pub segment: &'a str,
    /// Байты имени до разделителя; 0 - родителя нет.
    pub parent_len: usize,
}

impl<'a> ParsedName<'a> {
    pub fn has_parent(&self) -> bool {
        self.parent_len > 0
    }
}

/// Разделить `name` на крайний правый сегмент и префикс-родителя.
///
/// Для `file:/tmp.txt#cache:` получаем сегмент `cache:` и длину родителя 13.
/// Разделитель экранирован, если перед ним нечётное число обратных слэшей;
/// такие разделители пропускаются, сканирование идёт дальше влево.
pub fn parse_name(name: &str) -> ParsedName<'_> {
    let bytes = name.as_bytes();
    let mut i = bytes.len();

    while i > 0 {
        i -= 1;
        let b = bytes[i];
        if !is_separator(b) {
            continue;
        }

        let segment = if b == b'!' { &name[i..] } else { &name[i + 1..] };

        // `!!`, `#!` и т.п., либо разделитель в начале имени
        if i == 0 || is_separator(bytes[i - 1]) {
            return ParsedName { segment, parent_len: i };
        }

        let backslashes = bytes[..i].iter().rev().take_while(|&&c| c == b'\\').count();
        if backslashes % 2 == 0 {
            return ParsedName { segment, parent_len: i };
        }
        i -= backslashes;
    }

    ParsedName { segment: name, parent_len: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_last_hash() {
        let name = "file:/tmp/a.tar.gz#gzip:#tar:";
        let parsed = parse_name(name);
        assert_eq!(parsed.segment, "tar:");
        assert_eq!(parsed.parent_len, name.rfind('#').unwrap());
        assert_eq!(&name[..parsed.parent_len], "file:/tmp/a.tar.gz#gzip:");
    }

    #[test]
    fn cache_example_parent_length() {
        let parsed = parse_name("file:/tmp.txt#cache:");
        assert_eq!(parsed.segment, "cache:");
        assert_eq!(parsed.parent_len, 13);
    }

    #[test]
    fn escaped_hash_is_not_a_separator() {
        let name = r"a\#b!c";
        let parsed = parse_name(name);
        assert_eq!(parsed.segment, "!c");
        assert_eq!(&name[..parsed.parent_len], r"a\#b");
    }

    #[test]
    fn double_backslash_leaves_separator_live() {
        let name = r"a\\#b";
        let parsed = parse_name(name);
        assert_eq!(parsed.segment, "b");
        assert_eq!(&name[..parsed.parent_len], r"a\\");
    }

    #[test]
    fn fully_escaped_name_is_one_segment() {
        let parsed = parse_name(r"\#a\!b");
        assert_eq!(parsed.segment, r"\#a\!b");
        assert!(!parsed.has_parent());
    }

    #[test]
    fn no_separator_means_no_parent() {
        let parsed = parse_name("file:/tmp/a.jpeg");
        assert_eq!(parsed.segment, "file:/tmp/a.jpeg");
        assert_eq!(parsed.parent_len, 0);
    }

    #[test]
    fn leading_or_adjacent_separators_stop_the_scan() {
        let parsed = parse_name("!item");
        assert_eq!(parsed.segment, "!item");
        assert_eq!(parsed.parent_len, 0);

        let parsed = parse_name("abc#!x");
        assert_eq!(parsed.segment, "!x");
        assert_eq!(parsed.parent_len, 4);
    }
}
