use super::is_separator;
use tracing::warn;

/// Найти первый неэкранированный `!` или `#` начиная с `min_idx`.
///
/// Возвращает индекс разделителя или `s.len()`, если его нет. Все байты до
/// `min_idx` должны существовать и быть не NUL; иначе возвращается индекс
/// первого нарушения.
pub fn seek_separator(s: &str, min_idx: usize) -> usize {
    let bytes = s.as_bytes();

    for i in 0..min_idx {
        if bytes.get(i).map_or(true, |&b| b == 0) {
            warn!("Серьёзная ошибка разделителя: поиск в '{}' < {}", s, min_idx);
            return i;
        }
    }

    let mut i = min_idx;
    while i < bytes.len() {
        match bytes[i] {
            0 => break,
            b'\\' if i + 1 < bytes.len() && bytes[i + 1] != 0 => i += 1,
            b if is_separator(b) => break,
            _ => {}
        }
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_escaped_separators() {
        let s = r"abc\!def!ghi";
        assert_eq!(seek_separator(s, 0), 8);
        assert_eq!(&s[8..9], "!");
    }

    #[test]
    fn stops_at_hash() {
        assert_eq!(seek_separator("file:/a#gzip:", 0), 7);
    }

    #[test]
    fn returns_length_without_separator() {
        assert_eq!(seek_separator("file:/tmp/a.jpeg", 0), 16);
        assert_eq!(seek_separator("", 0), 0);
    }

    #[test]
    fn min_idx_skips_leading_separator() {
        assert_eq!(seek_separator("!item!next", 0), 0);
        assert_eq!(seek_separator("!item!next", 1), 5);
    }

    #[test]
    fn min_idx_past_end_is_tolerated() {
        assert_eq!(seek_separator("ab", 5), 2);
        assert_eq!(seek_separator("a\0b", 3), 1);
    }
}
