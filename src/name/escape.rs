use super::is_reserved;
use tracing::warn;

/// Экранировать все зарезервированные символы `s` начиная с `offset`.
///
/// `None`, если `offset` вне строки: это ошибка вызывающего кода.
pub fn escape(s: &str, offset: usize) -> Option<String> {
    if offset >= s.len() || !s.is_char_boundary(offset) {
        warn!("escape вызван со смещением {} для имени длиной {} байт", offset, s.len());
        return None;
    }

    let tail = &s[offset..];
    let reserved = tail.bytes().filter(|&b| is_reserved(b)).count();
    if reserved == 0 {
        return Some(tail.to_string());
    }

    let mut escaped = String::with_capacity(tail.len() + reserved);
    for c in tail.chars() {
        if c.is_ascii() && is_reserved(c as u8) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Some(escaped)
}

/// Экранировать строку целиком; пустая строка остаётся пустой.
pub fn escape_all(s: &str) -> String {
    escape(s, 0).unwrap_or_default()
}

/// Снять экранирование с первых `n` байт `s`, убирая обратный слэш перед
/// экранированным символом. Останавливается на встроенном NUL.
pub fn unescape(s: &str, n: usize) -> String {
    let bytes = s.as_bytes();
    let n = n.min(bytes.len());
    let mut out = Vec::with_capacity(n);

    let mut i = 0;
    while i < n {
        match bytes[i] {
            0 => break,
            b'\\' => {
                i += 1;
                match bytes.get(i) {
                    None | Some(0) => break,
                    Some(&b) => out.push(b),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
