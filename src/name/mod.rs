//! Грамматика имён моникеров: `segment (SEP segment)*`, где `SEP` - `!` или `#`.
//!
//! Зарезервированные символы `\`, `#` и `!` экранируются обратным слэшем.
//! Всё здесь работает с байтами; зарезервированные символы - ASCII,
//! поэтому любая точка разреза совпадает с границей символа.

mod escape;
mod parse;
mod separator;

pub use escape::{escape, escape_all, unescape};
pub use parse::{parse_name, ParsedName};
pub use separator::seek_separator;

pub(crate) fn is_separator(b: u8) -> bool {
    b == b'!' || b == b'#'
}

pub(crate) fn is_reserved(b: u8) -> bool {
    b == b'\\' || is_separator(b)
}
