use super::NamingError;
use smallvec::SmallVec;
use std::fmt;

/// Один шаг `id.kind` пути в каталоге имён.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathComponent {
    pub id: String,
    pub kind: String,
}

impl PathComponent {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { id: id.into(), kind: kind.into() }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}.{}", self.id, self.kind)
        }
    }
}

pub type Path = SmallVec<[PathComponent; 4]>;

/// Разобрать `a.kind/b/c` в компоненты имени.
///
/// `/` начинает новый компонент, первая `.` переключает с id на kind,
/// `\` берёт следующий `.`, `/` или `\` буквально. Пустые компоненты
/// отбрасываются.
pub fn parse_path(s: &str) -> Result<Path, NamingError> {
    let mut path = Path::new();
    let mut current = PathComponent::default();
    let mut in_kind = false;
    let mut used = false;

    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if in_kind {
                    return Err(NamingError::InvalidName(format!("second '.' in a component of '{}'", s)));
                }
                in_kind = true;
                used = true;
            }
            '/' => {
                if used {
                    path.push(std::mem::take(&mut current));
                }
                in_kind = false;
                used = false;
            }
            '\\' => {
                let escaped = match chars.next() {
                    Some(e @ ('.' | '/' | '\\')) => e,
                    _ => return Err(NamingError::InvalidName(format!("неверное экранирование в '{}'", s))),
                };
                // Экранированный символ дописывается, но компонент не открывает
                if in_kind {
                    current.kind.push(escaped);
                } else {
                    current.id.push(escaped);
                }
            }
            c => {
                if in_kind {
                    current.kind.push(c);
                } else {
                    current.id.push(c);
                }
                used = true;
            }
        }
    }

    if used {
        path.push(current);
    }
    Ok(path)
}
