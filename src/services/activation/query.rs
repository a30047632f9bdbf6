use super::{ActivationError, ServerInfo};
use std::iter::Peekable;
use std::str::Chars;

/// Один конъюнкт запроса активации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// `field.has ('value')`
    Has { field: String, value: String },
    /// `field == 'value'`
    Equals { field: String, value: String },
}

/// Разобранный запрос возможностей: должны выполняться все требования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationQuery {
    requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Dot,
    LParen,
    RParen,
    EqEq,
    And,
}

impl ActivationQuery {
    pub fn parse(query: &str) -> Result<Self, ActivationError> {
        let tokens = tokenize(query)?;
        let mut tokens = tokens.into_iter().peekable();
        let mut requirements = Vec::new();

        loop {
            requirements.push(parse_requirement(&mut tokens, query)?);
            match tokens.next() {
                None => break,
                Some(Token::And) => continue,
                Some(other) => {
                    return Err(ActivationError::InvalidQuery(format!(
                        "неожиданный {:?} в '{}'",
                        other, query
                    )))
                }
            }
        }

        Ok(Self { requirements })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn matches(&self, info: &ServerInfo) -> bool {
        self.requirements.iter().all(|req| match req {
            Requirement::Has { field, value } => info.values(field).iter().any(|v| v == value),
            Requirement::Equals { field, value } if field == "iid" => info.iid() == value,
            Requirement::Equals { field, value } => {
                matches!(info.values(field), [single] if single == value)
            }
        })
    }
}

fn parse_requirement(
    tokens: &mut Peekable<std::vec::IntoIter<Token>>,
    query: &str,
) -> Result<Requirement, ActivationError> {
    let invalid = |what: &str| ActivationError::InvalidQuery(format!("{} в '{}'", what, query));

    let field = match tokens.next() {
        Some(Token::Ident(field)) => field,
        _ => return Err(invalid("ожидалось имя поля")),
    };

    match tokens.next() {
        Some(Token::Dot) => {
            match tokens.next() {
                Some(Token::Ident(method)) if method == "has" => {}
                _ => return Err(invalid("поддерживается только .has ()")),
            }
            if tokens.next() != Some(Token::LParen) {
                return Err(invalid("ожидалась '('"));
            }
            let value = match tokens.next() {
                Some(Token::Str(value)) => value,
                _ => return Err(invalid("ожидалось значение в кавычках")),
            };
            if tokens.next() != Some(Token::RParen) {
                return Err(invalid("ожидалась ')'"));
            }
            Ok(Requirement::Has { field, value })
        }
        Some(Token::EqEq) => match tokens.next() {
            Some(Token::Str(value)) => Ok(Requirement::Equals { field, value }),
            _ => Err(invalid("ожидалось значение в кавычках после '=='")),
        },
        _ => Err(invalid("expected '.has' or '=='")),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-')
}

fn tokenize(query: &str) -> Result<Vec<Token>, ActivationError> {
    let mut chars: Peekable<Chars<'_>> = query.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(ActivationError::InvalidQuery(format!("одиночный '=' в '{}'", query)));
                }
                tokens.push(Token::EqEq);
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(ActivationError::InvalidQuery(format!(
                                "незакрытая строка в '{}'",
                                query
                            )))
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if is_ident_char(c) => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                if ident.eq_ignore_ascii_case("and") {
                    tokens.push(Token::And);
                } else {
                    tokens.push(Token::Ident(ident));
                }
            }
            other => {
                return Err(ActivationError::InvalidQuery(format!(
                    "неожиданный символ '{}' в '{}'",
                    other, query
                )))
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::query_from_name;
    use crate::object::MONIKER_REPO_ID;

    fn file_moniker_info() -> ServerInfo {
        ServerInfo::new("OAFIID:Test_Moniker_File")
            .with_repo_id(MONIKER_REPO_ID)
            .with_property("matecomponent:moniker", &["file:", "path:"])
    }

    #[test]
    fn parses_generated_moniker_query() {
        let query = ActivationQuery::parse(&query_from_name("file:/tmp/a")).unwrap();
        assert_eq!(
            query.requirements(),
            &[
                Requirement::Has { field: "repo_ids".into(), value: MONIKER_REPO_ID.into() },
                Requirement::Has { field: "matecomponent:moniker".into(), value: "file:".into() },
            ]
        );
        assert!(query.matches(&file_moniker_info()));
    }

    #[test]
    fn unmatched_property_fails() {
        let query = ActivationQuery::parse(&query_from_name("http://x")).unwrap();
        assert!(!query.matches(&file_moniker_info()));
    }

    #[test]
    fn iid_equality() {
        let query = ActivationQuery::parse("iid == 'OAFIID:Test_Moniker_File'").unwrap();
        assert!(query.matches(&file_moniker_info()));
        let query = ActivationQuery::parse("iid == 'OAFIID:Other'").unwrap();
        assert!(!query.matches(&file_moniker_info()));
    }

    #[test]
    fn malformed_queries_are_rejected() {
        for bad in ["", "repo_ids.has", "repo_ids.has ('x'", "a = 'b'", "a.has ('x') OR b.has ('y')", "a.has ('x"] {
            assert!(
                matches!(ActivationQuery::parse(bad), Err(ActivationError::InvalidQuery(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
