use super::MonikerKind;
use crate::error::{MonikerError, Result};
use crate::name::{escape, parse_name, seek_separator, unescape};
use crate::object::{ObjectRef, ResolveOptions, Unknown, MONIKER_REPO_ID};
use crate::services::{extender, Resolver};
use crate::moniker_error;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Узел цепочки моникеров.
///
/// Узел владеет своим неэкранированным локальным сегментом и счётной ссылкой
/// на родителя. `set_name` строит цепочку от корня к листу, поэтому родитель
/// никогда не ссылается на потомка.
pub struct Moniker {
    prefix: Option<String>,
    case_sensitive: bool,
    name: RwLock<String>,
    parent: RwLock<Option<Arc<Moniker>>>,
    kind: Box<dyn MonikerKind>,
}

impl Moniker {
    pub fn new(kind: impl MonikerKind + 'static) -> Self {
        Self {
            prefix: None,
            case_sensitive: true,
            name: RwLock::new(String::new()),
            parent: RwLock::new(None),
            kind: Box::new(kind),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, kind: impl MonikerKind + 'static) -> Self {
        let mut moniker = Self::new(kind);
        moniker.prefix = Some(prefix.into());
        moniker
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix.as_ref().map_or(0, String::len)
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn parent(&self) -> Option<Arc<Moniker>> {
        self.parent.read().clone()
    }

    /// Заменить родителя; предыдущий освобождается.
    pub fn set_parent(&self, parent: Option<Arc<Moniker>>) {
        let old = std::mem::replace(&mut *self.parent.write(), parent);
        drop(old);
    }

    /// Неэкранированный локальный сегмент вместе с префиксом.
    pub fn local_name(&self) -> String {
        self.name.read().clone()
    }

    pub fn internal_name(&self) -> String {
        self.kind.internal_name(self)
    }

    pub fn set_internal_name(&self, unescaped: &str) -> Result<()> {
        self.kind.set_internal_name(self, unescaped)
    }

    pub(crate) fn store_local_name(&self, unescaped: String) -> Result<()> {
        if unescaped.len() < self.prefix_len() {
            return Err(moniker_error!(
                invalid_argument,
                "'{}' короче префикса моникера '{}'",
                unescaped,
                self.prefix().unwrap_or("")
            ));
        }
        *self.name.write() = unescaped;
        Ok(())
    }

    fn is_item_segment(&self) -> bool {
        self.name.read().starts_with('!')
    }

    /// Локальный сегмент в экранированном виде; префикс копируется как есть.
    pub fn escaped_local_name(&self) -> String {
        let name = self.name.read();
        let mut prefix_len = self.prefix_len().min(name.len());
        if !name.is_char_boundary(prefix_len) {
            prefix_len = 0;
        }
        let mut escaped = name[..prefix_len].to_string();
        // ✅ Голый префикс (`cache:`, `tar:`) - экранировать нечего
        if prefix_len < name.len() {
            if let Some(rest) = escape(&name, prefix_len) {
                escaped.push_str(&rest);
            }
        }
        escaped
    }

    /// Полное экранированное имя цепочки, заканчивающейся этим узлом.
    pub fn name(&self) -> String {
        let local = self.escaped_local_name();
        match self.parent() {
            Some(parent) if local.starts_with('!') => format!("{}{}", parent.name(), local),
            Some(parent) => format!("{}#{}", parent.name(), local),
            None => local,
        }
    }

    /// Полное имя цепочки родителя, если он есть.
    pub fn parent_name(&self) -> Option<String> {
        self.parent().map(|parent| parent.name())
    }

    /// Отрезать крайний правый сегмент `name`, построить цепочку родителя
    /// для остатка и сохранить сегмент в этом узле.
    pub fn set_name(self: &Arc<Self>, resolver: &Resolver, name: &str) -> Result<()> {
        let parsed = parse_name(name);
        let local = unescape(parsed.segment, parsed.segment.len());
        self.check_local(&local)?;

        if parsed.has_parent() {
            let parent = resolver.new_from_name(&name[..parsed.parent_len])?;
            self.set_parent(Some(parent));
        }
        self.store_local_name(local)
    }

    pub async fn set_name_async(self: &Arc<Self>, resolver: &Resolver, name: &str) -> Result<()> {
        let parsed = parse_name(name);
        let local = unescape(parsed.segment, parsed.segment.len());
        self.check_local(&local)?;

        if parsed.has_parent() {
            let parent = resolver.new_from_name_async(&name[..parsed.parent_len]).await?;
            self.set_parent(Some(parent));
        }
        self.store_local_name(local)
    }

    fn check_local(&self, local: &str) -> Result<()> {
        if local.len() < self.prefix_len() {
            return Err(moniker_error!(invalid_argument, "у сегмента '{}' нет префикса", local));
        }
        Ok(())
    }

    /// Разрешить цепочку в `repo_id`: сначала свой вариант, затем расширитель,
    /// зарегистрированный для префикса.
    pub fn resolve(self: &Arc<Self>, resolver: &Resolver, options: &ResolveOptions, repo_id: &str) -> Result<ObjectRef> {
        debug_if_enabled!("Разрешение '{}' в {}", self.name(), repo_id);

        if let Some(object) = self.kind.resolve(self, resolver, options, repo_id)? {
            return Ok(object);
        }
        if let Some(prefix) = self.prefix() {
            if let Some(object) = extender::resolve_with_extender(resolver, self, prefix, options, repo_id)? {
                return Ok(object);
            }
        }
        Err(self.exhausted())
    }

    pub async fn resolve_async(
        self: &Arc<Self>,
        resolver: &Resolver,
        options: &ResolveOptions,
        repo_id: &str,
    ) -> Result<ObjectRef> {
        debug_if_enabled!("Разрешение '{}' в {} (async)", self.name(), repo_id);

        if let Some(object) = self.kind.resolve_async(self, resolver, options, repo_id).await? {
            return Ok(object);
        }
        if let Some(prefix) = self.prefix() {
            let extended =
                extender::resolve_with_extender_async(resolver, self, prefix, options, repo_id).await?;
            if let Some(object) = extended {
                return Ok(object);
            }
        }
        Err(self.exhausted())
    }

    fn exhausted(&self) -> MonikerError {
        moniker_error!(general, "Failed to resolve, or extend '{}'", self.name())
    }

    /// Сопоставить `candidate` с цепочкой, начиная с корня.
    ///
    /// Возвращает число байт `candidate`, покрытых цепочкой, или 0, если
    /// какой-либо узел отличается.
    pub fn equal(&self, candidate: &str) -> usize {
        let mut offset = 0;
        if let Some(parent) = self.parent() {
            offset = parent.equal(candidate);
            if offset == 0 {
                return 0;
            }
            // `#` соединяет сегмент с родителем, но не входит в сегмент
            if !self.is_item_segment() && candidate.as_bytes().get(offset) == Some(&b'#') {
                offset += 1;
            }
        }

        let rest = candidate.get(offset..).unwrap_or("");
        let own = self.escaped_local_name();
        let len = seek_separator(rest, self.prefix_len().min(rest.len()));
        let scanned = &rest.as_bytes()[..len];

        let same = if self.case_sensitive {
            scanned == own.as_bytes()
        } else {
            scanned.eq_ignore_ascii_case(own.as_bytes())
        };

        if same {
            offset + len
        } else {
            0
        }
    }

    /// Называет ли `candidate` ровно эту цепочку.
    pub fn matches(&self, candidate: &str) -> bool {
        self.equal(candidate) == candidate.len() && !candidate.is_empty()
    }
}

impl Unknown for Moniker {
    fn implements(&self, repo_id: &str) -> bool {
        repo_id == MONIKER_REPO_ID
    }

    fn as_moniker(self: Arc<Self>) -> Option<Arc<Moniker>> {
        Some(self)
    }
}

impl fmt::Debug for Moniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Moniker")
            .field("name", &self.name())
            .field("prefix", &self.prefix)
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

impl fmt::Display for Moniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
