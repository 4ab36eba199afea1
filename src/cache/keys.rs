//! Cache key construction.
//!
//! Keys are stable, human-debuggable strings; two requests with identical
//! components always hash out to the same key.

use std::fmt;

use crate::domain::types::Language;

/// Operation families a key can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    List,
    Item,
    Set,
    Almanax,
    AlmanaxRange,
}

impl KeyScope {
    fn as_str(self) -> &'static str {
        match self {
            KeyScope::List => "list",
            KeyScope::Item => "item",
            KeyScope::Set => "set",
            KeyScope::Almanax => "almanax",
            KeyScope::AlmanaxRange => "almanax-range",
        }
    }
}

impl fmt::Display for KeyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the cache key for a search (list) call.
pub fn list_key(entity: &str, query: &str, language: Language, source: &str) -> String {
    compose(KeyScope::List, entity, query, language, source)
}

/// Build the cache key for a detail (by-id or by-date) call.
pub fn item_key(scope: KeyScope, entity: &str, query: &str, language: Language, source: &str) -> String {
    compose(scope, entity, query, language, source)
}

fn compose(scope: KeyScope, entity: &str, query: &str, language: Language, source: &str) -> String {
    format!("{scope}/{entity}/{query}/{}/{source}", language.source_code())
}
