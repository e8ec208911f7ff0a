// src/rename.rs
//! Identifier renaming with per-scope, collision-free name maps.
//!
//! A [`Renamer`] owns the monotonically increasing counter for one unit, so
//! generated names are never handed out twice, even across unrelated scopes.
//! Each [`Scope`] owns its own [`NameMap`]; once an identifier is mapped in a
//! scope, the mapping is stable until the scope is dropped.

use crate::lang::{Lang, ReservedWords};
use crate::matcher::Region;
use std::collections::{HashMap, HashSet};

/// Original identifier -> generated identifier, for one scope.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    forward: HashMap<String, String>,
}

impl NameMap {
    #[must_use]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.forward.get(original).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// A bounded region over which renaming is kept consistent.
#[derive(Debug, Clone)]
pub struct Scope {
    pub region: Region,
    pub names: NameMap,
}

impl Scope {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            names: NameMap::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renamer {
    prefix: &'static str,
    reserved: ReservedWords,
    counter: u64,
    taken: HashSet<String>,
}

impl Renamer {
    #[must_use]
    pub fn new(lang: Lang, counter_start: u64) -> Self {
        Self {
            prefix: lang.rename_prefix(),
            reserved: ReservedWords::for_lang(lang),
            counter: counter_start,
            taken: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_reserved(mut self, reserved: ReservedWords) -> Self {
        self.reserved = reserved;
        self
    }

    /// Marks names already present in the source so they are never generated.
    pub fn avoid<I, S>(&mut self, existing: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(existing.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn is_reserved(&self, ident: &str) -> bool {
        self.reserved.contains(ident)
    }

    /// Maps `ident` within `scope`. Reserved words come back unchanged.
    pub fn rename(&mut self, scope: &mut Scope, ident: &str) -> String {
        if self.is_reserved(ident) {
            return ident.to_string();
        }
        if let Some(existing) = scope.names.get(ident) {
            return existing.to_string();
        }
        let fresh = self.fresh();
        scope.names.forward.insert(ident.to_string(), fresh.clone());
        fresh
    }

    /// Allocates the next unused generated name.
    pub fn fresh(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.prefix, self.counter);
            self.counter = self.counter.wrapping_add(1);
            if !self.taken.contains(&candidate) && !self.reserved.contains(&candidate) {
                self.taken.insert(candidate.clone());
                return candidate;
            }
        }
    }
}
