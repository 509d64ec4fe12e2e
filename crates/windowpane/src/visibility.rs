//! Window visibility predicates over named session flags.
//!
//! A predicate like `"lights_on,!door_open"` is resolved to flag ids once, at
//! construction, and evaluated every update as an AND over its terms.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlagId(pub u32);

/// Flag lookup provided by the host session.
pub trait FlagSource {
    /// Intern `name`, creating an unset flag if it was never seen.
    fn resolve(&mut self, name: &str) -> FlagId;

    fn value(&self, flag: FlagId) -> bool;
}

/// Default [`FlagSource`]: interned flag names with boolean values, all unset to start.
#[derive(Clone, Debug, Default)]
pub struct SessionFlags {
    ids: HashMap<String, FlagId>,
    values: Vec<bool>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: bool) {
        let id = self.resolve(name);
        self.values[id.0 as usize] = value;
    }

    pub fn get(&self, name: &str) -> bool {
        self.ids.get(name).is_some_and(|id| self.value(*id))
    }
}

impl FlagSource for SessionFlags {
    fn resolve(&mut self, name: &str) -> FlagId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = FlagId(self.values.len() as u32);
        self.values.push(false);
        self.ids.insert(name.to_string(), id);
        id
    }

    fn value(&self, flag: FlagId) -> bool {
        self.values.get(flag.0 as usize).copied().unwrap_or(false)
    }
}

/// Compiled AND of `(flag, negate)` terms. No terms means always visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagPredicate {
    terms: Vec<(FlagId, bool)>,
}

impl FlagPredicate {
    /// Compile a comma-separated flag list; a leading `!` negates a flag.
    pub fn compile(list: &str, flags: &mut impl FlagSource) -> Self {
        let terms = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| match name.strip_prefix('!') {
                Some(rest) if rest.trim().is_empty() => None,
                Some(rest) => Some((flags.resolve(rest.trim()), true)),
                None => Some((flags.resolve(name), false)),
            })
            .collect();
        Self { terms }
    }

    pub fn evaluate(&self, flags: &impl FlagSource) -> bool {
        self.terms
            .iter()
            .all(|&(flag, negate)| flags.value(flag) != negate)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
