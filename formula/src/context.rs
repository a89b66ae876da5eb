// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The symbol table: sorts of declared symbols and generation of fresh names.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::syntax::{Sort, Term};

#[derive(Debug, Default)]
struct Symbols {
    sorts: BTreeMap<String, Sort>,
    next: usize,
    memo: HashMap<String, String>,
}

/// Declared symbols and their sorts, plus a counter for fresh names.
///
/// A context is shared by reference between all the code working on one
/// family of formulas, so it uses interior mutability: declaring a symbol or
/// generating a fresh one only needs `&Context`.
#[derive(Debug, Default)]
pub struct Context {
    symbols: RefCell<Symbols>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with `sort` and return the symbol as a term.
    ///
    /// Declaring the same name twice with the same sort is a no-op; declaring
    /// it with a different sort is a programming error.
    pub fn declare(&self, name: &str, sort: Sort) -> Term {
        let mut symbols = self.symbols.borrow_mut();
        if let Some(old) = symbols.sorts.insert(name.to_string(), sort) {
            assert_eq!(old, sort, "symbol {name} redeclared with a different sort");
        }
        Term::id(name)
    }

    /// The sort of a declared symbol.
    pub fn sort_of(&self, name: &str) -> Option<Sort> {
        self.symbols.borrow().sorts.get(name).copied()
    }

    /// Whether `name` has been declared.
    pub fn is_declared(&self, name: &str) -> bool {
        self.symbols.borrow().sorts.contains_key(name)
    }

    /// All declared symbols, in name order.
    pub fn declarations(&self) -> Vec<(String, Sort)> {
        self.symbols
            .borrow()
            .sorts
            .iter()
            .map(|(name, sort)| (name.clone(), *sort))
            .collect()
    }

    /// Declare a fresh symbol derived from `base` (as `base!n`) and return its
    /// name. Any `!n` suffix already on `base` is replaced rather than
    /// extended.
    pub fn fresh_name(&self, base: &str, sort: Sort) -> String {
        let base = base.split('!').next().unwrap_or(base);
        let mut symbols = self.symbols.borrow_mut();
        loop {
            let name = format!("{base}!{}", symbols.next);
            symbols.next += 1;
            if !symbols.sorts.contains_key(&name) {
                symbols.sorts.insert(name.clone(), sort);
                return name;
            }
        }
    }

    /// Like [`Context::fresh_name`] but returning the symbol as a term.
    pub fn fresh(&self, base: &str, sort: Sort) -> Term {
        Term::Id(self.fresh_name(base, sort))
    }

    /// Return the symbol memoized under `key`, declaring a fresh one derived
    /// from `base` the first time the key is seen.
    pub fn memo(&self, key: &str, base: &str, sort: Sort) -> String {
        if let Some(name) = self.symbols.borrow().memo.get(key) {
            return name.clone();
        }
        let name = if self.is_declared(base) {
            self.fresh_name(base, sort)
        } else {
            self.declare(base, sort);
            base.to_string()
        };
        self.symbols
            .borrow_mut()
            .memo
            .insert(key.to_string(), name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_names_are_distinct() {
        let ctx = Context::new();
        ctx.declare("x", Sort::Int);
        let a = ctx.fresh_name("x", Sort::Int);
        let b = ctx.fresh_name(&a, Sort::Int);
        assert_ne!(a, b);
        assert!(b.starts_with("x!"));
        assert!(!b.starts_with(&format!("{a}!")));
        assert_eq!(ctx.sort_of(&b), Some(Sort::Int));
    }

    #[test]
    fn test_fresh_avoids_declared() {
        let ctx = Context::new();
        ctx.declare("y!0", Sort::Real);
        assert_eq!(ctx.fresh_name("y", Sort::Real), "y!1");
    }

    #[test]
    fn test_memo() {
        let ctx = Context::new();
        ctx.declare("x'", Sort::Int);
        let a = ctx.memo("post x", "x'", Sort::Int);
        let b = ctx.memo("post x", "x'", Sort::Int);
        assert_eq!(a, b);
        assert_ne!(a, "x'");
        assert_eq!(ctx.memo("post y", "y'", Sort::Int), "y'");
    }
}
