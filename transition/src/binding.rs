// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Program variables and the symbols derived from them.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use formula::{
    context::Context,
    syntax::{Sort, Term},
};

/// A program variable. Its symbol (with the same name) denotes its value in
/// the pre-state of a transition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    name: String,
    sort: Sort,
}

impl Var {
    /// The name of the variable, which is also its pre-state symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sort of the variable.
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// The pre-state symbol as a term.
    pub fn term(&self) -> Term {
        Term::id(&self.name)
    }
}

impl From<&Var> for Term {
    fn from(var: &Var) -> Self {
        var.term()
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The symbols of one analysis: a [`Context`] of declared symbols plus the
/// registry of which of them are program variables, and the memoized post
/// symbol of each variable.
///
/// Like [`Context`] this only needs a shared borrow to be extended.
#[derive(Debug, Default)]
pub struct Vocabulary {
    ctx: Context,
    vars: RefCell<BTreeMap<String, Var>>,
    /// post symbol ↦ variable
    posts: RefCell<HashMap<String, Var>>,
}

impl Vocabulary {
    /// An empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbol context.
    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Declare a program variable. Declaring it again returns the same
    /// variable.
    pub fn var(&self, name: &str, sort: Sort) -> Var {
        self.ctx.declare(name, sort);
        let var = Var {
            name: name.to_string(),
            sort,
        };
        self.vars
            .borrow_mut()
            .insert(name.to_string(), var.clone());
        var
    }

    /// The program variable whose pre-state symbol is `name`.
    pub fn var_of_symbol(&self, name: &str) -> Option<Var> {
        self.vars.borrow().get(name).cloned()
    }

    /// Whether `name` is the symbol of a program variable.
    pub fn is_var(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }

    /// All program variables, in name order.
    pub fn vars(&self) -> Vec<Var> {
        self.vars.borrow().values().cloned().collect()
    }

    /// The canonical post-state symbol of `var`, normally `var'`. The same
    /// variable always gets the same symbol; if `var'` is already taken by an
    /// unrelated symbol, a fresh variant is chosen once.
    pub fn post_symbol(&self, var: &Var) -> String {
        let name = self.ctx.memo(
            &format!("post {}", var.name),
            &format!("{}'", var.name),
            var.sort,
        );
        self.posts
            .borrow_mut()
            .entry(name.clone())
            .or_insert_with(|| var.clone());
        name
    }

    /// The canonical post-state symbol of `var` as a term.
    pub fn post_term(&self, var: &Var) -> Term {
        Term::id(&self.post_symbol(var))
    }

    /// The variable whose canonical post symbol is `name`.
    pub fn var_of_post(&self, name: &str) -> Option<Var> {
        self.posts.borrow().get(name).cloned()
    }

    /// A fresh auxiliary symbol. It is never a program variable.
    pub fn fresh(&self, base: &str, sort: Sort) -> Term {
        self.ctx.fresh(base, sort)
    }

    /// The sort of a declared symbol.
    ///
    /// Panics if `name` was never declared.
    pub fn sort_of(&self, name: &str) -> Sort {
        self.ctx
            .sort_of(name)
            .unwrap_or_else(|| panic!("symbol {name} is not declared"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_symbols_are_memoized() {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        assert_eq!(voc.var("x", Sort::Int), x);
        assert_eq!(voc.post_symbol(&x), "x'");
        assert_eq!(voc.post_symbol(&x), "x'");
        assert_eq!(voc.var_of_post("x'"), Some(x.clone()));
        assert!(voc.is_var("x"));
        assert!(!voc.is_var("x'"));
    }

    #[test]
    fn test_post_symbol_avoids_taken_name() {
        let voc = Vocabulary::new();
        // an unrelated variable already called y'
        let y_prime = voc.var("y'", Sort::Int);
        let y = voc.var("y", Sort::Int);
        let post = voc.post_symbol(&y);
        assert_ne!(post, y_prime.name());
        assert!(post.starts_with("y'!"));
        assert_eq!(voc.post_symbol(&y), post);
        assert_eq!(voc.var_of_post(&post), Some(y));
    }

    #[test]
    fn test_fresh_is_not_a_var() {
        let voc = Vocabulary::new();
        voc.var("x", Sort::Int);
        let h = voc.fresh("x", Sort::Int);
        let name = h.as_id().unwrap();
        assert!(!voc.is_var(name));
        assert_eq!(voc.sort_of(name), Sort::Int);
        assert_eq!(voc.vars().len(), 1);
    }
}
