// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Perform substitutions of Id terms by other terms.

use std::collections::HashMap;

use crate::syntax::Term;

/// A map from identifiers to Terms.
pub type Substitution = HashMap<String, Term>;

/// Perform a simultaneous substitution. Symbols without an entry are kept.
pub fn substitute(term: &Term, substitution: &Substitution) -> Term {
    if substitution.is_empty() {
        return term.clone();
    }
    map_ids(term, &mut |s| substitution.get(s).cloned())
}

/// Rename symbols. This is a substitution whose range is only symbols.
pub fn rename(term: &Term, renaming: &HashMap<String, String>) -> Term {
    if renaming.is_empty() {
        return term.clone();
    }
    map_ids(term, &mut |s| renaming.get(s).map(|n| Term::id(n)))
}

/// Rebuild `term`, replacing each `Id` for which `f` returns a term. The
/// result of `f` is not traversed again.
pub fn map_ids<F>(term: &Term, f: &mut F) -> Term
where
    F: FnMut(&str) -> Option<Term>,
{
    match term {
        Term::Literal(_) | Term::Num(_) => term.clone(),
        Term::Id(s) => f(s).unwrap_or_else(|| term.clone()),
        Term::UnaryOp(op, arg) => Term::UnaryOp(*op, Box::new(map_ids(arg, f))),
        Term::BinOp(op, arg1, arg2) => Term::BinOp(
            *op,
            Box::new(map_ids(arg1, f)),
            Box::new(map_ids(arg2, f)),
        ),
        Term::NAryOp(op, args) => Term::NAryOp(*op, args.iter().map(|a| map_ids(a, f)).collect()),
        Term::NumOp(op, x, y) => {
            Term::NumOp(*op, Box::new(map_ids(x, f)), Box::new(map_ids(y, f)))
        }
        Term::NumRel(rel, x, y) => {
            Term::NumRel(*rel, Box::new(map_ids(x, f)), Box::new(map_ids(y, f)))
        }
        Term::Ite { cond, then, else_ } => Term::Ite {
            cond: Box::new(map_ids(cond, f)),
            then: Box::new(map_ids(then, f)),
            else_: Box::new(map_ids(else_, f)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_is_simultaneous() {
        let t = Term::add(Term::id("x"), Term::id("y"));
        let subst: Substitution = [
            ("x".to_string(), Term::id("y")),
            ("y".to_string(), Term::add(Term::id("x"), 1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            substitute(&t, &subst),
            Term::add(Term::id("y"), Term::add(Term::id("x"), 1))
        );
    }

    #[test]
    fn test_rename() {
        let t = Term::lt(Term::id("x"), Term::id("z"));
        let renaming = [("x".to_string(), "x@1".to_string())].into_iter().collect();
        assert_eq!(rename(&t, &renaming), Term::lt(Term::id("x@1"), Term::id("z")));
    }
}
