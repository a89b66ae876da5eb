// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Widening of transitions through an abstract domain.

use std::collections::{BTreeMap, BTreeSet};

use formula::syntax::Term;
use solver::SolverConf;

use crate::{
    binding::{Var, Vocabulary},
    domain::AbstractDomain,
    error::QueryError,
    transition::{Transition, TransitionFormula},
};

impl Transition {
    /// An upper bound of `self` and `other` that stabilizes along increasing
    /// chains, computed in `domain`.
    ///
    /// Both sides are abstracted as relations between the pre-state symbols
    /// and one shared post symbol per variable that either side writes. The
    /// result is in normalized form.
    pub fn widen<D>(
        &self,
        other: &Transition,
        voc: &Vocabulary,
        conf: &SolverConf,
        domain: &D,
    ) -> Result<Transition, QueryError>
    where
        D: AbstractDomain,
    {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }
        let vars: BTreeSet<Var> = self.defines().into_iter().chain(other.defines()).collect();
        let mut posts: BTreeMap<Var, String> = BTreeMap::new();
        let mut reused = BTreeSet::new();
        for v in &vars {
            let bare = |t: &Transition| {
                t.get_transform(v)
                    .and_then(|t| t.as_id())
                    .filter(|s| !voc.is_var(s))
                    .map(|s| s.to_string())
            };
            let post = match (bare(self), bare(other)) {
                (Some(a), Some(b)) if a == b => {
                    reused.insert(a.clone());
                    a
                }
                _ => voc.post_symbol(v),
            };
            posts.insert(v.clone(), post);
        }
        // auxiliary symbols that would be captured by a post symbol
        let targets: BTreeSet<&String> = posts.values().filter(|p| !reused.contains(*p)).collect();
        let relation = |t: &Transition| {
            let taken: Vec<String> = t
                .aux_symbols(voc)
                .into_iter()
                .filter(|s| targets.contains(s))
                .collect();
            let t = t.refresh(voc, &taken);
            let equations = posts
                .iter()
                .map(|(v, post)| Term::equals(Term::id(post), t.value_of(v)));
            Term::and([t.guard().clone()].into_iter().chain(equations))
        };
        let symbols: BTreeSet<&str> = posts.values().map(|p| p.as_str()).collect();
        let keep = |s: &str| voc.is_var(s) || symbols.contains(s);
        let a = domain.abstract_of(voc.ctx(), conf, &relation(self), keep)?;
        let b = domain.abstract_of(voc.ctx(), conf, &relation(other), keep)?;
        let widened = domain.widen(&a, &b);
        log::debug!("widened to {}", domain.formula_of(&widened));
        Ok(Transition::of_transition_formula(&TransitionFormula {
            formula: domain.formula_of(&widened),
            symbols: posts.into_iter().collect(),
        }))
    }
}
