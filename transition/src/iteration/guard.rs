// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A convex summary of one step: hulls of its pre-states, of its
//! post-states, and of the differences `x' - x` it can make.
//!
//! Summing the difference constraints over `K` steps gives constraints on
//! the total difference, which hold of any `K >= 1` steps together with the
//! pre-state hull (at the start) and the post-state hull (at the end).

use std::collections::BTreeSet;

use formula::{
    linear::{Constraint, Polynomial},
    polyhedron::Polyhedron,
    syntax::Term,
};
use solver::SolverConf;

use crate::{
    binding::{Var, Vocabulary},
    domain::{polyhedral::Poly, AbstractDomain, Polyhedral},
    error::QueryError,
    iteration::{is_invariant, stay, IterationDomain},
    TransitionFormula,
};

/// The convex-hull iteration domain.
#[derive(Copy, Clone, Debug, Default)]
pub struct Guard;

/// The summary of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardIter {
    /// The step never executes
    Bottom,
    /// Hulls of a step
    Hull {
        /// Over variable symbols
        pre: Polyhedron,
        /// Over post symbols and invariant symbols
        post: Polyhedron,
        /// Over difference symbols and invariant symbols
        delta: Polyhedron,
        /// Each difference symbol with its variable
        deltas: Vec<(String, Var)>,
    },
}

fn hull(p: Poly) -> Option<Polyhedron> {
    match p {
        Poly::Bottom => None,
        Poly::Hull(p) => Some(p),
    }
}

impl IterationDomain for Guard {
    type Iter = GuardIter;

    fn abstract_iter(
        &self,
        voc: &Vocabulary,
        conf: &SolverConf,
        tf: &TransitionFormula,
    ) -> Result<GuardIter, QueryError> {
        let ctx = voc.ctx();
        let tracked = &tf.symbols;
        let Some(pre) = hull(Polyhedral.abstract_of(ctx, conf, &tf.formula, |s| voc.is_var(s))?)
        else {
            return Ok(GuardIter::Bottom);
        };
        let posts: BTreeSet<&str> = tracked.iter().map(|(_, post)| post.as_str()).collect();
        let Some(post) = hull(Polyhedral.abstract_of(ctx, conf, &tf.formula, |s| {
            posts.contains(s) || is_invariant(voc, tracked, s)
        })?) else {
            return Ok(GuardIter::Bottom);
        };
        let mut differences = vec![tf.formula.clone()];
        let mut deltas = vec![];
        for (v, post) in tracked {
            let d = ctx.fresh_name(&format!("delta_{}", v.name()), v.sort());
            differences.push(Term::equals(Term::id(&d), Term::sub(Term::id(post), v.term())));
            deltas.push((d, v.clone()));
        }
        let names: BTreeSet<&str> = deltas.iter().map(|(d, _)| d.as_str()).collect();
        let Some(delta) = hull(Polyhedral.abstract_of(ctx, conf, &Term::and(differences), |s| {
            names.contains(s) || is_invariant(voc, tracked, s)
        })?) else {
            return Ok(GuardIter::Bottom);
        };
        log::debug!("step hulls: pre {pre}, post {post}, delta {delta}");
        Ok(GuardIter::Hull {
            pre,
            post,
            delta,
            deltas,
        })
    }

    fn exp(&self, _voc: &Vocabulary, tracked: &[(Var, String)], k: &str, iter: &GuardIter) -> Term {
        let kt = Term::id(k);
        let none = Term::and([Term::equals(&kt, 0), stay(tracked)]);
        let GuardIter::Hull {
            pre,
            post,
            delta,
            deltas,
        } = iter
        else {
            return none;
        };
        // a difference symbol stands for x' - x
        let difference = |d: &str| -> Option<Polynomial> {
            let (_, v) = deltas.iter().find(|(name, _)| name == d)?;
            let (_, post) = tracked.iter().find(|(w, _)| w == v)?;
            Some(&Polynomial::var(post) - &Polynomial::var(v.name()))
        };
        let k = Polynomial::var(k);
        let sums = delta.constraints().iter().filter_map(|c| {
            // Σ over K steps of (a·δ + rest) is a·(x' - x) + K·rest
            let mut poly = &Polynomial::constant(c.poly.constant_part().clone()) * &k;
            for (m, a) in c.poly.terms() {
                let (ds, others): (Vec<&String>, Vec<&String>) =
                    m.iter().partition(|s| deltas.iter().any(|(d, _)| d == *s));
                let factor = Polynomial::monomial(others.into_iter().cloned().collect(), a.clone());
                let summed = match ds.as_slice() {
                    [] => &factor * &k,
                    [d] => &factor * &difference(d.as_str())?,
                    _ => return None,
                };
                poly = &poly + &summed;
            }
            Some(Constraint { poly, rel: c.rel }.to_term())
        });
        let steps = Term::and(
            [Term::geq(&kt, 1), pre.to_term(), post.to_term()]
                .into_iter()
                .chain(sums),
        );
        Term::or([none, steps])
    }
}

impl GuardIter {
    /// Whether the step never executes.
    pub fn is_bottom(&self) -> bool {
        match self {
            GuardIter::Bottom => true,
            GuardIter::Hull { pre, .. } => !pre.is_feasible(),
        }
    }
}
