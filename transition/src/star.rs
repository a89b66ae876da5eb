// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! An over-approximation of the reflexive-transitive closure of a
//! transition.

use formula::syntax::{Sort, Term};
use solver::SolverConf;

use crate::{
    binding::Vocabulary,
    error::QueryError,
    iteration::IterationDomain,
    transition::{Transition, TransitionFormula},
};

impl Transition {
    /// Any number of repetitions of this transition, summarized by `domain`.
    ///
    /// The result is in normalized form over the written variables, with a
    /// fresh integer symbol counting the repetitions.
    pub fn star<D>(&self, voc: &Vocabulary, conf: &SolverConf, domain: &D) -> Result<Transition, QueryError>
    where
        D: IterationDomain,
    {
        let tf = self.to_transition_formula(voc);
        let iter = domain.abstract_iter(voc, conf, &tf)?;
        log::debug!("star of {self}: {iter:?}");
        let k = voc.ctx().fresh_name("K", Sort::Int);
        let formula = Term::and([
            domain.exp(voc, &tf.symbols, &k, &iter),
            Term::geq(Term::id(&k), 0),
        ]);
        Ok(Transition::of_transition_formula(&TransitionFormula {
            formula,
            symbols: tf.symbols,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        binding::Vocabulary,
        iteration::{default_iteration, Guard, Solvable},
        transition::{is_unsat, Transition},
        Var,
    };
    use formula::syntax::{Sort, Term};
    use solver::SolverConf;

    fn setup() -> (Vocabulary, SolverConf, Var) {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        (voc, SolverConf::native(), x)
    }

    /// Whether `star` can take `x` from `from` to `to`.
    fn reaches(voc: &Vocabulary, conf: &SolverConf, star: &Transition, x: &Var, from: i64, to: i64) -> bool {
        let post = star.get_transform(x).cloned().unwrap_or_else(|| x.term());
        let q = Term::and([
            star.guard().clone(),
            Term::equals(x, from),
            Term::equals(post, to),
        ]);
        !is_unsat(voc, conf, &q).unwrap()
    }

    #[test_log::test]
    fn test_star_over_approximates_unrolling() {
        let (voc, conf, x) = setup();
        let body = Transition::assume(Term::lt(&x, 10)).mul(&Transition::assign(&x, Term::add(&x, 1)), &voc);
        let star = body.star(&voc, &conf, &default_iteration()).unwrap();
        // every unrolling of the loop is included
        let mut unrolled = Transition::one();
        for i in 0..=3 {
            let image = unrolled.post_image(&Term::equals(&x, 0), &voc, &conf).unwrap();
            assert!(is_unsat(&voc, &conf, &Term::and([image, Term::not(Term::equals(&x, i))])).unwrap());
            assert!(reaches(&voc, &conf, &star, &x, 0, i));
            unrolled = unrolled.mul(&body, &voc);
        }
        assert!(reaches(&voc, &conf, &star, &x, 0, 10));
        assert!(!reaches(&voc, &conf, &star, &x, 0, 11));
        assert!(!reaches(&voc, &conf, &star, &x, 0, -1));
        assert!(!reaches(&voc, &conf, &star, &x, 3, 2));
    }

    #[test]
    fn test_star_domains() {
        let (voc, conf, x) = setup();
        let body = Transition::assign(&x, Term::add(&x, 2));
        let solvable = body.star(&voc, &conf, &Solvable).unwrap();
        assert!(reaches(&voc, &conf, &solvable, &x, 0, 4));
        assert!(!reaches(&voc, &conf, &solvable, &x, 0, 3));
        let guard = body.star(&voc, &conf, &Guard).unwrap();
        assert!(reaches(&voc, &conf, &guard, &x, 0, 4));
        assert!(!reaches(&voc, &conf, &guard, &x, 0, 3));
        assert!(!reaches(&voc, &conf, &guard, &x, 0, -2));
    }

    #[test]
    fn test_star_of_zero_is_identity() {
        let (voc, conf, x) = setup();
        let star = Transition::zero().star(&voc, &conf, &default_iteration()).unwrap();
        assert!(star.transform().is_empty());
        let image = star.post_image(&Term::equals(&x, 5), &voc, &conf).unwrap();
        assert!(is_unsat(&voc, &conf, &Term::not(Term::iff(image, Term::equals(&x, 5)))).unwrap());
    }
}
