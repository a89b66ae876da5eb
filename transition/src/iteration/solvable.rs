// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Closed forms for recurrences found among the top-level conjuncts of a
//! step.
//!
//! Two shapes are recognized. A translation `x' = x + p` where `p` is a
//! polynomial over invariant symbols and variables that are already solved
//! as translations, which makes the system lower triangular. A reset
//! `x' = c` where `c` only mentions invariant symbols. The closed form of a
//! translation is a polynomial in the number of steps `K` whose coefficients
//! are polynomials over pre-state symbols; sums over the step index are
//! computed with Faulhaber's formula.

use std::collections::BTreeMap;

use formula::{
    linear::{Constraint, Polynomial, Rel},
    syntax::{BinOp, Rat, Term},
};
use num_traits::{One, Zero};
use solver::SolverConf;

use crate::{
    binding::{Var, Vocabulary},
    error::QueryError,
    iteration::{is_invariant, IterationDomain},
    TransitionFormula,
};

/// The solvable-recurrence iteration domain.
#[derive(Copy, Clone, Debug, Default)]
pub struct Solvable;

/// A polynomial in the step index whose coefficients are polynomials over
/// pre-state symbols. Entry `j` is the coefficient of `i^j`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series(Vec<Polynomial>);

/// A recognized recurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recurrence {
    /// The value after `i` steps
    Translation(Series),
    /// The value after any positive number of steps
    Reset(Polynomial),
}

/// `binomial(n, k)` as a rational.
fn binomial(n: usize, k: usize) -> Rat {
    (0..k).fold(Rat::one(), |acc, i| {
        acc * Rat::from_integer((n - i).into()) / Rat::from_integer((i + 1).into())
    })
}

/// Bernoulli numbers `B_0 ..= B_n`, with `B_1 = -1/2`.
fn bernoulli(n: usize) -> Vec<Rat> {
    let mut b: Vec<Rat> = vec![];
    for m in 0..=n {
        if m == 0 {
            b.push(Rat::one());
            continue;
        }
        let sum = (0..m).fold(Rat::zero(), |acc, k| acc + binomial(m + 1, k) * &b[k]);
        b.push(-sum / Rat::from_integer((m + 1).into()));
    }
    b
}

/// The coefficients of `Σ_{i<K} i^d` as a polynomial in `K`, lowest degree
/// first.
fn power_sum(d: usize) -> Vec<Rat> {
    let b = bernoulli(d);
    let mut coeffs = vec![Rat::zero(); d + 2];
    let scale = Rat::from_integer((d + 1).into()).recip();
    for (m, bm) in b.iter().enumerate() {
        coeffs[d + 1 - m] += binomial(d + 1, m) * bm * &scale;
    }
    coeffs
}

impl Series {
    /// A series that does not depend on the step index.
    pub fn constant(p: Polynomial) -> Self {
        Series(vec![p])
    }

    fn get(&self, j: usize) -> Polynomial {
        self.0.get(j).cloned().unwrap_or_else(Polynomial::zero)
    }

    /// Pointwise sum.
    pub fn add(&self, other: &Series) -> Series {
        let n = self.0.len().max(other.0.len());
        Series((0..n).map(|j| &self.get(j) + &other.get(j)).collect())
    }

    /// Product of two series.
    pub fn mul(&self, other: &Series) -> Series {
        let mut coeffs = vec![Polynomial::zero(); self.0.len() + other.0.len()];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in other.0.iter().enumerate() {
                coeffs[i + j] = &coeffs[i + j] + &(a * b);
            }
        }
        Series(coeffs)
    }

    /// `Σ_{i<K} self(i)` as a series in `K`.
    pub fn sum_below(&self) -> Series {
        let mut acc = Series(vec![]);
        for (d, c) in self.0.iter().enumerate() {
            let sum = power_sum(d)
                .into_iter()
                .map(|a| c.scale(&a))
                .collect();
            acc = acc.add(&Series(sum));
        }
        acc
    }

    /// The series evaluated at the symbol `k`.
    pub fn at(&self, k: &str) -> Polynomial {
        let k = Polynomial::var(k);
        self.0
            .iter()
            .rev()
            .fold(Polynomial::zero(), |acc, c| &(&acc * &k) + c)
    }
}

/// `x' = e` among the conjuncts, with `e` a polynomial not mentioning `post`.
fn defining_equation(formula: &Term, post: &str) -> Option<Polynomial> {
    formula.conjuncts().into_iter().find_map(|c| match c {
        Term::BinOp(BinOp::Equals, lhs, rhs) => {
            let e = if lhs.as_id() == Some(post) {
                rhs
            } else if rhs.as_id() == Some(post) {
                lhs
            } else {
                return None;
            };
            if e.mentions(post) {
                return None;
            }
            Polynomial::from_term(&e)
        }
        _ => None,
    })
}

impl Solvable {
    /// The value of `p` after `i` steps, if every symbol of `p` is invariant
    /// or solved as a translation.
    fn series_of(
        voc: &Vocabulary,
        tracked: &[(Var, String)],
        solved: &BTreeMap<Var, Recurrence>,
        p: &Polynomial,
    ) -> Option<Series> {
        let symbol = |s: &String| -> Option<Series> {
            if is_invariant(voc, tracked, s) {
                return Some(Series::constant(Polynomial::var(s)));
            }
            match solved.get(&voc.var_of_symbol(s)?)? {
                Recurrence::Translation(series) => Some(series.clone()),
                Recurrence::Reset(_) => None,
            }
        };
        let mut acc = Series::constant(Polynomial::constant(p.constant_part().clone()));
        for (m, a) in p.terms() {
            let mut product = Series::constant(Polynomial::constant(a.clone()));
            for s in m {
                product = product.mul(&symbol(s)?);
            }
            acc = acc.add(&product);
        }
        Some(acc)
    }
}

impl IterationDomain for Solvable {
    type Iter = BTreeMap<Var, Recurrence>;

    fn abstract_iter(
        &self,
        voc: &Vocabulary,
        _conf: &SolverConf,
        tf: &TransitionFormula,
    ) -> Result<Self::Iter, QueryError> {
        let tracked = &tf.symbols;
        let equations: Vec<(&Var, Polynomial)> = tracked
            .iter()
            .filter_map(|(v, post)| Some((v, defining_equation(&tf.formula, post)?)))
            .filter(|(_, e)| e.symbols().iter().all(|s| voc.is_var(s)))
            .collect();
        let mut solved = BTreeMap::new();
        loop {
            let mut progress = false;
            for (v, e) in &equations {
                if solved.contains_key(*v) {
                    continue;
                }
                if e.symbols().iter().all(|s| is_invariant(voc, tracked, s)) {
                    solved.insert((*v).clone(), Recurrence::Reset(e.clone()));
                    progress = true;
                    continue;
                }
                let x = Polynomial::var(v.name());
                let step = e - &x;
                if step.symbols().contains(v.name()) {
                    continue;
                }
                if let Some(series) = Self::series_of(voc, tracked, &solved, &step) {
                    let closed = Series::constant(x).add(&series.sum_below());
                    solved.insert((*v).clone(), Recurrence::Translation(closed));
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }
        log::debug!("solvable recurrences for {} of {} variables", solved.len(), tracked.len());
        Ok(solved)
    }

    fn exp(&self, _voc: &Vocabulary, tracked: &[(Var, String)], k: &str, iter: &Self::Iter) -> Term {
        let kt = Term::id(k);
        let conjuncts = tracked.iter().filter_map(|(v, post)| {
            let t = match iter.get(v)? {
                Recurrence::Translation(series) => {
                    let poly = &Polynomial::var(post) - &series.at(k);
                    Constraint {
                        poly: poly.integral(),
                        rel: Rel::Eq,
                    }
                    .to_term()
                }
                Recurrence::Reset(c) => Term::or([
                    Term::and([Term::equals(&kt, 0), Term::equals(Term::id(post), v.term())]),
                    Term::and([Term::geq(&kt, 1), Term::equals(Term::id(post), c.to_term())]),
                ]),
            };
            Some(t)
        });
        Term::and(conjuncts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::{
        semantics::{Model, Value},
        syntax::{rat, Sort},
    };

    use crate::Transition;

    fn model(values: &[(&str, i64)]) -> Model {
        values
            .iter()
            .map(|(s, v)| (s.to_string(), Value::Num(rat(*v))))
            .collect()
    }

    #[test]
    fn test_power_sums() {
        // Σ_{i<K} i = K²/2 - K/2
        assert_eq!(power_sum(1), vec![rat(0), -rat(1) / rat(2), rat(1) / rat(2)]);
        // Σ_{i<K} i² at K = 4 is 0 + 1 + 4 + 9
        let s = power_sum(2);
        let at4 = s
            .iter()
            .enumerate()
            .fold(rat(0), |acc, (j, c)| acc + c * rat(4i64.pow(j as u32)));
        assert_eq!(at4, rat(14));
    }

    #[test]
    fn test_triangular() {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        let y = voc.var("y", Sort::Int);
        let n = voc.var("n", Sort::Int);
        voc.ctx().declare("K", Sort::Int);
        let conf = SolverConf::native();
        let step = Transition::parallel_assign([
            (x.clone(), Term::add(&x, 1)),
            (y.clone(), Term::add(Term::add(&y, &x), &n)),
        ]);
        let tf = step.to_transition_formula(&voc);
        let iter = Solvable.abstract_iter(&voc, &conf, &tf).unwrap();
        assert_eq!(iter.len(), 2);
        assert!(!iter.contains_key(&n));
        let exp = Solvable.exp(&voc, &tf.symbols, "K", &iter);
        insta::assert_snapshot!(exp.conjuncts()[0].to_string(), @"x' = K + x");
        // from x = 0, y = 0, n = 1, three steps: y = (0 + 1) + (1 + 1) + (2 + 1)
        let good = model(&[("x", 0), ("y", 0), ("n", 1), ("K", 3), ("x'", 3), ("y'", 6)]);
        assert_eq!(good.eval_bool(&exp), Some(true));
        let bad = model(&[("x", 0), ("y", 0), ("n", 1), ("K", 3), ("x'", 3), ("y'", 5)]);
        assert_eq!(bad.eval_bool(&exp), Some(false));
    }

    #[test]
    fn test_reset_and_unsolvable() {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        let y = voc.var("y", Sort::Int);
        voc.ctx().declare("K", Sort::Int);
        let conf = SolverConf::native();
        let step = Transition::parallel_assign([
            (x.clone(), Term::int(5)),
            (y.clone(), Term::mul(&y, &y)),
        ]);
        let tf = step.to_transition_formula(&voc);
        let iter = Solvable.abstract_iter(&voc, &conf, &tf).unwrap();
        assert_eq!(iter.get(&x), Some(&Recurrence::Reset(Polynomial::constant(rat(5)))));
        assert_eq!(iter.get(&y), None);
        let exp = Solvable.exp(&voc, &tf.symbols, "K", &iter);
        for (k, post, holds) in [(0, 1, true), (0, 5, false), (2, 5, true), (2, 1, false)] {
            let m = model(&[("x", 1), ("K", k), ("x'", post)]);
            assert_eq!(m.eval_bool(&exp), Some(holds), "K = {k}, x' = {post}");
        }

        let havoc = Transition::havoc(&voc, [&x]).mul(&Transition::assign(&x, Term::add(&x, 1)), &voc);
        let tf = havoc.to_transition_formula(&voc);
        assert!(Solvable.abstract_iter(&voc, &conf, &tf).unwrap().is_empty());
    }
}
