// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Conjunctions of linear constraints over rational dimensions.
//!
//! Variables are eliminated with Fourier-Motzkin, after first substituting
//! away any equality that mentions the variable. Model-guided projection uses
//! the Loos-Weispfenning virtual substitution restricted to the lower bound
//! that is tightest under the model, so a single projection produces one
//! convex piece of the exact projection that contains the model.

use itertools::Itertools;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::linear::{Constraint, Divides, Monomial, Polynomial, Rel};
use crate::syntax::{Rat, Term};

/// A conjunction of linear constraints.
///
/// Constraints are kept normalized and deduplicated; trivially true
/// constraints are dropped and a trivially false one replaces the whole
/// conjunction by [`Constraint::falsity`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Polyhedron {
    constraints: Vec<Constraint>,
}

/// What eliminating one dimension left behind, for back-substitution.
enum Step {
    /// The dimension equals this polynomial over the remaining dimensions.
    Def(Polynomial),
    /// The constraints that bounded the dimension.
    Bounds(Vec<Constraint>),
}

/// A bound on a dimension: its value and whether it is strict.
type Bound = (Rat, bool);

impl Polyhedron {
    /// Build a polyhedron from constraints.
    pub fn new<I>(constraints: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        let mut set = BTreeSet::new();
        for c in constraints {
            match c.trivial_value() {
                Some(true) => (),
                Some(false) => {
                    return Self {
                        constraints: vec![Constraint::falsity()],
                    }
                }
                None => {
                    set.insert(c);
                }
            }
        }
        Self {
            constraints: set.into_iter().collect(),
        }
    }

    /// The unconstrained polyhedron.
    pub fn top() -> Self {
        Self {
            constraints: vec![],
        }
    }

    /// The constraints of the conjunction.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether there are no constraints.
    pub fn is_top(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether the polyhedron contains a trivially false constraint. This is
    /// a syntactic check; see [`Polyhedron::is_feasible`].
    pub fn is_trivially_empty(&self) -> bool {
        self.constraints.iter().any(|c| c.trivial_value() == Some(false))
    }

    /// Conjoin two polyhedra.
    pub fn meet(&self, other: &Polyhedron) -> Polyhedron {
        Self::new(self.constraints.iter().chain(&other.constraints).cloned())
    }

    /// Add one constraint.
    pub fn with(&self, c: Constraint) -> Polyhedron {
        Self::new(self.constraints.iter().cloned().chain([c]))
    }

    /// The dimensions mentioned by the constraints, in order.
    pub fn dims(&self) -> BTreeSet<Monomial> {
        self.constraints
            .iter()
            .flat_map(|c| c.poly.dims().cloned())
            .collect()
    }

    /// The symbols mentioned by the constraints.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.dims().into_iter().flatten().collect()
    }

    /// Eliminate one dimension, returning the remaining constraints and what
    /// is needed to recover a value for `d`.
    fn eliminate(constraints: &[Constraint], d: &Monomial) -> (Vec<Constraint>, Step) {
        let eq = constraints
            .iter()
            .find(|c| c.rel == Rel::Eq && !c.poly.coeff(d).is_zero());
        if let Some(eq) = eq {
            let a = eq.poly.coeff(d);
            // d = -(eq - a·d) / a
            let def = (&eq.poly - &Polynomial::monomial(d.clone(), a.clone())).scale(&-a.recip());
            let rest = constraints
                .iter()
                .filter(|c| *c != eq)
                .map(|c| Constraint::new(c.poly.substitute_dim(d, &def), c.rel))
                .collect();
            return (rest, Step::Def(def));
        }
        let (bounds, mut rest): (Vec<_>, Vec<_>) = constraints
            .iter()
            .cloned()
            .partition(|c| !c.poly.coeff(d).is_zero());
        let (uppers, lowers): (Vec<_>, Vec<_>) = bounds
            .iter()
            .partition(|c| c.poly.coeff(d).is_positive());
        for (l, u) in lowers.iter().cartesian_product(&uppers) {
            rest.push(Self::combine(l, u, d));
        }
        (rest, Step::Bounds(bounds))
    }

    /// Fourier-Motzkin combination of a lower bound `l` and an upper bound `u`
    /// on `d`, which eliminates `d`.
    fn combine(l: &Constraint, u: &Constraint, d: &Monomial) -> Constraint {
        let a_l = l.poly.coeff(d);
        let a_u = u.poly.coeff(d);
        debug_assert!(a_l.is_negative() && a_u.is_positive());
        let poly = &l.poly.scale(&a_u) + &u.poly.scale(&-a_l);
        let rel = if l.rel == Rel::Lt || u.rel == Rel::Lt {
            Rel::Lt
        } else {
            Rel::Leq
        };
        Constraint::new(poly, rel)
    }

    /// Whether the polyhedron has a rational point.
    pub fn is_feasible(&self) -> bool {
        self.sample(|_| false).is_some()
    }

    /// Find a rational point in the polyhedron, or `None` if it is empty.
    /// Dimensions for which `prefer_int` holds get an integer value whenever
    /// the bounds at back-substitution time allow one; this is a heuristic,
    /// not a guarantee.
    pub fn sample<F>(&self, prefer_int: F) -> Option<BTreeMap<Monomial, Rat>>
    where
        F: Fn(&Monomial) -> bool,
    {
        let mut current = self.clone();
        let mut steps = vec![];
        for d in self.dims() {
            if current.is_trivially_empty() {
                return None;
            }
            let (rest, step) = Self::eliminate(&current.constraints, &d);
            steps.push((d, step));
            current = Self::new(rest);
        }
        if current.is_trivially_empty() {
            return None;
        }
        let mut values: BTreeMap<Monomial, Rat> = BTreeMap::new();
        for (d, step) in steps.into_iter().rev() {
            let lookup = |m: &Monomial| Some(values.get(m).cloned().unwrap_or_else(Rat::zero));
            let v = match step {
                Step::Def(def) => def.eval_dims(lookup).unwrap_or_else(Rat::zero),
                Step::Bounds(bounds) => {
                    let (lo, hi) = Self::bounds_under(&bounds, &d, lookup);
                    choose(lo, hi, prefer_int(&d))
                }
            };
            values.insert(d, v);
        }
        Some(values)
    }

    /// The tightest lower and upper bound on `d` given by `bounds`, with the
    /// other dimensions valued by `value`.
    fn bounds_under<F>(bounds: &[Constraint], d: &Monomial, mut value: F) -> (Option<Bound>, Option<Bound>)
    where
        F: FnMut(&Monomial) -> Option<Rat>,
    {
        let mut lo: Option<Bound> = None;
        let mut hi: Option<Bound> = None;
        for c in bounds {
            let a = c.poly.coeff(d);
            let r = c
                .poly
                .substitute_dim(d, &Polynomial::zero())
                .eval_dims(&mut value)
                .unwrap_or_else(Rat::zero);
            let b = -r / &a;
            let strict = c.rel == Rel::Lt;
            if a.is_positive() {
                let tighter = match &hi {
                    None => true,
                    Some((h, s)) => b < *h || (b == *h && strict && !s),
                };
                if tighter {
                    hi = Some((b, strict));
                }
            } else {
                let tighter = match &lo {
                    None => true,
                    Some((l, s)) => b > *l || (b == *l && strict && !s),
                };
                if tighter {
                    lo = Some((b, strict));
                }
            }
        }
        (lo, hi)
    }

    /// Exact projection: eliminate every dimension for which `keep` is false.
    pub fn project<F>(&self, keep: F) -> Polyhedron
    where
        F: Fn(&Monomial) -> bool,
    {
        let mut current = self.clone();
        for d in self.dims().into_iter().filter(|d| !keep(d)) {
            if current.is_trivially_empty() {
                break;
            }
            let (rest, _) = Self::eliminate(&current.constraints, &d);
            current = Self::new(rest);
        }
        current
    }

    /// Model-guided projection: eliminate every dimension for which
    /// `eliminate` holds, producing a polyhedron that contains the model
    /// (restricted to the kept dimensions) and implies the exact projection.
    ///
    /// `value` gives the model's value of every dimension; the model must
    /// satisfy the polyhedron. All dimensions are treated as rational.
    pub fn project_with_model<E, V>(&self, eliminate: E, value: V) -> Polyhedron
    where
        E: Fn(&Monomial) -> bool,
        V: Fn(&Monomial) -> Rat,
    {
        self.project_int_with_model(eliminate, |_| false, value).0
    }

    /// Model-guided projection that respects integrality: dimensions for
    /// which `is_int` holds range over the integers and are eliminated with
    /// Cooper's method, picking the residue class the model lies in. The
    /// result is a polyhedron together with divisibility constraints over the
    /// kept dimensions; both hold in the model and together imply the exact
    /// projection.
    ///
    /// An integer dimension that shares a constraint with a rational one is
    /// eliminated as a rational, which over-approximates.
    pub fn project_int_with_model<E, I, V>(
        &self,
        eliminate: E,
        is_int: I,
        value: V,
    ) -> (Polyhedron, Vec<Divides>)
    where
        E: Fn(&Monomial) -> bool,
        I: Fn(&Monomial) -> bool,
        V: Fn(&Monomial) -> Rat,
    {
        let mut current = self.clone();
        let mut divs: Vec<Divides> = vec![];
        for d in self.dims().into_iter().filter(|d| eliminate(d)) {
            if current.is_trivially_empty() {
                return (current, vec![]);
            }
            let mentioned = current.constraints.iter().any(|c| !c.poly.coeff(&d).is_zero())
                || divs.iter().any(|c| !c.poly.coeff(&d).is_zero());
            if !mentioned {
                continue;
            }
            let integral = is_int(&d)
                && current
                    .constraints
                    .iter()
                    .filter(|c| !c.poly.coeff(&d).is_zero())
                    .all(|c| c.poly.dims().all(&is_int));
            if integral {
                if let Some((rest, rest_divs)) = Self::cooper(&current.constraints, &divs, &d, &value) {
                    current = Self::new(rest);
                    divs = rest_divs;
                    if divs.iter().any(|c| c.trivial_value() == Some(false)) {
                        return (Self::new([Constraint::falsity()]), vec![]);
                    }
                    divs.retain(|c| c.trivial_value() != Some(true));
                    continue;
                }
            }
            divs.retain(|c| c.poly.coeff(&d).is_zero());
            current = Self::new(Self::loos_weispfenning(&current.constraints, &d, &value));
        }
        (current, divs)
    }

    /// Eliminate the rational dimension `d` by substituting the greatest lower
    /// bound under the model.
    fn loos_weispfenning<V>(constraints: &[Constraint], d: &Monomial, value: &V) -> Vec<Constraint>
    where
        V: Fn(&Monomial) -> Rat,
    {
        if constraints
            .iter()
            .any(|c| c.rel == Rel::Eq && !c.poly.coeff(d).is_zero())
        {
            return Self::eliminate(constraints, d).0;
        }
        let (bounds, mut rest): (Vec<_>, Vec<_>) = constraints
            .iter()
            .cloned()
            .partition(|c| !c.poly.coeff(d).is_zero());
        let (uppers, lowers): (Vec<_>, Vec<_>) =
            bounds.iter().partition(|c| c.poly.coeff(d).is_positive());
        if lowers.is_empty() || uppers.is_empty() {
            return rest;
        }
        let bound_value = |c: &Constraint| {
            let r = c
                .poly
                .substitute_dim(d, &Polynomial::zero())
                .eval_dims(|m| Some(value(m)))
                .unwrap_or_else(Rat::zero);
            -r / c.poly.coeff(d)
        };
        // the greatest lower bound under the model, preferring strict bounds
        // on ties
        let best = lowers
            .iter()
            .max_by(|a, b| {
                bound_value(a)
                    .cmp(&bound_value(b))
                    .then_with(|| (a.rel == Rel::Lt).cmp(&(b.rel == Rel::Lt)))
            })
            .copied()
            .cloned();
        if let Some(best) = best {
            let a_best = best.poly.coeff(d);
            for l in &lowers {
                if **l == best {
                    continue;
                }
                // bound(l) <= bound(best), strictly if only l is strict
                let a_l = l.poly.coeff(d);
                let poly = &l.poly.scale(&-a_best.clone()) + &best.poly.scale(&a_l);
                let rel = if l.rel == Rel::Lt && best.rel != Rel::Lt {
                    Rel::Lt
                } else {
                    Rel::Leq
                };
                rest.push(Constraint::new(poly, rel));
            }
            for u in &uppers {
                rest.push(Self::combine(&best, u, d));
            }
        }
        rest
    }

    /// Eliminate the integer dimension `d` from integer constraints and
    /// divisibility constraints, following the model. Returns `None` if the
    /// model does not give integer values.
    ///
    /// An equality `a·d + t = 0` is solved for `d` and leaves `|a| | t`.
    /// Otherwise, with `δ` the lcm of the coefficients of `d`, every lower
    /// bound becomes `δ·d >= t_l`; the greatest `t_l` under the model, shifted
    /// into the model's residue class modulo the lcm of all moduli, is
    /// substituted for `δ·d`.
    fn cooper<V>(
        constraints: &[Constraint],
        divs: &[Divides],
        d: &Monomial,
        value: &V,
    ) -> Option<(Vec<Constraint>, Vec<Divides>)>
    where
        V: Fn(&Monomial) -> Rat,
    {
        let eval = |p: &Polynomial| p.eval_dims(|m| Some(value(m))).unwrap_or_else(Rat::zero);
        let (bounds, mut rest): (Vec<Constraint>, Vec<Constraint>) = constraints
            .iter()
            .cloned()
            .partition(|c| !c.poly.coeff(d).is_zero());
        let bounds: Vec<Constraint> = bounds.iter().map(Constraint::tighten_int).collect();
        if bounds.iter().any(|c| c.trivial_value() == Some(false)) {
            return Some((vec![Constraint::falsity()], vec![]));
        }
        // integer coefficients; scaling by a positive factor keeps the relation
        let bounds: Vec<Constraint> = bounds
            .into_iter()
            .map(|c| Constraint {
                poly: c.poly.integral(),
                rel: c.rel,
            })
            .collect();
        let substitute = |def: &Polynomial, cs: &[Constraint], divs: &[Divides]| {
            let cs = cs
                .iter()
                .map(|c| Constraint::new(c.poly.substitute_dim(d, def), c.rel));
            let divs = divs
                .iter()
                .map(|c| Divides::new(&c.modulus, &c.poly.substitute_dim(d, def)));
            (cs.collect::<Vec<_>>(), divs.collect::<Vec<_>>())
        };

        if let Some(eq) = bounds.iter().find(|c| c.rel == Rel::Eq) {
            let a = eq.poly.coeff(d);
            let t = &eq.poly - &Polynomial::monomial(d.clone(), a.clone());
            let def = t.scale(&-a.recip());
            let others: Vec<Constraint> = bounds.iter().filter(|c| *c != eq).cloned().collect();
            let (cs, mut new_divs) = substitute(&def, &others, divs);
            rest.extend(cs);
            new_divs.push(Divides::new(&a.to_integer(), &t));
            return Some((rest, new_divs));
        }

        let coeff = |p: &Polynomial| p.coeff(d).abs().to_integer();
        let mut delta = BigInt::one();
        for c in &bounds {
            delta = delta.lcm(&coeff(&c.poly));
        }
        for c in divs.iter().filter(|c| !c.poly.coeff(d).is_zero()) {
            delta = delta.lcm(&coeff(&c.poly));
        }
        // the period of the divisibility constraints in δ·d
        let mut period = delta.clone();
        for c in divs.iter().filter(|c| !c.poly.coeff(d).is_zero()) {
            period = period.lcm(&(&c.modulus * &delta / coeff(&c.poly)));
        }
        let scaled = value(d) * Rat::from_integer(delta.clone());
        // δ·d >= t for a lower bound a·d + s <= 0 with a < 0
        let lowers: Vec<Polynomial> = bounds
            .iter()
            .filter(|c| c.poly.coeff(d).is_negative())
            .map(|c| {
                let a = c.poly.coeff(d);
                let s = c.poly.substitute_dim(d, &Polynomial::zero());
                s.scale(&(Rat::from_integer(delta.clone()) / a.abs()))
            })
            .collect();
        let best = lowers.iter().max_by(|a, b| eval(*a).cmp(&eval(*b)));
        let (base, from) = match best {
            Some(t) => (t.clone(), eval(t)),
            None => (Polynomial::zero(), Rat::zero()),
        };
        let offset = &scaled - &from;
        if !offset.is_integer() {
            return None;
        }
        let j = offset.to_integer().mod_floor(&period);
        let shifted = &base + &Polynomial::constant(Rat::from_integer(j));
        let def = shifted.scale(&Rat::from_integer(delta.clone()).recip());
        let kept: Vec<Constraint> = if best.is_some() { bounds } else { vec![] };
        let (cs, mut new_divs) = substitute(&def, &kept, divs);
        rest.extend(cs);
        new_divs.push(Divides::new(&delta, &shifted));
        Some((rest, new_divs))
    }

    /// Whether every point of the polyhedron satisfies `c` (over the
    /// rationals).
    pub fn entails(&self, c: &Constraint) -> bool {
        c.negate().into_iter().all(|n| !self.with(n).is_feasible())
    }

    /// Whether every point of `self` is a point of `other`.
    pub fn leq(&self, other: &Polyhedron) -> bool {
        !self.is_feasible() || other.constraints.iter().all(|c| self.entails(c))
    }

    /// The conjunction as a formula.
    pub fn to_term(&self) -> Term {
        Term::and(self.constraints.iter().map(Constraint::to_term))
    }
}

/// Pick a value between optional bounds, preferring an integer if asked.
fn choose(lo: Option<Bound>, hi: Option<Bound>, prefer_int: bool) -> Rat {
    let above = |v: &Rat| match &lo {
        None => true,
        Some((l, strict)) => v > l || (!strict && v == l),
    };
    let below = |v: &Rat| match &hi {
        None => true,
        Some((h, strict)) => v < h || (!strict && v == h),
    };
    if prefer_int {
        let candidate = match (&lo, &hi) {
            (Some((l, true)), _) => l.floor() + Rat::one(),
            (Some((l, false)), _) => l.ceil(),
            (None, Some((h, true))) => h.ceil() - Rat::one(),
            (None, Some((h, false))) => h.floor(),
            (None, None) => Rat::zero(),
        };
        if above(&candidate) && below(&candidate) {
            return candidate;
        }
    }
    match (lo, hi) {
        (Some((l, _)), Some((h, _))) if l == h => l,
        (Some((l, _)), Some((h, _))) => (l + h) / Rat::from_integer(2.into()),
        (Some((l, strict)), None) => {
            if strict {
                l + Rat::one()
            } else {
                l
            }
        }
        (None, Some((h, strict))) => {
            if strict {
                h - Rat::one()
            } else {
                h
            }
        }
        (None, None) => Rat::zero(),
    }
}

impl fmt::Display for Polyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rat;

    fn cube(atoms: &[Term]) -> Polyhedron {
        Polyhedron::new(atoms.iter().map(|a| Constraint::from_atom(a).unwrap()))
    }

    fn x() -> Term {
        Term::id("x")
    }

    fn y() -> Term {
        Term::id("y")
    }

    fn dim(s: &str) -> Monomial {
        vec![s.to_string()]
    }

    #[test]
    fn test_feasibility() {
        assert!(cube(&[Term::lt(x(), y()), Term::lt(y(), 3)]).is_feasible());
        assert!(!cube(&[Term::lt(x(), y()), Term::lt(y(), x())]).is_feasible());
        assert!(!cube(&[Term::leq(x(), 1), Term::gt(x(), 1)]).is_feasible());
        assert!(cube(&[Term::leq(x(), 1), Term::geq(x(), 1)]).is_feasible());
    }

    #[test]
    fn test_sample_satisfies() {
        let p = cube(&[
            Term::lt(x(), y()),
            Term::leq(Term::add(x(), y()), 10),
            Term::geq(x(), 2),
        ]);
        let values = p.sample(|_| true).unwrap();
        for c in p.constraints() {
            assert_eq!(c.holds(|m| values.get(m).cloned()), Some(true), "{c}");
        }
        assert!(values.values().all(|v| v.is_integer()));
    }

    #[test]
    fn test_project() {
        // exists y. x < y & y < 3  ==  x < 3
        let p = cube(&[Term::lt(x(), y()), Term::lt(y(), 3)]);
        let q = p.project(|d| *d == dim("x"));
        insta::assert_snapshot!(q.to_string(), @"x < 3");
        // equalities are substituted
        let p = cube(&[Term::equals(y(), Term::add(x(), 1)), Term::leq(y(), 5)]);
        insta::assert_snapshot!(p.project(|d| *d == dim("x")).to_string(), @"x <= 4");
    }

    #[test]
    fn test_project_with_model() {
        // exists y. (x <= y & 0 <= y & y <= 5), under the model x = 1, y = 2
        let p = cube(&[Term::leq(x(), y()), Term::leq(0, y()), Term::leq(y(), 5)]);
        let model = |m: &Monomial| if *m == dim("x") { rat(1) } else { rat(2) };
        let q = p.project_with_model(|d| *d == dim("y"), model);
        // x is the tightest lower bound for y in the model: x >= 0 and x <= 5
        insta::assert_snapshot!(q.to_string(), @"0 <= x & x <= 5");
        assert!(q.dims().iter().all(|d| *d == dim("x")));
    }

    #[test]
    fn test_project_int_with_model() {
        let is_int = |_: &Monomial| true;
        let at = |v: i64| move |_: &Monomial| Some(rat(v));
        // exists h. y = 2h  ==  y mod 2 = 0
        let p = cube(&[Term::equals(y(), Term::mul(2, Term::id("h")))]);
        let model = |m: &Monomial| if *m == dim("y") { rat(4) } else { rat(2) };
        let (q, divs) = p.project_int_with_model(|d| *d == dim("h"), is_int, model);
        assert!(q.is_top());
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].holds(at(4)), Some(true));
        assert_eq!(divs[0].holds(at(3)), Some(false));
        // over the rationals the parity is lost
        assert!(p.project_with_model(|d| *d == dim("h"), model).is_top());

        // exists x. y <= 3x <= y + 1 holds for y = 0, 2 (mod 3); the model
        // y = 2, x = 1 selects the second residue class
        let p = cube(&[
            Term::leq(y(), Term::mul(3, x())),
            Term::leq(Term::mul(3, x()), Term::add(y(), 1)),
        ]);
        let model = |m: &Monomial| if *m == dim("x") { rat(1) } else { rat(2) };
        let (q, divs) = p.project_int_with_model(|d| *d == dim("x"), is_int, model);
        assert!(q.is_top());
        let class: Vec<bool> = (0..6)
            .map(|v| divs.iter().all(|c| c.holds(at(v)) == Some(true)))
            .collect();
        assert_eq!(class, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_project_int_keeps_bounds() {
        // exists x. 0 <= x & 2x <= y, under y = 5, x = 1: a lower bound on y
        // survives next to the divisibility constraint
        let p = cube(&[Term::leq(0, x()), Term::leq(Term::mul(2, x()), y())]);
        let model = |m: &Monomial| if *m == dim("x") { rat(1) } else { rat(5) };
        let (q, divs) = p.project_int_with_model(|d| *d == dim("x"), |_| true, model);
        let holds = |v: i64| {
            let value = |_: &Monomial| Some(rat(v));
            q.constraints().iter().all(|c| c.holds(value) == Some(true))
                && divs.iter().all(|c| c.holds(value) == Some(true))
        };
        assert!(holds(5));
        assert!(!holds(-1));
        // every value the cube admits has a witness
        for v in -3..10 {
            if holds(v) {
                assert!(v >= 0, "y = {v} has no witness");
            }
        }
    }

    #[test]
    fn test_entails() {
        let p = cube(&[Term::lt(x(), 1), Term::geq(y(), x())]);
        assert!(p.entails(&Constraint::from_atom(&Term::leq(x(), 1)).unwrap()));
        assert!(!p.entails(&Constraint::from_atom(&Term::leq(y(), 1)).unwrap()));
    }
}
