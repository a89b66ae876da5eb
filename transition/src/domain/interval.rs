// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Intervals: independent, possibly strict, lower and upper bounds per
//! symbol.

use std::collections::BTreeMap;

use formula::{
    context::Context,
    linear::{Polynomial, Rel},
    polyhedron::Polyhedron,
    syntax::{Rat, Term},
};
use num_traits::Zero;
use solver::SolverConf;

use crate::{
    domain::{polyhedral::Poly, AbstractDomain, Polyhedral},
    error::QueryError,
};

/// The interval domain.
#[derive(Copy, Clone, Debug, Default)]
pub struct Interval;

/// A bound and whether it is strict.
pub type Bound = (Rat, bool);

/// The range of one symbol. `None` is unbounded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// Lower bound
    pub lo: Option<Bound>,
    /// Upper bound
    pub hi: Option<Bound>,
}

/// An interval value. Unbounded symbols are never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Boxes {
    /// No states
    Bottom,
    /// The states where every symbol lies in its range
    Ranges(BTreeMap<String, Range>),
}

/// Whether lower bound `a` admits every value lower bound `b` admits.
fn lo_weaker(a: &Bound, b: &Bound) -> bool {
    a.0 < b.0 || (a.0 == b.0 && (!a.1 || b.1))
}

/// Whether upper bound `a` admits every value upper bound `b` admits.
fn hi_weaker(a: &Bound, b: &Bound) -> bool {
    a.0 > b.0 || (a.0 == b.0 && (!a.1 || b.1))
}

impl Range {
    fn is_empty(&self) -> bool {
        match (&self.lo, &self.hi) {
            (Some((l, ls)), Some((h, hs))) => l > h || (l == h && (*ls || *hs)),
            _ => false,
        }
    }

    fn is_unbounded(&self) -> bool {
        self.lo.is_none() && self.hi.is_none()
    }

    fn meet_lo(&mut self, b: Bound) {
        if self.lo.as_ref().map_or(true, |lo| lo_weaker(lo, &b)) {
            self.lo = Some(b);
        }
    }

    fn meet_hi(&mut self, b: Bound) {
        if self.hi.as_ref().map_or(true, |hi| hi_weaker(hi, &b)) {
            self.hi = Some(b);
        }
    }

    fn join(&self, other: &Range) -> Range {
        let lo = match (&self.lo, &other.lo) {
            (Some(a), Some(b)) => Some(if lo_weaker(a, b) { a.clone() } else { b.clone() }),
            _ => None,
        };
        let hi = match (&self.hi, &other.hi) {
            (Some(a), Some(b)) => Some(if hi_weaker(a, b) { a.clone() } else { b.clone() }),
            _ => None,
        };
        Range { lo, hi }
    }

    fn widen(&self, other: &Range) -> Range {
        let lo = match (&self.lo, &other.lo) {
            (Some(a), Some(b)) if lo_weaker(a, b) => Some(a.clone()),
            _ => None,
        };
        let hi = match (&self.hi, &other.hi) {
            (Some(a), Some(b)) if hi_weaker(a, b) => Some(a.clone()),
            _ => None,
        };
        Range { lo, hi }
    }

    fn to_term(&self, symbol: &str) -> Term {
        let x = Term::id(symbol);
        let mut ts = vec![];
        if let Some((l, strict)) = &self.lo {
            let l = Term::Num(l.clone());
            ts.push(if *strict { Term::lt(l, &x) } else { Term::leq(l, &x) });
        }
        if let Some((h, strict)) = &self.hi {
            let h = Term::Num(h.clone());
            ts.push(if *strict { Term::lt(&x, h) } else { Term::leq(&x, h) });
        }
        Term::and(ts)
    }
}

impl Boxes {
    /// Build a value, dropping unbounded symbols and collapsing to bottom if
    /// any range is empty.
    pub fn new<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (String, Range)>,
    {
        let mut map = BTreeMap::new();
        for (s, r) in ranges {
            if r.is_empty() {
                return Boxes::Bottom;
            }
            if !r.is_unbounded() {
                map.insert(s, r);
            }
        }
        Boxes::Ranges(map)
    }

    /// The range of `symbol`.
    pub fn range(&self, symbol: &str) -> Option<Range> {
        match self {
            Boxes::Bottom => None,
            Boxes::Ranges(m) => Some(m.get(symbol).cloned().unwrap_or_default()),
        }
    }

    /// Read the bounds on one symbol off a polyhedron over that symbol alone.
    fn range_of(p: &Polyhedron, symbol: &str) -> Range {
        let dim = vec![symbol.to_string()];
        let mut range = Range::default();
        for c in p.constraints() {
            let a = c.poly.coeff(&dim);
            if a.is_zero() {
                continue;
            }
            // a·x + rest rel 0 with rest constant
            let rest = &c.poly - &Polynomial::monomial(dim.clone(), a.clone());
            if !rest.is_constant() {
                continue;
            }
            let v = -rest.constant_part().clone() / &a;
            let strict = c.rel == Rel::Lt;
            match c.rel {
                Rel::Eq => {
                    range.meet_lo((v.clone(), false));
                    range.meet_hi((v, false));
                }
                _ if a > Rat::zero() => range.meet_hi((v, strict)),
                _ => range.meet_lo((v, strict)),
            }
        }
        range
    }
}

impl AbstractDomain for Interval {
    type Value = Boxes;

    fn abstract_of<F>(
        &self,
        ctx: &Context,
        conf: &SolverConf,
        formula: &Term,
        keep: F,
    ) -> Result<Boxes, QueryError>
    where
        F: Fn(&str) -> bool,
    {
        let hull = match Polyhedral.abstract_of(ctx, conf, formula, &keep)? {
            Poly::Bottom => return Ok(Boxes::Bottom),
            Poly::Hull(p) if !p.is_feasible() => return Ok(Boxes::Bottom),
            Poly::Hull(p) => p,
        };
        let ranges = hull
            .symbols()
            .into_iter()
            .filter(|s| keep(s))
            .map(|s| {
                let dim = vec![s.clone()];
                let projected = hull.project(|m| m == &dim);
                let range = Boxes::range_of(&projected, &s);
                (s, range)
            })
            .collect::<Vec<_>>();
        Ok(Boxes::new(ranges))
    }

    fn bottom(&self) -> Boxes {
        Boxes::Bottom
    }

    fn top(&self) -> Boxes {
        Boxes::Ranges(BTreeMap::new())
    }

    fn join(&self, a: &Boxes, b: &Boxes) -> Boxes {
        match (a, b) {
            (Boxes::Bottom, x) | (x, Boxes::Bottom) => x.clone(),
            (Boxes::Ranges(p), Boxes::Ranges(q)) => Boxes::new(
                p.iter()
                    .filter_map(|(s, r)| q.get(s).map(|r2| (s.clone(), r.join(r2)))),
            ),
        }
    }

    fn widen(&self, a: &Boxes, b: &Boxes) -> Boxes {
        match (a, b) {
            (Boxes::Bottom, x) | (x, Boxes::Bottom) => x.clone(),
            (Boxes::Ranges(p), Boxes::Ranges(q)) => Boxes::new(
                p.iter()
                    .filter_map(|(s, r)| q.get(s).map(|r2| (s.clone(), r.widen(r2)))),
            ),
        }
    }

    fn formula_of(&self, a: &Boxes) -> Term {
        match a {
            Boxes::Bottom => Term::false_(),
            Boxes::Ranges(m) => Term::and(m.iter().map(|(s, r)| r.to_term(s))),
        }
    }

    fn exists<F>(&self, a: &Boxes, keep: F) -> Boxes
    where
        F: Fn(&str) -> bool,
    {
        match a {
            Boxes::Bottom => Boxes::Bottom,
            Boxes::Ranges(m) => Boxes::Ranges(
                m.iter()
                    .filter(|(s, _)| keep(s))
                    .map(|(s, r)| (s.clone(), r.clone()))
                    .collect(),
            ),
        }
    }

    fn equal(&self, a: &Boxes, b: &Boxes) -> bool {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::{rat, Sort};

    fn range(lo: Option<i64>, hi: Option<i64>) -> Range {
        Range {
            lo: lo.map(|l| (rat(l), false)),
            hi: hi.map(|h| (rat(h), false)),
        }
    }

    #[test]
    fn test_lattice() {
        let d = Interval;
        let a = Boxes::new([("x".to_string(), range(Some(0), Some(0)))]);
        let b = Boxes::new([("x".to_string(), range(Some(1), Some(1)))]);
        let j = d.join(&a, &b);
        insta::assert_snapshot!(d.formula_of(&j).to_string(), @"0 <= x & x <= 1");
        let c = Boxes::new([("x".to_string(), range(Some(0), Some(2)))]);
        let w = d.widen(&j, &c);
        insta::assert_snapshot!(d.formula_of(&w).to_string(), @"0 <= x");
        assert_eq!(w.range("x"), Some(range(Some(0), None)));
        assert_eq!(w.range("y"), Some(Range::default()));
        assert_eq!(d.widen(&w, &d.join(&w, &c)), w);
        assert_eq!(d.join(&d.bottom(), &a), a);
        assert!(d.is_bottom(&Boxes::new([("x".to_string(), range(Some(1), Some(0)))])));
        let strict = Range {
            lo: Some((rat(0), true)),
            hi: Some((rat(0), false)),
        };
        assert!(d.is_bottom(&Boxes::new([("x".to_string(), strict)])));
    }

    #[test]
    fn test_abstract_of() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Real);
        let y = ctx.declare("y", Sort::Real);
        let conf = SolverConf::native();
        let t = Term::and([
            Term::lt(0, &x),
            Term::leq(&x, &y),
            Term::leq(&y, 5),
        ]);
        let d = Interval;
        let v = d.abstract_of(&ctx, &conf, &t, |_| true).unwrap();
        insta::assert_snapshot!(d.formula_of(&v).to_string(), @"0 < x & x <= 5 & 0 < y & y <= 5");
        let only_y = d.exists(&v, |s| s == "y");
        insta::assert_snapshot!(d.formula_of(&only_y).to_string(), @"0 < y & y <= 5");
        let unsat = Term::and([Term::lt(&x, 0), Term::gt(&x, 0)]);
        assert!(d.is_bottom(&d.abstract_of(&ctx, &conf, &unsat, |_| true).unwrap()));
    }
}
