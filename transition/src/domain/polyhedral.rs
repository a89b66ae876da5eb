// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Convex polyhedra, represented by their constraints.
//!
//! Joins are weak: the join of two polyhedra keeps the constraints of each
//! side that the other side entails, which is an upper bound but not the
//! convex hull. Abstraction joins the model-based projections of a formula
//! until the hull covers it.

use formula::{
    context::Context,
    linear::Constraint,
    polyhedron::Polyhedron,
    syntax::{Term, UOp},
    term::{nnf::nnf, purify::purify},
};
use solver::{SatResp, SolverConf};

use crate::{domain::AbstractDomain, error::QueryError, mbp};

/// The polyhedral domain.
#[derive(Copy, Clone, Debug, Default)]
pub struct Polyhedral;

/// A polyhedral value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Poly {
    /// No states
    Bottom,
    /// The states satisfying the constraints
    Hull(Polyhedron),
}

impl Poly {
    /// The linear constraints of a cube produced by projection, ignoring
    /// atoms that are not polynomial constraints.
    pub fn of_cube(cube: &Term) -> Self {
        if cube == &Term::false_() {
            return Poly::Bottom;
        }
        let constraints = cube
            .conjuncts()
            .iter()
            .filter_map(|atom| match atom {
                Term::UnaryOp(UOp::Not, _) | Term::Id(_) => None,
                atom => Constraint::from_atom(atom),
            })
            .collect::<Vec<_>>();
        Poly::Hull(Polyhedron::new(constraints))
    }

    fn polyhedron(&self) -> Option<&Polyhedron> {
        match self {
            Poly::Bottom => None,
            Poly::Hull(p) => Some(p),
        }
    }
}

/// The constraints of `from` (with equalities split in two) that `by` entails.
fn entailed(from: &Polyhedron, by: &Polyhedron) -> Vec<Constraint> {
    from.constraints()
        .iter()
        .flat_map(|c| c.halves())
        .filter(|c| by.entails(c))
        .collect()
}

impl AbstractDomain for Polyhedral {
    type Value = Poly;

    fn abstract_of<F>(
        &self,
        ctx: &Context,
        conf: &SolverConf,
        formula: &Term,
        keep: F,
    ) -> Result<Poly, QueryError>
    where
        F: Fn(&str) -> bool,
    {
        let purified = purify(ctx, formula);
        let formula = nnf(ctx, &purified.formula);
        let mut solver = conf.solver(ctx)?;
        solver.assert(&formula)?;
        let mut hull = Poly::Bottom;
        loop {
            match solver.check_sat(&[])? {
                SatResp::Sat => (),
                SatResp::Unsat => break,
                SatResp::Unknown(reason) => return Err(QueryError::Unknown(reason)),
            }
            let model = solver.get_model()?;
            let cube = mbp::cube_of(ctx, &formula, &model, &keep)?;
            hull = self.join(&hull, &Poly::of_cube(&cube));
            log::debug!("polyhedral hull grew to {}", self.formula_of(&hull));
            solver.assert(&Term::not(self.formula_of(&hull)))?;
        }
        Ok(hull)
    }

    fn bottom(&self) -> Poly {
        Poly::Bottom
    }

    fn top(&self) -> Poly {
        Poly::Hull(Polyhedron::top())
    }

    fn join(&self, a: &Poly, b: &Poly) -> Poly {
        let (Some(p), Some(q)) = (a.polyhedron(), b.polyhedron()) else {
            return if a == &Poly::Bottom { b.clone() } else { a.clone() };
        };
        let mut constraints = entailed(p, q);
        constraints.extend(entailed(q, p));
        Poly::Hull(Polyhedron::new(constraints))
    }

    fn widen(&self, a: &Poly, b: &Poly) -> Poly {
        let (Some(p), Some(q)) = (a.polyhedron(), b.polyhedron()) else {
            return if a == &Poly::Bottom { b.clone() } else { a.clone() };
        };
        Poly::Hull(Polyhedron::new(entailed(p, q)))
    }

    fn formula_of(&self, a: &Poly) -> Term {
        match a {
            Poly::Bottom => Term::false_(),
            Poly::Hull(p) => p.to_term(),
        }
    }

    fn exists<F>(&self, a: &Poly, keep: F) -> Poly
    where
        F: Fn(&str) -> bool,
    {
        match a {
            Poly::Bottom => Poly::Bottom,
            Poly::Hull(p) => Poly::Hull(p.project(|m| m.iter().all(|s| keep(s)))),
        }
    }

    fn equal(&self, a: &Poly, b: &Poly) -> bool {
        match (a.polyhedron(), b.polyhedron()) {
            (None, None) => true,
            (Some(p), None) | (None, Some(p)) => !p.is_feasible(),
            (Some(p), Some(q)) => p.leq(q) && q.leq(p),
        }
    }

    fn is_bottom(&self, a: &Poly) -> bool {
        a.polyhedron().map_or(true, |p| !p.is_feasible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::Sort;

    fn poly(ts: &[Term]) -> Poly {
        Poly::of_cube(&Term::and(ts.iter().cloned()))
    }

    #[test]
    fn test_join_and_widen() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let a = poly(&[Term::equals(&x, 0)]);
        let b = poly(&[Term::equals(&x, 1)]);
        let d = Polyhedral;
        let j = d.join(&a, &b);
        insta::assert_snapshot!(d.formula_of(&j).to_string(), @"0 <= x & x <= 1");
        let c = poly(&[Term::leq(0, &x), Term::leq(&x, 2)]);
        let w = d.widen(&j, &c);
        insta::assert_snapshot!(d.formula_of(&w).to_string(), @"0 <= x");
        assert!(d.equal(&d.widen(&w, &d.join(&w, &c)), &w));
        assert_eq!(d.join(&Poly::Bottom, &a), a);
        assert!(d.is_bottom(&poly(&[Term::lt(&x, 0), Term::gt(&x, 0)])));
        assert!(!d.is_bottom(&d.top()));
    }

    #[test]
    fn test_abstract_of() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Real);
        let y = ctx.declare("y", Sort::Real);
        let conf = SolverConf::native();
        // y = 2x on 0 <= x <= 1 or 3 <= x <= 4; the hull over y is [0, 8]
        let t = Term::and([
            Term::equals(&y, Term::mul(2, &x)),
            Term::or([
                Term::and([Term::leq(0, &x), Term::leq(&x, 1)]),
                Term::and([Term::leq(3, &x), Term::leq(&x, 4)]),
            ]),
        ]);
        let d = Polyhedral;
        let hull = d.abstract_of(&ctx, &conf, &t, |s| s == "y").unwrap();
        let expected = poly(&[Term::leq(0, &y), Term::leq(&y, 8)]);
        assert!(d.equal(&hull, &expected), "got {}", d.formula_of(&hull));

        let unsat = Term::and([Term::lt(&x, 0), Term::gt(&x, 0)]);
        assert!(d.is_bottom(&d.abstract_of(&ctx, &conf, &unsat, |_| true).unwrap()));
    }

    #[test]
    fn test_exists() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Real);
        let y = ctx.declare("y", Sort::Real);
        let d = Polyhedral;
        let p = poly(&[Term::leq(&x, &y), Term::leq(&y, 3)]);
        let q = d.exists(&p, |s| s == "x");
        insta::assert_snapshot!(d.formula_of(&q).to_string(), @"x <= 3");
    }
}
