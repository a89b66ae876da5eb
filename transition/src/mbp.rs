// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Model-based projection: eliminate symbols from a quantifier-free formula
//! one model-guided cube at a time.
//!
//! The formula is purified (no `ite`, `floor`, `div` or `mod`) and put in
//! negation normal form. A model then selects an implicant cube, whose linear
//! part is projected guided by the model: integer symbols with Cooper's
//! method, which leaves divisibility atoms `p mod m = 0` behind, and real
//! symbols with Loos-Weispfenning virtual substitution. Nonlinear monomials
//! are treated as opaque dimensions; atoms that are not polynomial and
//! boolean literals that mention an eliminated symbol are dropped. Each cube
//! implies the projection, and the disjunction of all cubes is exact for
//! linear arithmetic over the integers and over the reals separately. An
//! integer symbol that shares a constraint with a real one is eliminated as
//! a real, which over-approximates.

use formula::{
    context::Context,
    linear::{Constraint, Divides, Monomial},
    polyhedron::Polyhedron,
    semantics::Model,
    syntax::{NOp, Rat, Sort, Term, UOp},
    term::{nnf::nnf, purify::purify},
};
use num_traits::{One, Zero};
use solver::{ModelResp, SatResp, SolverConf};

use crate::error::QueryError;

/// An implicant of a formula in negation normal form: a set of atoms that
/// hold in `model` and together imply the formula. `None` if the formula does
/// not hold in the model.
pub fn implicant(t: &Term, model: &Model) -> Option<Vec<Term>> {
    match t {
        Term::Literal(true) => Some(vec![]),
        Term::Literal(false) => None,
        Term::NAryOp(NOp::And, ts) => {
            let mut atoms = vec![];
            for t in ts {
                atoms.append(&mut implicant(t, model)?);
            }
            Some(atoms)
        }
        Term::NAryOp(NOp::Or, ts) => ts
            .iter()
            .find(|t| model.eval_bool(t) == Some(true))
            .and_then(|t| implicant(t, model)),
        atom if model.eval_bool(atom) == Some(true) => Some(vec![atom.clone()]),
        _ => None,
    }
}

/// The value of a monomial in a model; symbols the model does not bind count
/// as zero.
pub(crate) fn monomial_value(model: &Model, m: &Monomial) -> Rat {
    m.iter()
        .map(|s| model.get_num(s).unwrap_or_else(Rat::zero))
        .fold(Rat::one(), |acc, v| acc * v)
}

/// Project the implicant of `formula` selected by `model` onto the symbols for
/// which `keep` holds. `formula` must be purified and in negation normal form,
/// and hold in `model`; a model the formula does not evaluate to true in is
/// reported as unknown.
pub(crate) fn cube_of<F>(ctx: &Context, formula: &Term, model: &Model, keep: F) -> Result<Term, QueryError>
where
    F: Fn(&str) -> bool,
{
    let Some(atoms) = implicant(formula, model) else {
        return Err(QueryError::Unknown(format!(
            "model does not satisfy the formula being projected:\n{model}"
        )));
    };
    let mut kept = vec![];
    let mut constraints = vec![];
    for atom in atoms {
        let is_literal = match &atom {
            Term::Id(_) => true,
            Term::UnaryOp(UOp::Not, arg) => matches!(arg.as_ref(), Term::Id(_)),
            _ => false,
        };
        if is_literal {
            if atom.symbols().iter().all(|s| keep(s)) {
                kept.push(atom);
            }
            continue;
        }
        match Constraint::from_atom(&atom) {
            Some(c) => constraints.push(c),
            None => {
                if atom.symbols().iter().all(|s| keep(s)) {
                    kept.push(atom);
                }
            }
        }
    }
    let (projected, divisibility) = Polyhedron::new(constraints).project_int_with_model(
        |m| m.iter().any(|s| !keep(s)),
        |m| m.iter().all(|s| ctx.sort_of(s) == Some(Sort::Int)),
        |m| monomial_value(model, m),
    );
    kept.push(projected.to_term());
    kept.extend(divisibility.iter().map(Divides::to_term));
    Ok(Term::and(kept))
}

/// Project `formula` onto the symbols satisfying `keep` with a single cube: the
/// result implies `∃ others. formula` and is satisfiable whenever `formula` is.
/// Returns `None` if `formula` is unsatisfiable.
pub fn project_cube<F>(
    ctx: &Context,
    conf: &SolverConf,
    formula: &Term,
    keep: F,
) -> Result<Option<Term>, QueryError>
where
    F: Fn(&str) -> bool,
{
    let purified = purify(ctx, formula);
    let formula = nnf(ctx, &purified.formula);
    match conf.get_model(ctx, &formula)? {
        ModelResp::Sat(model) => Ok(Some(cube_of(ctx, &formula, &model, keep)?)),
        ModelResp::Unsat => Ok(None),
        ModelResp::Unknown(reason) => Err(QueryError::Unknown(reason)),
    }
}

/// Project `formula` onto the symbols satisfying `keep`, as a disjunction of
/// cubes. The result is equivalent to `∃ others. formula` for linear rational
/// arithmetic and implied by it otherwise. An unsatisfiable formula projects
/// to `false`.
pub fn project<F>(ctx: &Context, conf: &SolverConf, formula: &Term, keep: F) -> Result<Term, QueryError>
where
    F: Fn(&str) -> bool,
{
    let purified = purify(ctx, formula);
    let formula = nnf(ctx, &purified.formula);
    let mut solver = conf.solver(ctx)?;
    solver.assert(&formula)?;
    let mut cubes = vec![];
    loop {
        match solver.check_sat(&[])? {
            SatResp::Sat => (),
            SatResp::Unsat => break,
            SatResp::Unknown(reason) => return Err(QueryError::Unknown(reason)),
        }
        let model = solver.get_model()?;
        let cube = cube_of(ctx, &formula, &model, &keep)?;
        log::debug!("mbp cube {}: {cube}", cubes.len());
        solver.assert(&Term::not(&cube))?;
        cubes.push(cube);
    }
    Ok(Term::or(cubes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::{rat, Sort};
    use solver::SatResp;

    fn valid(ctx: &Context, conf: &SolverConf, t: Term) -> bool {
        conf.check(ctx, &Term::not(t)).unwrap() == SatResp::Unsat
    }

    #[test]
    fn test_implicant() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let p = ctx.declare("p", Sort::Bool);
        let t = Term::and([
            Term::or([Term::lt(&x, 0), Term::gt(&x, 5)]),
            Term::or([p.clone(), Term::equals(&x, 7)]),
        ]);
        let model: Model = [
            ("x".to_string(), formula::semantics::Value::Num(rat(7))),
            ("p".to_string(), formula::semantics::Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        let atoms = implicant(&t, &model).unwrap();
        assert_eq!(atoms, vec![Term::gt(&x, 5), Term::equals(&x, 7)]);
    }

    #[test]
    fn test_project_linear() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Real);
        let y = ctx.declare("y", Sort::Real);
        let conf = SolverConf::native();
        // ∃y. x < y < 3  ==  x < 3
        let t = Term::and([Term::lt(&x, &y), Term::lt(&y, 3)]);
        let p = project(&ctx, &conf, &t, |s| s == "x").unwrap();
        assert!(!p.mentions("y"));
        assert!(valid(&ctx, &conf, Term::iff(&p, Term::lt(&x, 3))));
    }

    #[test]
    fn test_project_disjunction_is_complete() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Real);
        let y = ctx.declare("y", Sort::Real);
        let conf = SolverConf::native();
        // ∃y. (y = x + 1 ∧ y < 0) ∨ (y = x - 1 ∧ y > 10)  ==  x < -1 ∨ x > 11
        let t = Term::or([
            Term::and([Term::equals(&y, Term::add(&x, 1)), Term::lt(&y, 0)]),
            Term::and([Term::equals(&y, Term::sub(&x, 1)), Term::gt(&y, 10)]),
        ]);
        let p = project(&ctx, &conf, &t, |s| s == "x").unwrap();
        let expected = Term::or([Term::lt(&x, -1), Term::gt(&x, 11)]);
        assert!(valid(&ctx, &conf, Term::iff(&p, expected)));
    }

    #[test]
    fn test_project_int_keeps_parity() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let h = ctx.declare("h", Sort::Int);
        let conf = SolverConf::native();
        // ∃h. x = 2h  ==  x mod 2 = 0, which the rational relaxation loses
        let t = Term::equals(&x, Term::mul(2, &h));
        let p = project(&ctx, &conf, &t, |s| s == "x").unwrap();
        assert!(!p.mentions("h"));
        let even = Term::equals(Term::modulo(&x, 2), 0);
        assert!(valid(&ctx, &conf, Term::iff(&p, even)));

        // ∃h. 0 <= h <= 3 ∧ x = 3h + 1  ==  x ∈ {1, 4, 7, 10}
        let t = Term::and([
            Term::leq(0, &h),
            Term::leq(&h, 3),
            Term::equals(&x, Term::add(Term::mul(3, &h), 1)),
        ]);
        let p = project(&ctx, &conf, &t, |s| s == "x").unwrap();
        let expected = Term::or([1, 4, 7, 10].map(|v| Term::equals(&x, v)));
        assert!(valid(&ctx, &conf, Term::iff(&p, expected)));
    }

    #[test]
    fn test_cube_of_unsatisfied_model() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let model: Model = [("x".to_string(), formula::semantics::Value::Num(rat(1)))]
            .into_iter()
            .collect();
        let result = cube_of(&ctx, &Term::gt(&x, 5), &model, |_| true);
        assert!(matches!(result, Err(QueryError::Unknown(_))));
    }

    #[test]
    fn test_project_cube_soundness() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let p = ctx.declare("p", Sort::Bool);
        let conf = SolverConf::native();
        let t = Term::and([
            Term::leq(&x, &y),
            Term::leq(&y, 10),
            Term::implies(&p, Term::equals(Term::modulo(&y, 2), 0)),
        ]);
        let cube = project_cube(&ctx, &conf, &t, |s| s == "x").unwrap().unwrap();
        assert!(cube.symbols().iter().all(|s| s == "x"));
        // the cube is implied by nothing stronger than the formula's projection
        assert!(valid(
            &ctx,
            &conf,
            Term::implies(&cube, Term::leq(&x, 10))
        ));
        assert_eq!(
            conf.check(&ctx, &Term::and([cube, t])).unwrap(),
            SatResp::Sat
        );
        let unsat = Term::and([Term::lt(&x, 0), Term::gt(&x, 0)]);
        assert_eq!(project_cube(&ctx, &conf, &unsat, |_| true).unwrap(), None);
    }

    #[test]
    fn test_project_drops_opaque_atoms() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let conf = SolverConf::native();
        let t = Term::and([
            Term::equals(Term::mul(&x, &y), 6),
            Term::equals(&x, 2),
            Term::gt(&y, 0),
        ]);
        let p = project(&ctx, &conf, &t, |s| s == "x").unwrap();
        assert!(!p.mentions("y"));
        // every model of the formula satisfies the projection
        assert!(valid(&ctx, &conf, Term::implies(t, p)));
    }
}
