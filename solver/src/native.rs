// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! An in-process [`Solver`] for quantifier-free linear arithmetic.
//!
//! Formulas are purified and put in negation normal form, then searched
//! DPLL-style: conjunctions are saturated into a cube of literals and the
//! smallest remaining disjunction is split, after a rational feasibility check
//! (Fourier-Motzkin) of the cube so far. Complete cubes are decided by solving
//! integer equalities by substitution, then branch and bound over integer
//! dimensions on top of constraint tightening.
//!
//! Nonlinear monomials are treated as independent dimensions, so a candidate
//! model is only reported when it evaluates the purified assertions to true.
//! When it does not, the symbols of nonlinear monomials are fixed to their
//! candidate values and the search is repeated once; if that fails too the
//! answer is unknown. Exhausting the branch-and-bound budget or
//! the timeout also answers unknown.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use formula::{
    context::Context,
    linear::{Constraint, Monomial, Polynomial, Rel},
    polyhedron::Polyhedron,
    semantics::{Model, Value},
    syntax::{NOp, Rat, Sort, Term, UOp},
    term::{
        nnf::nnf,
        purify::purify,
        subst::{substitute, Substitution},
    },
};
use num_traits::{One, Signed, Zero};
use smtlib::proc::{SatResp, SolverError};

use crate::basics::Solver;

/// Default number of branch-and-bound nodes explored per cube.
pub const DEFAULT_BRANCH_LIMIT: usize = 1000;

enum Outcome {
    Sat(Model),
    Unsat,
    Unknown(String),
}

/// The literals collected along one branch of the search.
#[derive(Clone, Debug, Default)]
struct Cube {
    bools: BTreeMap<String, bool>,
    constraints: Vec<Constraint>,
}

impl Cube {
    /// Add an atom of negation normal form. Returns false on a conflict that
    /// is evident without arithmetic reasoning.
    fn add(&mut self, atom: &Term) -> bool {
        match atom {
            Term::Literal(b) => *b,
            Term::Id(p) => self.assign(p, true),
            Term::UnaryOp(UOp::Not, arg) => match arg.as_ref() {
                Term::Id(p) => self.assign(p, false),
                _ => true,
            },
            _ => match Constraint::from_atom(atom) {
                Some(c) if c.trivial_value() == Some(false) => false,
                Some(c) => {
                    self.constraints.push(c);
                    true
                }
                // non-polynomial atoms are only checked against the model
                None => true,
            },
        }
    }

    fn assign(&mut self, p: &str, value: bool) -> bool {
        *self.bools.entry(p.to_string()).or_insert(value) == value
    }
}

/// The result of searching for a point with integral integer dimensions.
enum Point {
    Found(BTreeMap<Monomial, Rat>),
    Empty,
    GaveUp(String),
}

struct Search<'a> {
    ctx: &'a Context,
    /// the purified conjunction being decided
    formula: &'a Term,
    deadline: Option<Instant>,
    branch_limit: usize,
}

impl Search<'_> {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn is_int(&self, m: &Monomial) -> bool {
        m.iter().all(|s| self.ctx.sort_of(s) == Some(Sort::Int))
    }

    fn search(&self, mut cube: Cube, mut todo: Vec<Term>) -> Outcome {
        let mut ors: Vec<Vec<Term>> = vec![];
        while let Some(t) = todo.pop() {
            match t {
                Term::NAryOp(NOp::And, ts) => todo.extend(ts),
                Term::NAryOp(NOp::Or, ts) => ors.push(ts),
                atom => {
                    if !cube.add(&atom) {
                        return Outcome::Unsat;
                    }
                }
            }
        }
        if self.expired() {
            return Outcome::Unknown("timeout".to_string());
        }
        let smallest = (0..ors.len()).min_by_key(|&i| ors[i].len());
        let Some(smallest) = smallest else {
            return self.leaf(&cube);
        };
        if !Polyhedron::new(cube.constraints.iter().cloned()).is_feasible() {
            return Outcome::Unsat;
        }
        let disjuncts = ors.swap_remove(smallest);
        let rest: Vec<Term> = ors
            .into_iter()
            .map(|ts| Term::NAryOp(NOp::Or, ts))
            .collect();
        let mut unknown = None;
        for d in disjuncts {
            let mut todo = rest.clone();
            todo.push(d);
            match self.search(cube.clone(), todo) {
                Outcome::Sat(model) => return Outcome::Sat(model),
                Outcome::Unsat => (),
                Outcome::Unknown(reason) => unknown = Some(reason),
            }
        }
        match unknown {
            Some(reason) => Outcome::Unknown(reason),
            None => Outcome::Unsat,
        }
    }

    fn leaf(&self, cube: &Cube) -> Outcome {
        let point = match self.integer_point(&cube.constraints) {
            Point::Found(point) => point,
            Point::Empty => return Outcome::Unsat,
            Point::GaveUp(reason) => return Outcome::Unknown(reason),
        };
        let model = self.model_of(cube, &point);
        if model.eval_bool(self.formula) == Some(true) {
            return Outcome::Sat(model);
        }
        log::trace!("candidate model rejected:\n{model}");

        // Fix symbols of nonlinear monomials to their candidate values, which
        // linearizes the cube, and look for a point again. Each attempt leaves
        // one of them free; the last fixes them all.
        let nonlinear: Vec<String> = cube
            .constraints
            .iter()
            .flat_map(|c| c.poly.dims())
            .filter(|m| m.len() > 1)
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if nonlinear.is_empty() {
            return Outcome::Unknown("candidate model violates the assertions".to_string());
        }
        let attempts = nonlinear
            .iter()
            .map(|free| nonlinear.iter().filter(|s| *s != free).collect::<Vec<_>>())
            .chain([nonlinear.iter().collect()]);
        for to_fix in attempts {
            if self.expired() {
                return Outcome::Unknown("timeout".to_string());
            }
            if let Some(model) = self.linearized(cube, &model, &to_fix) {
                return Outcome::Sat(model);
            }
        }
        Outcome::Unknown("candidate model violates a nonlinear constraint".to_string())
    }

    /// Search the cube again with the symbols `to_fix` fixed to their values
    /// in `candidate`, returning a model of the formula if one is found.
    fn linearized(&self, cube: &Cube, candidate: &Model, to_fix: &[&String]) -> Option<Model> {
        let fixed: Substitution = to_fix
            .iter()
            .map(|s| {
                let v = candidate.get_num(s).unwrap_or_else(Rat::zero);
                (s.to_string(), Term::Num(v))
            })
            .collect();
        let mut constraints: Vec<Constraint> = cube
            .constraints
            .iter()
            .filter_map(|c| Constraint::from_atom(&substitute(&c.to_term(), &fixed)))
            .collect();
        for (s, v) in &fixed {
            let v = v.as_num().cloned().unwrap_or_else(Rat::zero);
            constraints.push(Constraint::new(
                &Polynomial::var(s) - &Polynomial::constant(v),
                Rel::Eq,
            ));
        }
        match self.integer_point(&constraints) {
            Point::Found(point) => {
                let model = self.model_of(cube, &point);
                (model.eval_bool(self.formula) == Some(true)).then_some(model)
            }
            Point::Empty | Point::GaveUp(_) => None,
        }
    }

    /// Complete a point to a model of the symbols of the formula. Unconstrained
    /// booleans are false and unconstrained numbers are zero.
    fn model_of(&self, cube: &Cube, point: &BTreeMap<Monomial, Rat>) -> Model {
        let mut model = Model::new();
        for name in self.formula.symbols() {
            let value = match self.ctx.sort_of(&name) {
                Some(Sort::Bool) => Value::Bool(cube.bools.get(&name).copied().unwrap_or(false)),
                _ => Value::Num(
                    point
                        .get(&vec![name.clone()])
                        .cloned()
                        .unwrap_or_else(Rat::zero),
                ),
            };
            model.insert(&name, value);
        }
        model
    }

    /// Tighten a constraint over integer dimensions only.
    fn tighten(&self, c: &Constraint) -> Constraint {
        if c.poly.dims().all(|m| self.is_int(m)) {
            c.tighten_int()
        } else {
            c.clone()
        }
    }

    /// Solve equalities over integer dimensions by substitution, introducing a
    /// fresh integer `sigma` when no coefficient is a unit:
    /// for `a·m + Σ b·n + c = 0` with `a > 1` the least coefficient,
    /// `m = sigma - Σ floor(b/a)·n - floor(c/a)` rewrites the equation to
    /// `a·sigma + Σ (b mod a)·n + (c mod a) = 0`, whose least coefficient is
    /// smaller. Returns the remaining constraints and the definitions of the
    /// eliminated dimensions in elimination order, or `None` if the equalities
    /// have no integer solution.
    fn solve_int_equalities(
        &self,
        mut constraints: Vec<Constraint>,
    ) -> Option<(Vec<Constraint>, Vec<(Monomial, Polynomial)>)> {
        let mut defs = vec![];
        loop {
            // a symbol that occurs in a product cannot be substituted away
            let in_products: BTreeSet<String> = constraints
                .iter()
                .flat_map(|c| c.poly.dims())
                .filter(|m| m.len() > 1)
                .flatten()
                .cloned()
                .collect();
            let solvable = |m: &Monomial| m.len() == 1 && self.is_int(m) && !in_products.contains(&m[0]);
            let mut best: Option<(usize, Monomial, Rat)> = None;
            for (i, c) in constraints.iter().enumerate() {
                if c.rel != Rel::Eq || !c.poly.dims().all(|m| self.is_int(m)) {
                    continue;
                }
                let poly = c.poly.integral();
                let all_solvable = poly.dims().all(solvable);
                for (m, a) in poly.terms() {
                    let a = a.abs();
                    let smaller = best.as_ref().map_or(true, |(_, _, b)| a < *b);
                    if solvable(m) && (a.is_one() || all_solvable) && smaller {
                        best = Some((i, m.clone(), a));
                    }
                }
            }
            let Some((i, m, _)) = best else {
                return Some((constraints, defs));
            };
            let eq = constraints.swap_remove(i);
            let mut poly = eq.poly.integral();
            if poly.coeff(&m).is_negative() {
                poly = -&poly;
            }
            let a = poly.coeff(&m);
            let rest = &poly - &Polynomial::monomial(m.clone(), a.clone());
            let def = if a.is_one() {
                -&rest
            } else {
                let sigma = self.ctx.fresh_name("sigma", Sort::Int);
                let floor_div = |b: &Rat| (b / &a).floor();
                let mut def = &Polynomial::var(&sigma) - &Polynomial::constant(floor_div(rest.constant_part()));
                for (n, b) in rest.terms() {
                    def = &def - &Polynomial::monomial(n.clone(), floor_div(b));
                }
                // rewritten by the substitution below
                constraints.push(Constraint::new(poly, Rel::Eq));
                def
            };
            let mut next = vec![];
            for c in &constraints {
                let c = self.tighten(&Constraint::new(c.poly.substitute_dim(&m, &def), c.rel));
                match c.trivial_value() {
                    Some(false) => return None,
                    Some(true) => (),
                    None => next.push(c),
                }
            }
            constraints = next;
            defs.push((m, def));
        }
    }

    /// A point with integral integer dimensions: integer equalities are solved
    /// first, then the rest is left to branch and bound.
    fn integer_point(&self, constraints: &[Constraint]) -> Point {
        let tightened: Vec<Constraint> = constraints.iter().map(|c| self.tighten(c)).collect();
        if tightened.iter().any(|c| c.trivial_value() == Some(false)) {
            return Point::Empty;
        }
        let Some((rest, defs)) = self.solve_int_equalities(tightened) else {
            return Point::Empty;
        };
        let mut point = match self.branch_and_bound(Polyhedron::new(rest)) {
            Point::Found(point) => point,
            other => return other,
        };
        for (m, def) in defs.iter().rev() {
            let v = def
                .eval_dims(|d| Some(point.get(d).cloned().unwrap_or_else(Rat::zero)))
                .unwrap_or_else(Rat::zero);
            point.insert(m.clone(), v);
        }
        Point::Found(point)
    }

    /// Branch and bound over the integer dimensions.
    fn branch_and_bound(&self, start: Polyhedron) -> Point {
        let is_int = |m: &Monomial| self.is_int(m);
        let mut stack = vec![start];
        let mut nodes = 0;
        while let Some(p) = stack.pop() {
            nodes += 1;
            if nodes > self.branch_limit {
                return Point::GaveUp(format!(
                    "branch and bound exceeded {} nodes",
                    self.branch_limit
                ));
            }
            if self.expired() {
                return Point::GaveUp("timeout".to_string());
            }
            let Some(point) = p.sample(is_int) else {
                continue;
            };
            let fractional = point
                .iter()
                .find(|&(m, v)| is_int(m) && !v.is_integer());
            let Some((m, v)) = fractional else {
                return Point::Found(point);
            };
            let dim = Polynomial::monomial(m.clone(), Rat::one());
            // m <= floor(v) or m >= ceil(v)
            let below = Constraint::new(&dim - &Polynomial::constant(v.floor()), Rel::Leq);
            let above = Constraint::new(&Polynomial::constant(v.ceil()) - &dim, Rel::Leq);
            stack.push(p.with(above));
            stack.push(p.with(below));
        }
        Point::Empty
    }
}

/// An in-process solver for linear arithmetic over the integers and the
/// rationals. See the module documentation.
pub struct NativeSolver<'a> {
    ctx: &'a Context,
    assertions: Vec<Term>,
    scopes: Vec<usize>,
    timeout: Option<Duration>,
    branch_limit: usize,
    model: Option<Model>,
    core: Option<Vec<Term>>,
}

impl<'a> NativeSolver<'a> {
    /// Create a solver with no assertions.
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            assertions: vec![],
            scopes: vec![],
            timeout: None,
            branch_limit: DEFAULT_BRANCH_LIMIT,
            model: None,
            core: None,
        }
    }

    /// Set a per-check time limit. None disables the limit.
    pub fn timeout_ms(&mut self, ms: Option<usize>) -> &mut Self {
        self.timeout = ms.map(|ms| Duration::from_millis(ms as u64));
        return self;
    }

    /// Set the number of branch-and-bound nodes explored per cube.
    pub fn branch_limit(&mut self, limit: usize) -> &mut Self {
        self.branch_limit = limit;
        return self;
    }

    fn solve(&self, assumptions: &[Term], deadline: Option<Instant>) -> Outcome {
        let formula = Term::and(self.assertions.iter().chain(assumptions).cloned());
        let purified = purify(self.ctx, &formula);
        let search = Search {
            ctx: self.ctx,
            formula: &purified.formula,
            deadline,
            branch_limit: self.branch_limit,
        };
        match search.search(Cube::default(), vec![nnf(self.ctx, &purified.formula)]) {
            Outcome::Sat(model) => {
                let symbols = formula.symbols();
                Outcome::Sat(model.restrict(|s| symbols.contains(s)))
            }
            other => other,
        }
    }

    /// Deletion-based minimization of an unsatisfiable set of assumptions.
    fn minimize(&self, assumptions: &[Term], deadline: Option<Instant>) -> Vec<Term> {
        let mut core = assumptions.to_vec();
        let mut i = 0;
        while i < core.len() {
            let mut candidate = core.clone();
            candidate.remove(i);
            if matches!(self.solve(&candidate, deadline), Outcome::Unsat) {
                core = candidate;
            } else {
                i += 1;
            }
        }
        core
    }
}

impl Solver for NativeSolver<'_> {
    fn assert(&mut self, t: &Term) -> Result<(), SolverError> {
        self.assertions.push(t.clone());
        Ok(())
    }

    fn push(&mut self) -> Result<(), SolverError> {
        self.scopes.push(self.assertions.len());
        Ok(())
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        let len = self.scopes.pop().expect("pop without a matching push");
        self.assertions.truncate(len);
        Ok(())
    }

    fn check_sat(&mut self, assumptions: &[Term]) -> Result<SatResp, SolverError> {
        self.model = None;
        self.core = None;
        let start = Instant::now();
        let deadline = self.timeout.map(|t| start + t);
        let resp = match self.solve(assumptions, deadline) {
            Outcome::Sat(model) => {
                self.model = Some(model);
                SatResp::Sat
            }
            Outcome::Unsat => {
                self.core = Some(self.minimize(assumptions, deadline));
                SatResp::Unsat
            }
            Outcome::Unknown(reason) => SatResp::Unknown(reason),
        };
        log::debug!(
            "native solver returned {resp:?} after {}ms ({} assertions, {} assumptions)",
            start.elapsed().as_millis(),
            self.assertions.len(),
            assumptions.len(),
        );
        Ok(resp)
    }

    fn get_model(&mut self) -> Result<Model, SolverError> {
        self.model.clone().ok_or_else(|| {
            SolverError::UnexpectedResponse("get-model without a sat response".to_string())
        })
    }

    fn get_unsat_core(&mut self) -> Result<Vec<Term>, SolverError> {
        self.core.clone().ok_or_else(|| {
            SolverError::UnexpectedResponse("get-unsat-core without an unsat response".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::rat;

    fn check(ctx: &Context, assertions: &[Term]) -> (SatResp, Option<Model>) {
        let mut solver = NativeSolver::new(ctx);
        for t in assertions {
            solver.assert(t).unwrap();
        }
        let resp = solver.check_sat(&[]).unwrap();
        let model = solver.get_model().ok();
        if let Some(model) = &model {
            for t in assertions {
                assert_eq!(model.eval_bool(t), Some(true), "model violates {t}");
            }
        }
        (resp, model)
    }

    #[test_log::test]
    fn test_rational_model() {
        let ctx = Context::new();
        let r = ctx.declare("r", Sort::Real);
        let (resp, model) = check(&ctx, &[Term::equals(Term::mul(2, &r), 1)]);
        assert_eq!(resp, SatResp::Sat);
        assert_eq!(
            model.unwrap().get_num("r"),
            Some(Rat::new(1.into(), 2.into()))
        );
    }

    #[test]
    fn test_integer_tightening() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let (resp, _) = check(&ctx, &[Term::equals(Term::mul(2, &x), 1)]);
        assert_eq!(resp, SatResp::Unsat);
        let (resp, _) = check(&ctx, &[Term::lt(2, Term::mul(2, &x)), Term::lt(Term::mul(2, &x), 4)]);
        assert_eq!(resp, SatResp::Unsat);
        let (resp, model) = check(&ctx, &[Term::lt(1, Term::mul(2, &x)), Term::lt(Term::mul(2, &x), 4)]);
        assert_eq!(resp, SatResp::Sat);
        assert_eq!(model.unwrap().get_num("x"), Some(rat(1)));
    }

    #[test]
    fn test_branch_and_bound() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        // 3x + 3y = 6 and x - y = 1 has only the rational solution (3/2, 1/2)
        let (resp, _) = check(
            &ctx,
            &[
                Term::equals(Term::add(Term::mul(3, &x), Term::mul(3, &y)), 6),
                Term::equals(Term::sub(&x, &y), 1),
            ],
        );
        assert_eq!(resp, SatResp::Unsat);
        let (resp, _) = check(
            &ctx,
            &[
                Term::leq(1, Term::add(Term::mul(2, &x), Term::mul(2, &y))),
                Term::leq(Term::add(Term::mul(2, &x), Term::mul(2, &y)), 3),
                Term::leq(0, &x),
                Term::leq(0, &y),
            ],
        );
        assert_eq!(resp, SatResp::Sat);
    }

    #[test]
    fn test_parity_conflict_without_branching() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let h = ctx.declare("h", Sort::Int);
        let g = ctx.declare("g", Sort::Int);
        // an even number equal to an odd one; the rational relaxation is
        // unbounded, so branching alone never refutes it
        let mut solver = NativeSolver::new(&ctx);
        solver.branch_limit(5);
        solver.assert(&Term::equals(&x, Term::mul(2, &h))).unwrap();
        solver.assert(&Term::equals(&y, Term::add(Term::mul(2, &g), 1))).unwrap();
        solver.assert(&Term::equals(&x, &y)).unwrap();
        assert_eq!(solver.check_sat(&[]).unwrap(), SatResp::Unsat);
    }

    #[test_log::test]
    fn test_equality_without_unit_coefficient() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let eq = Term::equals(Term::add(Term::mul(3, &x), Term::mul(5, &y)), 1);
        // 3x + 5y = 1 forces x = 2 (mod 5)
        let (resp, model) = check(&ctx, &[eq.clone(), Term::leq(5, &x), Term::leq(&x, 8)]);
        assert_eq!(resp, SatResp::Sat);
        let model = model.unwrap();
        assert_eq!(model.get_num("x"), Some(rat(7)));
        assert_eq!(model.get_num("y"), Some(rat(-4)));
        let (resp, _) = check(&ctx, &[eq, Term::leq(3, &x), Term::leq(&x, 6)]);
        assert_eq!(resp, SatResp::Unsat);
    }

    #[test]
    fn test_division_by_symbol() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let r = ctx.declare("r", Sort::Real);
        let d = ctx.declare("d", Sort::Real);
        let (resp, model) = check(
            &ctx,
            &[
                Term::equals(&y, 3),
                Term::equals(Term::modulo(&x, &y), 2),
                Term::equals(Term::idiv(&x, &y), 4),
            ],
        );
        assert_eq!(resp, SatResp::Sat);
        let model = model.unwrap();
        assert_eq!(model.get_num("x"), Some(rat(14)));
        // only the asserted symbols are reported
        assert_eq!(model.symbols().count(), 2);

        let (resp, model) = check(&ctx, &[Term::equals(&d, 2), Term::equals(Term::div(&r, &d), 3)]);
        assert_eq!(resp, SatResp::Sat);
        assert_eq!(model.unwrap().get_num("r"), Some(rat(6)));
    }

    #[test]
    fn test_disjunctions_and_bools() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let p = ctx.declare("p", Sort::Bool);
        let q = ctx.declare("q", Sort::Bool);
        let (resp, model) = check(
            &ctx,
            &[
                Term::or([Term::lt(&x, 0), Term::gt(&x, 5)]),
                Term::gt(&x, -1),
                Term::lt(&x, 7),
                Term::or([p.clone(), q.clone()]),
                Term::not(&p),
            ],
        );
        assert_eq!(resp, SatResp::Sat);
        let model = model.unwrap();
        assert_eq!(model.get_num("x"), Some(rat(6)));
        assert_eq!(model.get("q"), Some(&Value::Bool(true)));
        let (resp, _) = check(&ctx, &[Term::iff(&p, Term::not(&q)), Term::equals(&p, &q)]);
        assert_eq!(resp, SatResp::Unsat);
    }

    #[test]
    fn test_div_mod_ite() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let (resp, model) = check(
            &ctx,
            &[
                Term::equals(Term::modulo(&x, 3), 2),
                Term::equals(Term::idiv(&x, 3), 4),
                Term::gt(Term::ite(Term::lt(&x, 0), Term::sub(0, &x), &x), 10),
            ],
        );
        assert_eq!(resp, SatResp::Sat);
        assert_eq!(model.unwrap().get_num("x"), Some(rat(14)));
    }

    #[test]
    fn test_nonlinear_is_unknown() {
        let ctx = Context::new();
        let r = ctx.declare("r", Sort::Real);
        let (resp, _) = check(&ctx, &[Term::equals(Term::mul(&r, &r), 2)]);
        assert!(matches!(resp, SatResp::Unknown(_)), "got {resp:?}");
    }

    #[test]
    fn test_nonlinear_linearized_by_model() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let y = ctx.declare("y", Sort::Int);
        let (resp, model) = check(
            &ctx,
            &[Term::equals(&x, 2), Term::equals(Term::mul(&x, &y), 6)],
        );
        assert_eq!(resp, SatResp::Sat);
        assert_eq!(model.unwrap().get_num("y"), Some(rat(3)));
    }

    #[test]
    fn test_push_pop() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let mut solver = NativeSolver::new(&ctx);
        solver.assert(&Term::gt(&x, 0)).unwrap();
        solver.push().unwrap();
        solver.assert(&Term::lt(&x, 0)).unwrap();
        assert_eq!(solver.check_sat(&[]).unwrap(), SatResp::Unsat);
        solver.pop().unwrap();
        assert_eq!(solver.check_sat(&[]).unwrap(), SatResp::Sat);
        assert!(solver.get_unsat_core().is_err());
    }

    #[test]
    fn test_unsat_core_is_minimal() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let mut solver = NativeSolver::new(&ctx);
        let a = Term::lt(&x, 0);
        let b = Term::gt(&x, 5);
        let c = Term::gt(&x, 10);
        let resp = solver.check_sat(&[a.clone(), b, c.clone()]).unwrap();
        assert_eq!(resp, SatResp::Unsat);
        assert_eq!(solver.get_unsat_core().unwrap(), vec![a, c]);
    }
}
