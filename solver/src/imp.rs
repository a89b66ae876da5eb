// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A [`Solver`] backed by an external SMT-LIB process.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use formula::{
    context::Context,
    semantics::{Model, Value},
    syntax::{Sort, Term, UOp},
};
use smtlib::{
    conf::SolverCmd,
    proc::{SatResp, SmtProc, SolverError},
    sexp::{app, atom_s, InterpretedValue, Sexp},
};

use crate::{basics::Solver, sexp};

/// What was added in one assertion scope, so it can be forgotten on pop.
#[derive(Debug, Default)]
struct Frame {
    declared: Vec<String>,
    asserts: Vec<Term>,
}

/// An SMT solver process, with symbols declared lazily from a [`Context`].
///
/// Assumptions that are not boolean literals are replaced by fresh indicator
/// symbols `ind` together with an assertion `ind => assumption`.
pub struct SmtSolver<'a> {
    ctx: &'a Context,
    proc: SmtProc,
    declared: HashSet<String>,
    base: Frame,
    frames: Vec<Frame>,
    /// indicators created so far, by the assumption they stand for
    indicators: HashMap<Term, String>,
    /// the last assumptions, by the s-expression they were sent as
    assumptions: BTreeMap<Sexp, Term>,
}

impl<'a> SmtSolver<'a> {
    /// Launch a solver process.
    ///
    /// The `tee` argument causes the SMT2 output sent to the solver to also be
    /// sent to a file, for debugging purposes.
    pub fn new(ctx: &'a Context, cmd: SolverCmd, tee: Option<&Path>) -> Result<Self, SolverError> {
        let proc = SmtProc::new(cmd, tee)?;
        Ok(Self {
            ctx,
            proc,
            declared: HashSet::new(),
            base: Frame::default(),
            frames: vec![],
            indicators: HashMap::new(),
            assumptions: BTreeMap::new(),
        })
    }

    /// Create a comment in the tee'd SMT file, if there is one.
    pub fn comment_with<F>(&mut self, comment: F)
    where
        F: FnOnce() -> String,
    {
        self.proc.comment_with(comment)
    }

    fn frame(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap_or(&mut self.base)
    }

    fn declare(&mut self, t: &Term) -> Result<(), SolverError> {
        for name in t.symbols() {
            if self.declared.contains(&name) {
                continue;
            }
            let sort = self
                .ctx
                .sort_of(&name)
                .unwrap_or_else(|| panic!("symbol {name} of {t} is not declared"));
            self.proc
                .send(&app("declare-const", [atom_s(&name), sexp::sort(sort)]))?;
            self.declared.insert(name.clone());
            self.frame().declared.push(name);
        }
        Ok(())
    }

    fn send_assert(&mut self, t: &Term) -> Result<(), SolverError> {
        self.declare(t)?;
        self.proc.send(&app("assert", [sexp::term(t)]))
    }

    /// The s-expression to pass as an assumption for `t`, creating an indicator
    /// if `t` is not a literal.
    fn assumption(&mut self, t: &Term) -> Result<Sexp, SolverError> {
        let is_literal = match t {
            Term::Id(_) => true,
            Term::UnaryOp(UOp::Not, arg) => matches!(arg.as_ref(), Term::Id(_)),
            _ => false,
        };
        if is_literal {
            self.declare(t)?;
            return Ok(sexp::term(t));
        }
        if let Some(ind) = self.indicators.get(t) {
            return Ok(atom_s(ind));
        }
        let ind = self.ctx.fresh_name("ind", Sort::Bool);
        self.send_assert(&Term::implies(Term::id(&ind), t))?;
        self.indicators.insert(t.clone(), ind.clone());
        Ok(atom_s(ind))
    }
}

impl Solver for SmtSolver<'_> {
    fn assert(&mut self, t: &Term) -> Result<(), SolverError> {
        self.send_assert(t)?;
        self.frame().asserts.push(t.clone());
        Ok(())
    }

    fn push(&mut self) -> Result<(), SolverError> {
        self.proc.push(1)?;
        self.frames.push(Frame::default());
        Ok(())
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        assert!(!self.frames.is_empty(), "pop without a matching push");
        self.proc.pop(1)?;
        if let Some(frame) = self.frames.pop() {
            for name in frame.declared {
                self.declared.remove(&name);
            }
        }
        // indicators asserted in the popped scope are gone too
        let declared = &self.declared;
        self.indicators.retain(|_, ind| declared.contains(ind));
        Ok(())
    }

    fn check_sat(&mut self, assumptions: &[Term]) -> Result<SatResp, SolverError> {
        self.assumptions.clear();
        let mut sexps = vec![];
        for t in assumptions {
            let s = self.assumption(t)?;
            self.assumptions.insert(s.clone(), t.clone());
            sexps.push(s);
        }
        self.proc.check_sat_assuming(&sexps)
    }

    fn get_model(&mut self) -> Result<Model, SolverError> {
        let indicators: HashSet<&String> = self.indicators.values().collect();
        let symbols: BTreeSet<String> = [&self.base]
            .into_iter()
            .chain(&self.frames)
            .flat_map(|f| &f.asserts)
            .chain(self.assumptions.values())
            .flat_map(|t| t.symbols())
            .filter(|s| !indicators.contains(s))
            .collect();
        let symbols: Vec<String> = symbols.into_iter().collect();
        let values = self
            .proc
            .get_value(&symbols.iter().map(atom_s).collect::<Vec<_>>())?;
        let mut model = Model::new();
        for (name, value) in symbols.iter().zip(values) {
            let value = match value.interpreted_value() {
                Some(InterpretedValue::Bool(b)) => Value::Bool(b),
                Some(InterpretedValue::Num(n)) => Value::Num(n),
                None => {
                    return Err(SolverError::UnexpectedResponse(format!(
                        "cannot interpret value {value} of {name}"
                    )))
                }
            };
            model.insert(name, value);
        }
        Ok(model)
    }

    fn get_unsat_core(&mut self) -> Result<Vec<Term>, SolverError> {
        let core = self.proc.get_unsat_assumptions()?;
        core.into_iter()
            .filter(|s| !matches!(s, Sexp::Comment(_)))
            .map(|s| {
                // CVC5 may print negated assumptions with a different head
                let negated = match s.app() {
                    Some(("!", [arg])) => Some(app("not", [arg.clone()])),
                    _ => None,
                };
                let s = negated.unwrap_or(s);
                self.assumptions.get(&s).cloned().ok_or_else(|| {
                    SolverError::UnexpectedResponse(format!(
                        "unsat assumption {s} is not an assumption"
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver_path;
    use formula::syntax::rat;
    use smtlib::conf::Z3Conf;

    fn z3(ctx: &Context) -> Option<SmtSolver<'_>> {
        let cmd = Z3Conf::new(&solver_path("z3")).done();
        match SmtSolver::new(ctx, cmd, None) {
            Ok(solver) => Some(solver),
            Err(_) => {
                eprintln!("could not find z3, skipping test");
                None
            }
        }
    }

    #[test]
    fn test_model_z3() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let r = ctx.declare("r", Sort::Real);
        let Some(mut solver) = z3(&ctx) else { return };
        solver.assert(&Term::equals(&x, 3)).unwrap();
        solver
            .assert(&Term::equals(Term::mul(2, &r), &x))
            .unwrap();
        assert_eq!(solver.check_sat(&[]).unwrap(), SatResp::Sat);
        let model = solver.get_model().unwrap();
        assert_eq!(model.get_num("x"), Some(rat(3)));
        assert_eq!(
            model.get_num("r"),
            Some(formula::syntax::Rat::new(3.into(), 2.into()))
        );
    }

    #[test]
    fn test_core_with_indicators_z3() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let Some(mut solver) = z3(&ctx) else { return };
        let a = Term::lt(&x, 0);
        let b = Term::gt(&x, 5);
        let c = Term::gt(&x, 10);
        assert_eq!(
            solver.check_sat(&[a.clone(), b.clone(), c.clone()]).unwrap(),
            SatResp::Unsat
        );
        let core = solver.get_unsat_core().unwrap();
        assert!(core.contains(&a));
        assert!(core.iter().all(|t| [&a, &b, &c].contains(&t)));
    }

    #[test]
    fn test_push_pop_redeclares_z3() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let Some(mut solver) = z3(&ctx) else { return };
        solver.push().unwrap();
        solver.assert(&Term::gt(&x, 0)).unwrap();
        solver.pop().unwrap();
        // x was declared inside the popped scope and must be declared again
        solver.assert(&Term::lt(&x, 0)).unwrap();
        assert_eq!(solver.check_sat(&[]).unwrap(), SatResp::Sat);
    }
}
