// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Manage a running SMT process.
//!
//! This is a low-level generic API for SMT-LIB solvers; the solver-specific
//! parts are captured by the [`SolverCmd`] passed to launch the solver.
//! Calls block until the solver answers; dropping an [`SmtProc`] kills the
//! child process.

use crate::conf::SolverCmd;
use crate::sexp;
use crate::tee::Tee;
use std::{
    ffi::{OsStr, OsString},
    io::{self, BufRead, BufReader, Write},
    path::Path,
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    time::Instant,
};
use thiserror::Error;

use super::sexp::{app, atom_i, atom_s, sexp_l, Sexp};

/// SmtProc wraps an instance of a solver process.
#[derive(Debug)]
pub struct SmtProc {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    tee: Option<Tee>,
}

/// SatResp is a solver's response to a `(check-sat)` or similar command.
///
/// For unknown it also returns the reason the solver provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResp {
    /// The query is satisfiable.
    Sat,
    /// The query is unsatisfiable (and thus negated assertions are valid).
    Unsat,
    /// Unknown whether the query is sat or unsat. The reason is the one given
    /// by (get-info :reason-unknown).
    ///
    /// This can happen due to a timeout or incompleteness for nonlinear
    /// arithmetic, for example.
    Unknown(String),
}

#[derive(Error, Debug)]
/// An error from trying to call the solver
pub enum SolverError {
    /// I/O went wrong
    #[error("some I/O went wrong: {0}")]
    Io(#[from] io::Error),
    /// Solver returned an `(error ...)` response or exited
    #[error("solver returned an error:\n{0}")]
    UnexpectedClose(String),
    /// Solver returned something that could not be understood
    #[error("unexpected solver response:\n{0}")]
    UnexpectedResponse(String),
}

type Result<T> = std::result::Result<T, SolverError>;

impl Drop for SmtProc {
    fn drop(&mut self) {
        self.kill();
    }
}

impl SmtProc {
    /// Create a new SMT process by running a solver.
    ///
    /// The optional `tee` argument appends all SMT input to a file, for
    /// debugging purposes.
    pub fn new(mut cmd: SolverCmd, tee: Option<&Path>) -> Result<Self> {
        cmd.option("produce-models", "true");
        cmd.option("produce-unsat-assumptions", "true");
        let mut child = Command::new(OsStr::new(&cmd.cmd))
            .args(cmd.args.iter().map(OsString::from))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let tee = match tee {
            Some(path) => {
                let mut f = Tee::new(path)?;
                f.append(&Sexp::Comment(cmd.cmdline()));
                log::debug!("writing SMT transcript to {}", f.path().display());
                Some(f)
            }
            None => None,
        };
        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                _ = child.kill();
                return Err(SolverError::UnexpectedClose(format!(
                    "could not open pipes to {}",
                    cmd.cmd
                )));
            }
        };
        let mut proc = Self {
            child,
            stdin,
            stdout,
            tee,
        };
        for (option, val) in &cmd.options {
            proc.send(&app(
                "set-option",
                [atom_s(format!(":{option}")), atom_s(val)],
            ))?;
        }
        proc.send(&app("set-logic", [atom_s("ALL")]))?;
        Ok(proc)
    }

    /// Low-level API to send the solver a command as an s-expression. This
    /// should only be used for commands that do not require a response.
    pub fn send(&mut self, data: &Sexp) -> Result<()> {
        writeln!(self.stdin, "{data}")?;
        if let Some(f) = &mut self.tee {
            f.append(data);
        }
        Ok(())
    }

    /// Low-level API to send the solver a command that expects a response,
    /// which is parsed as a single s-expression.
    fn send_with_reply(&mut self, data: &Sexp) -> Result<Sexp> {
        self.send(data)?;
        let resp = self.get_response()?;
        sexp::parse(&resp).or_else(|_| self.get_error(&resp))
    }

    /// Get an error presumed to be in resp.
    ///
    /// This function always returns a `Result::Err`, but is written this way for
    /// convenient use with `?`. As a result it can return a `Result<T>` for any
    /// type `T`.
    fn get_error<T>(&mut self, resp: &str) -> Result<T> {
        match Self::parse_error(resp) {
            Some(msg) => Err(SolverError::UnexpectedClose(msg)),
            None => Err(SolverError::UnexpectedResponse(resp.to_string())),
        }
    }

    /// A marker for determining end of solver response.
    const DONE: &'static str = "<<DONE>>";

    /// Low-level mechanism to get a response. Note that this needs to be issued
    /// after each query that returns a response, since it sends a marker and
    /// waits for the solver to reach that marker.
    fn get_response(&mut self) -> Result<String> {
        writeln!(self.stdin, r#"(echo "{}")"#, Self::DONE)?;
        self.stdin.flush()?;
        // buf accumulates the entire response, which is read line-by-line
        // looking for the DONE marker.
        let mut buf = String::new();
        loop {
            let last_end = buf.len();
            // n is the number of bytes read (that is, the length of this line
            // including the newline)
            let n = self.stdout.read_line(&mut buf)?;
            if n == 0 {
                let msg = Self::parse_error(&buf).unwrap_or(buf);
                return Err(SolverError::UnexpectedClose(msg));
            }
            // last line, without the newline
            let last_line = buf[last_end..last_end + n].trim_end();
            // Z3 doesn't put quotes and CVC does (quotes do follow SMT-LIB)
            if last_line == Self::DONE || last_line == format!("\"{}\"", Self::DONE) {
                return Ok(buf[..last_end].trim_end().to_string());
            }
        }
    }

    fn kill(&mut self) {
        _ = writeln!(self.stdin, "(exit)");
        _ = self.stdin.flush();
        _ = self.child.kill();
        _ = self.child.wait();
    }

    /// Get some attribute using the SMT get-info command.
    pub fn get_info(&mut self, attribute: &str) -> Result<Sexp> {
        let resp = self.send_with_reply(&app("get-info", [atom_s(attribute)]))?;
        match resp.list() {
            Some([key, value]) if key == &atom_s(attribute) => Ok(value.clone()),
            _ => Err(SolverError::UnexpectedResponse(format!(
                "unexpected get-info format {resp}"
            ))),
        }
    }

    /// Parse an error message returned as an s-expression.
    fn parse_error(resp: &str) -> Option<String> {
        // Z3 returns check-sat errors as:
        // (error "error msg")
        // sat
        //
        // Thus we parse the result as a sequence of sexps and look for the
        // error sexp.
        let sexps = sexp::parse_many(resp).ok()?;
        let error_msg = sexps.iter().find_map(|s| {
            s.app().and_then(|(head, args)| {
                if head == "error" && args.len() == 1 {
                    args[0].atom_s()
                } else {
                    None
                }
            })
        });
        error_msg.map(|msg| msg.to_string())
    }

    fn parse_sat(&mut self, resp: &str) -> Result<SatResp> {
        if resp == "unsat" {
            return Ok(SatResp::Unsat);
        }
        if resp == "sat" {
            return Ok(SatResp::Sat);
        }
        if resp == "unknown" {
            let reason = self.get_info(":reason-unknown")?;
            return Ok(SatResp::Unknown(reason.to_string()));
        }
        self.get_error(resp)
    }

    /// Send the solver `(check-sat-assuming)` with some assumed variables
    /// (which must be atoms, literal symbols or their negations).
    ///
    /// The assumptions do not affect subsequent use of the solver.
    pub fn check_sat_assuming(&mut self, assumptions: &[Sexp]) -> Result<SatResp> {
        let cmd = if assumptions.is_empty() {
            app("check-sat", [])
        } else {
            app("check-sat-assuming", [sexp_l(assumptions.to_vec())])
        };
        let start = Instant::now();
        self.send(&cmd)?;
        let resp = self.get_response()?;
        let resp = self.parse_sat(&resp)?;
        log::debug!(
            "{} returned {resp:?} in {:?}",
            self.cmd_name(),
            start.elapsed()
        );
        Ok(resp)
    }

    /// Send the solver `(check-sat)`. For unknown gets a reason, but does not
    /// fetch a model for sat.
    pub fn check_sat(&mut self) -> Result<SatResp> {
        self.check_sat_assuming(&[])
    }

    /// Run `(get-unsat-assumptions)` following an unsat response to get the
    /// list of assumptions used in the proof.
    ///
    /// Fails if the previous command wasn't a check_sat or check_sat_assuming
    /// that returned unsat.
    pub fn get_unsat_assumptions(&mut self) -> Result<Vec<Sexp>> {
        let sexp = self.send_with_reply(&app("get-unsat-assumptions", []))?;
        match sexp {
            Sexp::List(ss) => Ok(ss),
            _ => Err(SolverError::UnexpectedResponse(format!(
                "malformed get-unsat-assumptions response: {sexp}"
            ))),
        }
    }

    /// Run `(get-value)` following a sat response, returning the value of each
    /// of the given terms (in the same order).
    pub fn get_value(&mut self, terms: &[Sexp]) -> Result<Vec<Sexp>> {
        if terms.is_empty() {
            return Ok(vec![]);
        }
        let sexp = self.send_with_reply(&app("get-value", [sexp_l(terms.to_vec())]))?;
        let malformed = || {
            SolverError::UnexpectedResponse(format!("malformed get-value response: {sexp}"))
        };
        let pairs = sexp.list().ok_or_else(malformed)?;
        if pairs.len() != terms.len() {
            return Err(malformed());
        }
        pairs
            .iter()
            .map(|pair| match pair.list() {
                Some([_, value]) => Ok(value.clone()),
                _ => Err(malformed()),
            })
            .collect()
    }

    /// Push `n` assertion scopes.
    pub fn push(&mut self, n: usize) -> Result<()> {
        self.send(&app("push", [atom_i(n)]))
    }

    /// Pop `n` assertion scopes.
    pub fn pop(&mut self, n: usize) -> Result<()> {
        self.send(&app("pop", [atom_i(n)]))
    }

    /// Add a comment to the tee'd file.
    ///
    /// The comment is passed as a closure, which is not evaluated if there is
    /// no tee'd smt2 file.
    pub fn comment_with<F>(&mut self, comment: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(f) = &mut self.tee {
            let comment = comment();
            f.append(&Sexp::Comment("".to_string()));
            f.append(&Sexp::Comment(comment));
        }
    }

    fn cmd_name(&self) -> String {
        format!("solver (pid {})", self.child.id())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        conf::{CvcConf, Z3Conf},
        path::solver_path,
        proc::{SatResp, SmtProc, SolverError},
        sexp::{app, atom_s, parse, InterpretedValue},
    };
    use eyre::Context;

    fn z3() -> Option<SmtProc> {
        let z3 = Z3Conf::new(&solver_path("z3")).done();
        match SmtProc::new(z3, None) {
            Ok(proc) => Some(proc),
            Err(_) => {
                eprintln!("could not find z3, skipping test");
                None
            }
        }
    }

    fn send_all(proc: &mut SmtProc, smt2: &str) {
        for e in crate::sexp::parse_many(smt2).unwrap() {
            proc.send(&e).unwrap();
        }
    }

    #[test]
    fn test_check_sat_z3() {
        let Some(mut solver) = z3() else { return };
        let response = solver.check_sat().wrap_err("could not check-sat").unwrap();
        assert!(
            matches!(response, SatResp::Sat { .. }),
            "should be sat, got {response:?}"
        );
    }

    #[test]
    fn test_unsat_z3() {
        let Some(mut solver) = z3() else { return };
        solver
            .send(&app("declare-const", [atom_s("a"), atom_s("Bool")]))
            .unwrap();
        solver.send(&parse("(assert (and a (not a)))").unwrap()).unwrap();
        let response = solver.check_sat().wrap_err("could not check-sat").unwrap();
        insta::assert_debug_snapshot!(response, @"Unsat");
    }

    #[test]
    fn test_get_value_z3() {
        let Some(mut solver) = z3() else { return };
        send_all(
            &mut solver,
            "(declare-const x Real) (declare-const n Int)
             (assert (= (* 2 x) 1)) (assert (= n (- 3)))",
        );
        assert_eq!(solver.check_sat().unwrap(), SatResp::Sat);
        let values = solver.get_value(&[atom_s("x"), atom_s("n")]).unwrap();
        let values: Vec<_> = values
            .iter()
            .map(|v| v.interpreted_value().unwrap())
            .collect();
        assert_eq!(
            values,
            vec![
                InterpretedValue::Num(num_rational::BigRational::new(1.into(), 2.into())),
                InterpretedValue::Num(num_rational::BigRational::from_integer((-3).into())),
            ]
        );
    }

    #[test]
    fn test_unsat_assumptions_z3() {
        let Some(mut solver) = z3() else { return };
        send_all(
            &mut solver,
            "(declare-const x Int) (declare-const a Bool) (declare-const b Bool)
             (declare-const c Bool)
             (assert (=> a (< x 0))) (assert (=> b (> x 0))) (assert (=> c (> x 5)))",
        );
        let r = solver
            .check_sat_assuming(&[atom_s("a"), atom_s("b"), atom_s("c")])
            .unwrap();
        assert_eq!(r, SatResp::Unsat);
        let core = solver.get_unsat_assumptions().unwrap();
        assert!(core.contains(&atom_s("a")));
        // the assumptions do not persist
        assert_eq!(solver.check_sat().unwrap(), SatResp::Sat);
    }

    #[test]
    fn test_push_pop_z3() {
        let Some(mut solver) = z3() else { return };
        send_all(&mut solver, "(declare-const x Int) (assert (> x 0))");
        solver.push(1).unwrap();
        send_all(&mut solver, "(assert (< x 0))");
        assert_eq!(solver.check_sat().unwrap(), SatResp::Unsat);
        solver.pop(1).unwrap();
        assert_eq!(solver.check_sat().unwrap(), SatResp::Sat);
    }

    #[test]
    fn test_cvc5_singleton_or() {
        let cvc5 = CvcConf::new_cvc5(&solver_path("cvc5")).done();
        let mut solver = if let Ok(solver) = SmtProc::new(cvc5, None) {
            solver
        } else {
            eprintln!("could not find cvc5, skipping test");
            return;
        };

        let e = parse("(assert (and (or true) (and false)))").unwrap();
        solver.send(&e).unwrap();
        let response = solver.check_sat().wrap_err("could not check-sat").unwrap();
        insta::assert_debug_snapshot!(response, @"Unsat");
    }

    #[test]
    fn test_z3_ill_formed() {
        let Some(mut proc) = z3() else { return };
        // unbound symbol
        proc.send(&parse("(assert p)").unwrap()).unwrap();
        let r = proc.check_sat();
        assert!(
            matches!(r, Err(SolverError::UnexpectedClose(_))),
            "expected an error, got {r:?}"
        );
    }

    #[test]
    fn test_missing_binary() {
        let conf = Z3Conf::new("/nonexistent/solver/binary").done();
        assert!(matches!(SmtProc::new(conf, None), Err(SolverError::Io(_))));
    }
}
