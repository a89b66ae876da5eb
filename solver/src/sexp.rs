// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Converts `Term`s to S-expressions.

use formula::syntax::{BinOp, NOp, NumOp, NumRel, Rat, Sort, Term, UOp};
use num_traits::Signed;
use smtlib::sexp::{app, atom_i, atom_s, Atom, Sexp};

/// Convert a `Sort` to an S-expression.
pub fn sort(s: Sort) -> Sexp {
    match s {
        Sort::Bool => atom_s("Bool"),
        Sort::Int => atom_s("Int"),
        Sort::Real => atom_s("Real"),
    }
}

/// Convert a rational numeral. Fractions are written as a division of
/// decimals so that they are real-sorted for every solver.
pub fn num(n: &Rat) -> Sexp {
    let magnitude = if n.is_integer() {
        atom_i(n.numer().abs())
    } else {
        let decimal = |i: String| Sexp::Atom(Atom::D(format!("{i}.0")));
        app(
            "/",
            [
                decimal(n.numer().abs().to_string()),
                decimal(n.denom().to_string()),
            ],
        )
    };
    if n.is_negative() {
        app("-", [magnitude])
    } else {
        magnitude
    }
}

/// Convert a `Term` to an S-expression.
pub fn term(t: &Term) -> Sexp {
    match t {
        Term::Literal(false) => atom_s("false"),
        Term::Literal(true) => atom_s("true"),
        Term::Num(n) => num(n),
        Term::Id(s) => atom_s(s),
        Term::UnaryOp(UOp::Not, arg) => app("not", [term(arg)]),
        Term::UnaryOp(UOp::Floor, arg) => app("to_int", [term(arg)]),
        Term::BinOp(op, arg1, arg2) => {
            let args = [term(arg1), term(arg2)];
            match op {
                BinOp::Equals | BinOp::Iff => app("=", args),
                BinOp::NotEquals => app("distinct", args),
                BinOp::Implies => app("=>", args),
            }
        }
        Term::NAryOp(op, args) => {
            let args = args.iter().map(term).collect::<Vec<_>>();
            match (op, args.is_empty()) {
                (NOp::And, false) => app("and", args),
                (NOp::Or, false) => app("or", args),
                // the solver can error if no arguments are provided like `(and)`, `(or)`
                (NOp::And, true) => atom_s("true"),
                (NOp::Or, true) => atom_s("false"),
            }
        }
        Term::NumOp(op, x, y) => {
            let op = match op {
                NumOp::Add => "+",
                NumOp::Sub => "-",
                NumOp::Mul => "*",
                NumOp::Div => "/",
                NumOp::IDiv => "div",
                NumOp::Mod => "mod",
            };
            app(op, [term(x), term(y)])
        }
        Term::NumRel(rel, x, y) => {
            let rel = match rel {
                NumRel::Lt => "<",
                NumRel::Leq => "<=",
                NumRel::Geq => ">=",
                NumRel::Gt => ">",
            };
            app(rel, [term(x), term(y)])
        }
        Term::Ite { cond, then, else_ } => app("ite", [term(cond), term(then), term(else_)]),
    }
}
