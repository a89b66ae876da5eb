// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Infix pretty printing of terms with as few parentheses as possible.

use num_traits::Signed;
use std::fmt;

use crate::syntax::*;

fn precedence(t: &Term) -> usize {
    use crate::syntax::{BinOp::*, NOp::*, NumOp::*, Term::*, UOp::*};

    match t {
        BinOp(Implies | Iff, _, _) => 10,
        Ite { .. } => 30,
        NAryOp(Or, _) => 40,
        NAryOp(And, _) => 50,
        BinOp(Equals | NotEquals, _, _) | NumRel(..) => 60,
        NumOp(Add | Sub, _, _) => 64,
        NumOp(Mul | Div | IDiv | Mod, _, _) => 66,
        UnaryOp(Not, _) => 70,
        // negative and fractional numerals bind like a product
        Num(n) if !n.is_integer() || n.numer().is_negative() => 65,
        UnaryOp(Floor, _) | Literal(_) | Id(_) | Num(_) => 1000,
    }
}

fn parens(add_parens: bool, s: String) -> String {
    if add_parens {
        format!("({s})")
    } else {
        s
    }
}

fn right_associative(op: &BinOp) -> bool {
    matches!(op, BinOp::Implies)
}

fn num(n: &Rat) -> String {
    if n.is_integer() {
        n.numer().to_string()
    } else {
        format!("{}/{}", n.numer(), n.denom())
    }
}

/// Print a term.
pub fn term(t: &Term) -> String {
    // handling of precedence is based on
    // https://stackoverflow.com/questions/6277747/pretty-print-expression-with-as-few-parentheses-as-possible
    match t {
        Term::Literal(false) => "false".to_string(),
        Term::Literal(true) => "true".to_string(),
        Term::Num(n) => num(n),
        Term::Id(i) => i.to_string(),
        Term::UnaryOp(UOp::Not, arg) => {
            let arg = parens(precedence(t) > precedence(arg), term(arg));
            format!("!{arg}")
        }
        Term::UnaryOp(UOp::Floor, arg) => format!("floor({})", term(arg)),
        Term::BinOp(op, arg1, arg2) => {
            let use_left_paren = precedence(t) > precedence(arg1)
                || (precedence(t) == precedence(arg1) && right_associative(op));
            let use_right_paren = precedence(t) > precedence(arg2);
            let left = parens(use_left_paren, term(arg1));
            let right = parens(use_right_paren, term(arg2));
            let op = match op {
                BinOp::Equals => "=",
                BinOp::NotEquals => "!=",
                BinOp::Implies => "->",
                BinOp::Iff => "<->",
            };
            format!("{left} {op} {right}")
        }
        Term::NumRel(rel, arg1, arg2) => {
            let left = parens(precedence(t) >= precedence(arg1), term(arg1));
            let right = parens(precedence(t) >= precedence(arg2), term(arg2));
            let rel = match rel {
                NumRel::Lt => "<",
                NumRel::Leq => "<=",
                NumRel::Geq => ">=",
                NumRel::Gt => ">",
            };
            format!("{left} {rel} {right}")
        }
        Term::NumOp(op, arg1, arg2) => {
            // arithmetic is left associative
            let left = parens(precedence(t) > precedence(arg1), term(arg1));
            let right = parens(precedence(t) >= precedence(arg2), term(arg2));
            let op = match op {
                NumOp::Add => "+",
                NumOp::Sub => "-",
                NumOp::Mul => "*",
                NumOp::Div => "/",
                NumOp::IDiv => "div",
                NumOp::Mod => "mod",
            };
            format!("{left} {op} {right}")
        }
        Term::NAryOp(op, args) => {
            let args = args
                .iter()
                .map(|arg| parens(precedence(t) >= precedence(arg), term(arg)))
                .collect::<Vec<_>>();
            let op = match op {
                NOp::And => "&",
                NOp::Or => "|",
            };
            args.join(&format!(" {op} "))
        }
        Term::Ite { cond, then, else_ } => {
            let cond = term(cond);
            let then = parens(precedence(t) >= precedence(then), term(then));
            let else_ = parens(precedence(t) > precedence(else_), term(else_));
            format!("if {cond} then {then} else {else_}")
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", term(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Term {
        Term::id("x")
    }

    #[test]
    fn test_printer_basic() {
        let t = Term::or([
            Term::and([Term::id("a"), Term::id("b")]),
            Term::id("c"),
        ]);
        insta::assert_snapshot!(term(&t), @"a & b | c");
        let t = Term::and([
            Term::or([Term::id("a"), Term::id("b")]),
            Term::not(Term::id("c")),
        ]);
        insta::assert_snapshot!(term(&t), @"(a | b) & !c");
    }

    #[test]
    fn test_printer_arith() {
        let t = Term::leq(Term::mul(2, Term::add(x(), 1)), Term::sub(x(), Term::sub(x(), 3)));
        insta::assert_snapshot!(term(&t), @"2 * (x + 1) <= x - (x - 3)");
        let t = Term::equals(Term::add(x(), Term::Num(Rat::new(1.into(), 2.into()))), -1);
        insta::assert_snapshot!(term(&t), @"x + 1/2 = -1");
        let t = Term::mul(Term::Num(Rat::new(1.into(), 2.into())), x());
        insta::assert_snapshot!(term(&t), @"(1/2) * x");
        let t = Term::implies(Term::implies(Term::id("p"), Term::id("q")), Term::id("r"));
        insta::assert_snapshot!(term(&t), @"(p -> q) -> r");
    }
}
