// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A custom s-expression data type and parsing.
//!
//! This implementation supports comments as part of the grammar, since they are
//! needed to fully parse the responses returned by for example CVC5.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use peg::str::LineCol;
use serde::Serialize;
use std::fmt;

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, PartialOrd, Ord)]
pub enum Atom {
    /// A non-negative integer numeral
    I(BigInt),
    /// A decimal numeral, kept as written
    D(String),
    S(String),
}

impl Atom {
    /// Return the string value of self, if it is a string.
    pub fn s(&self) -> Option<&str> {
        if let Self::S(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A value in some interpreted universe: a Boolean or a rational number.
pub enum InterpretedValue {
    /// A Boolean value
    Bool(bool),
    /// A numeric value (integers are rationals with denominator 1)
    Num(BigRational),
}

impl InterpretedValue {
    /// Return the inner `bool` (if the interpreted value is a `bool`).
    pub fn bool(&self) -> Option<bool> {
        match self {
            InterpretedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the inner number (if the interpreted value is a number).
    pub fn num(&self) -> Option<&BigRational> {
        match self {
            InterpretedValue::Num(n) => Some(n),
            _ => None,
        }
    }
}

/// Parse a decimal numeral like `2.50` into an exact rational.
fn parse_decimal(s: &str) -> Option<BigRational> {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let digits: BigInt = format!("{whole}{frac}").parse().ok()?;
    let scale = (0..frac.len()).fold(BigInt::one(), |acc, _| acc * 10);
    Some(BigRational::new(digits, scale))
}

/// An s-expression which also tracks comments.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, PartialOrd, Ord)]
pub enum Sexp {
    Atom(Atom),
    Comment(String),
    List(Vec<Sexp>),
}

/// Construct an sexp atom from a string.
pub fn atom_s<S: AsRef<str>>(s: S) -> Sexp {
    Sexp::Atom(Atom::S(s.as_ref().to_string()))
}

/// Construct an sexp atom from a non-negative integer.
pub fn atom_i<I: Into<BigInt>>(i: I) -> Sexp {
    Sexp::Atom(Atom::I(i.into()))
}

/// Construct an sexp list from an iteratable.
pub fn sexp_l<I>(i: I) -> Sexp
where
    I: IntoIterator,
    I::IntoIter: Iterator<Item = Sexp>,
{
    Sexp::List(i.into_iter().collect())
}

/// Construct an sexp list with a string atom as its "head" element, followed by
/// an iterable of remaining arguments.
pub fn app<I>(head: &str, args: I) -> Sexp
where
    I: IntoIterator,
    I::IntoIter: Iterator<Item = Sexp>,
{
    let mut ss = vec![atom_s(head)];
    #[allow(clippy::useless_conversion)]
    ss.extend(args.into_iter());
    Sexp::List(ss)
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::I(i) => write!(f, "{i}"),
            Atom::D(d) => write!(f, "{d}"),
            Atom::S(s) => {
                if s.contains([' ', '\"', '\'', '(', ')']) {
                    write!(f, "|{s}|")
                } else if s.contains('|') {
                    write!(f, "\"{s}\"")
                } else {
                    write!(f, "{s}")
                }
            }
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(s) => write!(f, "{s}"),
            Sexp::Comment(s) => write!(f, ";{s}"),
            Sexp::List(ss) => {
                write!(f, "(")?;
                for (i, s) in ss.iter().enumerate() {
                    let last = i == ss.len() - 1;
                    let this_comment = matches!(s, Sexp::Comment(_));
                    let next_comment = !last && matches!(ss[i + 1], Sexp::Comment(_));
                    let space = if last || this_comment || next_comment {
                        ""
                    } else {
                        " "
                    };
                    if this_comment {
                        write!(f, "\n{s}\n{space}")?;
                    } else {
                        write!(f, "{s}{space}")?;
                    }
                }
                write!(f, ")")?;
                Ok(())
            }
        }
    }
}

impl Sexp {
    /// Return the inner elements if self is a Sexp::List
    pub fn list(&self) -> Option<&[Sexp]> {
        if let Sexp::List(ss) = self {
            Some(ss)
        } else {
            None
        }
    }

    /// Return the inner string if self is a string atom.
    pub fn atom_s(&self) -> Option<&str> {
        if let Sexp::Atom(Atom::S(s)) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Return the inner integer if self is an integer atom.
    pub fn atom_i(&self) -> Option<&BigInt> {
        if let Sexp::Atom(Atom::I(i)) = self {
            Some(i)
        } else {
            None
        }
    }

    /// Return the interpreted value of the [`Sexp`].
    ///
    /// Understands the forms solvers use to print values: `true`, `5`,
    /// `2.5`, `(- 5)`, `(/ 1 2)` and combinations like `(- (/ 1.0 2.0))`.
    pub fn interpreted_value(&self) -> Option<InterpretedValue> {
        let num = |s: &Sexp| match s.interpreted_value() {
            Some(InterpretedValue::Num(n)) => Some(n),
            _ => None,
        };
        match self {
            Sexp::Atom(Atom::I(i)) => Some(InterpretedValue::Num(BigRational::from_integer(
                i.clone(),
            ))),
            Sexp::Atom(Atom::D(d)) => parse_decimal(d).map(InterpretedValue::Num),
            Sexp::Atom(Atom::S(s)) => match s as &str {
                "true" => Some(InterpretedValue::Bool(true)),
                "false" => Some(InterpretedValue::Bool(false)),
                _ => None,
            },
            Sexp::Comment(_) => None,
            Sexp::List(_) => match self.app()? {
                ("-", [arg]) => Some(InterpretedValue::Num(-num(arg)?)),
                ("/", [n, d]) => {
                    let (n, d) = (num(n)?, num(d)?);
                    if d.is_zero() {
                        return None;
                    }
                    Some(InterpretedValue::Num(n / d))
                }
                _ => None,
            },
        }
    }

    /// Return the head and tail if self is of the form `(head rest..)`.
    pub fn app(&self) -> Option<(&str, &[Sexp])> {
        self.list().and_then(|ss| {
            if !ss.is_empty() {
                if let Some(head) = ss[0].atom_s() {
                    return Some((head, &ss[1..]));
                }
            }
            None
        })
    }
}

peg::parser! {
grammar parser() for str {
  rule ident_start() = ['a'..='z' | 'A'..='Z' | '_' | '\'' | '<' | '>' | ':' | '=' | '$' | '@' | '+' | '-' | '*' | '/' | '!']
  rule ident_char() = ident_start() / ['0'..='9' | '!' | '#' | '%' | '-' | '.']
  rule ident() = quiet! { ident_start() ident_char()* } / expected!("atom")

  rule whitespace() = [' ' | '\t' | '\n' | '\r']
  rule _ = whitespace()*

  rule quoted_atom() -> Atom
  = "\"" s:$([^'"']*) "\"" { Atom::S(s.to_string()) }

  rule pipe_quoted_atom() -> Atom
  = "|" s:$([^'|']*) "|" { Atom::S(s.to_string()) }

  rule unquoted_atom() -> Atom
  = s:$(ident()) { Atom::S(s.to_string()) }

  rule decimal_atom() -> Atom
  = d:$(['0'..='9']+ "." ['0'..='9']+) { Atom::D(d.to_string()) }

  rule int_atom() -> Atom
  = i:$(['0'..='9']+) {? i.parse().map(Atom::I).or(Err("integer")) }

  rule atom() -> Sexp
  = s:(quoted_atom() /
       pipe_quoted_atom() /
       unquoted_atom() /
       decimal_atom() /
       int_atom()) { Sexp::Atom(s) }

  rule comment() -> Sexp
  = ";" s:$(([^'\n']*)) ['\n'] { Sexp::Comment(s.to_string()) }

  rule list() -> Sexp
  = "(" _ ss:(sexp() ** _) _ ")" { Sexp::List(ss) }

  rule sexp() -> Sexp
  = atom() / comment() / list()

  /// Parse an sexp but be tolerant to whitespace around it.
  pub(super) rule sexp_whitespace() -> Sexp
  = _ s:sexp() _ { s }

  /// Parse a sequence of sexps.
  pub(super) rule sexps() -> Vec<Sexp>
  = _ ss:(sexp() ** _) _ { ss }
}
}

/// Parse an sexp.
///
/// Allows whitespace before or after.
pub fn parse(s: &str) -> Result<Sexp, peg::error::ParseError<LineCol>> {
    parser::sexp_whitespace(s)
}

/// Parse a sequence of sexps, separated by whitespace.
pub fn parse_many(s: &str) -> Result<Vec<Sexp>, peg::error::ParseError<LineCol>> {
    parser::sexps(s)
}

#[cfg(test)]
mod tests {
    use super::{app, atom_i, atom_s, parse, sexp_l, InterpretedValue};
    use num_rational::BigRational;

    fn num(n: i64, d: i64) -> Option<InterpretedValue> {
        Some(InterpretedValue::Num(BigRational::new(n.into(), d.into())))
    }

    #[test]
    fn test_parsing() {
        assert_eq!(
            parse("(foo  a (bar () 1))"),
            Ok(app(
                "foo",
                [atom_s("a"), app("bar", [sexp_l([]), atom_i(1)])]
            ))
        );
    }

    #[test]
    fn test_printing() {
        let e = parse(
            r#"(hello a b c (there
            ; here's a comment
            (friend)))
            "#,
        )
        .unwrap();
        insta::assert_snapshot!(e, @r#"
        (hello a b c (there
        ; here's a comment
        (friend)))
        "#);
    }

    #[test]
    fn test_parsing_unusual_chars() {
        let s = vec![
            "(x!3 x@0 ind@1.2)",
            "(/ 1.0 2.0)",
            "<<DONE>>\n",
            "\n<<DONE>>\n",
            "(:reason-unknown \"timeout\")",
            "123456789012345678901234567890",
        ]
        .into_iter()
        .map(|s| parse(s).unwrap());
        let printed: Vec<String> = s.map(|s| s.to_string()).collect();
        insta::assert_snapshot!(printed.join("\n"), @r###"
        (x!3 x@0 ind@1.2)
        (/ 1.0 2.0)
        <<DONE>>
        <<DONE>>
        (:reason-unknown timeout)
        123456789012345678901234567890
        "###);
    }

    #[test]
    fn test_roundtrip_parsing() {
        let mut es = vec![];
        for s in vec![
            r#"  "hello there" "#,
            r#"|"hello"|"#,
            r#"|also has a space|"#,
            r#"(assert (=> ind@0.1 (<= x@0 (- 3))))"#,
        ]
        .into_iter()
        {
            let e = parse(s).unwrap_or_else(|_| panic!("`{s}` did not parse"));
            es.push(e.clone());
            assert_eq!(
                parse(&e.to_string()).unwrap(),
                e,
                "`{s}` does not roundtrip",
            );
        }
        insta::assert_snapshot!(&es[0], @"|hello there|");
        insta::assert_snapshot!(&es[1], @r#"|"hello"|"#);
        insta::assert_snapshot!(&es[2], @"|also has a space|");
    }

    #[test]
    fn test_interpreted_values() {
        let value = |s: &str| parse(s).unwrap().interpreted_value();
        assert_eq!(value("true"), Some(InterpretedValue::Bool(true)));
        assert_eq!(value("5"), num(5, 1));
        assert_eq!(value("(- 5)"), num(-5, 1));
        assert_eq!(value("2.5"), num(5, 2));
        assert_eq!(value("(/ 1 2)"), num(1, 2));
        assert_eq!(value("(- (/ 1.0 3.0))"), num(-1, 3));
        assert_eq!(value("(/ 1 0)"), None);
        assert_eq!(value("x"), None);
    }
}
