// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! SSA-style subscripting of a sequence of transitions.
//!
//! Position 0 is the initial state; after encoding the `i`th transition of a
//! path the table is at position `i`. Every write at position `i` introduces
//! a fresh symbol `x@i`, and reads resolve to the symbol live at the current
//! position. The table also remembers, for each indexed symbol, the variable
//! and position it stands for. It lives for one query and is then dropped.

use std::collections::HashMap;

use formula::{
    semantics::Model,
    syntax::Term,
    term::subst::{rename, substitute, Substitution},
};

use crate::{
    binding::{Var, Vocabulary},
    transition::Transition,
};

/// A scoped map between program variables and their indexed symbols.
pub struct Subscript<'a> {
    voc: &'a Vocabulary,
    /// the live symbol of each variable, one snapshot per position
    frames: Vec<im::HashMap<Var, String>>,
    /// indexed symbol ↦ (variable, position)
    origin: HashMap<String, (Var, usize)>,
}

impl<'a> Subscript<'a> {
    /// A table at position 0, with an indexed symbol for every variable of
    /// the vocabulary.
    pub fn new(voc: &'a Vocabulary) -> Self {
        let mut table = Self {
            voc,
            frames: vec![im::HashMap::new()],
            origin: HashMap::new(),
        };
        let initial = voc.vars();
        table.write(&initial);
        table
    }

    /// The current position.
    pub fn position(&self) -> usize {
        self.frames.len() - 1
    }

    fn live(&self) -> &im::HashMap<Var, String> {
        &self.frames[self.position()]
    }

    /// Introduce fresh symbols at the current position for `vars`.
    fn write(&mut self, vars: &[Var]) {
        let position = self.position();
        let mut live = self.live().clone();
        for v in vars {
            let name = self
                .voc
                .ctx()
                .fresh_name(&format!("{}@{position}", v.name()), v.sort());
            self.origin.insert(name.clone(), (v.clone(), position));
            live.insert(v.clone(), name);
        }
        self.frames[position] = live;
    }

    /// The symbol of `var` live at `position`.
    pub fn symbol_at(&self, var: &Var, position: usize) -> Option<&str> {
        self.frames.get(position)?.get(var).map(|s| s.as_str())
    }

    /// The variable and position an indexed symbol stands for.
    pub fn origin(&self, symbol: &str) -> Option<&(Var, usize)> {
        self.origin.get(symbol)
    }

    /// Rewrite the variable symbols of `t` to the symbols live at the
    /// current position. Other symbols are left alone.
    pub fn read(&self, t: &Term) -> Term {
        self.read_at(t, self.position())
    }

    /// Rewrite the variable symbols of `t` to the symbols live at
    /// `position`, which must not be past the current position.
    pub fn read_at(&self, t: &Term, position: usize) -> Term {
        let renaming: HashMap<String, String> = self.frames[position]
            .iter()
            .map(|(v, s)| (v.name().to_string(), s.clone()))
            .collect();
        rename(t, &renaming)
    }

    /// Encode one transition: advance to the next position, and return the
    /// subscripted guard together with one equation per write that defines
    /// the new symbol.
    pub fn step(&mut self, tr: &Transition) -> (Term, Vec<Term>) {
        let guard = self.read(tr.guard());
        let values: Vec<(Var, Term)> = tr
            .transform()
            .iter()
            .map(|(v, t)| (v.clone(), self.read(t)))
            .collect();
        let next = self.live().clone();
        self.frames.push(next);
        self.write(&tr.defines());
        let equations = values
            .into_iter()
            .map(|(v, t)| {
                let post = self.live()[&v].clone();
                Term::equals(Term::id(&post), t)
            })
            .collect();
        (guard, equations)
    }

    /// The state at `position` in a model over indexed symbols, as a model
    /// over variable symbols. Variables whose symbol the model does not bind
    /// are omitted.
    pub fn state(&self, model: &Model, position: usize) -> Model {
        let mut state = Model::new();
        let Some(frame) = self.frames.get(position) else {
            return state;
        };
        let mut vars: Vec<(&Var, &String)> = frame.iter().collect();
        vars.sort();
        for (v, s) in vars {
            if let Some(value) = model.get(s) {
                state.insert(v.name(), value.clone());
            }
        }
        state
    }

    /// Rewrite indexed symbols back to variable symbols with `f`, which is
    /// given each indexed symbol's variable and position. Symbols for which
    /// `f` returns `None`, and symbols not in the table, are left alone.
    pub fn unsubscript<F>(&self, t: &Term, mut f: F) -> Term
    where
        F: FnMut(&Var, usize) -> Option<Term>,
    {
        let substitution: Substitution = self
            .origin
            .iter()
            .filter_map(|(s, (v, i))| f(v, *i).map(|t| (s.clone(), t)))
            .collect();
        substitute(t, &substitution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::{semantics::Value, syntax::{rat, Sort}};

    #[test]
    fn test_step() {
        let voc = Vocabulary::new();
        let x = voc.var("x", Sort::Int);
        let y = voc.var("y", Sort::Int);
        let mut table = Subscript::new(&voc);
        let x0 = table.symbol_at(&x, 0).unwrap().to_string();
        let y0 = table.symbol_at(&y, 0).unwrap().to_string();
        assert!(x0.starts_with("x@0"));

        let tr = Transition::assume(Term::lt(&y, 10)).mul(&Transition::assign(&x, Term::add(&x, &y)), &voc);
        let (guard, equations) = table.step(&tr);
        assert_eq!(table.position(), 1);
        let x1 = table.symbol_at(&x, 1).unwrap().to_string();
        assert_ne!(x0, x1);
        // y is not written, so it keeps its symbol
        assert_eq!(table.symbol_at(&y, 1), Some(y0.as_str()));
        assert_eq!(guard, Term::lt(Term::id(&y0), 10));
        assert_eq!(
            equations,
            vec![Term::equals(Term::id(&x1), Term::add(Term::id(&x0), Term::id(&y0)))]
        );
        assert_eq!(table.origin(&x1), Some(&(x.clone(), 1)));
        assert_eq!(table.read_at(&Term::id("x"), 0), Term::id(&x0));
        assert_eq!(table.read(&Term::id("x")), Term::id(&x1));

        let back = table.unsubscript(&equations[0], |v, i| {
            Some(Term::id(&format!("{}_{i}", v.name())))
        });
        insta::assert_snapshot!(back.to_string(), @"x_1 = x_0 + y_0");

        let model: Model = [(x0, Value::Num(rat(1))), (x1, Value::Num(rat(3))), (y0, Value::Num(rat(2)))]
            .into_iter()
            .collect();
        assert_eq!(table.state(&model, 1).get_num("x"), Some(rat(3)));
        assert_eq!(table.state(&model, 1).get_num("y"), Some(rat(2)));
        assert_eq!(table.state(&model, 0).get_num("x"), Some(rat(1)));
    }
}
