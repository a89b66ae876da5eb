// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Record the SMT sent to a solver in a file, for debugging purposes.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::sexp::Sexp;

/// Streams everything sent to the solver into an `.smt2` transcript.
///
/// The file is opened in append mode so that several solvers in one run can
/// share a transcript.
#[derive(Debug)]
pub struct Tee {
    path: PathBuf,
    file: File,
}

impl Tee {
    /// Open (or create) the transcript at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Append a raw s-expression sent to solver.
    pub fn append(&mut self, s: &Sexp) {
        let line = match s {
            Sexp::Comment(c) if c.is_empty() => String::new(),
            Sexp::Comment(c) => format!(";; {c}"),
            _ => s.to_string(),
        };
        if let Err(err) = writeln!(self.file, "{line}") {
            // not fatal, the solver itself is unaffected
            log::warn!("failed to write to {}: {err}", self.path.display());
        }
    }

    /// The path of the transcript.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::Tee;
    use crate::sexp::{app, atom_s, Sexp};
    use std::{env, fs, process};

    #[test]
    fn test_tee_appends() {
        let path = env::temp_dir().join(format!("smtlib-tee-{}.smt2", process::id()));
        _ = fs::remove_file(&path);
        {
            let mut tee = Tee::new(&path).unwrap();
            tee.append(&Sexp::Comment("z3 -in".to_string()));
            tee.append(&app("check-sat", []));
        }
        {
            let mut tee = Tee::new(&path).unwrap();
            tee.append(&app("assert", [atom_s("p")]));
        }
        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        insta::assert_snapshot!(contents, @r###"
        ;; z3 -in
        (check-sat)
        (assert p)
        "###);
    }
}
