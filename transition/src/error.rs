// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Errors from queries made on behalf of the transition algebra.

use solver::{SatResp, SolverError};
use thiserror::Error;

/// A query that could not be answered.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The solver was inconclusive
    #[error("solver returned unknown: {0}")]
    Unknown(String),
    /// The solver could not be run or misbehaved
    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),
}

impl QueryError {
    /// Turn a satisfiability response into whether the query was satisfiable,
    /// with unknown as an error.
    pub fn sat(resp: SatResp) -> Result<bool, Self> {
        match resp {
            SatResp::Sat => Ok(true),
            SatResp::Unsat => Ok(false),
            SatResp::Unknown(reason) => Err(Self::Unknown(reason)),
        }
    }
}
