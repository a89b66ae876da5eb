// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Utilities for manipulating [`crate::syntax::Term`]s.

pub mod nnf;
pub mod purify;
pub mod subst;
