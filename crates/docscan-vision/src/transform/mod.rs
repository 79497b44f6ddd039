// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric transforms — perspective rectification of a detected quad.

pub mod rectify;

pub use rectify::PerspectiveRectifier;
