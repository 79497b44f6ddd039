// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-aware enhancement — edge-density classification, tiled histogram
// equalisation, and sharpening applied to luminance only.

pub mod adaptive;
pub mod clahe;
pub mod color;

pub use adaptive::{AdaptiveEnhancer, ContentKind};
pub use clahe::clahe;
