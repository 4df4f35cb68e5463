// Copyright 2026 Pagesift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pagesift: harvest headline-like text from rendered pages.
//!
//! Each seed address is rendered in Chromium, run through headline heuristics
//! and an example-trained pattern extractor, and followed through a single
//! pagination link until the chain ends or loops. Results are deduplicated
//! across seeds and written to a one-column CSV file.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod harvest;
pub mod output;
pub mod renderer;
pub mod traversal;
