// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calc;
pub mod config;
pub mod doctor;
pub mod exporter;
pub mod fx;
pub mod importer;
pub mod price;
pub mod purchases;
pub mod report;

/// `(--json, --jsonl)` for commands that offer machine output.
pub(crate) fn json_flags(m: &clap::ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}
