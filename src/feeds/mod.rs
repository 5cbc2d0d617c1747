// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Network adapters for the gold spot price and the USD/EGP rate.

pub mod fx;
pub mod gold;

use crate::error::GoldError;
use reqwest::blocking::Client;

/// GET `url` and return the body, mapping transport and status errors to a
/// feed error tagged with `source_name`.
pub(crate) fn get_text(client: &Client, source_name: &str, url: &str) -> Result<String, GoldError> {
    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .map_err(|e| GoldError::feed(source_name, e))?
        .error_for_status()
        .map_err(|e| GoldError::feed(source_name, e))?;
    resp.text().map_err(|e| GoldError::feed(source_name, e))
}
