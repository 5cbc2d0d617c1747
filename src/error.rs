// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors produced by the valuation engine, the feeds, and settings parsing.
///
/// Command handlers wrap these in `anyhow` with extra context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GoldError {
    #[error("Invalid karat '{0}', expected one of 24, 21, 18, 14")]
    InvalidKarat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{source_name} feed failed: {message}")]
    Feed {
        source_name: String,
        message: String,
    },

    #[error("All gold price sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },
}

impl GoldError {
    pub fn feed(source_name: &str, message: impl ToString) -> Self {
        GoldError::Feed {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }
}
