// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query facades over the shared background connection.

pub mod ledger;
pub mod records;
pub mod results;
