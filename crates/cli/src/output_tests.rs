// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::OutputFormat;

#[test]
fn output_format_defaults_to_text() {
    assert!(matches!(OutputFormat::default(), OutputFormat::Text));
}
