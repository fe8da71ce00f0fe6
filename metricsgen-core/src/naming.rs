// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Deterministic names derived from a trait name.

/// Converts `CamelCase` to `snake_case`.
///
/// A run of uppercase characters is treated as an acronym and kept together, so `HTTPServer`
/// becomes `http_server` and `ID` becomes `id`. Characters that are not uppercase (digits and
/// punctuation included) are copied as-is and never start a new word on their own.
pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    // the last uppercase character seen, not yet written
    let mut pending: Option<char> = None;
    // whether we are inside an uppercase run that already got its separator
    let mut in_run = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if let Some(prev) = pending {
                if !in_run {
                    separate(&mut out);
                    in_run = true;
                }
                out.extend(prev.to_lowercase());
            }
            pending = Some(ch);
        } else {
            if let Some(prev) = pending.take() {
                separate(&mut out);
                out.extend(prev.to_lowercase());
                in_run = false;
            }
            out.push(ch);
        }
    }

    if let Some(prev) = pending {
        if !in_run {
            separate(&mut out);
        }
        out.extend(prev.to_lowercase());
    }

    out
}

fn separate(out: &mut String) {
    if !out.is_empty() {
        out.push('_');
    }
}

/// `Example` -> `ExampleMetrics`
pub fn struct_name(interface_name: &str) -> String {
    format!("{interface_name}Metrics")
}

/// `HTTPServer` + `_metrics.rs` -> `http_server_metrics.rs`
pub fn output_file_name(interface_name: &str, suffix: &str) -> String {
    format!("{}{suffix}", camel_to_snake(interface_name))
}

/// `ExampleMetrics` -> `new_example_metrics_collector`
pub fn collector_fn_name(struct_name: &str) -> String {
    format!("new_{}_collector", camel_to_snake(struct_name))
}
