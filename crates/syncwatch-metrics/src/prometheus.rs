//! Prometheus text exposition format.
//!
//! Renders sink snapshots into the text format (version 0.0.4) for
//! scraping by a Prometheus server or compatible agent.

use crate::sink::FamilySnapshot;

/// `Content-Type` of the rendered output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render family snapshots into Prometheus text format.
///
/// Every family gets its HELP and TYPE lines even when it has no series.
pub fn render_prometheus(families: &[FamilySnapshot]) -> String {
    let mut out = String::new();

    for family in families {
        out.push_str(&format!("# HELP {} {}\n", family.name, escape_help(family.help)));
        out.push_str(&format!("# TYPE {} gauge\n", family.name));

        for sample in &family.samples {
            out.push_str(&family.name);
            if !sample.labels.is_empty() {
                let labels: Vec<String> = sample
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
                    .collect();
                out.push_str(&format!("{{{}}}", labels.join(",")));
            }
            out.push_str(&format!(" {}\n", format_value(sample.value)));
        }
    }

    out
}

fn escape_label_value(v: &str) -> String {
    v.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
