//! Output formatting for route reports and airport listings.
//!
//! Everything is written to a caller-supplied writer so the binary can target
//! stdout while tests capture a buffer. Logs go to stderr and never mix with
//! this output.

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use skybee_lib::QueryReport;

/// Output format shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON for scripts.
    Json,
}

/// JSON shape of the `airports` command.
#[derive(Debug, Serialize)]
struct AirportListing<'a> {
    loaded: bool,
    count: usize,
    airports: &'a [&'a str],
}

/// Render a strategy comparison.
pub fn write_report<W: Write>(
    writer: &mut W,
    report: &QueryReport,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writer
                .write_all(report.render_text().as_bytes())
                .context("failed to write route report")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)
                .context("failed to serialise route report")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Render the airport selection list.
///
/// `loaded` distinguishes an empty dataset from one that failed to load.
pub fn write_airports<W: Write>(
    writer: &mut W,
    codes: &[&str],
    loaded: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if !loaded {
                writeln!(writer, "data not loaded")?;
                return Ok(());
            }
            for code in codes {
                writeln!(writer, "{code}")?;
            }
            writeln!(writer, "\n{} airport(s)", codes.len())?;
        }
        OutputFormat::Json => {
            let listing = AirportListing {
                loaded,
                count: codes.len(),
                airports: codes,
            };
            serde_json::to_writer_pretty(&mut *writer, &listing)
                .context("failed to serialise airport list")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_airports(codes: &[&str], loaded: bool, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        write_airports(&mut buffer, codes, loaded, format).expect("write succeeds");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn text_listing_ends_with_count() {
        let text = render_airports(&["CDG", "LHR"], true, OutputFormat::Text);
        assert_eq!(text, "CDG\nLHR\n\n2 airport(s)\n");
    }

    #[test]
    fn unloaded_listing_reports_sentinel() {
        let text = render_airports(&[], false, OutputFormat::Text);
        assert_eq!(text, "data not loaded\n");

        let json: serde_json::Value =
            serde_json::from_str(&render_airports(&[], false, OutputFormat::Json))
                .expect("valid json");
        assert_eq!(json["loaded"], false);
        assert_eq!(json["count"], 0);
    }

    #[test]
    fn json_listing_preserves_order() {
        let json: serde_json::Value =
            serde_json::from_str(&render_airports(&["CDG", "LHR"], true, OutputFormat::Json))
                .expect("valid json");
        assert_eq!(json["airports"][0], "CDG");
        assert_eq!(json["airports"][1], "LHR");
        assert_eq!(json["count"], 2);
    }

    #[test]
    fn report_json_is_keyed_by_strategy() {
        use skybee_lib::{GraphBuilder, GraphStore, RouteAlgorithm, RouteEngine};

        let graph = GraphBuilder::new()
            .airport("AAA", 0.0, 0.0)
            .airport("BBB", 0.0, 0.0)
            .route_with_distance("AAA", "BBB", 550.3)
            .build();
        let report = RouteEngine::new(GraphStore::from(graph)).query(
            "AAA",
            "BBB",
            &[RouteAlgorithm::Dijkstra],
        );

        let mut buffer = Vec::new();
        write_report(&mut buffer, &report, OutputFormat::Json).expect("write succeeds");
        let json: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(json["source"], "AAA");
        assert_eq!(json["results"]["dijkstra"]["distance"], 550.3);
        assert_eq!(json["results"]["dijkstra"]["path"][1], "BBB");
    }
}
