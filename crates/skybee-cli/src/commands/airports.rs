//! Airports command handler for listing known identifiers.

use std::io;

use anyhow::Result;
use skybee_lib::NodeFilter;

use skybee_cli::output::{write_airports, OutputFormat};

use super::DataArgs;

/// Handle the airports subcommand.
pub fn handle_airports_command(
    data: &DataArgs,
    three_letter_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let store = data.load_store();
    let filter = if three_letter_only {
        NodeFilter::ThreeLetterCodes
    } else {
        NodeFilter::All
    };
    let codes = store.codes(filter);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_airports(&mut handle, &codes, store.is_loaded(), format)
}
