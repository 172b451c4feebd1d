//! Result and error printing for the CLI.
//!
//! Human output goes to the terminal with `console` styling; `--json` prints
//! one machine-readable document per result instead.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter for the global `--json`, `--verbose` and `--quiet` flags.
///
/// `--json` wins; verbosity only shapes human output.
pub fn create_formatter(json: bool, verbose: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        return Box::new(JsonFormatter);
    }
    Box::new(HumanFormatter::new(verbose, quiet))
}
