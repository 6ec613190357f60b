//! Reading commands from the user
//!
//! A whole script is parsed up front (see `parse::extract`), errors are
//! aggregated in an `error::Record` and do not stop the valid commands
//! from being executed.

pub mod error;
pub mod parse;

/// Contents of a script file, or an error report if it cannot be read
pub fn read_script(filename: &str, errs: &mut error::Record) -> Option<String> {
    match std::fs::read_to_string(filename) {
        Ok(contents) => Some(contents),
        Err(e) => {
            errs.make("Cannot read script")
                .text(format!("Script loaded is '{}'", filename))
                .text(e)
                .hint("check the path or pipe the commands through stdin");
            None
        }
    }
}
