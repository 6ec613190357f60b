mod cli;
mod lib;
mod load;

use std::io::{self, BufRead, Write};

use clap::{App, Arg, ArgMatches};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{
    plot::Plotter,
    session::{Flow, Session},
};
use lib::date::Date;
use load::error::Record;

/// Nothing went wrong
const EXIT_OK: i32 = 0;
/// Some commands were rejected
const EXIT_REJECTED: i32 = 1;
/// The session could not even start
const EXIT_USAGE: i32 = 2;

fn app() -> App<'static, 'static> {
    App::new("semimonth")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track the repayment of a debt in half-month cycles")
        .arg(
            Arg::with_name("FILE")
                .help("Script of commands to run, reads standard input if absent")
                .index(1),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .value_name("DATE")
                .help("Date the first cycle contains, e.g. 2024-Jan-16 (default: today)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("plot")
                .long("plot")
                .value_name("FILE")
                .help("Write a chart of all cycles once the session ends")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no-color")
                .long("no-color")
                .help("Print error reports without escape sequences"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log what happens (-v), and how (-vv)"),
        )
}

/// `RUST_LOG` takes precedence over `-v`
fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let matches = app().get_matches();
    init_logging(matches.occurrences_of("verbose"));
    let code = match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("semimonth: {}", e);
            EXIT_REJECTED
        }
    };
    std::process::exit(code);
}

fn record(color: bool) -> Record {
    if color {
        Record::new()
    } else {
        Record::new().plain()
    }
}

/// Error reports go to stderr, next to the logs
fn report(errs: &Record) {
    if !errs.is_empty() {
        eprint!("{}", errs);
    }
}

fn run(matches: &ArgMatches) -> io::Result<i32> {
    let color = !matches.is_present("no-color");
    let start = match start_date(matches.value_of("start"), color) {
        Some(start) => start,
        None => return Ok(EXIT_USAGE),
    };
    info!(%start, "session starts");
    let stdout = io::stdout();
    let mut session = Session::new(start, stdout.lock());
    let code = match matches.value_of("FILE") {
        Some(file) => script(&mut session, file, color)?,
        None => interactive(&mut session, color)?,
    };
    if code == EXIT_USAGE {
        return Ok(code);
    }
    match matches.value_of("plot") {
        Some(file) => Ok(code.max(final_plot(&session, file, color))),
        None => Ok(code),
    }
}

/// `--start` if provided, today otherwise
fn start_date(arg: Option<&str>, color: bool) -> Option<Date> {
    let mut errs = record(color);
    let start = match arg {
        Some(text) => load::parse::parse_date("--start", &mut errs, text),
        None => match Date::today() {
            Ok(today) => Some(today),
            Err(e) => {
                errs.make("Cannot determine today's date")
                    .text(&e)
                    .hint("provide the first date explicitly with '--start'");
                None
            }
        },
    };
    report(&errs);
    start
}

fn script<W: Write>(session: &mut Session<W>, file: &str, color: bool) -> io::Result<i32> {
    let mut errs = record(color);
    let contents = match load::read_script(file, &mut errs) {
        Some(contents) => contents,
        None => {
            report(&errs);
            return Ok(EXIT_USAGE);
        }
    };
    info!(file, "running script");
    session.run(file, &contents, &mut errs)?;
    report(&errs);
    Ok(if errs.is_fatal() { EXIT_REJECTED } else { EXIT_OK })
}

/// One line at a time, each with its own report
fn interactive<W: Write>(session: &mut Session<W>, color: bool) -> io::Result<i32> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let mut errs = record(color);
        let flow = session.run("stdin", &line, &mut errs)?;
        report(&errs);
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(EXIT_OK)
}

fn final_plot<W: Write>(session: &Session<W>, file: &str, color: bool) -> i32 {
    let mut errs = record(color);
    let saved = match session.state().ledger() {
        Ok(ledger) => Plotter::from(ledger).save(file),
        Err(_) => Ok(false),
    };
    match saved {
        Ok(true) => info!(file, "chart written"),
        Ok(false) => {
            errs.make("Nothing to plot")
                .nonfatal()
                .text(format!("No cycles were recorded, '{}' was not written", file));
        }
        Err(e) => {
            warn!(file, error = %e, "chart not written");
            errs.make("Cannot write chart")
                .text(format!("'{}': {}", file, e))
                .hint("check that the destination directory exists");
        }
    }
    report(&errs);
    if errs.is_fatal() {
        EXIT_REJECTED
    } else {
        EXIT_OK
    }
}
