use std::fmt::Display;

use colored::Colorize;
use log::{Level, LevelFilter};

/// Target used by the server for one line per handled request
const HTTP_TARGET: &str = "escapade_server::http";

pub fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let max_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .level(max_level)
        .filter(move |meta| is_shown(&Target::from_str(meta.target()), meta.level(), verbose))
        .chain(std::io::stdout())
        .apply()
}

/// External crates only get to log warnings and errors.
/// Request lines stay at info even when verbose.
fn is_shown(target: &Target, level: Level, verbose: bool) -> bool {
    match target {
        Target::External(_) => level <= Level::Warn,
        Target::Http => level <= Level::Info,
        _ if verbose => level <= Level::Debug,
        _ => level <= Level::Info,
    }
}

enum Target {
    External(String),
    Cli,
    Http,
    Server,
    Admin,
}

impl Target {
    fn from_str(str: &str) -> Self {
        if str.starts_with(HTTP_TARGET) {
            return Self::Http;
        }

        let module = str.split("::").next().unwrap_or_default();

        match module {
            "escapade" => Self::Cli,
            "escapade_server" => Self::Server,
            "escapade_admin" => Self::Admin,
            other => Target::External(other.to_string()),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Cli => "CLI".blue(),
            Target::Http => "HTTP".cyan(),
            Target::Server => "SERVER".bright_green(),
            Target::Admin => "ADMIN".bright_purple(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
