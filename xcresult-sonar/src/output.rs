// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging to stderr.
//!
//! The report itself goes to stdout or to a file; everything else (warnings about unresolved
//! classes, the run summary, errors) is a `tracing` event rendered here as `level: message`.

use clap::{
    Args, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use owo_colors::{OwoColorize, Style, style};
use std::fmt;
use tracing::{Event, Level, Subscriber, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// The environment variable used to override log filtering.
pub(crate) static LOG_ENV: &str = "XCRESULT_SONAR_LOG";

/// The target for events printed without a `level:` prefix, such as error causes.
pub(crate) const NO_HEADING_TARGET: &str = "xcresult_sonar::no_heading";

pub(crate) const fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
}

#[derive(Copy, Clone, Debug, Args)]
#[command(next_help_heading = "Output options")]
pub(crate) struct OutputOpts {
    /// Also log debug messages, such as every test file as it is formatted
    #[arg(long, short, global = true, env = "XCRESULT_SONAR_VERBOSE")]
    verbose: bool,

    /// Color log messages: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "XCRESULT_SONAR_COLOR"
    )]
    color: Color,
}

impl OutputOpts {
    /// Installs the global stderr logger. Only the first call in a process has an effect.
    pub(crate) fn init_logger(self) {
        let filter = LogFilter::from_env(self.verbose);
        let colorize = self.color.should_colorize();

        let layer = tracing_subscriber::fmt::layer()
            .event_format(LevelPrefixFormatter { colorize })
            .with_writer(std::io::stderr)
            .with_filter(filter.targets.clone());

        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            if let Some(error) = filter.parse_error {
                warn!("ignoring invalid {LOG_ENV} (`{}`): {error}", filter.input);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

impl Color {
    fn should_colorize(self) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(supports_color::Stream::Stderr).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// The log filter: `XCRESULT_SONAR_LOG` if set and valid, otherwise INFO (DEBUG with
/// `--verbose`).
#[derive(Debug)]
struct LogFilter {
    targets: Targets,
    input: String,
    parse_error: Option<String>,
}

impl LogFilter {
    fn from_env(verbose: bool) -> Self {
        let input = std::env::var(LOG_ENV).unwrap_or_default();
        Self::parse(&input, verbose)
    }

    fn parse(input: &str, verbose: bool) -> Self {
        let default_level = if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let fallback = || Targets::new().with_default(default_level);

        let (targets, parse_error) = if input.trim().is_empty() {
            (fallback(), None)
        } else {
            match input.parse::<Targets>() {
                Ok(targets) => (targets, None),
                Err(error) => (fallback(), Some(error.to_string())),
            }
        };
        Self {
            targets,
            input: input.to_owned(),
            parse_error,
        }
    }
}

/// Writes events as `warning: message`, with the level optionally colored.
struct LevelPrefixFormatter {
    colorize: bool,
}

impl LevelPrefixFormatter {
    fn prefix(level: Level) -> (&'static str, Style) {
        match level {
            Level::ERROR => ("error", style().red().bold()),
            Level::WARN => ("warning", style().yellow().bold()),
            Level::INFO => ("info", style().bold()),
            _ => ("debug", style().dimmed()),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LevelPrefixFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (label, label_style) = Self::prefix(*metadata.level());
            if self.colorize {
                write!(writer, "{}: ", label.style(label_style))?;
            } else {
                write!(writer, "{label}: ")?;
            }
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use test_case::test_case;

    #[derive(Debug, Parser)]
    struct TestApp {
        #[clap(flatten)]
        output: OutputOpts,
    }

    #[test_case("", false, LevelFilter::INFO; "default")]
    #[test_case("", true, LevelFilter::DEBUG; "verbose")]
    #[test_case("warn", true, LevelFilter::WARN; "env overrides verbose")]
    #[test_case("sonar_formatter=trace", false, LevelFilter::TRACE; "per-target")]
    fn log_filter_levels(input: &str, verbose: bool, expected: LevelFilter) {
        let filter = LogFilter::parse(input, verbose);
        assert!(filter.parse_error.is_none());
        let max_level = filter
            .targets
            .iter()
            .map(|(_, level)| level)
            .chain(filter.targets.default_level())
            .max()
            .expect("some level is set");
        assert_eq!(max_level, expected);
    }

    #[test]
    fn invalid_log_filter_falls_back_to_default() {
        let filter = LogFilter::parse("sonar_formatter=loud", false);
        assert!(filter.parse_error.is_some(), "parse error recorded");
        assert_eq!(filter.targets.default_level(), Some(LevelFilter::INFO));
    }

    #[test_case(&["app"], Color::Auto, false; "defaults")]
    #[test_case(&["app", "-v", "--color", "never"], Color::Never, true; "explicit")]
    fn parses_output_opts(args: &[&str], color: Color, verbose: bool) {
        let app = TestApp::try_parse_from(args).expect("arguments are valid");
        assert_eq!(app.output.color, color);
        assert_eq!(app.output.verbose, verbose);
    }

    #[test]
    fn never_colorizes_when_disabled() {
        assert!(!Color::Never.should_colorize());
        assert!(Color::Always.should_colorize());
    }
}
