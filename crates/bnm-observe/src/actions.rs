//! Event formatter that speaks the CI runner's workflow-command syntax.
//!
//! `ERROR` and `WARN` events become `::error::` / `::warning::` annotations, `DEBUG` and
//! `TRACE` become `::debug::` lines (shown only when step debugging is on), `INFO` is
//! printed as is.
use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

/// Workflow-command event formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionsFormat;

impl<S, N> FormatEvent<S, N> for ActionsFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut line = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut line), event)?;

        match command_for(*event.metadata().level()) {
            Some(command) => writeln!(writer, "::{command}::{}", escape_data(&line)),
            None => writeln!(writer, "{line}"),
        }
    }
}

/// Workflow command for a level, `None` for plain output.
fn command_for(level: Level) -> Option<&'static str> {
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        Level::INFO => None,
        Level::DEBUG | Level::TRACE => Some("debug"),
    }
}

/// Escape a command payload so it stays on one line.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
