use std::io::{self, Write};
use std::sync::{Mutex, OnceLock, PoisonError};

use console::style;
use time::{macros::format_description, OffsetDateTime, UtcOffset};
use tracing::warn;

use crate::types::{Credential, ProbeOutcome, ProbeReport};

/// Marker printed in front of every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Good,
    Bad,
    Warn,
    Info,
    Plain,
}

impl Status {
    fn marker(self) -> char {
        match self {
            Status::Good => '+',
            Status::Bad => '-',
            Status::Warn => '*',
            Status::Info => ':',
            Status::Plain => ' ',
        }
    }
}

/// Line sink shared by all workers. Every call writes one whole line while
/// holding the lock, so lines from different workers never interleave.
pub struct StatusReporter {
    sink: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl StatusReporter {
    pub fn new(sink: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            sink: Mutex::new(sink),
            color,
        }
    }

    pub fn stdout(color: bool) -> Self {
        Self::new(Box::new(io::stdout()), color)
    }

    /// Write one already formatted line.
    pub fn emit(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
            warn!(error = %e, "failed to write status line");
        }
    }

    /// Timestamped operator message.
    pub fn notice(&self, status: Status, message: &str) {
        let line = self.decorate(status, message);
        self.emit(&line);
    }

    /// Report one classified attempt. `worker` is the 0-based shard index.
    pub fn probe(
        &self,
        worker: usize,
        target: &str,
        credential: &Credential,
        report: &ProbeReport,
    ) {
        let line = format_probe_line(worker, target, credential, report, self.color);
        self.notice(Status::Plain, &line);
    }

    fn decorate(&self, status: Status, message: &str) -> String {
        let marker = format!("[{}]", status.marker());
        let marker = match status {
            Status::Good => style(marker).green(),
            Status::Bad => style(marker).red(),
            Status::Warn => style(marker).yellow(),
            Status::Info => style(marker).cyan(),
            Status::Plain => style(marker).white(),
        }
        .bold()
        .force_styling(self.color);
        let stamp = style(format!("[{}]", now_stamp()))
            .blue()
            .force_styling(self.color);
        format!("{marker} {stamp} {message}")
    }
}

/// `Thread N:S.SSs -> user:pass@target => classification`
pub fn format_probe_line(
    worker: usize,
    target: &str,
    credential: &Credential,
    report: &ProbeReport,
    color: bool,
) -> String {
    let user = style(&credential.username).cyan().force_styling(color);
    let pass = style(&credential.password).green().force_styling(color);
    let target = style(target).magenta().force_styling(color);
    let verdict = match &report.outcome {
        ProbeOutcome::Authorized(_) => style("Authorized".to_string())
            .blue()
            .on_magenta()
            .force_styling(color),
        ProbeOutcome::Denied => style("Access Denied".to_string())
            .yellow()
            .on_red()
            .force_styling(color),
        ProbeOutcome::Error(message) => style(format!("Error Occured : {message}"))
            .yellow()
            .force_styling(color),
    };
    format!(
        "Thread {}:{:.2}s -> {user}:{pass}@{target} => {verdict}",
        worker + 1,
        report.elapsed.as_secs_f64(),
    )
}

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Capture the local UTC offset. The offset can only be read reliably while
/// the process is single-threaded, so call this before starting the runtime.
pub fn init_local_offset() {
    LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    let offset = LOCAL_OFFSET
        .get()
        .copied()
        .unwrap_or_else(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));
    OffsetDateTime::now_utc().to_offset(offset)
}

fn now_stamp() -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    local_now()
        .format(fmt)
        .unwrap_or_else(|_| String::from("1970-01-01 00:00:00"))
}
