//! Terminal rendering for each command. Styling is applied only when the
//! output is a terminal.

use chrono::NaiveDateTime;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::io::{self, Write};
use std::path::Path;

use crate::app_dirs::LAUNCHER_NAME;
use crate::install::InstallResult;
use crate::session::{SessionRecord, SessionStatus};

const SEPARATOR_WIDTH: usize = 54;
const LABEL_WIDTH: usize = 16;
const TIMESTAMP_FORMAT: &str = "%a %b %d %Y · %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Bold,
    Dim,
    Green,
    Yellow,
    Red,
}

pub struct View<W: Write> {
    out: W,
    color: bool,
}

impl View<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_tty();
        Self { out, color }
    }
}

impl<W: Write> View<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn session_registered(&mut self, record: &SessionRecord) -> io::Result<()> {
        let title = format!("{} Session registered", self.paint(Tone::Green, "✓"));
        self.header(&title)?;
        self.row("Request", &record.request)?;
        self.row("Duration", &format!("{} min", record.duration_minutes))?;
        self.row("Started", &timestamp(&record.started_at))?;
        let deadline = self.paint(Tone::Bold, &timestamp(&record.deadline));
        self.row("Deadline", &deadline)?;
        self.separator()
    }

    pub fn status(&mut self, status: Option<&SessionStatus>) -> io::Result<()> {
        let Some(status) = status else {
            self.header(LAUNCHER_NAME)?;
            writeln!(self.out, "  No active session.")?;
            return self.separator();
        };

        let phase_tone = if status.is_active { Tone::Green } else { Tone::Red };
        let title = format!(
            "{LAUNCHER_NAME} · {}",
            self.paint(phase_tone, &status.phase().to_string())
        );
        let record = &status.record;
        let remaining_tone = if !status.is_active {
            Some(Tone::Red)
        } else if status.is_urgent {
            Some(Tone::Yellow)
        } else {
            None
        };
        let remaining = match remaining_tone {
            Some(tone) => self.paint(tone, &status.remaining_display()),
            None => status.remaining_display(),
        };

        self.header(&title)?;
        self.row("Request", &record.request)?;
        self.row("Now", &timestamp(&status.now))?;
        self.row("Started", &timestamp(&record.started_at))?;
        self.row("Deadline", &timestamp(&record.deadline))?;
        self.row("Duration", &format!("{} min", record.duration_minutes))?;
        self.row(
            "Elapsed",
            &format!(
                "{}  ({}%)",
                status.elapsed_display(),
                status.percent_complete
            ),
        )?;
        self.row("Remaining", &remaining)?;
        self.separator()
    }

    pub fn cancelled(&mut self, existed: bool) -> io::Result<()> {
        if existed {
            let tick = self.paint(Tone::Green, "✓");
            writeln!(self.out, "{tick} Session cancelled.")
        } else {
            writeln!(self.out, "  No active session to clear.")
        }
    }

    pub fn installed(&mut self, result: &InstallResult, target_dir: &Path) -> io::Result<()> {
        let title = format!("{} Installed", self.paint(Tone::Green, "✓"));
        self.header(&title)?;
        self.row("Source", &result.source_path.display().to_string())?;
        self.row("Link", &result.link_path.display().to_string())?;
        writeln!(self.out)?;
        let verify = self.paint(Tone::Bold, &format!("{LAUNCHER_NAME} --status"));
        writeln!(self.out, "  Run {verify} to verify.")?;

        if !result.path_contains_target_dir {
            let bang = self.paint(Tone::Yellow, "!");
            writeln!(self.out)?;
            writeln!(
                self.out,
                "  {bang} {} is not in your PATH. Add it:",
                target_dir.display()
            )?;
            writeln!(
                self.out,
                "    export PATH=\"{}:$PATH\"",
                target_dir.display()
            )?;
        }
        self.separator()
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = match tone {
            Tone::Bold => text.bold(),
            Tone::Dim => text.dim(),
            Tone::Green => text.green(),
            Tone::Yellow => text.yellow(),
            Tone::Red => text.red(),
        };
        styled.to_string()
    }

    fn separator(&mut self) -> io::Result<()> {
        let line = self.paint(Tone::Dim, &"─".repeat(SEPARATOR_WIDTH));
        writeln!(self.out, "{line}")
    }

    fn header(&mut self, title: &str) -> io::Result<()> {
        self.separator()?;
        let title = self.paint(Tone::Bold, title);
        writeln!(self.out, "  {title}")?;
        self.separator()
    }

    fn row(&mut self, label: &str, value: &str) -> io::Result<()> {
        let label = self.paint(
            Tone::Dim,
            &format!("{:<width$}", format!("{label}:"), width = LABEL_WIDTH),
        );
        writeln!(self.out, "  {label}  {value}")
    }
}

fn timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
