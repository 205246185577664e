//! Colored terminal output shared by the commands.
//!
//! `NO_COLOR` beats `--color`, which beats TTY detection.

use std::io::Write;

use flir_engine::Severity;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
        Severity::Hint => Color::Green,
    }
}

/// `1 file`, `2 files`
pub fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    // ── Styled writes ────────────────────────────────────────────────

    fn write_spec(&mut self, text: &str, spec: &ColorSpec) {
        let _ = self.stdout.set_color(spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    pub fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        self.write_spec(text, &spec);
    }

    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    pub fn error(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Red), true);
    }

    pub fn warning(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Yellow), true);
    }

    pub fn dim(&mut self, text: &str) {
        self.write_styled(text, Some(Color::White), false);
    }

    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// `error[MISSING_DISPOSE]` in the severity's color.
    pub fn severity_label(&mut self, severity: Severity, code: &str) {
        self.write_styled(
            &format!("{}[{}]", severity, code),
            Some(severity_color(severity)),
            true,
        );
    }

    // ── Badges ───────────────────────────────────────────────────────

    fn badge(&mut self, label: &str, bg: Color, fg: Color) {
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(bg)).set_fg(Some(fg)).set_bold(true);
        self.write_spec(&format!(" {} ", label), &spec);
    }

    pub fn pass_badge(&mut self) {
        self.badge("PASS", Color::Green, Color::White);
    }

    pub fn fail_badge(&mut self) {
        self.badge("FAIL", Color::Red, Color::White);
    }

    pub fn skip_badge(&mut self) {
        self.badge("SKIP", Color::Yellow, Color::Black);
    }

    // ── stderr ───────────────────────────────────────────────────────

    pub fn stderr_error(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }
}
