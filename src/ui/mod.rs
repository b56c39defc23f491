//! Terminal UI: the live preview of the document, status output and spinners.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::controller::InteractionState;
use crate::models::Line;

/// Text shown in place of the line being enhanced
pub const BUSY_LINE_TEXT: &str = "Generating & Finding Top Result...";

/// Accessible description of the line being enhanced
pub const BUSY_LABEL: &str = "Generating search and finding top result...";

/// Export control label when idle
pub const EXPORT_IDLE_LABEL: &str = "Download Word";

/// Export control label while the document is generated
pub const EXPORT_BUSY_LABEL: &str = "Generating...";

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Loading => "◐",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Loading,
    Search,
}

/// Print a styled status message.
#[macro_export]
macro_rules! print_status {
    ($status:expr, $msg:expr) => {{
        use owo_colors::OwoColorize;
        use $crate::ui::{status_icon, Status};
        let status: Status = $status;
        let icon = status_icon(status);
        match status {
            Status::Success => println!("{} {}", icon.green().bold(), $msg),
            Status::Error => println!("{} {}", icon.red().bold(), $msg),
            Status::Warning => println!("{} {}", icon.yellow().bold(), $msg),
            Status::Info => println!("{} {}", icon.cyan().bold(), $msg),
            Status::Loading => println!("{} {}", icon.cyan(), $msg),
            Status::Search => println!("{} {}", icon.yellow(), $msg),
        }
    }};
}

/// Accessible label for a line, mirroring what a screen reader would announce.
pub fn line_label(line: &Line, state: InteractionState) -> String {
    if state == InteractionState::Busy(line.index) {
        BUSY_LABEL.to_string()
    } else if line.actionable {
        format!("Search Google for \"{}\"", line.trimmed)
    } else {
        String::new()
    }
}

/// Text displayed for a line in the preview.
pub fn line_display_text(line: &Line, state: InteractionState) -> &str {
    if state == InteractionState::Busy(line.index) {
        BUSY_LINE_TEXT
    } else {
        &line.raw
    }
}

/// Render the preview, one output row per document line.
///
/// Actionable lines are shown as links, blank lines as-is. While a line is
/// busy, every other actionable line is shown disabled.
pub fn render_preview(lines: &[Line], state: InteractionState, width: usize, color: bool) -> Vec<String> {
    let gutter = lines.len().saturating_sub(1).to_string().len();
    let text_width = width.saturating_sub(gutter + 3).max(4);

    lines
        .iter()
        .map(|line| {
            let text = truncate_with_ellipsis(line_display_text(line, state), text_width);
            let number = format!("{:>gutter$}", line.index, gutter = gutter);
            if !color {
                return format!("{} │ {}", number, text);
            }

            let styled = if state == InteractionState::Busy(line.index) {
                text.yellow().bold().to_string()
            } else if !line.actionable {
                text
            } else if state.is_busy() {
                text.dimmed().to_string()
            } else {
                text.blue().underline().to_string()
            };
            format!("{} {} {}", number.dimmed(), "│".dimmed(), styled)
        })
        .collect()
}

/// Print the live preview to stdout.
pub fn print_preview(lines: &[Line], state: InteractionState) {
    print_section("Live Preview");
    for row in render_preview(lines, state, terminal_width(), is_terminal()) {
        println!("{}", row);
    }
}

/// Render the accessible label of every line that has one.
pub fn render_labels(lines: &[Line], state: InteractionState) -> Vec<String> {
    let gutter = lines.len().saturating_sub(1).to_string().len();
    lines
        .iter()
        .map(|line| (line.index, line_label(line, state)))
        .filter(|(_, label)| !label.is_empty())
        .map(|(index, label)| format!("{:>gutter$} │ {}", index, label, gutter = gutter))
        .collect()
}

/// Print the accessible labels to stdout.
pub fn print_labels(lines: &[Line], state: InteractionState) {
    print_section("Labels");
    for row in render_labels(lines, state) {
        println!("{}", row);
    }
}

/// Print the startup banner for interactive sessions.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}", format!("Interactive Hyperlink Document v{}", version).bold());
    println!(
        "{}",
        "  <n> open line n · + <text> append · p preview · l labels · x export · q quit".dimmed()
    );
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();

    if total_width <= max_width {
        return text.to_string();
    }

    // Find the longest prefix that fits
    let mut current_width = 0;
    let mut end_idx = 0;

    for (i, (_, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width.saturating_sub(3) {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

fn spinner_style(template: &str, ticks: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
        .tick_chars(ticks)
}

/// A loading spinner with message.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(spinner_style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that draws nothing (quiet mode, non-terminal output).
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.green} {msg}", "✓ ✗ "));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(spinner_style("{spinner:.red} {msg}", "✓ ✗ "));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment;

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
    }

    #[test]
    fn test_line_labels() {
        let lines = segment("cat dog\n  ");
        assert_eq!(
            line_label(&lines[0], InteractionState::Idle),
            "Search Google for \"cat dog\""
        );
        assert_eq!(line_label(&lines[0], InteractionState::Busy(0)), BUSY_LABEL);
        assert_eq!(line_label(&lines[1], InteractionState::Idle), "");
    }

    #[test]
    fn test_render_labels_skips_blank_lines() {
        let lines = segment("Hello\n\ncat dog");
        assert_eq!(
            render_labels(&lines, InteractionState::Idle),
            vec![
                "0 │ Search Google for \"Hello\"".to_string(),
                "2 │ Search Google for \"cat dog\"".to_string(),
            ]
        );
        assert_eq!(
            render_labels(&lines, InteractionState::Busy(2))[1],
            format!("2 │ {}", BUSY_LABEL)
        );
    }

    #[test]
    fn test_render_preview_plain() {
        let lines = segment("Hello\n\ncat dog");
        let rows = render_preview(&lines, InteractionState::Idle, 80, false);
        assert_eq!(rows, vec!["0 │ Hello", "1 │ ", "2 │ cat dog"]);
    }

    #[test]
    fn test_render_preview_busy_line() {
        let lines = segment("Hello\ncat dog");
        let rows = render_preview(&lines, InteractionState::Busy(1), 80, false);
        assert_eq!(rows[0], "0 │ Hello");
        assert_eq!(rows[1], format!("1 │ {}", BUSY_LINE_TEXT));
    }

    #[test]
    fn test_render_preview_gutter_alignment() {
        let text = (0..11).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let rows = render_preview(&segment(&text), InteractionState::Idle, 80, false);
        assert_eq!(rows[0], " 0 │ 0");
        assert_eq!(rows[10], "10 │ 10");
    }
}
