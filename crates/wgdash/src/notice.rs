//! Notices ("toasts") printed to stderr.

use owo_colors::OwoColorize;

use wgdash_core::{Notice, NoticeLevel, Notifier};

/// Writes one line per notice to stderr, coloured by level.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
    quiet: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    fn render(&self, notice: &Notice) -> String {
        let (icon, text) = (icon(notice.level), notice.message.as_str());
        if !self.color {
            return format!("{icon} {text}");
        }
        match notice.level {
            NoticeLevel::Success => format!("{} {text}", icon.green().bold()),
            NoticeLevel::Info => format!("{} {text}", icon.cyan().bold()),
            NoticeLevel::Error => format!("{} {}", icon.red().bold(), text.red()),
        }
    }
}

fn icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Error => "✗",
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        // Errors are shown even in quiet mode.
        if self.quiet && notice.level != NoticeLevel::Error {
            return;
        }
        eprintln!("{}", self.render(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_has_icon_and_message() {
        let notifier = TerminalNotifier::new(false, false);
        assert_eq!(
            notifier.render(&Notice::success("Your token is saved")),
            "✓ Your token is saved"
        );
        assert_eq!(notifier.render(&Notice::info("Input canceled")), "ℹ Input canceled");
    }
}
