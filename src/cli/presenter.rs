//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Presenter for CLI output formatting.
/// Status goes to stderr so stdout stays free for media or listings.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "✓".green(), message));
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        self.finish_spinner(format!("{} {}", "✗".red(), message));
    }

    /// A spinner is hidden when stderr is not a terminal; print the
    /// final status plainly then.
    fn finish_spinner(&mut self, line: String) {
        match self.spinner.take() {
            Some(spinner) if !spinner.is_hidden() => spinner.finish_with_message(line),
            Some(spinner) => {
                spinner.finish_and_clear();
                eprintln!("{}", line);
            }
            None => eprintln!("{}", line),
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Print a key-value pair (for device listings)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the launcher command line, one shell word per argument
    pub fn command_line(&self, program: &str, args: &[String]) {
        self.output(&format_command_line(program, args));
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a command line, quoting words that a shell would split.
pub fn format_command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=.,/:%+@!".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_not_quoted() {
        let args = vec![
            "-qe".to_string(),
            "ximagesrc".to_string(),
            "use-damage=false".to_string(),
            "!".to_string(),
            "video/x-raw,framerate=30/1".to_string(),
        ];
        assert_eq!(
            format_command_line("/usr/bin/gst-launch-1.0", &args),
            "/usr/bin/gst-launch-1.0 -qe ximagesrc use-damage=false ! video/x-raw,framerate=30/1"
        );
    }

    #[test]
    fn special_words_are_quoted() {
        let args = vec![
            "location=/tmp/my video.mkv".to_string(),
            "it's".to_string(),
            String::new(),
        ];
        assert_eq!(
            format_command_line("gst", &args),
            r"gst 'location=/tmp/my video.mkv' 'it'\''s' ''"
        );
    }

    #[test]
    fn spinner_lifecycle() {
        let mut presenter = Presenter::new();
        assert!(!presenter.is_spinning());
        presenter.start_spinner("Launching");
        assert!(presenter.is_spinning());
        presenter.spinner_success("Recording");
        assert!(!presenter.is_spinning());
        presenter.start_spinner("Finalizing");
        presenter.spinner_fail("Interrupted");
        assert!(!presenter.is_spinning());
    }
}
