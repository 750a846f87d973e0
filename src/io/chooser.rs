use crate::types::{OrthoError, OrthoResult};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// File type offered in a selection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    /// Extension without the leading dot
    pub extension: &'static str,
}

impl FileFilter {
    pub const RAW: FileFilter = FileFilter {
        name: "RAW files",
        extension: "raw",
    };
    pub const DTH: FileFilter = FileFilter {
        name: "DTH files",
        extension: "dth",
    };
    pub const LOG: FileFilter = FileFilter {
        name: "Text Document",
        extension: "log",
    };

    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(self.extension))
            .unwrap_or(false)
    }
}

/// Operator interaction. Every call may block until a human answers.
pub trait Chooser {
    /// Ask the operator to pick one file
    fn select_file(&mut self, title: &str, filter: &FileFilter) -> OrthoResult<PathBuf>;

    /// Ask the operator for a line of text
    fn prompt_text(&mut self, message: &str) -> OrthoResult<String>;

    /// Show progress to the operator
    fn notify(&mut self, message: &str);
}

/// Line-oriented chooser over a reader/writer pair, normally stdin/stdout
pub struct ConsoleChooser<R, W> {
    input: R,
    output: W,
}

impl ConsoleChooser<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, message: &str) -> OrthoResult<String> {
        write!(self.output, "{}\t\t", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(OrthoError::InvalidInput(format!(
                "no answer given to '{}'",
                message
            )));
        }
        Ok(line.trim().to_string())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Chooser for ConsoleChooser<R, W> {
    fn select_file(&mut self, title: &str, filter: &FileFilter) -> OrthoResult<PathBuf> {
        let prompt = format!("{} [{} (*.{})]", title, filter.name, filter.extension);
        let answer = self.read_line(&prompt)?;
        // Paths pasted from Explorer arrive quoted
        let path = PathBuf::from(answer.trim_matches('"'));

        if !filter.accepts(&path) {
            return Err(OrthoError::InvalidInput(format!(
                "'{}' is not a .{} file",
                path.display(),
                filter.extension
            )));
        }
        Ok(path)
    }

    fn prompt_text(&mut self, message: &str) -> OrthoResult<String> {
        self.read_line(message)
    }

    fn notify(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{}", message) {
            log::warn!("Failed to write to console: {}", e);
        }
    }
}

/// Native file dialogs for selections, console for text prompts
#[cfg(feature = "dialog")]
pub struct DialogChooser {
    console: ConsoleChooser<std::io::StdinLock<'static>, std::io::Stdout>,
}

#[cfg(feature = "dialog")]
impl DialogChooser {
    pub fn new() -> Self {
        Self {
            console: ConsoleChooser::stdio(),
        }
    }
}

#[cfg(feature = "dialog")]
impl Default for DialogChooser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "dialog")]
impl Chooser for DialogChooser {
    fn select_file(&mut self, title: &str, filter: &FileFilter) -> OrthoResult<PathBuf> {
        self.console.notify(title);
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter(filter.name, &[filter.extension])
            .pick_file()
            .ok_or_else(|| OrthoError::InvalidInput(format!("no file selected for '{}'", title)))
    }

    fn prompt_text(&mut self, message: &str) -> OrthoResult<String> {
        self.console.prompt_text(message)
    }

    fn notify(&mut self, message: &str) {
        self.console.notify(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_console_select_file() {
        let input = Cursor::new("\"C:\\imgs\\ESP_012345_1780_RED.raw\"\n");
        let mut chooser = ConsoleChooser::new(input, Vec::new());
        let path = chooser
            .select_file("select image raw file", &FileFilter::RAW)
            .unwrap();
        assert_eq!(path, PathBuf::from("C:\\imgs\\ESP_012345_1780_RED.raw"));

        let output = String::from_utf8(chooser.into_output()).unwrap();
        assert!(output.contains("RAW files (*.raw)"));
    }

    #[test]
    fn test_console_rejects_wrong_extension() {
        let mut chooser = ConsoleChooser::new(Cursor::new("gale.dth\n"), Vec::new());
        let err = chooser.select_file("select image", &FileFilter::RAW).unwrap_err();
        assert!(matches!(err, OrthoError::InvalidInput(_)));
    }

    #[test]
    fn test_console_eof_is_an_error() {
        let mut chooser = ConsoleChooser::new(Cursor::new(""), Vec::new());
        assert!(chooser.prompt_text("enter name of project").is_err());
    }

    #[test]
    fn test_prompt_text_trims() {
        let mut chooser = ConsoleChooser::new(Cursor::new("  gale \n3\n"), Vec::new());
        assert_eq!(chooser.prompt_text("project").unwrap(), "gale");
        assert_eq!(chooser.prompt_text("count").unwrap(), "3");
    }
}
