use crate::error::Result;
use crate::runner::OutputLine;

/// Everything a step says to, or asks of, the person running the installer.
pub trait Console {
    fn info(&mut self, message: &str);

    fn warn(&mut self, message: &str);

    fn error(&mut self, message: &str);

    /// Plain, unstyled text.
    fn line(&mut self, message: &str);

    fn newline(&mut self);

    /// A line streamed from an external process.
    fn process_output(&mut self, line: &OutputLine);

    /// Ask a yes/no question. `default` is the answer on a bare enter.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}
