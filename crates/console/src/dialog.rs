use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use tableside_workspace::{Dialog, normalize_input};

/// Line source shared by the REPL and the dialog.
pub type SharedInput = Rc<RefCell<dyn BufRead>>;
pub type SharedOutput = Rc<RefCell<dyn Write>>;

/// Answers workspace prompts on the console.
///
/// A blank answer (or end of input) cancels a prompt; confirmations default
/// to "no".
#[derive(Clone)]
pub struct ConsoleDialog {
    input: SharedInput,
    output: SharedOutput,
}

impl ConsoleDialog {
    pub fn new(input: SharedInput, output: SharedOutput) -> Self {
        Self { input, output }
    }

    fn write(&self, text: &str) {
        let mut output = self.output.borrow_mut();
        if let Err(error) = output.write_all(text.as_bytes()).and_then(|()| output.flush()) {
            tracing::debug!(error = %error, "console write failed");
        }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(error) => {
                tracing::debug!(error = %error, "console read failed");
                None
            }
        }
    }
}

impl Dialog for ConsoleDialog {
    fn try_get_input(&self, title: &str, prompt: &str, initial: Option<&str>) -> Option<String> {
        match initial {
            Some(current) => self.write(&format!("[{title}] {prompt} (currently \"{current}\") ")),
            None => self.write(&format!("[{title}] {prompt} ")),
        }
        normalize_input(self.read_line().as_deref())
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        self.write(&format!("[{title}] {message} [y/N] "));
        self.read_line()
            .map(|answer| answer.trim().to_lowercase())
            .is_some_and(|answer| answer == "y" || answer == "yes")
    }

    fn show_message(&self, title: &str, message: &str) {
        self.write(&format!("[{title}] {message}\n"));
    }
}

impl core::fmt::Debug for ConsoleDialog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleDialog").finish_non_exhaustive()
    }
}
