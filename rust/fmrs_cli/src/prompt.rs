use fmrs::models::{
    MAX_WINDOW_SIZE,
    MIN_WINDOW_SIZE,
};
use fmrs::WindowSize;
use std::io::{
    BufRead,
    Write,
};

use crate::error::CliError;

/// Asks for the sliding window until a value within range is entered.
pub fn prompt_window_size<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> Result<WindowSize, CliError> {
    let mut line = String::new();
    loop {
        write!(
            output,
            "Enter sliding window [{}..{}]: ",
            MIN_WINDOW_SIZE, MAX_WINDOW_SIZE
        )?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(CliError::Usage(
                "no sliding window given (use --window)".to_string(),
            ));
        }
        match line.trim().parse::<usize>().map(WindowSize::new) {
            Ok(Ok(window)) => return Ok(window),
            _ => writeln!(
                output,
                "Sliding window must be a whole number within {}..{}",
                MIN_WINDOW_SIZE, MAX_WINDOW_SIZE
            )?,
        }
    }
}
