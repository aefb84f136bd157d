//! Interactive stdin prompts

use std::io::{self, Write};

use crate::error::Result;

/// Prompt for a line of input; an empty answer is allowed
pub fn prompt(msg: &str) -> Result<String> {
    print!("{msg}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt until the operator enters a non-empty value
pub fn prompt_not_empty(msg: &str) -> Result<String> {
    loop {
        let value = prompt(msg)?;
        if !value.is_empty() {
            return Ok(value);
        }
    }
}

/// Numbered choice list; returns the selected zero-based index.
/// An empty answer selects the first option.
pub fn prompt_choice(msg: &str, options: &[String]) -> Result<usize> {
    println!("{msg}");
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, option);
    }
    loop {
        let answer = prompt("Please enter a choice [Default choice(1)]: ")?;
        if answer.is_empty() {
            return Ok(0);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
            _ => println!("Invalid choice."),
        }
    }
}
