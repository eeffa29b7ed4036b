//! Styled terminal output helpers.

use console::style;

pub fn success(message: &str) {
    println!("{}", style(message).green());
}

pub fn warning(message: &str) {
    println!("{}", style(message).yellow().bold());
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}
