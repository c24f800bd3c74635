use colored::*;

// Operator-facing lines go to stdout; tracing owns stderr.

pub fn print_error(message: &str, hint: &str) {
    println!(
        "{prefix} {message} {hint}",
        prefix = "Error:".red().bold(),
        hint = format!("({hint})").dimmed()
    );
}

pub fn print_success(message: &str) {
    println!("{prefix} {message}", prefix = "✓".green().bold());
}

pub fn print_warning(message: &str) {
    println!("{prefix} {message}", prefix = "⚠".yellow().bold());
}

pub fn print_info(message: &str) {
    println!("{prefix} {message}", prefix = "ℹ".blue().bold());
}
