use colored::Colorize;

const CONTEXT_RANGE: usize = 3;

/// Source context around a 1-based `line_number`, one entry per printed
/// line. The offending line is marked with `-->` in bold red.
pub fn highlight_error_line(source: &str, line_number: usize) -> Vec<String> {
    let total = source.lines().count();
    let start_line = line_number.saturating_sub(CONTEXT_RANGE + 1);
    let end_line = (line_number + CONTEXT_RANGE).min(total);

    let mut out: Vec<String> = source
        .lines()
        .enumerate()
        .skip(start_line)
        .take(end_line.saturating_sub(start_line))
        .map(|(index, line)| {
            let current_line_number = index + 1;
            if current_line_number == line_number {
                format!("--> {}: {}", current_line_number, line)
                    .red()
                    .bold()
                    .to_string()
            } else {
                format!("    {}: {}", current_line_number, line)
            }
        })
        .collect();
    out.push(String::new());
    out
}
