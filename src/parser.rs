use regex::Regex;

/// Split a pasted block of text into discrete task titles.
///
/// A line like "1. Buy stamps" or "3) Call the bank" starts a new task; any
/// unnumbered line that follows is folded into the open task as an extra
/// line. When no task is open, each non-blank line stands on its own. Blank
/// lines are skipped and never open or close a task. Total over all inputs.
pub fn parse_task_block(text: &str) -> Vec<String> {
    let numbered = Regex::new(r"^\s*\d+[.)]\s+(.+)$").unwrap();

    let mut tasks: Vec<String> = Vec::new();
    let mut open: Option<String> = None;

    for line in text.lines() {
        if let Some(caps) = numbered.captures(line) {
            if let Some(done) = open.take() {
                tasks.push(done);
            }
            open = Some(caps[1].trim().to_string());
        } else if line.trim().is_empty() {
            continue;
        } else if let Some(task) = open.as_mut() {
            task.push('\n');
            task.push_str(line.trim());
        } else {
            tasks.push(line.trim().to_string());
        }
    }
    if let Some(done) = open {
        tasks.push(done);
    }
    tasks
}
