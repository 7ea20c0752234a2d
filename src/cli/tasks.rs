use std::io::Read;
use std::sync::Arc;

use colored::Colorize;
use tokio::io::AsyncBufReadExt;

use crate::cli::{client_from, confirm};
use crate::drafts::{DraftSaver, DraftStore, FileDraftStore, TASKS_DRAFT};
use crate::error::{Result, ShoeboxError};
use crate::parser::parse_task_block;
use crate::settings::load_settings;

pub async fn run(
    file: Option<String>,
    list: Option<String>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let settings = load_settings();
    let store: Arc<dyn DraftStore> = Arc::new(FileDraftStore::new(settings.drafts_dir()));
    let interactive = atty::is(atty::Stream::Stdin);

    let text = match &file {
        Some(path) => std::fs::read_to_string(path)?,
        None if interactive => match restored_draft(store.as_ref())? {
            Some(draft) => draft,
            None => capture(Arc::clone(&store)).await?,
        },
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let titles = parse_task_block(&text);
    if titles.is_empty() {
        println!("Nothing to create: no task lines found.");
        return Ok(());
    }

    print_preview(&titles);
    if dry_run {
        return Ok(());
    }

    if !yes {
        if !interactive {
            return Err(ShoeboxError::Other(
                "cannot confirm from piped input; pass --yes or --dry-run".to_string(),
            ));
        }
        let n = titles.len();
        if !confirm(&format!("Create {n} task{}?", plural(n)))? {
            if file.is_none() {
                store.save(TASKS_DRAFT, &renumber(&titles));
                println!("Nothing created. Draft kept; run `shoebox tasks add` to resume.");
            } else {
                println!("Nothing created.");
            }
            return Ok(());
        }
    }

    let client = client_from(&settings)?;
    for (i, title) in titles.iter().enumerate() {
        if let Err(e) = client.create_task(title, list.as_deref()).await {
            store.save(TASKS_DRAFT, &renumber(&titles[i..]));
            println!(
                "Created {i} of {} tasks before the server refused.",
                titles.len()
            );
            println!("The rest are kept as a draft; run `shoebox tasks add` to retry.");
            return Err(e);
        }
    }
    store.clear(TASKS_DRAFT);
    let n = titles.len();
    println!("{}", format!("Created {n} task{}.", plural(n)).green());
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Read lines from the terminal, keeping the draft store up to date as the
/// text grows. A lone `.` ends input without closing stdin, so the
/// confirmation prompt afterwards still works.
async fn capture(store: Arc<dyn DraftStore>) -> Result<String> {
    println!("Type or paste tasks below. Numbered lines start a task; other lines continue it.");
    println!("End with a single `.` on its own line (or Ctrl-D).");
    println!();
    let mut saver = DraftSaver::new(store, TASKS_DRAFT);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "." {
            break;
        }
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(&line);
        saver.update(&buffer);
    }
    saver.cancel();
    Ok(buffer)
}

fn restored_draft(store: &dyn DraftStore) -> Result<Option<String>> {
    let Some(draft) = store.load(TASKS_DRAFT) else {
        return Ok(None);
    };
    println!("Found a saved task draft:");
    println!();
    for line in draft.lines() {
        println!("  {line}");
    }
    println!();
    if confirm("Resume this draft?")? {
        Ok(Some(draft))
    } else {
        store.clear(TASKS_DRAFT);
        println!("Draft discarded.");
        Ok(None)
    }
}

/// Serialize titles back into numbered-block form so a later run parses
/// them to the same sequence, multi-line titles included.
fn renumber(titles: &[String]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_preview(titles: &[String]) {
    println!("Tasks to create:");
    for (i, title) in titles.iter().enumerate() {
        let mut lines = title.lines();
        if let Some(first) = lines.next() {
            println!("  {:>2}. {first}", i + 1);
        }
        for cont in lines {
            println!("      {cont}");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renumber_round_trips_through_parser() {
        let titles = vec![
            "Call plumber".to_string(),
            "Finish report\nwith appendix".to_string(),
            "12. haircut".to_string(),
        ];
        let block = renumber(&titles);
        assert_eq!(parse_task_block(&block), titles);
    }

    #[test]
    fn test_renumber_of_tail_keeps_remaining_order() {
        let titles: Vec<String> = ["water plants", "rotate tires", "file receipts", "call mom"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let block = renumber(&titles[2..]);
        assert_eq!(
            parse_task_block(&block),
            vec!["file receipts".to_string(), "call mom".to_string()]
        );
    }
}
