use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use folio_sdk::{DiffLine, ObjectId, PageDiff, SdkError, Wiki};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let repo = cli.repo;
    match cli.command {
        Command::Init(args) => cmd_init(args.path.as_deref().unwrap_or(&repo)),
        Command::Show(args) => cmd_show(&open(&repo)?, args),
        Command::Create(args) => cmd_create(&open(&repo)?, args),
        Command::Edit(args) => cmd_edit(&open(&repo)?, args),
        Command::Pages(args) => cmd_pages(&open(&repo)?, args),
        Command::Log(args) => cmd_log(&open(&repo)?, args),
        Command::Diff(args) => cmd_diff(&open(&repo)?, args),
    }
}

fn open(repo: &Path) -> anyhow::Result<Wiki> {
    Wiki::open(repo).with_context(|| format!("opening wiki at {}", repo.display()))
}

fn parse_commit(id: &str) -> anyhow::Result<ObjectId> {
    id.parse()
        .with_context(|| format!("invalid commit id {id:?}"))
}

fn cmd_init(path: &Path) -> anyhow::Result<()> {
    let wiki = Wiki::init(path).with_context(|| format!("initializing {}", path.display()))?;
    println!(
        "{} Initialized wiki in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    println!("  Branch: {}", wiki.config().branch.yellow());
    println!("  Default page: {}", wiki.config().default_page);
    Ok(())
}

fn cmd_show(wiki: &Wiki, args: ShowArgs) -> anyhow::Result<()> {
    let page = match (&args.commit, &args.branch) {
        (Some(commit), _) => wiki.get_page_at_commit(&args.path, parse_commit(commit)?)?,
        (None, Some(branch)) => wiki.get_page_at_branch(&args.path, branch)?,
        (None, None) => wiki.get_page(&args.path)?,
    };
    debug!(path = %page.path(), format = %page.format(), "showing page");
    print!("{}", page.content());
    Ok(())
}

fn cmd_create(wiki: &Wiki, args: CreateArgs) -> anyhow::Result<()> {
    let page = wiki.create_page(&args.path, &args.format, &args.author)?;
    let commit = page
        .base_commit()
        .context("created page has no commit")?;
    println!(
        "{} Created {} ({})",
        "✓".green().bold(),
        page.path().to_string().bold(),
        page.format()
    );
    println!("  Commit: {}", commit.short_hex().yellow());
    Ok(())
}

fn cmd_edit(wiki: &Wiki, args: EditArgs) -> anyhow::Result<()> {
    let content = match &args.file {
        Some(file) => {
            fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let mut page = match &args.base {
        Some(base) => wiki.get_page_at_commit(&args.path, parse_commit(base)?)?,
        None => wiki.get_page(&args.path)?,
    };
    page.set_content(content);

    let outcome = match page.save_detailed(&args.author, &args.message) {
        Ok(outcome) => outcome,
        Err(SdkError::ManualMergeRequired { orphan, base, head }) => {
            eprintln!(
                "{} {} was changed concurrently; merge by hand",
                "✗".red().bold(),
                page.path().to_string().bold()
            );
            eprintln!("  Your commit: {}", orphan.to_hex().yellow());
            match base {
                Some(base) => eprintln!("  Base:        {}", base.to_hex()),
                None => eprintln!("  Base:        (empty wiki)"),
            }
            eprintln!("  Head:        {}", head.to_hex().cyan());
            bail!("manual merge required for {}", page.path());
        }
        Err(e) => return Err(e.into()),
    };

    if outcome.is_noop() {
        println!("No changes to {}.", page.path());
    } else if outcome.merged {
        println!(
            "{} Merged edit of {} with concurrent changes",
            "✓".green().bold(),
            page.path().to_string().bold()
        );
        println!("  Commit: {}", outcome.commit.short_hex().yellow());
    } else {
        println!(
            "{} Saved {}",
            "✓".green().bold(),
            page.path().to_string().bold()
        );
        println!("  Commit: {}", outcome.commit.short_hex().yellow());
    }
    Ok(())
}

fn cmd_pages(wiki: &Wiki, args: PagesArgs) -> anyhow::Result<()> {
    let commit = args.commit.as_deref().map(parse_commit).transpose()?;
    let pages = wiki.list_pages(commit)?;
    if pages.is_empty() {
        println!("No pages.");
        return Ok(());
    }
    for page in pages {
        println!(
            "{}  {}  {}",
            page.blob.short_hex().dimmed(),
            page.path.bold(),
            page.format.to_string().cyan()
        );
    }
    Ok(())
}

fn cmd_log(wiki: &Wiki, args: LogArgs) -> anyhow::Result<()> {
    let log = wiki.history(args.limit)?;
    if log.is_empty() {
        println!("No commits on {}.", wiki.config().branch.yellow());
        return Ok(());
    }
    for entry in log {
        if args.oneline {
            println!("{} {}", entry.id.short_hex().yellow(), entry.commit.summary());
            continue;
        }
        let merge = if entry.commit.is_merge() {
            " (merge)".magenta().to_string()
        } else {
            String::new()
        };
        println!("{}{}", format!("commit {}", entry.id).yellow().bold(), merge);
        println!("Author: {}", entry.commit.author);
        println!("Date:   {}", entry.commit.timestamp);
        println!();
        for line in entry.commit.message.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

fn cmd_diff(wiki: &Wiki, args: DiffArgs) -> anyhow::Result<()> {
    let from = parse_commit(&args.from)?;
    let to = parse_commit(&args.to)?;
    let diff = wiki.diff_page(&args.path, from, to)?;
    if diff.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    if args.stat {
        println!(
            "{} {}, {}",
            args.path.bold(),
            format!("+{}", diff.additions()).green(),
            format!("-{}", diff.deletions()).red()
        );
        return Ok(());
    }
    print_diff(&diff);
    Ok(())
}

fn print_diff(diff: &PageDiff) {
    for hunk in &diff.hunks {
        println!(
            "{}",
            format!(
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            )
            .cyan()
        );
        for line in &hunk.lines {
            let text = line.to_string();
            match line {
                DiffLine::Context(_) => println!("{text}"),
                DiffLine::Added(_) => println!("{}", text.green()),
                DiffLine::Removed(_) => println!("{}", text.red()),
            }
        }
    }
}
