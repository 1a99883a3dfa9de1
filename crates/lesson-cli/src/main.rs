//! Command-line front end for the lesson engine.
//!
//! Loads a topic catalog (and optionally a progress snapshot) and exposes
//! the engine's operations for inspection:
//! - `topics`, `compile`, `locks`, `resolve`, `outline`, `search`
//! - `walk`: drive a navigation cursor through a topic
//! - `review`: grade a timed review from the command line
//! - `summary`: learner totals and rank

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lesson_core::catalog::TopicCatalog;
use lesson_core::content::Topic;
use lesson_core::logging::{LogFormat, init_subscriber};
use lesson_core::progress::ProgressStore;
use lesson_engine::outline::{module_items, table_of_contents};
use lesson_engine::review::{ReviewLimits, ReviewPolicy, ReviewSession};
use lesson_engine::search::search;
use lesson_engine::{
    CatalogCompile, CompiledSequence, GatingPolicy, LockMap, NavigationCursor, compute_locks,
    locate,
};
use lesson_progress::{LearnerSummary, MemoryProgressStore, ProgressSnapshot};
use lesson_settings::{LessonSettings, LogOutput};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "lesson", about = "Compile and navigate lesson topics")]
struct Cli {
    /// Topic catalog (`topics.json`). Defaults to the configured path.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Progress snapshot to read (and write, for `review --save`).
    #[arg(long, global = true)]
    progress: Option<PathBuf>,

    /// Settings file. Defaults to `~/.lesson/settings.json`.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Ignore section locks.
    #[arg(long, global = true, default_value_t = false)]
    privileged: bool,

    /// Log filter, e.g. `debug` or `lesson_engine=debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog topics with completion.
    Topics,

    /// Print a topic's compiled sequence.
    Compile {
        /// Topic ID.
        topic: String,
        /// Emit JSON instead of one line per step.
        #[arg(long)]
        json: bool,
    },

    /// Print a topic's lock map.
    Locks {
        /// Topic ID.
        topic: String,
    },

    /// Resolve a deep-link target to a step.
    Resolve {
        /// Topic ID.
        topic: String,
        /// Target token.
        target: String,
    },

    /// Extract a review and optionally grade answers.
    Review {
        /// Topic ID.
        topic: String,
        /// Start token. Defaults to the configured review token.
        #[arg(long)]
        token: Option<String>,
        /// Answers in question order; `-` lets the clock run out.
        #[arg(long = "answer")]
        answers: Vec<String>,
        /// Write graded results back to the progress snapshot.
        #[arg(long)]
        save: bool,
    },

    /// Print the table of contents, or one module's items.
    Outline {
        /// Topic ID.
        topic: String,
        /// Header ID whose module items to list.
        #[arg(long)]
        module: Option<String>,
    },

    /// Search titles and descriptions across the catalog.
    Search {
        /// Query text.
        query: String,
    },

    /// Walk a topic with a navigation cursor.
    Walk {
        /// Topic ID.
        topic: String,
        /// Deep-link target to start from.
        #[arg(long)]
        from: Option<String>,
        /// Steps to advance.
        #[arg(long, default_value_t = 3)]
        steps: usize,
    },

    /// Show learner totals and rank.
    Summary,
}

/// Loaded inputs shared by every command.
struct Workspace {
    settings: Arc<LessonSettings>,
    catalog: TopicCatalog,
    store: MemoryProgressStore,
    progress_path: Option<PathBuf>,
}

impl Workspace {
    fn open(cli: &Cli, settings: Arc<LessonSettings>) -> Result<Self> {
        let catalog_path = cli
            .catalog
            .clone()
            .unwrap_or_else(|| PathBuf::from(&settings.catalog.path));
        let catalog = TopicCatalog::load(&catalog_path)
            .with_context(|| format!("failed to load catalog {}", catalog_path.display()))?;

        let store = MemoryProgressStore::with_pass_ratio(settings.progress.pass_ratio);
        if let Some(path) = cli.progress.as_deref().filter(|p| p.exists()) {
            let snapshot = ProgressSnapshot::load(path)
                .with_context(|| format!("failed to load progress {}", path.display()))?;
            let imported = store.import_snapshot(&snapshot);
            info!(?path, imported, "loaded progress");
        }

        Ok(Self {
            settings,
            catalog,
            store,
            progress_path: cli.progress.clone(),
        })
    }

    fn topic(&self, id: &str) -> Result<&Topic> {
        self.catalog
            .require(id)
            .with_context(|| format!("unknown topic {id}"))
    }

    fn policy(&self) -> GatingPolicy {
        GatingPolicy::from(&self.settings.gating)
    }

    fn compiled(&self, id: &str) -> Result<(CompiledSequence, LockMap)> {
        let topic = self.topic(id)?;
        let sequence = self.catalog.compile(id)?;
        let locks = compute_locks(topic, &self.store, &self.policy());
        Ok((sequence, locks))
    }

    fn save_progress(&self) -> Result<()> {
        let path = self
            .progress_path
            .as_deref()
            .context("--save needs --progress <path>")?;
        self.store
            .export_snapshot()
            .save(path)
            .with_context(|| format!("failed to save progress {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match cli.settings.as_deref() {
        Some(path) => lesson_settings::reload_settings_from_path(path),
        None => lesson_settings::get_settings(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    let format = match settings.logging.format {
        LogOutput::Compact => LogFormat::Compact,
        LogOutput::Json => LogFormat::Json,
    };
    init_subscriber(&level, format);

    let ws = Workspace::open(&cli, settings)?;
    debug!(command = ?cli.command, topics = ws.catalog.len(), "running command");
    run(&cli, &ws)
}

fn run(cli: &Cli, ws: &Workspace) -> Result<()> {
    match &cli.command {
        Command::Topics => {
            for topic in ws.catalog.topics() {
                let percent = ws.store.topic_completion_percent(&topic.id);
                println!("{:<24} {:>3}%  {}", topic.id.as_str(), percent, topic.title);
            }
        }
        Command::Compile { topic, json } => {
            let (sequence, _) = ws.compiled(topic)?;
            if *json {
                print_json(&sequence)?;
            } else {
                print!("{sequence}");
            }
        }
        Command::Locks { topic } => {
            let (_, locks) = ws.compiled(topic)?;
            print_json(&locks)?;
        }
        Command::Resolve { topic, target } => {
            let (sequence, _) = ws.compiled(topic)?;
            match locate(&sequence, target) {
                Some(found) => {
                    let step = &sequence.steps[found.step];
                    println!("#{} sub {}  {step}", found.step, found.sub_index);
                }
                None => println!("{target}: not found"),
            }
        }
        Command::Review {
            topic,
            token,
            answers,
            save,
        } => review(ws, topic, token.as_deref(), answers, *save)?,
        Command::Outline { topic, module } => {
            let (sequence, _) = ws.compiled(topic)?;
            match module {
                Some(header) => {
                    let step = locate(&sequence, header)
                        .with_context(|| format!("no module {header} in {topic}"))?
                        .step;
                    print_json(&module_items(&sequence, step, &ws.store))?;
                }
                None => {
                    let toc = table_of_contents(&sequence, &ws.store, &ws.settings.outline);
                    print_json(&toc)?;
                }
            }
        }
        Command::Search { query } => {
            for hit in search(&ws.catalog, query, &ws.settings.search) {
                let target = hit.node_id.as_ref().map_or("", |id| id.as_str());
                println!("{:?}\t{}\t{}#{}", hit.kind, hit.title, hit.topic_id, target);
            }
        }
        Command::Walk { topic, from, steps } => {
            walk(ws, topic, from.as_deref(), *steps, cli.privileged)?;
        }
        Command::Summary => print_json(&LearnerSummary::from_store(&ws.store))?,
    }
    Ok(())
}

fn walk(
    ws: &Workspace,
    topic: &str,
    from: Option<&str>,
    steps: usize,
    privileged: bool,
) -> Result<()> {
    let (sequence, locks) = ws.compiled(topic)?;
    let mut cursor = NavigationCursor::new(sequence, locks, privileged);
    if let Some(target) = from {
        let _ = cursor.jump_to_deep_link(target);
    }

    for _ in 0..=steps {
        let Some(step) = cursor.current() else {
            println!("(empty topic)");
            break;
        };
        let lock = cursor
            .current_lock()
            .map(|l| format!("  [locked {}/{}]", l.achieved, l.required))
            .unwrap_or_default();
        println!("#{:<3} {step}{lock}", cursor.cursor());
        if !cursor.can_go_next() || !cursor.go_next() {
            break;
        }
    }
    Ok(())
}

fn review(
    ws: &Workspace,
    topic_id: &str,
    token: Option<&str>,
    answers: &[String],
    save: bool,
) -> Result<()> {
    let topic = ws.topic(topic_id)?;
    let policy = ReviewPolicy::from(&ws.settings.review);
    let token = token.unwrap_or(policy.token.as_str());
    let questions = policy.extract(topic, token);
    if questions.is_empty() {
        println!("no review questions for {token}");
        return Ok(());
    }

    let mut session = ReviewSession::new(
        topic.id.clone(),
        questions,
        ReviewLimits::from(&ws.settings.review),
    );
    for (i, answer) in answers.iter().enumerate() {
        if i > 0 && !session.go_next() {
            break;
        }
        let result = if answer == "-" {
            let _ = session.time_up();
            "TimeUp".to_owned()
        } else {
            format!("{:?}", session.submit(answer))
        };
        let position = session.current().map_or(0, |q| q.position);
        println!("q{} (node {position}): {result}", i + 1);
    }

    print_json(&session.outcomes().collect::<Vec<_>>())?;
    if save {
        for (key, record) in session.into_records(ws.settings.progress.pass_ratio) {
            ws.store.set(key, record);
        }
        ws.save_progress()?;
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
