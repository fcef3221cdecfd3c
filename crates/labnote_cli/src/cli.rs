//! Command-line surface of the `labnote` binary.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use labnote_core::{ExperimentSection, ExperimentStatus};
use std::path::PathBuf;

/// Top-level parser.
#[derive(Debug, Parser)]
#[command(name = "labnote", version, about = "LabNote - personal lab notebook")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite file holding the notebook.
    #[arg(long, global = true, env = "LABNOTE_DB", default_value = "labnote.sqlite3")]
    pub db: PathBuf,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "LABNOTE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "LABNOTE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Manage experiments.
    Experiment {
        #[command(subcommand)]
        action: ExperimentCommands,
    },
    /// Manage the daily task list.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Export or restore the whole notebook.
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },
    /// Mirror the notebook to a remote repository file.
    Sync {
        #[command(subcommand)]
        action: SyncCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// List projects in creation order.
    List,
    /// Create a project.
    Create { name: String },
    /// Rename a project.
    Rename { id: String, name: String },
    /// Replace a project's notes.
    Notes {
        id: String,
        #[command(flatten)]
        body: MarkupInput,
    },
    /// Delete a project and all of its experiments.
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExperimentCommands {
    /// List experiments, most recently updated first.
    List {
        #[arg(long)]
        project: Option<String>,
        /// Case-insensitive title filter.
        #[arg(long)]
        search: Option<String>,
        /// Only in-progress experiments, across all projects.
        #[arg(long, conflicts_with_all = ["project", "search"])]
        in_progress: bool,
    },
    /// Print one experiment with every section.
    Show { id: String },
    /// Create an in-progress experiment.
    Create { project: String, title: String },
    /// Duplicate an experiment.
    Copy { id: String },
    /// Change lifecycle status.
    Status { id: String, status: ExperimentStatus },
    /// Replace one content section.
    Edit {
        id: String,
        /// purpose|methods|results|conclusion
        #[arg(long)]
        section: ExperimentSection,
        #[command(flatten)]
        body: MarkupInput,
    },
    /// Change the title.
    Rename { id: String, title: String },
    /// Move the start date (YYYY-MM-DD) used by the exported record.
    Date { id: String, date: NaiveDate },
    /// Delete an experiment.
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Write the experiment as a Word-compatible `.doc` record.
    ExportDoc {
        id: String,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Markup supplied inline or from a file.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct MarkupInput {
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// Tasks for one day (default today).
    List {
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Add tasks; each non-empty line becomes one task.
    Add {
        text: String,
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Flip completion.
    Toggle { id: String },
    /// Delete a task.
    Delete { id: String },
    /// All tasks grouped by day, newest day first.
    Timeline,
}

#[derive(Debug, Subcommand)]
pub enum BackupCommands {
    /// Write the full backup document.
    Export {
        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace every collection with a backup document.
    Import {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Store remote credentials and target file.
    Configure {
        #[arg(long, env = "LABNOTE_SYNC_TOKEN", hide_env_values = true)]
        token: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        api_base: Option<String>,
    },
    /// Print the stored configuration with the token masked.
    Show,
    /// Upload the whole notebook, creating or overwriting the remote file.
    Push,
    /// Replace local data with the remote file.
    Pull {
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, ExperimentCommands, ProjectCommands, TaskCommands};
    use clap::{CommandFactory, Parser};
    use labnote_core::{ExperimentSection, ExperimentStatus};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "labnote",
            "project",
            "list",
            "--db",
            "/tmp/lab.sqlite3",
            "--log-level",
            "debug",
        ])
        .expect("cli should parse");

        assert_eq!(cli.db.to_str(), Some("/tmp/lab.sqlite3"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::Project {
                action: ProjectCommands::List
            }
        ));
    }

    #[test]
    fn experiment_status_and_section_parse_from_names() {
        let cli = Cli::try_parse_from(["labnote", "experiment", "status", "e1", "paused"])
            .expect("status should parse");
        match cli.command {
            Commands::Experiment {
                action: ExperimentCommands::Status { id, status },
            } => {
                assert_eq!(id, "e1");
                assert_eq!(status, ExperimentStatus::Paused);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "labnote",
            "experiment",
            "edit",
            "e1",
            "--section",
            "results",
            "--text",
            "<p>ok</p>",
        ])
        .expect("edit should parse");
        match cli.command {
            Commands::Experiment {
                action: ExperimentCommands::Edit { section, body, .. },
            } => {
                assert_eq!(section, ExperimentSection::Results);
                assert_eq!(body.text.as_deref(), Some("<p>ok</p>"));
                assert!(body.file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn task_day_parses_as_calendar_date() {
        let cli = Cli::try_parse_from(["labnote", "task", "add", "a\nb", "--day", "2024-03-05"])
            .expect("task add should parse");
        match cli.command {
            Commands::Task {
                action: TaskCommands::Add { text, day },
            } => {
                assert_eq!(text, "a\nb");
                assert_eq!(day.map(|d| d.to_string()).as_deref(), Some("2024-03-05"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn experiment_date_requires_a_calendar_date() {
        let cli = Cli::try_parse_from(["labnote", "experiment", "date", "e1", "2024-01-02"])
            .expect("date should parse");
        match cli.command {
            Commands::Experiment {
                action: ExperimentCommands::Date { id, date },
            } => {
                assert_eq!(id, "e1");
                assert_eq!(date.to_string(), "2024-01-02");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let result = Cli::try_parse_from(["labnote", "experiment", "date", "e1", "02/01/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn markup_text_and_file_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "labnote", "project", "notes", "p1", "--text", "x", "--file", "notes.html",
        ]);
        assert!(result.is_err());
    }
}
