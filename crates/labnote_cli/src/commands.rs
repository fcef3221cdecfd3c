//! Command handlers. Each prints plain, tab-separated lines.

use crate::cli::{
    BackupCommands, Commands, ExperimentCommands, MarkupInput, ProjectCommands, SyncCommands,
    TaskCommands,
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use labnote_core::{
    export_experiment_document, Experiment, ExperimentSection, ExperimentService,
    GitHubContentsClient, LabRepository, Project, PullOutcome, PushOutcome, SqliteKvStore,
    SyncConfig, SyncService, TaskService,
};
use log::info;
use std::path::Path;

type Repo = LabRepository<SqliteKvStore>;

pub async fn dispatch(command: Commands, repo: &Repo) -> Result<()> {
    match command {
        Commands::Project { action } => project(action, repo),
        Commands::Experiment { action } => experiment(action, repo),
        Commands::Task { action } => task(action, repo),
        Commands::Backup { action } => backup(action, repo),
        Commands::Sync { action } => sync(action, repo).await,
    }
}

fn project(action: ProjectCommands, repo: &Repo) -> Result<()> {
    match action {
        ProjectCommands::List => {
            for project in repo.list_projects() {
                println!(
                    "{}\t{}\t{}",
                    project.id,
                    format_time(project.created_at),
                    project.name
                );
            }
        }
        ProjectCommands::Create { name } => {
            let project = repo.create_project(name.trim())?;
            println!("{}", project.id);
        }
        ProjectCommands::Rename { id, name } => {
            let mut project = find_project(repo, &id)?;
            project.name = name.trim().to_string();
            repo.update_project(&project)?;
        }
        ProjectCommands::Notes { id, body } => {
            let mut project = find_project(repo, &id)?;
            project.notes = Some(read_markup(body)?);
            repo.update_project(&project)?;
        }
        ProjectCommands::Delete { id, yes } => {
            confirm(yes, "delete a project and all of its experiments")?;
            let deletion = repo.delete_project(&id)?;
            if !deletion.project_removed {
                bail!("project `{id}` not found");
            }
            println!(
                "deleted project {id} with {} experiment(s)",
                deletion.experiments_removed
            );
        }
    }
    Ok(())
}

fn experiment(action: ExperimentCommands, repo: &Repo) -> Result<()> {
    match action {
        ExperimentCommands::List {
            project,
            search,
            in_progress,
        } => {
            let experiments = if in_progress {
                repo.list_in_progress()
            } else if let Some(query) = search {
                repo.search_experiments(project.as_deref(), &query)
            } else {
                repo.list_experiments(project.as_deref())
            };
            for experiment in experiments {
                println!(
                    "{}\t{}\t{}\t{}",
                    experiment.id,
                    experiment.status.label(),
                    format_time(experiment.updated_at),
                    experiment.title
                );
            }
        }
        ExperimentCommands::Show { id } => print_experiment(&find_experiment(repo, &id)?),
        ExperimentCommands::Create { project, title } => {
            find_project(repo, &project)?;
            let experiment = repo.create_experiment(project, title.trim())?;
            println!("{}", experiment.id);
        }
        ExperimentCommands::Copy { id } => {
            let copy = repo
                .copy_experiment(&id)?
                .ok_or_else(|| anyhow!("experiment `{id}` not found"))?;
            println!("{}", copy.id);
        }
        ExperimentCommands::Status { id, status } => {
            let mut experiment = find_experiment(repo, &id)?;
            experiment.status = status;
            repo.save_experiment(&experiment)?;
        }
        ExperimentCommands::Edit { id, section, body } => {
            let mut experiment = find_experiment(repo, &id)?;
            experiment.set_section(section, read_markup(body)?);
            repo.save_experiment(&experiment)?;
        }
        ExperimentCommands::Rename { id, title } => {
            let mut experiment = find_experiment(repo, &id)?;
            experiment.title = title.trim().to_string();
            repo.save_experiment(&experiment)?;
        }
        ExperimentCommands::Date { id, date } => {
            let experiment = ExperimentService::new(repo)
                .set_start_date(&id, date)?
                .ok_or_else(|| anyhow!("experiment `{id}` not found"))?;
            println!("{}\t{}", experiment.id, date);
        }
        ExperimentCommands::Delete { id, yes } => {
            confirm(yes, "delete an experiment")?;
            if !repo.delete_experiment(&id)? {
                bail!("experiment `{id}` not found");
            }
        }
        ExperimentCommands::ExportDoc { id, out } => {
            let experiment = find_experiment(repo, &id)?;
            let document = export_experiment_document(&experiment, today());
            let path = out.join(&document.file_name);
            std::fs::write(&path, &document.bytes)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn task(action: TaskCommands, repo: &Repo) -> Result<()> {
    let service = TaskService::new(repo);
    match action {
        TaskCommands::List { day } => {
            for task in service.tasks_for_day(day.unwrap_or_else(today)) {
                println!("{}\t{}\t{}", task.id, checkbox(task.completed), task.text);
            }
        }
        TaskCommands::Add { text, day } => {
            for task in service.add_tasks(&text, day.unwrap_or_else(today))? {
                println!("{}", task.id);
            }
        }
        TaskCommands::Toggle { id } => {
            let task = service
                .toggle_task(&id)?
                .ok_or_else(|| anyhow!("task `{id}` not found"))?;
            println!("{}\t{}", task.id, checkbox(task.completed));
        }
        TaskCommands::Delete { id } => {
            if !service.delete_task(&id)? {
                bail!("task `{id}` not found");
            }
        }
        TaskCommands::Timeline => {
            for group in service.timeline() {
                println!("{}", group.day);
                for task in group.tasks {
                    println!("  {}\t{}\t{}", task.id, checkbox(task.completed), task.text);
                }
            }
            println!("pending: {}", service.pending_count());
        }
    }
    Ok(())
}

fn backup(action: BackupCommands, repo: &Repo) -> Result<()> {
    match action {
        BackupCommands::Export { out } => {
            let text = repo.export_all()?;
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("failed to write `{}`", path.display()))?,
                None => println!("{text}"),
            }
        }
        BackupCommands::Import { file, yes } => {
            confirm(yes, "replace all local data with a backup")?;
            let text = read_text(&file)?;
            let summary = repo.import_all(&text)?;
            println!(
                "imported {} project(s), {} experiment(s), {} task(s)",
                summary.projects, summary.experiments, summary.tasks
            );
        }
    }
    Ok(())
}

async fn sync(action: SyncCommands, repo: &Repo) -> Result<()> {
    match action {
        SyncCommands::Configure {
            token,
            owner,
            repo: repo_name,
            branch,
            path,
            api_base,
        } => {
            let mut config = SyncConfig::new(token.trim(), owner.trim(), repo_name.trim());
            if let Some(branch) = branch {
                config.branch = branch;
            }
            if let Some(path) = path {
                config.path = path;
            }
            if let Some(api_base) = api_base {
                config.api_base = api_base;
            }
            config.validate()?;
            config.save(repo.store())?;
            info!(
                "event=sync_configure module=cli status=ok owner={} repo={}",
                config.owner, config.repo
            );
        }
        SyncCommands::Show => {
            let config = SyncConfig::load(repo.store());
            println!("owner\t{}", config.owner);
            println!("repo\t{}", config.repo);
            println!("branch\t{}", config.branch);
            println!("path\t{}", config.path);
            println!("api_base\t{}", config.api_base);
            println!("token\t{}", if config.token.is_empty() { "unset" } else { "set" });
        }
        SyncCommands::Push => {
            let config = SyncConfig::load(repo.store());
            let service = SyncService::new(repo, GitHubContentsClient::new());
            match service.push(&config).await? {
                PushOutcome::Created { revision } => {
                    println!("created remote file {}", revision.unwrap_or_default());
                }
                PushOutcome::Updated {
                    previous_revision,
                    revision,
                } => println!(
                    "updated remote file {previous_revision} -> {}",
                    revision.unwrap_or_default()
                ),
            }
        }
        SyncCommands::Pull { yes } => {
            confirm(yes, "replace all local data with the remote file")?;
            let config = SyncConfig::load(repo.store());
            let service = SyncService::new(repo, GitHubContentsClient::new());
            match service.pull(&config).await? {
                PullOutcome::NotFound => println!("no remote file yet; local data unchanged"),
                PullOutcome::Imported(summary) => println!(
                    "imported {} project(s), {} experiment(s), {} task(s)",
                    summary.projects, summary.experiments, summary.tasks
                ),
            }
        }
    }
    Ok(())
}

fn print_experiment(experiment: &Experiment) {
    println!("id\t{}", experiment.id);
    println!("project\t{}", experiment.project_id);
    println!("title\t{}", experiment.title);
    println!("status\t{}", experiment.status.label());
    println!("created\t{}", format_time(experiment.created_at));
    println!("updated\t{}", format_time(experiment.updated_at));
    for section in ExperimentSection::ALL {
        println!("\n[{}]\n{}", section.as_str(), experiment.section(section));
    }
}

fn find_project(repo: &Repo, id: &str) -> Result<Project> {
    repo.get_project(id)
        .ok_or_else(|| anyhow!("project `{id}` not found"))
}

fn find_experiment(repo: &Repo, id: &str) -> Result<Experiment> {
    repo.get_experiment(id)
        .ok_or_else(|| anyhow!("experiment `{id}` not found"))
}

fn read_markup(input: MarkupInput) -> Result<String> {
    match (input.text, input.file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => read_text(&path),
        (None, None) => bail!("provide --text or --file"),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

fn confirm(yes: bool, action: &str) -> Result<()> {
    if !yes {
        bail!("refusing to {action} without --yes");
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn format_time(epoch_ms: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_ms)
        .earliest()
        .map_or_else(|| epoch_ms.to_string(), |time| time.format("%Y-%m-%d %H:%M").to_string())
}
