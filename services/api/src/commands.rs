use crate::infra::live_scoring_service;
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use transcript_scorer::config::AppConfig;
use transcript_scorer::error::AppError;
use transcript_scorer::projects::{
    entry_file_name, project_file_name, render_entry, render_project, sorted_entries,
    JsonFileProjectStore, Project, ProjectId, ProjectRepository, SortKey, SortOrder, StoreError,
    TranscriptEntry,
};
use transcript_scorer::scoring::{
    Dimension, ScoreRequest, ScoreResponse, ScoreStatus, SectionScores, VideoUpload,
};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Project that receives the scored transcript
    #[arg(long)]
    pub(crate) project: String,
    /// Plain-text transcript file
    #[arg(long)]
    pub(crate) transcript: PathBuf,
    /// Optional lecture video to analyze before scoring
    #[arg(long)]
    pub(crate) video: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    /// Project identifier
    pub(crate) id: String,
    /// Order entries by `date` or `score`
    #[arg(long, default_value = "date")]
    pub(crate) sort_by: SortKey,
    /// `asc` or `desc`
    #[arg(long, default_value = "desc")]
    pub(crate) order: SortOrder,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Project identifier
    pub(crate) project: String,
    /// Export only this entry (1-based position as shown by `projects show`)
    #[arg(long)]
    pub(crate) entry: Option<usize>,
    /// Output directory for the report
    #[arg(long, default_value = ".")]
    pub(crate) out: PathBuf,
}

fn project_store(config: &AppConfig) -> JsonFileProjectStore {
    JsonFileProjectStore::new(&config.storage.projects_path)
}

fn require_project(store: &impl ProjectRepository, id: &ProjectId) -> Result<Project, AppError> {
    store
        .get(id)?
        .ok_or_else(|| StoreError::ProjectNotFound(id.clone()).into())
}

pub(crate) async fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        project,
        transcript,
        video,
    } = args;

    let store = project_store(config);
    let project_id = ProjectId(project);
    let project = require_project(&store, &project_id)?;

    let transcript = tokio::fs::read_to_string(&transcript).await?;
    let service = live_scoring_service(&config.upstream)?;

    let (video_analysis, video_filename) = match video {
        Some(path) => {
            let upload = read_video(&path).await?;
            let filename = upload.filename.clone();
            println!("Analyzing video {filename}...");
            let description = service.analyze_video(upload).await?;
            println!("\nVideo Analysis:\n{description}\n");
            (Some(description), Some(filename))
        }
        None => (None, None),
    };

    let response = service
        .score(ScoreRequest {
            transcript,
            video_analysis: video_analysis.clone(),
        })
        .await?;

    print!("{}", render_score_summary(&response));

    let entry = TranscriptEntry::from_response(response, video_analysis, video_filename, Utc::now());
    let updated = store.append_entry(&project.id, entry)?;
    info!(project = %updated.id, entries = updated.transcript_count(), "transcript recorded");
    println!(
        "\nSaved to project '{}' ({} transcripts).",
        updated.name,
        updated.transcript_count()
    );

    Ok(())
}

async fn read_video(path: &Path) -> Result<VideoUpload, AppError> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    Ok(VideoUpload {
        filename,
        content_type,
        bytes,
    })
}

pub(crate) fn run_projects_create(config: &AppConfig, name: &str) -> Result<(), AppError> {
    let project = project_store(config).create(name)?;
    println!("Created project '{}' with id {}", project.name, project.id);
    Ok(())
}

pub(crate) fn run_projects_list(config: &AppConfig) -> Result<(), AppError> {
    let projects = project_store(config).list()?;
    print!("{}", render_project_listing(&projects));
    Ok(())
}

pub(crate) fn run_projects_show(config: &AppConfig, args: ShowArgs) -> Result<(), AppError> {
    let project = require_project(&project_store(config), &ProjectId(args.id))?;
    print!("{}", render_project_history(&project, args.sort_by, args.order));
    Ok(())
}

pub(crate) fn run_export(config: &AppConfig, args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        project,
        entry,
        out,
    } = args;

    let path = export_report(
        &project_store(config),
        &ProjectId(project),
        entry,
        &out,
        Local::now().date_naive(),
    )?;
    println!("Report written to {}", path.display());
    Ok(())
}

/// Writes the project report, or a single entry's report, into `out_dir`.
pub(crate) fn export_report(
    store: &impl ProjectRepository,
    id: &ProjectId,
    entry: Option<usize>,
    out_dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf, AppError> {
    let project = require_project(store, id)?;

    let (file_name, contents) = match entry {
        Some(position) => {
            let entry = position
                .checked_sub(1)
                .and_then(|index| project.transcripts.get(index))
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "project {} has no entry #{} ({} recorded)",
                        project.id,
                        position,
                        project.transcript_count()
                    ))
                })?;
            (entry_file_name(entry), render_entry(entry))
        }
        None => (project_file_name(&project, today), render_project(&project)),
    };

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

pub(crate) fn render_score_summary(response: &ScoreResponse) -> String {
    let mut out = String::new();
    writeln!(out, "Scores:").expect("write summary");
    out.push_str(&render_scores(&response.score, "  "));

    if let Some(feedback) = response.feedback.as_deref() {
        writeln!(out, "\nFeedback:\n{feedback}").expect("write summary");
    }

    if !response.warnings.is_empty() {
        writeln!(out, "\nWarnings:").expect("write summary");
        for warning in &response.warnings {
            writeln!(out, "  - {warning}").expect("write summary");
        }
    }

    out
}

fn render_scores(scores: &SectionScores, indent: &str) -> String {
    let mut out = String::new();
    for dimension in Dimension::ordered() {
        let max = dimension.rule().max;
        match scores.get(dimension) {
            Some(score) => {
                let status = ScoreStatus::for_dimension(dimension, score);
                writeln!(
                    out,
                    "{indent}{:<24} {:>5}/{} [{}]",
                    dimension.label(),
                    score,
                    max,
                    status.label()
                )
                .expect("write summary");
            }
            None => {
                writeln!(out, "{indent}{:<24} {:>5}/{}", dimension.label(), "n/a", max)
                    .expect("write summary");
            }
        }
    }
    out
}

pub(crate) fn render_project_listing(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects yet. Create one with `projects create <name>`.\n".to_string();
    }

    let mut out = String::new();
    for project in projects {
        writeln!(
            out,
            "{}  {}  ({} transcripts)",
            project.id,
            project.name,
            project.transcript_count()
        )
        .expect("write summary");
    }
    out
}

/// Entries keep their stored position number so it can be passed to `export --entry`.
pub(crate) fn render_project_history(project: &Project, key: SortKey, order: SortOrder) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{} ({}): {} transcripts",
        project.name,
        project.id,
        project.transcript_count()
    )
    .expect("write summary");

    for entry in sorted_entries(&project.transcripts, key, order) {
        let position = project
            .transcripts
            .iter()
            .position(|candidate| std::ptr::eq(candidate, entry))
            .map_or(0, |index| index + 1);

        writeln!(
            out,
            "\n#{position}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .expect("write summary");
        out.push_str(&render_scores(&entry.score, "    "));
        if let Some(filename) = entry.video_filename.as_deref() {
            writeln!(out, "    video: {filename}").expect("write summary");
        }
        if !entry.warnings.is_empty() {
            writeln!(out, "    {} validation warnings", entry.warnings.len())
                .expect("write summary");
        }
    }

    out
}
