use crate::commands::{
    run_export, run_projects_create, run_projects_list, run_projects_show, run_score, ExportArgs,
    ScoreArgs, ShowArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use transcript_scorer::config::AppConfig;
use transcript_scorer::error::AppError;
use transcript_scorer::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Transcript Scorer",
    about = "Score lecture transcripts, relay video analysis, and keep per-project history",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP relay service (default command)
    Serve(ServeArgs),
    /// Score a transcript file and record the result in a project
    Score(ScoreArgs),
    /// Create, list, and inspect projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Write a project's history (or one entry) as a plain-text report
    Export(ExportArgs),
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    /// Create an empty project
    Create {
        /// Display name for the project
        name: String,
    },
    /// List every project with its transcript count
    List,
    /// Show a project's scored transcripts
    Show(ShowArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Score(args) => run_score(&config, args).await,
        Command::Projects { command } => match command {
            ProjectsCommand::Create { name } => run_projects_create(&config, &name),
            ProjectsCommand::List => run_projects_list(&config),
            ProjectsCommand::Show(args) => run_projects_show(&config, args),
        },
        Command::Export(args) => run_export(&config, args),
    }
}
