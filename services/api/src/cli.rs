use crate::demo::{run_assessment_list, run_assessment_score, run_demo, DemoArgs, ScoreArgs};
use crate::server;
use aptitude::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Aptitude",
    about = "Score learner assessments and gate results behind lead capture",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect and score assessments offline
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },
    /// Walk through a scripted session: answers, lead capture, and release
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AssessmentCommand {
    /// List the registered assessment types
    List,
    /// Score a `question_id,option` CSV export without any lead gating
    Score(ScoreArgs),
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

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assessment {
            command: AssessmentCommand::List,
        } => run_assessment_list(),
        Command::Assessment {
            command: AssessmentCommand::Score(args),
        } => run_assessment_score(args),
        Command::Demo(args) => run_demo(args),
    }
}
