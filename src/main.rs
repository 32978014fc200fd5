use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use git_deploy::changelog::ChangelogGenerator;
use git_deploy::config;
use git_deploy::git::Git2Repository;
use git_deploy::process::SystemRunner;
use git_deploy::publish::GhPublisher;
use git_deploy::release::{ReleaseDriver, ReleaseOptions, ReleaseOutcome, ReleaseSettings};
use git_deploy::ui::{self, TerminalConfirm};

#[derive(clap::Parser)]
#[command(
    name = "deploy",
    about = "a monorepo deploy helper",
    override_usage = "deploy --version minor --name myservice",
    long_about = "Generates a new release by:
- Creating and pushing a semver git tag (optional with a name)
- Generating a changelog
- Generating a new GitHub release"
)]
struct Args {
    #[arg(
        short,
        long,
        default_value = "patch",
        help = "Version you want to deploy, can be: patch, minor, major"
    )]
    version: String,

    #[arg(short, long, help = "Optional: Service prefix for the tag")]
    name: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Show the changelog without tagging or publishing")]
    dry_run: bool,

    #[arg(long, help = "Log every pipeline stage")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DEPLOY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Input is validated before the repository is touched
    let options = ReleaseOptions::parse(&args.version, args.name.as_deref())?
        .dry_run(args.dry_run);

    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let settings = ReleaseSettings::from_config(&config);
    let template = config.changelog.template()?;

    let repo = Git2Repository::open(".").context("Git repository error")?;
    let publisher = GhPublisher::new(config.publish.program.clone(), SystemRunner::new());

    let driver = ReleaseDriver::new(
        repo,
        publisher,
        TerminalConfirm::new(),
        ChangelogGenerator::new(template),
        settings,
    )?;

    match driver.run(&options)? {
        ReleaseOutcome::Released { tag, published } => {
            let what = if published { "tag and release" } else { "tag" };
            ui::display_success(&format!(
                "Successfully deployed {} ({} pushed to {})",
                tag, what, config.release.remote
            ));
        }
        ReleaseOutcome::Declined { tag } => {
            println!("Deployment of {} cancelled by user.", tag);
        }
        ReleaseOutcome::DryRun { tag } => {
            ui::display_status(&format!("Dry run: {} was not created", tag));
        }
    }

    Ok(())
}
