use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use importer::{
    CompetitionCode, FootballDataClient, FootballDataImporter, FootballDataSpec, TeamNaming,
    canonical::{PredictionsFile, PredictionsTransformer, PredictionsValidator},
    sources::football_data::DEFAULT_BASE_URL,
};
use storage::Database;
use storage::services::{ReconcileReport, ReconcileStatus, ReconciliationService};
use storage::traits::StandingsProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lp-import")]
#[command(about = "League prediction contest importer and reconciler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load pre-season predictions from a JSON file
    Predictions {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Fetch and print the live table
    Standings {
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Score every prediction against the live table and append history
    Reconcile {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Report what would be appended without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List supported competitions
    Competitions,
}

#[derive(clap::Args)]
struct ProviderArgs {
    #[arg(short, long, env = "COMPETITION", default_value = "PL")]
    competition: CompetitionCode,

    #[arg(long, env = "FOOTBALL_DATA_TOKEN")]
    token: Option<String>,

    #[arg(long, env = "FOOTBALL_DATA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = "full")]
    naming: TeamNaming,
}

impl ProviderArgs {
    fn importer(&self) -> Result<FootballDataImporter, Box<dyn std::error::Error>> {
        let client = FootballDataClient::new(self.base_url.clone(), self.token.clone())?;
        let spec = FootballDataSpec::new(self.competition).with_naming(self.naming);
        Ok(FootballDataImporter::new(client, spec))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lp_import={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Predictions {
            file,
            validate_only,
        } => {
            handle_predictions_import(file, validate_only, cli.database_url.as_deref()).await?;
        }
        Commands::Standings { provider } => {
            handle_standings(provider).await?;
        }
        Commands::Reconcile { provider, dry_run } => {
            handle_reconcile(provider, dry_run, cli.database_url.as_deref()).await?;
        }
        Commands::Competitions => list_competitions(),
    }

    Ok(())
}

async fn connect(database_url: Option<&str>) -> Result<Database, Box<dyn std::error::Error>> {
    let database_url = database_url.ok_or("DATABASE_URL is required for this command")?;

    tracing::info!("Connecting to database...");
    let db = Database::new(database_url).await?;
    db.run_migrations().await?;

    Ok(db)
}

async fn handle_predictions_import(
    file: PathBuf,
    validate_only: bool,
    database_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading predictions from: {}", file.display());

    let json_content = tokio::fs::read_to_string(&file).await?;
    let predictions = PredictionsFile::from_json(&json_content)?;

    tracing::info!(
        "Loaded {} predictions for {} {} (v{})",
        predictions.participants.len(),
        predictions.competition,
        predictions.season,
        predictions.format_version
    );

    tracing::info!("Validating predictions...");
    let validation_report = PredictionsValidator::validate(&predictions)?;
    validation_report.log_warnings();
    tracing::info!("✓ Validation successful!");

    if validate_only {
        return Ok(());
    }

    let db = connect(database_url).await?;
    let summary = PredictionsTransformer::new(db.pool())
        .import_to_database(predictions)
        .await?;

    tracing::info!(
        "✓ Imported {} participants ({} predicted positions)",
        summary.participants,
        summary.predictions
    );

    Ok(())
}

async fn handle_standings(provider: ProviderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let importer = provider.importer()?;
    let rows = importer.fetch_standings().await?;

    println!(
        "\n{} standings ({} teams):\n",
        importer.spec().competition().name(),
        rows.len()
    );
    for row in &rows {
        let position = row
            .position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3}  {:<30} {:>3} pts  ({:+})",
            position, row.team, row.points, row.goal_difference
        );
    }
    println!();

    Ok(())
}

async fn handle_reconcile(
    provider: ProviderArgs,
    dry_run: bool,
    database_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = connect(database_url).await?;
    let importer = provider.importer()?;

    let service = ReconciliationService::new(
        Arc::new(importer),
        Arc::new(db.clone()),
        Arc::new(db),
    );

    let report = if dry_run {
        tracing::info!("Dry run: nothing will be written");
        service.preview().await?
    } else {
        service.reconcile().await?
    };

    print_report(&report);

    Ok(())
}

fn print_report(report: &ReconcileReport) {
    match report.status {
        ReconcileStatus::Appended => tracing::info!(
            "✓ Appended {} history points (run {})",
            report.appended(),
            report
                .run_id
                .map(|id| id.to_string())
                .unwrap_or_default()
        ),
        ReconcileStatus::WouldAppend => tracing::info!(
            "Would append {} history points ({} participants changed)",
            report.points.len(),
            report.changed_participants.len()
        ),
        ReconcileStatus::Unchanged => tracing::info!("No total changed; history untouched"),
    }

    println!("\nLeaderboard as of {}:\n", report.snapshot_captured_at);
    for entry in &report.leaderboard {
        println!(
            "  {:>3}. {:<30} {:>4}",
            entry.rank, entry.participant_name, entry.total
        );
    }
    println!();
}

fn list_competitions() {
    println!("\nSupported competitions:\n");
    for code in CompetitionCode::all() {
        println!("  • {:<4} {} ({} teams)", code, code.name(), code.team_count());
    }
    println!();
}
