//! EV Support CLI
//!
//! Operator and user front end for the malfunction reporting workflow.
//!
//! ```sh
//! # Import the station register configured in config.toml (or given here)
//! ev-support import datasets/Ladesaeulenregister.csv
//!
//! # File and process a report in one go
//! ev-support report --station BERLIN-10115-0001 --type not-charging \
//!     --description "Vehicle not charging properly"
//!
//! # Close the ticket
//! ev-support resolve 5f0c... --notes "Replaced connector"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info};

use ev_support::application::{seed_stations, CatalogSummary};
use ev_support::bootstrap::{build_service, init_tracing};
use ev_support::domain::{
    ChargingStation, MalfunctionReport, MalfunctionType, PostalCode, ReportId, TicketId,
};
use ev_support::notifications::{create_event_bus, SharedEventBus};
use ev_support::{
    AppConfig, AppError, DomainError, MalfunctionReportService, ProcessingResult, RegisterLoader,
};

/// Malfunction reporting for public EV charging stations.
#[derive(Parser, Debug)]
#[command(
    name = "ev-support",
    version,
    about = "Report and resolve EV charging station malfunctions",
    long_about = "Report malfunctions at public charging stations, open tickets \
                  for valid reports and put stations back into service.\n\n\
                  Default config: ~/.config/ev-support/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "EV_SUPPORT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the effective settings.
    Check,

    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Load a station register CSV and upsert its stations.
    Import {
        /// Register file; defaults to `catalog.path` from the config.
        csv: Option<PathBuf>,

        /// Region to import; defaults to `catalog.region`.
        #[arg(long)]
        region: Option<String>,
    },

    /// List stations.
    Stations {
        /// Only stations in this postal code.
        #[arg(long)]
        postal_code: Option<String>,
    },

    /// File a malfunction report.
    Submit(SubmitArgs),

    /// Validate a submitted report and open a ticket.
    Process {
        report_id: String,

        /// Exit non-zero when the report is rejected.
        #[arg(long)]
        strict: bool,
    },

    /// Submit and process a report in one step.
    Report {
        #[command(flatten)]
        submit: SubmitArgs,

        /// Exit non-zero when the report is rejected.
        #[arg(long)]
        strict: bool,
    },

    /// Resolve a ticket and mark the station available again.
    Resolve {
        ticket_id: String,

        /// Free text for the log and the audit trail.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List reports.
    Reports {
        /// Only reports for this station.
        #[arg(long)]
        station: Option<String>,

        /// Only reports not yet resolved.
        #[arg(long)]
        open: bool,
    },

    /// Network statistics.
    Overview,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
}

#[derive(clap::Args, Debug)]
struct SubmitArgs {
    /// Station identifier, e.g. BERLIN-10115-0001.
    #[arg(long)]
    station: String,

    /// not-charging, payment-failure, payment-not-reflected, physical-damage,
    /// display-malfunction, connector-issue or other.
    #[arg(long = "type", value_parser = parse_malfunction_type)]
    malfunction_type: MalfunctionType,

    /// What is wrong (10 to 500 characters).
    #[arg(long)]
    description: String,

    /// Contact e-mail of the reporter.
    #[arg(long)]
    reported_by: Option<String>,
}

fn parse_malfunction_type(s: &str) -> Result<MalfunctionType, String> {
    s.parse().map_err(|e: ev_support::DomainError| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) if is_transient(e.as_ref()) => {
            error!("{}", e);
            eprintln!("error: {} (temporary, try again)", e);
            ExitCode::from(EXIT_TEMPFAIL)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// sysexits `EX_TEMPFAIL`
const EXIT_TEMPFAIL: u8 = 75;

/// Storage failures may clear up on retry; everything else will not.
fn is_transient(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = e.downcast_ref::<DomainError>() {
        return e.is_transient();
    }
    matches!(e.downcast_ref::<AppError>(), Some(AppError::Domain(d)) if d.is_transient())
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ev_support::default_config_path);

    let mut config = AppConfig::load(&config_path)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // Every command publishes into the bus; the audit trail drains it
    // once the command is done, also when it failed part way.
    let bus = create_event_bus();
    let mut events = bus.subscribe();
    let audit = config.audit_trail();

    let out = Output { json: cli.json };
    let outcome = execute(cli.command, &mut config, &config_path, &out, &bus).await;
    let recorded = audit.record_pending(&mut events);
    let code = outcome?;
    let count = recorded?;
    debug!(events = count, "Audit trail updated");
    Ok(code)
}

async fn execute(
    command: Command,
    config: &mut AppConfig,
    config_path: &Path,
    out: &Output,
    bus: &SharedEventBus,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Check => {
            config.validate()?;
            println!("✅ Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Storage     : {:?}", config.storage.backend);
            println!("   Database    : {}", config.storage.database_config().url);
            println!("   Log level   : {}", config.logging.level);
            println!("   Region      : {}", config.catalog.region);
            println!(
                "   Catalog     : {}",
                config
                    .catalog
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".into())
            );
            println!(
                "   Audit file  : {}",
                config
                    .audit
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "- (log only)".into())
            );
            let reprocessing = if config.workflow.reject_reprocessing {
                "rejected"
            } else {
                "allowed"
            };
            println!("   Re-process  : {}", reprocessing);
            Ok(ExitCode::SUCCESS)
        }

        Command::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Import { csv, region } => {
            let path = csv
                .or_else(|| config.catalog.path.clone())
                .ok_or("no CSV given and catalog.path is not set")?;
            let region = region.unwrap_or_else(|| config.catalog.region.clone());

            let stations = RegisterLoader::new(region).load_file(&path)?;
            let summary = CatalogSummary::from_stations(&stations);

            // Seeding is done here explicitly.
            config.catalog.seed_on_startup = false;
            let service = open_service(config, bus).await?;
            seed_stations(service.repositories().stations(), stations).await?;

            out.summary(&summary)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Stations { postal_code } => {
            let postal_code = postal_code.map(PostalCode::new).transpose()?;
            let service = open_service(config, bus).await?;
            let stations = service.list_stations(postal_code.as_ref()).await?;
            out.stations(&stations)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Submit(args) => {
            let service = open_service(config, bus).await?;
            let report_id = submit(&service, &args).await?;
            out.value(&serde_json::json!({ "report_id": report_id }), || {
                println!("Report submitted: {}", report_id)
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Process { report_id, strict } => {
            let report_id: ReportId = report_id.parse()?;
            let service = open_service(config, bus).await?;
            let result = service.process_malfunction_report(report_id).await?;
            out.processing(&result)?;
            Ok(exit_for(&result, strict))
        }

        Command::Report { submit: args, strict } => {
            let service = open_service(config, bus).await?;
            let report_id = submit(&service, &args).await?;
            let result = service.process_malfunction_report(report_id).await?;
            out.processing(&result)?;
            Ok(exit_for(&result, strict))
        }

        Command::Resolve { ticket_id, notes } => {
            let ticket_id: TicketId = ticket_id.parse()?;
            let service = open_service(config, bus).await?;
            service
                .resolve_malfunction(ticket_id, notes.as_deref())
                .await?;
            out.value(&serde_json::json!({ "resolved": ticket_id }), || {
                println!("✅ Ticket {} resolved, station available again", ticket_id)
            })?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Reports { station, open } => {
            let service = open_service(config, bus).await?;
            let mut reports = match station {
                Some(ref id) => service.get_reports_for_station(id).await?,
                None => service.get_all_reports().await?,
            };
            if open {
                reports.retain(|r| r.is_open());
            }
            reports.sort_by_key(|r| r.created_at());
            out.reports(&reports)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Overview => {
            let service = open_service(config, bus).await?;
            let overview = service.network_overview().await?;
            out.value(&overview, || {
                println!("Stations      : {}", overview.total_stations);
                println!("Defective     : {}", overview.defective_stations);
                println!("Open reports  : {}", overview.open_reports);
                println!("Health        : {:.1}%", overview.health_percentage);
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn open_service(
    config: &AppConfig,
    bus: &SharedEventBus,
) -> Result<MalfunctionReportService, AppError> {
    build_service(config, Some(bus.clone())).await
}

async fn submit(
    service: &MalfunctionReportService,
    args: &SubmitArgs,
) -> Result<ReportId, ev_support::DomainError> {
    service
        .submit_malfunction_report(
            &args.station,
            args.malfunction_type,
            &args.description,
            args.reported_by.as_deref(),
        )
        .await
}

fn exit_for(result: &ProcessingResult, strict: bool) -> ExitCode {
    if strict && !result.success {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

// ── Output ──────────────────────────────────────────────────────

struct Output {
    json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> serde_json::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }

    fn processing(&self, result: &ProcessingResult) -> serde_json::Result<()> {
        self.value(result, || match result.ticket_id {
            Some(ticket) if result.success => {
                println!("✅ Ticket created: {}", ticket);
                println!("   The station is now marked as defective.");
            }
            _ => {
                println!("❌ Report rejected:");
                for e in &result.errors {
                    println!("   - {}", e);
                }
            }
        })
    }

    fn summary(&self, summary: &CatalogSummary) -> serde_json::Result<()> {
        self.value(summary, || {
            println!("Stations imported : {}", summary.total_stations);
            println!("Postal codes      : {}", summary.unique_postal_codes);
            println!(
                "With coordinates  : {} ({:.1}%)",
                summary.stations_with_coordinates, summary.coverage_percentage
            );
        })
    }

    fn stations(&self, stations: &[ChargingStation]) -> serde_json::Result<()> {
        self.value(&stations, || {
            for s in stations {
                println!(
                    "{:<22} {:<11} {:<6} {} {}",
                    s.station_id().as_str(),
                    s.status().as_str(),
                    s.postal_code(),
                    s.name(),
                    s.address().map(|a| format!("({})", a)).unwrap_or_default()
                );
            }
            println!("{} station(s)", stations.len());
        })
    }

    fn reports(&self, reports: &[MalfunctionReport]) -> serde_json::Result<()> {
        self.value(&reports, || {
            for r in reports {
                println!(
                    "{} {:<22} {:<15} {:<22} {}",
                    r.report_id(),
                    r.station_id().as_str(),
                    r.status().as_str(),
                    r.malfunction_type().label(),
                    r.ticket_id().map(|t| t.short()).unwrap_or_else(|| "-".into())
                );
            }
            println!("{} report(s)", reports.len());
        })
    }
}
