use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use chancay_tracker::app::ports::WeatherSnapshot;
use chancay_tracker::config::{AppConfig, DEFAULT_CONFIG_PATH};
use chancay_tracker::domain::{AiInsight, Container, ContainerStatus};
use chancay_tracker::infra::CsvStore;
use chancay_tracker::wiring::AppContext;
use chancay_tracker::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "chancay_tracker")]
#[command(about = "Container and vessel tracking for the Port of Chancay")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Overwrite the data files with the sample port data
    Seed,
    /// Print the port overview
    Overview,
    /// List containers, optionally filtered by status
    Containers {
        #[arg(long)]
        status: Option<String>,
    },
    /// List ships
    Ships {
        /// Only ships arriving or docked
        #[arg(long)]
        arriving: bool,
    },
    /// Mark a container as docked
    Dock { container_id: String },
    /// Assign the first free crane to a docked container
    AssignCrane { container_id: String },
    /// Record unloading progress (0-100)
    Progress { container_id: String, percent: i32 },
    /// Set a ship's status text
    ShipStatus { ship_id: String, status: String },
    /// Print today's efficiency figures and operational advice
    Efficiency,
    /// Generate dashboard insights
    Insights {
        /// Also run the trade corridor analysis
        #[arg(long)]
        corridor: bool,
    },
    /// Forecast delays for one ship under the given sea conditions
    PredictDelay {
        ship_id: String,
        #[arg(long, default_value = "clear")]
        conditions: String,
        #[arg(long, default_value_t = 10.0)]
        wind_knots: f64,
        #[arg(long, default_value_t = 1.0)]
        wave_height_m: f64,
        #[arg(long, default_value_t = 10.0)]
        visibility_km: f64,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_containers(containers: &[Container]) {
    for c in containers {
        println!(
            "{:<16} {:<12} {:<14} {:>9.0} kg {:>4}% {:<9} {}",
            c.container_id,
            c.status().as_str(),
            c.cargo_type.as_str(),
            c.weight_kg(),
            c.progress_percent(),
            c.priority.as_str(),
            c.crane_assigned().unwrap_or("-")
        );
    }
    println!("{} container(s)", containers.len());
}

fn print_insight(insight: &AiInsight) {
    println!(
        "[{}] {} (confidence {:.2}, impact {})",
        insight.category(),
        insight.title(),
        insight.confidence(),
        insight.impact_level()
    );
    println!("    {}", insight.description());
}

fn outcome(ok: bool, what: &str) {
    if ok {
        println!("✅ {}", what);
    } else {
        println!("❌ {} failed (see logs)", what);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;

    if let Commands::Seed = cli.command {
        let store = CsvStore::new(&config.storage.data_dir);
        store.seed_sample_data().await?;
        println!("🌱 Sample data written to {}", config.storage.data_dir.display());
        return Ok(());
    }
    if let Commands::Serve { port: Some(port) } = cli.command {
        config.server.port = port;
    }

    let ctx = Arc::new(AppContext::build(config).await?);

    match cli.command {
        Commands::Serve { .. } => {
            info!("Starting HTTP server");
            if let Err(e) = server::start_server(ctx).await {
                error!("Server stopped: {}", e);
                return Err(e);
            }
        }
        Commands::Seed => {}
        Commands::Overview => print_json(&ctx.analytics.port_overview().await)?,
        Commands::Containers { status } => {
            let containers = match status {
                Some(raw) => {
                    let status: ContainerStatus = raw.parse()?;
                    ctx.tracking.containers_by_status(status).await
                }
                None => ctx.tracking.all_containers().await,
            };
            print_containers(&containers);
        }
        Commands::Ships { arriving } => {
            let ships = if arriving {
                ctx.tracking.arriving_ships().await
            } else {
                ctx.tracking.all_ships().await
            };
            for s in &ships {
                println!(
                    "{:<10} {:<18} {:<10} {:>4}/{:<4} ({:.0}%) {}",
                    s.ship_id,
                    s.name,
                    s.current_status,
                    s.containers_count(),
                    s.max_capacity(),
                    s.load_percentage(),
                    if s.is_overloaded() { "⚠️ near capacity" } else { "" }
                );
            }
        }
        Commands::Dock { container_id } => {
            outcome(ctx.tracking.dock_container(&container_id).await, "Dock");
        }
        Commands::AssignCrane { container_id } => {
            match ctx.tracking.try_assign_crane(&container_id).await {
                Ok(assignment) => println!(
                    "🏗️ {} assigned to {} (operation {})",
                    assignment.crane_id, assignment.container_id, assignment.operation.operation_id
                ),
                Err(e) => println!("❌ Crane assignment failed: {}", e),
            }
        }
        Commands::Progress { container_id, percent } => {
            outcome(
                ctx.tracking
                    .update_unloading_progress(&container_id, percent)
                    .await,
                "Progress update",
            );
        }
        Commands::ShipStatus { ship_id, status } => {
            outcome(ctx.tracking.update_ship_status(&ship_id, &status).await, "Ship status update");
        }
        Commands::Efficiency => {
            print_json(&ctx.efficiency.calculate_daily_efficiency().await)?;
            for insight in ctx.efficiency.optimize_operations().await {
                print_insight(&insight);
            }
        }
        Commands::Insights { corridor } => {
            for insight in ctx.insights.generate_dashboard_insights().await {
                print_insight(&insight);
            }
            if corridor {
                if let Some(insight) = ctx.insights.analyze_trade_corridor().await {
                    print_insight(&insight);
                }
            }
        }
        Commands::PredictDelay {
            ship_id,
            conditions,
            wind_knots,
            wave_height_m,
            visibility_km,
        } => {
            let weather = WeatherSnapshot {
                conditions,
                wind_knots,
                wave_height_m,
                visibility_km,
            };
            match ctx.tracking.predict_ship_delay(&ship_id, &weather).await {
                Some(insight) => print_insight(&insight),
                None => println!("❌ Ship {} not found", ship_id),
            }
        }
    }
    Ok(())
}
