use clap::{Parser, Subcommand};
use lzctl::bootstrap::BootstrapOptions;
use lzctl::naming::Environment;
use lzctl::shared::logging;
use lzctl::LandingZone;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(
    name = "lzctl",
    about = "Resolve landing-zone resource names and bootstrap Terraform remote state.",
    version = APP_VERSION,
    disable_version_flag(true)
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(
        long,
        short = 'c',
        value_name = "PATH",
        help = "Path to the configuration file"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        short = 'd',
        value_name = "PATH",
        help = "Landing-zone root directory (holds 01-bootstrap, 02-governance, ...)"
    )]
    pub dir: Option<String>,

    #[arg(long, short = 'V', help = "Print version")]
    pub version: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "bootstrap",
        about = "Create or attach to remote state and write every layer's backend config"
    )]
    Bootstrap {
        #[arg(value_enum)]
        environment: Environment,

        #[arg(long, help = "Skip interactive confirmation")]
        auto_approve: bool,

        #[arg(long, help = "Apply without a plan preview")]
        skip_plan: bool,

        #[arg(
            long,
            help = "Attach to existing remote state without creating resources (implies --skip-plan)"
        )]
        connect_only: bool,
    },

    #[command(name = "generate", about = "Regenerate backend configs for every layer")]
    Generate {
        #[arg(value_enum)]
        environment: Environment,
    },

    #[command(name = "names", about = "Print resolved resource names and tags as JSON")]
    Names {
        #[arg(value_enum)]
        environment: Environment,

        #[arg(long, default_value = "bootstrap", help = "Layer to resolve names for")]
        layer: String,
    },

    #[command(
        name = "scaffold",
        about = "Write the default backend template into layers that lack one"
    )]
    Scaffold,
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    if cli.version {
        println!("{}", APP_VERSION);
        std::process::exit(0);
    }

    let Some(command) = &cli.command else {
        println!("No command specified. Use --help for usage information.");
        return;
    };

    let landing_zone = match LandingZone::new(cli.config.clone(), cli.dir.clone()) {
        Ok(landing_zone) => landing_zone,
        Err(e) => {
            logging::error(&format!("Failed to initialize lzctl: {}", e));
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&landing_zone, command) {
        logging::error(&format!("{:#}", e));
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(landing_zone: &LandingZone, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Bootstrap {
            environment,
            auto_approve,
            skip_plan,
            connect_only,
        } => {
            let options = BootstrapOptions {
                auto_approve: *auto_approve,
                skip_plan: *skip_plan,
                connect_only: *connect_only,
            };
            let report = landing_zone.bootstrap(*environment, options)?;
            let phases: Vec<&str> = report.phases.iter().map(|p| p.as_str()).collect();
            println!("Phases: {}", phases.join(" -> "));
            println!(
                "Backend: bucket={} region={} kms={}",
                report.backend.bucket, report.backend.region, report.backend.kms_key_id
            );
            println!(
                "Backend configs written: {}, layers skipped: {}",
                report.generation.written.len(),
                report.generation.skipped.len()
            );
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
        }
        Commands::Generate { environment } => {
            let summary = landing_zone.generate(*environment)?;
            for (layer, path) in &summary.written {
                println!("{}: {}", layer, path.display());
            }
            println!(
                "Backend configs written: {}, layers skipped: {}",
                summary.written.len(),
                summary.skipped.len()
            );
        }
        Commands::Names { environment, layer } => {
            let naming = landing_zone.resolve_names(*environment, layer)?;
            println!("{}", serde_json::to_string_pretty(&naming)?);
        }
        Commands::Scaffold => {
            let created = landing_zone.scaffold()?;
            println!("Templates created: {}", created.len());
        }
    }
    Ok(())
}

fn init_logging() {
    let log_level = std::env::var("LZCTL_LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "warn",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lzctl={}", filter).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
