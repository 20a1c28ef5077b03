use clap::Parser;
use seekbeacon::cli::{HealthArgs, LogArgs, StateFileArgs};
use seekbeacon::telemetry;
use seekbeacon_health::create_default_registry;

#[derive(Parser)]
#[command(
    name = "seekbeacon-health",
    version,
    about = "Check the runtime directory, beacon log and subscription registry"
)]
struct Cli {
    #[command(flatten)]
    files: StateFileArgs,

    #[command(flatten)]
    health: HealthArgs,

    /// Print the report as a JSON array
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log.log_json);

    let ctx = cli.health.to_context(&cli.files, |k| std::env::var(k).ok());
    let report = create_default_registry().run_all(&ctx);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        println!("{}", report.render());
    }
    std::process::exit(report.exit_code());
}
