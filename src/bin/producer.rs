use clap::Parser;
use seekbeacon::cli::{LogArgs, NoiseArgs, SeekingArgs, StateFileArgs};
use seekbeacon::{telemetry, NoiseGenerator, Producer};
use seekbeacon_store::{BeaconStore, SubscriptionStore};

#[derive(Parser)]
#[command(
    name = "seekbeacon-producer",
    version,
    about = "Emit filler events on stdout and beacon for a listener while unattached"
)]
struct Cli {
    #[command(flatten)]
    files: StateFileArgs,

    #[command(flatten)]
    seeking: SeekingArgs,

    #[command(flatten)]
    noise: NoiseArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log.log_json);

    let config = cli.seeking.to_config()?;
    let generator = NoiseGenerator::new(cli.noise.to_config(cli.seeking.mode));

    let producer = Producer::new(
        config,
        generator,
        BeaconStore::new(&cli.files.beacon_path),
        SubscriptionStore::new(&cli.files.subscriptions_path),
        std::io::stdout(),
    );
    producer.run().await?;
    Ok(())
}
