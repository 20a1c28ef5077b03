use clap::Parser;
use seekbeacon::cli::{ListenerArgs, LogArgs, StateFileArgs};
use seekbeacon::telemetry;
use seekbeacon_listener::ListenerAgent;
use seekbeacon_store::{BeaconStore, SubscriptionStore};

#[derive(Parser)]
#[command(
    name = "seekbeacon-listener",
    version,
    about = "Poll the beacon log and subscribe to streams that are seeking"
)]
struct Cli {
    #[command(flatten)]
    files: StateFileArgs,

    #[command(flatten)]
    listener: ListenerArgs,

    #[command(flatten)]
    log: LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log.log_json);

    let config = cli.listener.to_config()?;
    let agent = ListenerAgent::new(
        config,
        BeaconStore::new(&cli.files.beacon_path),
        SubscriptionStore::new(&cli.files.subscriptions_path),
    );
    agent.run().await;
    Ok(())
}
