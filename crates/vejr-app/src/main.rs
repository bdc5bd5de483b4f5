use anyhow::Result;
use tracing::info;

use vejr_app::{home, saved, AppServices, HomeState, SavedState};
use vejr_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    vejr_core::init()?;

    // warnings are logged by the loader; errors abort here
    let (config, _) = Config::load_validated()?;

    let services = AppServices::from_config(&config)?;

    info!("Loading home screen");
    let home_state = home::activate(&services, HomeState::default()).await;
    println!("{}", serde_json::to_string_pretty(&home_state)?);

    info!("Loading saved cities");
    let saved_state = saved::activate(&services, SavedState::default()).await;
    println!("{}", serde_json::to_string_pretty(&saved_state)?);

    Ok(())
}
