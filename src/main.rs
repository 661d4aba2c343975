#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod config;
mod credentials;
mod fault;
mod message_source;
mod notifier;
mod poll_loop;
mod response;
mod status_client;
mod verdict;

use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver};
use log::{error, info};

use crate::{
    config::Config,
    credentials::Credentials,
    message_source::run_message_source,
    notifier::{LogNotifier, Notifier, TelegramNotifier},
    poll_loop::PollLoop,
    status_client::StatusClient,
};

fn main() {
    env_logger::init();
    info!("Initialising");
    let (config, credentials) = match initialise() {
        Ok(initialised) => initialised,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    if let Err(err) = run(&config, &credentials) {
        error!("Abnormal shutdown: {:?}", err);
        process::exit(1);
    }
}

fn initialise() -> Result<(Config, Credentials)> {
    let credentials = Credentials::from_env()?;
    let config = Config::from_env()?;
    info!("Loaded config {:?}", config);

    Ok((config, credentials))
}

fn install_stop_handler() -> Result<Receiver<()>> {
    let (tx_stop, rx_stop) = bounded(1);
    ctrlc::set_handler(move || {
        // A second signal while the first is pending has nothing more to say.
        let _ = tx_stop.try_send(());
    })
    .context("Failed to set Ctrl+C handler")?;

    Ok(rx_stop)
}

fn run(config: &Config, credentials: &Credentials) -> Result<()> {
    let rx_stop = install_stop_handler()?;
    let source = StatusClient::new(
        config.endpoint.clone(),
        credentials,
        config.request_timeout,
    );
    let notifier: Box<dyn Notifier> = if config.use_fake_notifier {
        info!("Using fake notifier");
        Box::new(LogNotifier)
    } else {
        Box::new(TelegramNotifier::new(credentials, config.request_timeout))
    };
    let watermark = Utc::now().timestamp() - config.lookback_secs;
    info!("Running poll loop from watermark {}", watermark);

    let poll_loop = PollLoop::new(source, notifier, watermark, config.retry_period, rx_stop);
    run_message_source("PollLoop", poll_loop)
}
