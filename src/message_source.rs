use anyhow::{Context, Result};
use log::{debug, info};

pub(crate) trait MessageSource {
    /// Runs one step. Returns `true` once the source wants to stop.
    fn run(&mut self) -> Result<bool>;
}

pub(crate) fn run_message_source<T>(name: &str, mut message_source: T) -> Result<()>
where
    T: MessageSource,
{
    debug!("Running MsgSource: {}", name);
    loop {
        let should_terminate = message_source
            .run()
            .context("Error on MessageSource `run`")?;

        if should_terminate {
            info!("MsgSource clean shutdown: {}", name);
            return Ok(());
        }
    }
}
