use std::{io::stdout, time::Duration};

use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tokio::{signal, time::sleep};

use crate::{
    api::{Capability, DataSource},
    prelude::*,
    tables::build_watch_table,
};

/// Redraw the live power panel every `interval` until Ctrl+C.
#[instrument(skip_all, fields(interval = ?interval))]
pub async fn run(source: &dyn DataSource, interval: Duration) -> Result {
    let region = source.region();
    region.ensure(Capability::LivePower)?;
    let currency = region.currency();

    let tariff = match source.get_tariff().await {
        Ok(tariff) => tariff,
        Err(error) => {
            warn!("failed to fetch the tariff: {error:#}");
            None
        }
    };

    loop {
        let now = Local::now();
        let live_power = match source.get_live_power(None).await {
            Ok(live_power) => live_power,
            Err(error) => {
                warn!("failed to fetch the live power: {error:#}");
                None
            }
        };
        let rate = tariff.as_ref().map(|tariff| tariff.rate_at(now));

        execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        println!("{}", build_watch_table(live_power.as_ref(), rate.as_ref(), currency));
        println!("Refreshing every {}, press Ctrl+C to stop", humantime::format_duration(interval));

        tokio::select! {
            () = sleep(interval) => {}
            result = signal::ctrl_c() => {
                result?;
                break;
            }
        }
    }

    info!("stopped");
    Ok(())
}
