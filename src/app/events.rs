use std::time::Duration;

use rand::Rng;
use tokio::{sync::mpsc::Sender, time::sleep};

use crate::{
    app::state::RefreshMode,
    domain::weather::{ForecastReport, Location},
};

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickRefresh,
    FetchSucceeded {
        mode: RefreshMode,
        location: Location,
        report: Box<ForecastReport>,
    },
    FetchFailed {
        mode: RefreshMode,
        error: String,
    },
    Quit,
}

/// Wait before the next silent refresh, spread by ±10% so clients drift apart.
#[must_use]
pub fn jittered_delay(base_secs: u64, jitter: f32) -> Duration {
    let jitter = jitter.clamp(-0.1, 0.1);
    Duration::from_secs_f32(((base_secs as f32) * (1.0 + jitter)).max(1.0))
}

pub fn start_refresh_task(tx: Sender<AppEvent>, refresh_secs: u64) {
    tokio::spawn(async move {
        let base = refresh_secs.max(crate::cli::MIN_REFRESH_SECS);
        loop {
            let wait = {
                let mut rng = rand::rng();
                jittered_delay(base, rng.random_range(-0.1f32..0.1f32))
            };
            sleep(wait).await;
            if tx.send(AppEvent::TickRefresh).await.is_err() {
                break;
            }
        }
    });
}

pub fn start_shutdown_task(tx: Sender<AppEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(AppEvent::Quit).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_ten_percent() {
        assert_eq!(jittered_delay(600, 0.0), Duration::from_secs(600));
        assert_eq!(jittered_delay(600, 0.5), jittered_delay(600, 0.1));
        let low = jittered_delay(600, -0.1).as_secs_f32();
        assert!((539.0..=541.0).contains(&low));
    }

    #[test]
    fn delay_never_drops_below_a_second() {
        assert_eq!(jittered_delay(0, -0.1), Duration::from_secs(1));
    }
}
