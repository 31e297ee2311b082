//! Periodic self-ping that keeps the hosting instance from idling out.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

pub fn ping_url(port: u16) -> String {
    format!("http://localhost:{}/ping", port)
}

/// GET `url` every `period`, starting one period from now.
pub fn spawn(http: reqwest::Client, url: String, period: Duration) -> JoinHandle<()> {
    log::info!("Keep-warm pinger every {}s against {}", period.as_secs(), url);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            match http.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    log::info!("Keep-warm ping ok ({})", response.status());
                }
                Ok(response) => {
                    log::error!("Keep-warm ping returned {}", response.status());
                }
                Err(e) => log::error!("Keep-warm ping failed: {}", e),
            }
        }
    })
}
