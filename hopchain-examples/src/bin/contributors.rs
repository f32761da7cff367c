//! Example: list the contributors of a GitHub repository
//!
//! Logs the exchange through `LoggingInterceptor`, decodes the JSON body and
//! prints contributors sorted by contribution count.
//!
//! Usage:
//!   cargo run --bin contributors
//!
//!   # Another repository, with headers logged:
//!   RUST_LOG=hopchain=debug cargo run --bin contributors -- https://api.github.com/repos/tokio-rs/tokio/contributors

use std::env;
use std::time::Duration;

use hopchain_client::{Client, LogLevel, LoggingInterceptor, Request};
use hopchain_examples::{Contributor, init_tracing};

const ENDPOINT: &str = "https://api.github.com/repos/square/okhttp/contributors";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let endpoint = env::args().nth(1).unwrap_or_else(|| ENDPOINT.to_string());

    let client = Client::builder()
        .add_interceptor(LoggingInterceptor::new(LogLevel::Basic))
        .read_timeout(Duration::from_secs(5))
        .build()?;

    let request = Request::builder()
        .uri(endpoint)
        .header("accept", "application/vnd.github+json")
        .build()?;

    let call = client.new_call(request);
    let response = call.execute()?;
    if !response.is_success() {
        anyhow::bail!("unexpected status {}", response.status());
    }

    let mut contributors: Vec<Contributor> = response.json()?;
    contributors.sort_by(|a, b| b.contributions.cmp(&a.contributions));

    for contributor in &contributors {
        println!(
            "{}: {}: {}",
            contributor.login,
            contributor.contributions,
            contributor.avatar_url.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
