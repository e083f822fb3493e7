use std::io::Write;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "actuator-cli")]
#[command(about = "Client for actuator endpoints", long_about = None)]
struct Cli {
    /// Base URL of the actuator endpoints.
    #[arg(short, long, default_value = "http://localhost:8000/pyctuator")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show aggregate health
    Health,
    /// Show application info
    Info,
    /// List recorded HTTP traces
    Traces,
    /// Print the log tail
    Logfile {
        /// Bytes to fetch from the end on the first request
        #[arg(long, default_value_t = 64 * 1024)]
        tail: u64,

        /// Keep polling for new output
        #[arg(short, long)]
        follow: bool,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Info => {
            let res = client.get(format!("{}/info", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Traces => {
            let res = client.get(format!("{}/httptrace", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Logfile { tail, follow, interval_ms } => {
            let url = format!("{}/logfile", base);
            let mut offset = match fetch_log(&client, &url, &format!("bytes=-{}", tail)).await? {
                Fetch::Next(next) => next,
                Fetch::Unsatisfiable(_) => 0,
            };
            while follow {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                match fetch_log(&client, &url, &format!("bytes={}-", offset)).await? {
                    Fetch::Next(next) => offset = next,
                    // Our offset scrolled out of the buffer: take what is left after it.
                    Fetch::Unsatisfiable(Some(total)) if total > offset => {
                        if let Fetch::Next(next) =
                            fetch_log(&client, &url, &format!("bytes=-{}", total - offset)).await?
                        {
                            offset = next;
                        }
                    }
                    // The server restarted with a shorter stream.
                    Fetch::Unsatisfiable(Some(total)) if total < offset => offset = 0,
                    Fetch::Unsatisfiable(_) => {}
                }
            }
        }
    }

    Ok(())
}

enum Fetch {
    /// Bytes were printed; the offset following them.
    Next(u64),
    /// 416, with the stream length the server reported.
    Unsatisfiable(Option<u64>),
}

/// Print the requested log bytes.
async fn fetch_log(
    client: &reqwest::Client,
    url: &str,
    range: &str,
) -> Result<Fetch, Box<dyn std::error::Error>> {
    let res = client.get(url).header(RANGE, range).send().await?;
    let status = res.status();
    let content_range = res
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if status == StatusCode::RANGE_NOT_SATISFIABLE {
        let total = content_range
            .as_deref()
            .and_then(|v| v.strip_prefix("bytes */"))
            .and_then(|v| v.parse().ok());
        return Ok(Fetch::Unsatisfiable(total));
    }
    if !status.is_success() {
        return Err(format!("logfile endpoint returned status {}", status).into());
    }

    let next_offset = content_range.as_deref().and_then(end_of_content_range);
    let body = res.bytes().await?;
    let mut stdout = std::io::stdout();
    stdout.write_all(&body)?;
    stdout.flush()?;

    // A 200 carries the whole stream.
    Ok(Fetch::Next(next_offset.unwrap_or(body.len() as u64)))
}

/// `bytes 5-10/20` → 11
fn end_of_content_range(value: &str) -> Option<u64> {
    let range = value.strip_prefix("bytes ")?.split('/').next()?;
    let (_, end) = range.split_once('-')?;
    end.parse::<u64>().ok().map(|end| end + 1)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: actuator returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
