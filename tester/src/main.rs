use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:1111")]
    base: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a donation, optionally bound to a project
    Donate {
        amount: f64,

        #[arg(long)]
        donor: Option<String>,

        #[arg(long)]
        message: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },
    /// Fetch the donor leaderboard
    Leaderboard,
    /// Fetch the project cards
    Projects,
    /// Fetch the payment link for an amount
    Link { amount: f64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();

    match args.command {
        Command::Donate {
            amount,
            donor,
            message,
            project,
        } => {
            let url = match &project {
                Some(project) => format!("{}/projects/{}/donate", args.base, project),
                None => format!("{}/donate", args.base),
            };

            let payload = json!({
                "amount": amount,
                "donor": donor,
                "message": message,
            });

            let response = client.post(url).json(&payload).send().await?;

            println!("Status: {}", response.status());
            println!("{}", response.text().await?);
        }
        Command::Leaderboard => {
            let response = client.get(format!("{}/leaderboard", args.base)).send().await?;
            println!("{}", response.text().await?);
        }
        Command::Projects => {
            let response = client.get(format!("{}/projects", args.base)).send().await?;
            println!("{}", response.text().await?);
        }
        Command::Link { amount } => {
            let response = client
                .get(format!("{}/donate/link?amount={}", args.base, amount))
                .send()
                .await?;
            println!("{}", response.text().await?);
        }
    }

    Ok(())
}
