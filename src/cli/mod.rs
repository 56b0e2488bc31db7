pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shopping-list-api")]
#[command(about = "Shopping List API - shared lists, items and invites")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Mint a session token signed with the configured secret")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Token(args)) => commands::token::handle(args, output_format),
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_command() {
        let cli = Cli::try_parse_from([
            "shopping-list-api",
            "--json",
            "token",
            "--subject",
            "user1",
            "--role",
            "Administrator",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Some(Commands::Token(args)) => {
                assert_eq!(args.subject, "user1");
                assert_eq!(args.role, vec!["Administrator".to_string()]);
            }
            _ => panic!("expected token command"),
        }
    }

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["shopping-list-api"]).unwrap();
        assert!(cli.command.is_none());
    }
}
