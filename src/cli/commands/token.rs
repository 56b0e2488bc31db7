use anyhow::{bail, Context};
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, Role};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) the token is issued for")]
    pub subject: String,

    #[arg(long, help = "Role to grant; repeat for several (default: User)")]
    pub role: Vec<String>,

    #[arg(long, help = "Display name")]
    pub name: Option<String>,

    #[arg(long, help = "Email address")]
    pub email: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let roles = parse_roles(&args.role)?;
    let security = &config().security;

    let claims = Claims::new(&args.subject, &roles, security.jwt_expiry_hours)
        .with_profile(args.name, args.email, None)
        .with_provider("cli");
    let token = generate_jwt(&claims, &security.jwt_secret).context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "subject": args.subject, "expiresAt": claims.exp })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}

fn parse_roles(raw: &[String]) -> anyhow::Result<Vec<Role>> {
    if raw.is_empty() {
        return Ok(vec![Role::User]);
    }
    raw.iter()
        .map(|name| match Role::parse(name) {
            Some(role) => Ok(role),
            None => bail!("unknown role '{}' (expected User or Administrator)", name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_user_role() {
        assert_eq!(parse_roles(&[]).unwrap(), vec![Role::User]);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(parse_roles(&["Wizard".to_string()]).is_err());
        assert_eq!(
            parse_roles(&["Administrator".to_string()]).unwrap(),
            vec![Role::Administrator]
        );
    }
}
