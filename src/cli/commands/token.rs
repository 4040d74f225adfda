use clap::Args;
use serde_json::json;

use crate::auth::TokenIssuer;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) the token is issued to")]
    pub subject: String,

    #[arg(long, default_value = "", help = "Display name embedded in the token")]
    pub name: String,

    #[arg(long, help = "Grant admin privileges")]
    pub admin: bool,
}

pub fn handle(
    args: TokenArgs,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    config.validate()?;

    let issuer = TokenIssuer::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
    let token = issuer.issue(&args.subject, &args.name, args.admin)?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            &output_format,
            "Token issued",
            Some(json!({
                "token": token,
                "subject": args.subject,
                "is_admin": args.admin,
                "expires_in_hours": config.security.jwt_expiry_hours,
            })),
        )?,
    }
    Ok(())
}
