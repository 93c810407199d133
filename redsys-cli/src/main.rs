//! `redsys` command: sign and verify Redsys redirect parameters from the shell.
//!
//!   sign   → build the three form fields for a payment request
//!   verify → check a gateway notification and print its parameters
//!   decode → show a payload without checking any signature
//!   derive → print the per-order HMAC key

mod observability;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use redsys_signer::{
    Gateway, GatewayConfig, ParameterMapping,
    gateway::{NotificationParams, PaymentOutcome, PaymentRequest},
};
use serde_json::json;
use tracing::{info, warn};

use crate::observability::{LogFormat, default_level, init_observability};

#[derive(Parser)]
#[command(name = "redsys", version, about = "Sign and verify Redsys redirect parameters")]
struct Cli {
    /// Gateway configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base64 merchant key; overrides the key in `--config`.
    #[arg(long, global = true, env = "REDSYS_MERCHANT_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Log output format (defaults to `LOG_FORMAT`, then pretty).
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Sign a payment request read as JSON from a file or stdin.
    Sign {
        /// Input file; `-` or absent reads stdin.
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Treat the input as raw `DS_MERCHANT_*` parameters instead of a request.
        #[arg(long)]
        raw: bool,
    },
    /// Verify a notification; exits with status 1 if the signature does not match.
    Verify {
        /// `Ds_MerchantParameters` value.
        #[arg(long, requires = "signature", conflicts_with = "input")]
        params: Option<String>,

        /// `Ds_Signature` value.
        #[arg(long, requires = "params")]
        signature: Option<String>,

        /// Notification JSON with the three `Ds_*` fields; `-` reads stdin.
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Decode a payload without verifying it.
    Decode {
        /// `Ds_MerchantParameters` value.
        payload: String,
    },
    /// Print the base64 HMAC key derived for an order.
    Derive {
        /// Order reference.
        order: String,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GatewayConfig>> {
    path.map(|path| {
        GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    })
    .transpose()
}

fn resolve_gateway(key: Option<&str>, config: Option<&GatewayConfig>) -> anyhow::Result<Gateway> {
    match (key, config) {
        (Some(key), _) => Gateway::new(key).context("invalid merchant key"),
        (None, Some(config)) => Gateway::from_config(config).context("invalid configured key"),
        (None, None) => bail!("no merchant key: pass --key, set REDSYS_MERCHANT_KEY or use --config"),
    }
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn sign(
    gateway: &Gateway,
    config: Option<&GatewayConfig>,
    input: &str,
    raw: bool,
) -> anyhow::Result<NotificationParams> {
    if raw {
        let params: ParameterMapping =
            serde_json::from_str(input).context("input is not a JSON object")?;
        return Ok(gateway.sign_parameters(&params)?);
    }

    let mut request: PaymentRequest =
        serde_json::from_str(input).context("input is not a valid payment request")?;
    if let Some(config) = config {
        request = request.with_defaults(config);
    }
    Ok(gateway.make_payment_parameters(&request)?)
}

fn verify(gateway: &Gateway, notification: &NotificationParams) -> anyhow::Result<Option<ParameterMapping>> {
    Ok(gateway.check_response(notification)?)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let format = cli.log_format.unwrap_or_else(LogFormat::from_env);
    init_observability(format, default_level(cli.verbose));

    let config = load_config(cli.config.as_deref())?;
    let key = cli.key.as_deref();

    match cli.command {
        Cmd::Sign { input, raw } => {
            let gateway = resolve_gateway(key, config.as_ref())?;
            let input = read_input(input.as_deref())?;
            let signed = sign(&gateway, config.as_ref(), &input, raw)?;
            info!("request signed");
            print_json(&signed)?;
        }

        Cmd::Verify { params, signature, input } => {
            let gateway = resolve_gateway(key, config.as_ref())?;
            let notification = match (params, signature) {
                (Some(merchant_parameters), Some(signature)) => NotificationParams {
                    signature_version: redsys_signer::crypto::SIGNATURE_VERSION.to_owned(),
                    merchant_parameters,
                    signature,
                },
                _ => serde_json::from_str(&read_input(input.as_deref())?)
                    .context("input is not a notification JSON object")?,
            };

            let Some(decoded) = verify(&gateway, &notification)? else {
                warn!("notification signature rejected");
                eprintln!("signature mismatch");
                return Ok(ExitCode::FAILURE);
            };

            let outcome = PaymentOutcome::from_params(&decoded).ok();
            print_json(&json!({
                "authorized": outcome.map(|o| o.is_authorized()),
                "response_code": outcome.map(|o| o.code()),
                "parameters": decoded,
            }))?;
        }

        Cmd::Decode { payload } => {
            let decoded = redsys_signer::crypto::decode(&payload)?;
            print_json(&decoded)?;
        }

        Cmd::Derive { order } => {
            let gateway = resolve_gateway(key, config.as_ref())?;
            println!("{}", gateway.encrypt(&order)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
