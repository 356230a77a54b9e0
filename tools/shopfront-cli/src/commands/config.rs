//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::CliConfig;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.config.redacted();

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    // API section
    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    if let Some(ref token) = config.api.token {
        ctx.output.kv("token", token);
    }
    if let Some(secs) = config.api.timeout_secs {
        ctx.output.kv("timeout_secs", &secs.to_string());
    }

    // Pricing section
    let pricing = &config.pricing;
    ctx.output.info("");
    ctx.output.info("[pricing]");
    ctx.output.kv("currency", pricing.currency.code());
    ctx.output.kv("tax_rate", &pricing.tax_rate.to_string());
    ctx.output.kv("tax_basis", &format!("{:?}", pricing.tax_basis));

    for rate in &pricing.shipping {
        let price = shopfront_commerce::Money::new(rate.price, pricing.currency);
        let line = match rate.free_over {
            Some(threshold) => format!(
                "{} ({}), free over {}",
                price,
                rate.method.delivery_estimate(),
                shopfront_commerce::Money::new(threshold, pricing.currency)
            ),
            None => format!("{} ({})", price, rate.method.delivery_estimate()),
        };
        ctx.output.kv(rate.method.as_str(), &line);
    }

    // Coupons
    ctx.output.info("");
    ctx.output.info("Coupons:");
    for (code, percent) in pricing.coupons.entries() {
        ctx.output.list_item(&format!("{} ({}% off)", code, percent));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join(CONFIG_NAMES[0]);
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    CliConfig::default().save(&path)?;
    ctx.output
        .success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
