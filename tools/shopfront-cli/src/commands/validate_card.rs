//! Format and validate card input.

use anyhow::{bail, Result};
use serde::Serialize;
use shopfront_commerce::checkout::{CardDetails, ValidationErrors};

use super::ValidateCardArgs;
use crate::context::Context;
use crate::output::status_badge;

#[derive(Serialize)]
struct CardReport<'a> {
    valid: bool,
    number: &'a str,
    name: &'a str,
    expiry: &'a str,
    errors: &'a ValidationErrors,
}

/// Run the validate-card command. Fails when any field is invalid.
pub async fn run(args: ValidateCardArgs, ctx: &Context) -> Result<()> {
    let card = CardDetails::new(&args.number, args.name, &args.expiry, &args.cvv);
    let errors = card.validate();

    if ctx.output.is_json() {
        ctx.output.json(&CardReport {
            valid: errors.is_empty(),
            number: card.number(),
            name: &card.name,
            expiry: card.expiry(),
            errors: &errors,
        });
    } else {
        ctx.output.header("Card");
        ctx.output.kv("number", card.number());
        ctx.output.kv("name", &card.name);
        ctx.output.kv("expiry", card.expiry());
        ctx.output.kv("status", &status_badge(errors.is_empty()));
        for (field, message) in errors.iter() {
            ctx.output.warn(&format!("{}: {}", field.as_str(), message));
        }
    }

    if errors.is_empty() {
        if let Some(last_four) = card.last_four() {
            ctx.output.success(&format!("Card ending in {} is valid", last_four));
        }
        Ok(())
    } else {
        bail!("{} invalid field(s)", errors.len())
    }
}
