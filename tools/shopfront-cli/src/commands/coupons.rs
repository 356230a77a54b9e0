//! List the active coupon table.

use anyhow::Result;
use serde::Serialize;

use crate::context::Context;

#[derive(Serialize)]
struct CouponEntry<'a> {
    code: &'a str,
    discount_percent: u8,
}

/// Run the coupons command.
pub async fn run(ctx: &Context) -> Result<()> {
    let entries: Vec<CouponEntry<'_>> = ctx
        .config
        .pricing
        .coupons
        .entries()
        .map(|(code, discount_percent)| CouponEntry {
            code,
            discount_percent,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    ctx.output.header("Coupons");
    if entries.is_empty() {
        ctx.output.info("No coupon codes configured");
        return Ok(());
    }

    ctx.output.table_row(&["CODE", "DISCOUNT"], &[16, 8]);
    for entry in &entries {
        let discount = format!("{}%", entry.discount_percent);
        ctx.output
            .table_row(&[entry.code, discount.as_str()], &[16, 8]);
    }

    Ok(())
}
