//! Output formatting for the CLI.

use console::style;
use shopfront_commerce::pricing::PricingBreakdown;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print an already rounded breakdown as an aligned summary.
    pub fn breakdown(&self, quote: &PricingBreakdown) {
        if self.json {
            return;
        }
        for (label, value) in breakdown_rows(quote) {
            self.table_row(&[label.as_str(), value.as_str()], &[24, 12]);
        }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Label/amount rows for a breakdown, total last.
pub fn breakdown_rows(quote: &PricingBreakdown) -> Vec<(String, String)> {
    let mut rows = vec![(
        format!("Subtotal ({} items)", quote.item_count),
        quote.subtotal.display(),
    )];
    if quote.has_discount() {
        let label = match &quote.coupon_code {
            Some(code) => format!("Discount ({})", code),
            None => "Discount".to_string(),
        };
        rows.push((label, format!("-{}", quote.discount.display())));
    }
    let shipping = if quote.has_free_shipping() {
        "FREE".to_string()
    } else {
        quote.shipping.display()
    };
    rows.push((
        format!("Shipping ({})", quote.shipping_method),
        shipping,
    ));
    rows.push(("Tax".to_string(), quote.tax.display()));
    rows.push(("Total".to_string(), quote.total.display()));
    rows
}

/// Status badge for pass/fail results.
pub fn status_badge(ok: bool) -> String {
    if ok {
        style("valid").green().to_string()
    } else {
        style("invalid").red().to_string()
    }
}
