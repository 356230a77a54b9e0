//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shopfront_api::ApiConfig;
use shopfront_commerce::pricing::PricingPolicy;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront API connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Tax, shipping and coupon settings.
    #[serde(default)]
    pub pricing: PricingPolicy,
}

impl CliConfig {
    /// Load and validate config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content, is_json(path))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .pricing
            .validate()
            .with_context(|| format!("Invalid pricing policy in {}", path.display()))?;
        Ok(config)
    }

    fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Copy safe to print: the API token is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(token) = &mut config.api.token {
            *token = mask(token);
        }
        config
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopfront_commerce::checkout::ShippingMethod;
    use shopfront_commerce::pricing::TaxBasis;

    const CONFIG: &str = r#"
[api]
base_url = "https://shop.example.com/api"
token = "eyJhbGciOiJIUzI1NiJ9"

[pricing]
currency = "USD"
tax_rate = 0.07
tax_basis = "discounted_subtotal"

[[pricing.shipping]]
method = "standard"
price = 5.99
free_over = 75

[[pricing.shipping]]
method = "express"
price = 12.5

[[pricing.shipping]]
method = "overnight"
price = 24

[pricing.coupons]
SPRING15 = 15
"#;

    #[test]
    fn test_parse_toml() {
        let config = CliConfig::parse(CONFIG, false).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.pricing.tax_rate, dec!(0.07));
        assert_eq!(config.pricing.tax_basis, TaxBasis::DiscountedSubtotal);
        let standard = config.pricing.rate(ShippingMethod::Standard).unwrap();
        assert_eq!(standard.price, dec!(5.99));
        assert_eq!(standard.free_over, Some(dec!(75)));
        assert_eq!(config.pricing.coupons.resolve("spring15").unwrap().discount_percent, 15);
        config.pricing.validate().unwrap();
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::parse("", false).unwrap();
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.pricing, PricingPolicy::default());

        let config = CliConfig::parse("{}", true).unwrap();
        assert_eq!(config.pricing, PricingPolicy::default());
    }

    #[test]
    fn test_redacted_masks_token() {
        let config = CliConfig::parse(CONFIG, false).unwrap().redacted();
        assert_eq!(config.api.token.as_deref(), Some("****NiJ9"));
        assert_eq!(mask("abc"), "****");
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Path::new("shopfront.json")));
        assert!(!is_json(Path::new("shopfront.toml")));
        assert!(!is_json(Path::new(".shopfront.toml")));
    }
}
