//! Supplier price-list import.
//!
//! Shops deliver their catalog as a YAML document, either inline or by URL:
//!
//! ```yaml
//! shop: Connect
//! categories:
//!   - id: 224
//!     name: Smartphones
//! goods:
//!   - id: 4216292
//!     category: 224
//!     model: apple/iphone/xs-max
//!     name: Smartphone Apple iPhone XS Max 512GB (gold)
//!     price: 110000
//!     price_rrc: 116990
//!     quantity: 14
//!     parameters:
//!       "Display (inch)": 6.5
//!       "Color": gold
//! ```
//!
//! Importing replaces every listing the shop had and upserts the shared
//! product and category rows, in one transaction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors from parsing or fetching a price list.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not valid YAML or does not match the schema.
    #[error("invalid price list: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The price-list URL is malformed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Fetching the price list by URL failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The document parsed but violates a schema constraint.
    #[error("invalid price list: {0}")]
    Invalid(String),
}

/// A parsed supplier price list.
#[derive(Debug, Deserialize)]
pub struct PriceList {
    pub shop: String,
    pub categories: Vec<PriceListCategory>,
    pub goods: Vec<PriceListGood>,
}

#[derive(Debug, Deserialize)]
pub struct PriceListCategory {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceListGood {
    /// The supplier's own article id, stored as `external_id`.
    pub id: i32,
    /// References a category id from the same document.
    pub category: i32,
    #[serde(default)]
    pub model: String,
    pub name: String,
    pub price: Decimal,
    pub price_rrc: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

/// Parameter values arrive as strings, numbers, or booleans; all are
/// stored as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Parse and validate a YAML price list.
///
/// # Errors
///
/// Returns `ImportError::Parse` for malformed YAML and
/// `ImportError::Invalid` for schema violations (negative stock, goods
/// referencing undeclared categories, blank shop name).
pub fn parse_price_list(yaml: &str) -> Result<PriceList, ImportError> {
    let list: PriceList = serde_yaml::from_str(yaml)?;

    if list.shop.trim().is_empty() {
        return Err(ImportError::Invalid("shop name is empty".to_owned()));
    }

    let category_ids: Vec<i32> = list.categories.iter().map(|c| c.id).collect();
    for good in &list.goods {
        if !category_ids.contains(&good.category) {
            return Err(ImportError::Invalid(format!(
                "good {} references undeclared category {}",
                good.id, good.category
            )));
        }
        if good.quantity < 0 {
            return Err(ImportError::Invalid(format!(
                "good {} has negative quantity",
                good.id
            )));
        }
        if good.price.is_sign_negative() || good.price_rrc.is_sign_negative() {
            return Err(ImportError::Invalid(format!(
                "good {} has a negative price",
                good.id
            )));
        }
    }

    Ok(list)
}

/// Fetch a price list from a URL and parse it.
///
/// # Errors
///
/// Returns `ImportError::InvalidUrl` for malformed URLs, `ImportError::Fetch`
/// for transport failures, and the `parse_price_list` errors otherwise.
pub async fn fetch_price_list(raw_url: &str) -> Result<PriceList, ImportError> {
    let url = Url::parse(raw_url)?;
    let body = reqwest::get(url).await?.error_for_status()?.text().await?;
    parse_price_list(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
shop: Connect
categories:
  - id: 224
    name: Smartphones
  - id: 15
    name: Accessories
goods:
  - id: 4216292
    category: 224
    model: apple/iphone/xs-max
    name: Smartphone Apple iPhone XS Max 512GB (gold)
    price: 110000
    price_rrc: 116990
    quantity: 14
    parameters:
      "Display (inch)": 6.5
      "Memory (GB)": 512
      "Color": gold
"#;

    #[test]
    fn test_parse_sample() {
        let list = parse_price_list(SAMPLE).expect("parse");
        assert_eq!(list.shop, "Connect");
        assert_eq!(list.categories.len(), 2);
        assert_eq!(list.goods.len(), 1);

        let good = list.goods.first().expect("one good");
        assert_eq!(good.id, 4_216_292);
        assert_eq!(good.category, 224);
        assert_eq!(good.quantity, 14);
        assert_eq!(good.price, Decimal::from(110_000));
        assert_eq!(good.parameters.len(), 3);
        assert_eq!(
            good.parameters.get("Color").map(ToString::to_string),
            Some("gold".to_owned())
        );
        assert_eq!(
            good.parameters.get("Memory (GB)").map(ToString::to_string),
            Some("512".to_owned())
        );
    }

    #[test]
    fn test_parse_rejects_malformed_yaml() {
        assert!(matches!(
            parse_price_list("shop: [unclosed"),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_undeclared_category() {
        let yaml = r"
shop: Connect
categories:
  - id: 1
    name: A
goods:
  - id: 10
    category: 2
    name: Thing
    price: 5
    price_rrc: 6
    quantity: 1
";
        assert!(matches!(
            parse_price_list(yaml),
            Err(ImportError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative_quantity() {
        let yaml = r"
shop: Connect
categories:
  - id: 1
    name: A
goods:
  - id: 10
    category: 1
    name: Thing
    price: 5
    price_rrc: 6
    quantity: -3
";
        assert!(matches!(
            parse_price_list(yaml),
            Err(ImportError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_blank_shop() {
        let yaml = r"
shop: '  '
categories: []
goods: []
";
        assert!(matches!(
            parse_price_list(yaml),
            Err(ImportError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_parameters_defaults_empty() {
        let yaml = r"
shop: Connect
categories:
  - id: 1
    name: A
goods:
  - id: 10
    category: 1
    name: Thing
    price: 5.50
    price_rrc: 6
    quantity: 3
";
        let list = parse_price_list(yaml).expect("parse");
        let good = list.goods.first().expect("one good");
        assert!(good.parameters.is_empty());
        assert_eq!(good.model, "");
        assert_eq!(good.price, Decimal::new(55, 1));
    }
}
