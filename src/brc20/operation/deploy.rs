use serde::{Deserialize, Serialize};

/// A `deploy` payload, fields as inscribed. Numeric validation happens in
/// the interpreter against the tick's decimals.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Deploy {
  #[serde(rename = "tick")]
  pub tick: String,
  #[serde(rename = "max")]
  pub max_supply: String,
  #[serde(rename = "lim", skip_serializing_if = "Option::is_none")]
  pub mint_limit: Option<String>,
  #[serde(rename = "dec", skip_serializing_if = "Option::is_none")]
  pub decimals: Option<String>,
}
