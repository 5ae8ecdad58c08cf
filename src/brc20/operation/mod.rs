mod deploy;
mod mint;
mod transfer;

pub use self::{deploy::Deploy, mint::Mint, transfer::Transfer};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::JSONError;

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(tag = "op")]
pub enum Operation {
  #[serde(rename = "deploy")]
  Deploy(Deploy),
  #[serde(rename = "mint")]
  Mint(Mint),
  #[serde(rename = "transfer")]
  Transfer(Transfer),
}

impl Operation {
  /// The raw tick as inscribed, before normalization.
  pub fn tick(&self) -> &str {
    match self {
      Operation::Deploy(deploy) => &deploy.tick,
      Operation::Mint(mint) => &mint.tick,
      Operation::Transfer(transfer) => &transfer.tick,
    }
  }
}

/// Decodes an inscription body as a BRC-20 operation.
///
/// The payload must be a flat JSON object. A non-string value drops that
/// key alone and the rest of the record still decodes; the record only
/// fails when a field the operation needs is missing or malformed.
/// Duplicate keys keep the last occurrence.
pub fn deserialize_brc20(content: &[u8]) -> Result<Operation, JSONError> {
  let value: Value = serde_json::from_slice(content).map_err(|_| JSONError::InvalidJson)?;
  let Value::Object(object) = value else {
    return Err(JSONError::InvalidJson);
  };
  let fields: Map<String, Value> = object
    .into_iter()
    .filter(|(_, field)| field.is_string())
    .collect();
  serde_json::from_value(Value::Object(fields))
    .map_err(|e| JSONError::ParseOperationJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deploy_deserialize() {
    let json_str = r##"{"p":"brc-20","op":"deploy","tick":"ordi","max":"21000000","lim":"1000"}"##;
    assert_eq!(
      deserialize_brc20(json_str.as_bytes()).unwrap(),
      Operation::Deploy(Deploy {
        tick: "ordi".to_string(),
        max_supply: "21000000".to_string(),
        mint_limit: Some("1000".to_string()),
        decimals: None,
      })
    );
  }

  #[test]
  fn test_mint_deserialize() {
    let json_str = r##"{"op":"mint","tick":"ordi","amt":"1000"}"##;
    assert_eq!(
      deserialize_brc20(json_str.as_bytes()).unwrap(),
      Operation::Mint(Mint {
        tick: "ordi".to_string(),
        amount: "1000".to_string(),
      })
    );
  }

  #[test]
  fn test_transfer_deserialize() {
    let json_str = r##"{"op":"transfer","tick":"ordi","amt":"100"}"##;
    assert_eq!(
      deserialize_brc20(json_str.as_bytes()).unwrap(),
      Operation::Transfer(Transfer {
        tick: "ordi".to_string(),
        amount: "100".to_string(),
      })
    );
  }

  #[test]
  fn test_missing_required_field() {
    assert!(deserialize_brc20(br##"{"op":"deploy","tick":"ordi"}"##).is_err());
    assert!(deserialize_brc20(br##"{"op":"mint","tick":"ordi"}"##).is_err());
    assert!(deserialize_brc20(br##"{"op":"transfer","amt":"1"}"##).is_err());
    assert!(deserialize_brc20(br##"{"tick":"ordi","amt":"1"}"##).is_err());
  }

  #[test]
  fn test_unknown_op_rejected() {
    assert!(deserialize_brc20(br##"{"op":"burn","tick":"ordi","amt":"1"}"##).is_err());
  }

  #[test]
  fn test_json_duplicate_field_keeps_last() {
    let json_str = r##"{"op":"mint","tick":"smol","amt":"333","amt":"33"}"##;
    assert_eq!(
      deserialize_brc20(json_str.as_bytes()).unwrap(),
      Operation::Mint(Mint {
        tick: "smol".to_string(),
        amount: "33".to_string(),
      })
    );
  }

  #[test]
  fn test_json_non_string_value_drops_only_that_field() {
    // an irrelevant non-string field does not invalidate the record.
    assert_eq!(
      deserialize_brc20(br##"{"op":"mint","tick":"smol","amt":"33","x":1}"##).unwrap(),
      Operation::Mint(Mint {
        tick: "smol".to_string(),
        amount: "33".to_string(),
      })
    );
    // a required field with a non-string value is simply absent.
    assert!(deserialize_brc20(br##"{"op":"mint","tick":"smol","amt":33}"##).is_err());
    assert!(deserialize_brc20(br##"{"op":1,"tick":"smol","amt":"33"}"##).is_err());
  }

  #[test]
  fn test_non_object_rejected() {
    assert_eq!(
      deserialize_brc20(br##"["op","mint"]"##).unwrap_err(),
      JSONError::InvalidJson
    );
    assert_eq!(
      deserialize_brc20(b"not json").unwrap_err(),
      JSONError::InvalidJson
    );
  }
}
