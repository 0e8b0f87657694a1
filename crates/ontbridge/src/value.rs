use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DapiError;

/// Primitive type tag attached to every smart-contract argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ArgType {
    Boolean,
    Integer,
    ByteArray,
    String,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::ByteArray => "ByteArray",
            Self::String => "String",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArgType {
    type Err = DapiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Boolean" => Ok(Self::Boolean),
            "Integer" => Ok(Self::Integer),
            "ByteArray" => Ok(Self::ByteArray),
            "String" => Ok(Self::String),
            other => Err(DapiError::UnsupportedArgType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ArgType {
    type Error = DapiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Argument as the dApp supplies it: a type tag and the raw string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeArg {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    pub value: String,
}

impl InvokeArg {
    pub fn new(arg_type: ArgType, value: impl Into<String>) -> Self {
        Self {
            arg_type,
            value: value.into(),
        }
    }
}

/// Argument after conversion to the desktop extension's native value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedArg {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    pub value: Value,
}

/// Lowercase hex of the UTF-8 bytes, the extension's `strToHex`.
pub fn str_to_hex(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Converts a raw argument into the value the desktop extension expects.
///
/// `String` arguments go through `hex_encoder` so a provider can substitute its
/// own encoding. `Boolean` accepts only `true`/`false`/`1`/`0`/empty
/// (case-insensitive); any other text is [`DapiError::InvalidArgValue`], not
/// `true`.
pub fn convert_value<F>(value: &str, arg_type: ArgType, hex_encoder: F) -> Result<Value, DapiError>
where
    F: FnOnce(&str) -> String,
{
    match arg_type {
        ArgType::Boolean => parse_boolean(value).map(Value::Bool),
        ArgType::Integer => parse_number(value).map(Value::Number),
        ArgType::ByteArray => Ok(Value::String(value.to_string())),
        ArgType::String => Ok(Value::String(hex_encoder(value))),
    }
}

fn parse_boolean(value: &str) -> Result<bool, DapiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(DapiError::InvalidArgValue {
            arg_type: ArgType::Boolean,
            value: value.to_string(),
        }),
    }
}

fn parse_number(value: &str) -> Result<serde_json::Number, DapiError> {
    let trimmed = value.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Ok(integer.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .ok_or_else(|| DapiError::InvalidArgValue {
            arg_type: ArgType::Integer,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{ArgType, InvokeArg, convert_value, str_to_hex};
    use crate::DapiError;

    fn convert(value: &str, arg_type: ArgType) -> Result<Value, DapiError> {
        convert_value(value, arg_type, str_to_hex)
    }

    #[test]
    fn integers_become_numbers() -> anyhow::Result<()> {
        assert_eq!(convert("5", ArgType::Integer)?, json!(5));
        assert_eq!(convert(" -42 ", ArgType::Integer)?, json!(-42));
        assert_eq!(convert("1.5", ArgType::Integer)?, json!(1.5));
        assert!(matches!(
            convert("five", ArgType::Integer),
            Err(DapiError::InvalidArgValue {
                arg_type: ArgType::Integer,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn booleans_parse_strictly() -> anyhow::Result<()> {
        assert_eq!(convert("true", ArgType::Boolean)?, json!(true));
        assert_eq!(convert("TRUE", ArgType::Boolean)?, json!(true));
        assert_eq!(convert("1", ArgType::Boolean)?, json!(true));
        assert_eq!(convert("false", ArgType::Boolean)?, json!(false));
        assert_eq!(convert("", ArgType::Boolean)?, json!(false));
        assert_eq!(convert("0", ArgType::Boolean)?, json!(false));
        assert!(matches!(
            convert("yes", ArgType::Boolean),
            Err(DapiError::InvalidArgValue {
                arg_type: ArgType::Boolean,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn byte_arrays_pass_through_unchanged() -> anyhow::Result<()> {
        let raw = "0xdeadbeef";
        assert_eq!(convert(raw, ArgType::ByteArray)?, json!(raw));
        Ok(())
    }

    #[test]
    fn strings_use_the_hex_encoder() -> anyhow::Result<()> {
        assert_eq!(convert("hello", ArgType::String)?, json!("68656c6c6f"));
        let custom = convert_value("hi", ArgType::String, |value| format!("<{value}>"))?;
        assert_eq!(custom, json!("<hi>"));
        Ok(())
    }

    #[test]
    fn unknown_type_tags_are_rejected() -> anyhow::Result<()> {
        assert!(matches!(
            "Hash160".parse::<ArgType>(),
            Err(DapiError::UnsupportedArgType(tag)) if tag == "Hash160"
        ));

        let parsed: InvokeArg = serde_json::from_value(json!({"type": "Integer", "value": "7"}))?;
        assert_eq!(parsed, InvokeArg::new(ArgType::Integer, "7"));
        let rejected = serde_json::from_value::<InvokeArg>(json!({"type": "Array", "value": "[]"}));
        assert!(rejected.is_err());
        Ok(())
    }

    #[test]
    fn invoke_args_serialize_with_type_tag() -> anyhow::Result<()> {
        let arg = InvokeArg::new(ArgType::ByteArray, "abcd");
        assert_eq!(
            serde_json::to_value(&arg)?,
            json!({"type": "ByteArray", "value": "abcd"})
        );
        Ok(())
    }
}
