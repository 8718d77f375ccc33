//! Codificación ABI de llamadas a funciones del contrato.
//!
//! Sólo los tipos que usa el ledger: `string`, `uintN`, `address`, `bool`.
//! La firma de cada función se deriva de la entrada correspondiente del ABI
//! (nombre + tipos de entrada), no de strings escritos a mano.
use ledger_core::{InterfaceSchema, ServiceError};
use serde_json::Value;
use sha3::{Digest, Keccak256};
use thiserror::Error;

const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    String(String),
    Uint(u64),
    Address(String),
    Bool(bool),
}

impl Token {
    fn accepts(&self, abi_type: &str) -> bool {
        match self {
            Token::String(_) => abi_type == "string",
            Token::Uint(_) => abi_type.starts_with("uint"),
            Token::Address(_) => abi_type == "address",
            Token::Bool(_) => abi_type == "bool",
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Token::String(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("function '{0}' not present in interface schema")]
    UnknownFunction(String),
    #[error("function '{function}' takes {expected} arguments, got {got}")]
    ArityMismatch { function: String, expected: usize, got: usize },
    #[error("argument {index} of '{function}' is not a {expected}")]
    TypeMismatch { function: String, index: usize, expected: String },
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid hex data: {0}")]
    InvalidHex(String),
    #[error("return value does not fit in u64")]
    Overflow,
    #[error("return data too short: {0} bytes")]
    ShortOutput(usize),
}

impl From<AbiError> for ServiceError {
    fn from(e: AbiError) -> Self {
        match e {
            AbiError::UnknownFunction(name) => ServiceError::UnknownOperation(name),
            other => ServiceError::Decode(other.to_string()),
        }
    }
}

/// Primeros 4 bytes de keccak256(firma).
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

fn find_function<'a>(schema: &'a InterfaceSchema, name: &str) -> Result<&'a Value, AbiError> {
    schema.operation(name)
          .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
}

fn input_types(entry: &Value) -> Vec<String> {
    entry.get("inputs")
         .and_then(Value::as_array)
         .map(|inputs| {
             inputs.iter()
                   .filter_map(|i| i.get("type").and_then(Value::as_str))
                   .map(str::to_string)
                   .collect()
         })
         .unwrap_or_default()
}

/// `name(type1,type2,...)` tal como aparece en el ABI.
pub fn function_signature(schema: &InterfaceSchema, name: &str) -> Result<String, AbiError> {
    let entry = find_function(schema, name)?;
    Ok(format!("{name}({})", input_types(entry).join(",")))
}

/// Selector + argumentos codificados, validando aridad y tipos contra el ABI.
pub fn encode_call(schema: &InterfaceSchema, name: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
    let entry = find_function(schema, name)?;
    let types = input_types(entry);
    if types.len() != args.len() {
        return Err(AbiError::ArityMismatch { function: name.to_string(),
                                             expected: types.len(),
                                             got: args.len() });
    }
    if let Some((index, ty)) = types.iter().enumerate().find(|(i, ty)| !args[*i].accepts(ty)) {
        return Err(AbiError::TypeMismatch { function: name.to_string(),
                                            index,
                                            expected: ty.clone() });
    }

    let signature = format!("{name}({})", types.join(","));
    let mut out = selector(&signature).to_vec();
    out.extend(encode(args)?);
    Ok(out)
}

/// Codificación head/tail de una tupla de argumentos.
pub fn encode(tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend(uint_word((head_len + tail.len()) as u64));
        }
        match token {
            Token::String(s) => {
                tail.extend(uint_word(s.len() as u64));
                tail.extend(padded(s.as_bytes()));
            }
            Token::Uint(v) => head.extend(uint_word(*v)),
            Token::Address(a) => head.extend(address_word(a)?),
            Token::Bool(b) => head.extend(uint_word(u64::from(*b))),
        }
    }

    head.extend(tail);
    Ok(head)
}

fn uint_word(v: u64) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[WORD - 8..].copy_from_slice(&v.to_be_bytes());
    w
}

fn address_word(address: &str) -> Result<[u8; WORD], AbiError> {
    let raw = strip_0x(address);
    let bytes = hex::decode(raw).map_err(|_| AbiError::InvalidAddress(address.to_string()))?;
    if bytes.len() != 20 {
        return Err(AbiError::InvalidAddress(address.to_string()));
    }
    let mut w = [0u8; WORD];
    w[WORD - 20..].copy_from_slice(&bytes);
    Ok(w)
}

fn padded(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    let rem = out.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + WORD - rem, 0);
    }
    out
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn from_hex(s: &str) -> Result<Vec<u8>, AbiError> {
    hex::decode(strip_0x(s)).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

/// Decodifica el primer word de la salida de `eth_call` como u64.
pub fn decode_uint(output: &str) -> Result<u64, AbiError> {
    let bytes = from_hex(output)?;
    if bytes.len() < WORD {
        return Err(AbiError::ShortOutput(bytes.len()));
    }
    let word = &bytes[..WORD];
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(buf))
}

/// Cantidad hexadecimal de JSON-RPC (`0x1a`) a u64.
pub fn parse_quantity(q: &str) -> Result<u64, AbiError> {
    let digits = strip_0x(q);
    if digits.is_empty() {
        return Err(AbiError::InvalidHex(q.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| AbiError::InvalidHex(q.to_string()))
}
