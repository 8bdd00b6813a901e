//! Minimal Solidity ABI codec for the protocol contract.
//!
//! Covers the types the contract's settlement functions and events use:
//! `uint256`, `address`, `address[]` and `string`. Function selectors and
//! event topics are Keccak-256 hashes of the canonical signature.

use sha3::{Digest, Keccak256};

use crate::domain::Address;

const WORD: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("data truncated: need {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} token, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// First four bytes of the hashed function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `topics[0]` of a non-anonymous event.
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// Parameter types understood by [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Uint,
    Address,
    AddressArray,
    String,
}

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Big-endian `uint256`.
    Uint([u8; 32]),
    Address(Address),
    AddressArray(Vec<Address>),
    String(String),
}

impl Token {
    pub fn uint(value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        Token::Uint(word)
    }

    fn kind(&self) -> &'static str {
        match self {
            Token::Uint(_) => "uint256",
            Token::Address(_) => "address",
            Token::AddressArray(_) => "address[]",
            Token::String(_) => "string",
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Token::AddressArray(_) | Token::String(_))
    }

    pub fn as_u64(&self) -> Result<u64, AbiError> {
        match self {
            Token::Uint(word) => word_to_u64(word),
            other => Err(AbiError::TypeMismatch {
                expected: "uint256",
                found: other.kind(),
            }),
        }
    }

    pub fn into_address(self) -> Result<Address, AbiError> {
        match self {
            Token::Address(a) => Ok(a),
            other => Err(AbiError::TypeMismatch {
                expected: "address",
                found: other.kind(),
            }),
        }
    }

    pub fn into_addresses(self) -> Result<Vec<Address>, AbiError> {
        match self {
            Token::AddressArray(a) => Ok(a),
            other => Err(AbiError::TypeMismatch {
                expected: "address[]",
                found: other.kind(),
            }),
        }
    }

    pub fn into_string(self) -> Result<String, AbiError> {
        match self {
            Token::String(s) => Ok(s),
            other => Err(AbiError::TypeMismatch {
                expected: "string",
                found: other.kind(),
            }),
        }
    }
}

/// Encode `tokens` as a tuple (head/tail layout).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            encode_dynamic(token, &mut tail);
        } else {
            head.extend_from_slice(&static_word(token));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Calldata for a function call: selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode(tokens));
    out
}

/// Decode a tuple of `types` from `data`.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let word = read_word(data, i * WORD)?;
            match ty {
                ParamType::Uint => Ok(Token::Uint(word)),
                ParamType::Address => Ok(Token::Address(word_to_address(&word))),
                ParamType::String => {
                    let offset = word_to_usize(&word)?;
                    let len = word_to_usize(&read_word(data, offset)?)?;
                    let bytes = read_bytes(data, offset + WORD, len)?;
                    String::from_utf8(bytes.to_vec())
                        .map(Token::String)
                        .map_err(|_| AbiError::InvalidUtf8)
                }
                ParamType::AddressArray => {
                    let offset = word_to_usize(&word)?;
                    let len = word_to_usize(&read_word(data, offset)?)?;
                    (0..len)
                        .map(|j| {
                            read_word(data, offset + WORD + j * WORD).map(|w| word_to_address(&w))
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(Token::AddressArray)
                }
            }
        })
        .collect()
}

/// Decode `0x`-prefixed (or bare) hex.
pub fn decode_hex(raw: &str) -> Result<Vec<u8>, AbiError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

/// Decode a 32-byte hex word such as an indexed topic.
pub fn decode_word(raw: &str) -> Result<[u8; 32], AbiError> {
    let bytes = decode_hex(raw)?;
    read_word(&bytes, 0)
}

pub fn word_to_u64(word: &[u8; 32]) -> Result<u64, AbiError> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow("u64"));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(buf))
}

fn word_to_usize(word: &[u8; 32]) -> Result<usize, AbiError> {
    let value = word_to_u64(word)?;
    usize::try_from(value).map_err(|_| AbiError::Overflow("usize"))
}

fn word_to_address(word: &[u8; 32]) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Address::from_bytes(bytes)
}

fn usize_word(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&address.to_bytes());
    word
}

fn static_word(token: &Token) -> [u8; 32] {
    match token {
        Token::Uint(word) => *word,
        Token::Address(a) => address_word(a),
        // dynamic tokens never reach here
        Token::AddressArray(_) | Token::String(_) => [0u8; 32],
    }
}

fn encode_dynamic(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::String(s) => {
            let bytes = s.as_bytes();
            out.extend_from_slice(&usize_word(bytes.len()));
            out.extend_from_slice(bytes);
            let padding = (WORD - bytes.len() % WORD) % WORD;
            out.extend(std::iter::repeat(0u8).take(padding));
        }
        Token::AddressArray(items) => {
            out.extend_from_slice(&usize_word(items.len()));
            for a in items {
                out.extend_from_slice(&address_word(a));
            }
        }
        Token::Uint(_) | Token::Address(_) => {}
    }
}

fn read_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(len).ok_or(AbiError::Overflow("usize"))?;
    data.get(offset..end).ok_or(AbiError::Truncated {
        offset,
        needed: len,
        len: data.len(),
    })
}

fn read_word(data: &[u8], offset: usize) -> Result<[u8; 32], AbiError> {
    let bytes = read_bytes(data, offset, WORD)?;
    let mut word = [0u8; 32];
    word.copy_from_slice(bytes);
    Ok(word)
}
