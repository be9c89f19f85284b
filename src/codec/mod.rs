//! Fixed-layout payload codec and hex/decimal text entry points
//!
//! Swap terms are four 32-byte big-endian words in the order
//! `tokenA, amountA, tokenB, amountB`, the layout the verifier's decoder
//! reads straight out of memory.

use crate::eip712::hasher::address_word;
use crate::error::{CoordinationError, CoordinationResult};
use crate::types::SwapTerms;

use alloy_primitives::{Address, Bytes, B256, U256};

/// Encoded size of [`SwapTerms`]
pub const SWAP_TERMS_LEN: usize = 4 * 32;

/// Pack swap terms into their 128-byte wire form
pub fn encode_swap_terms(
    token_a: &Address,
    amount_a: &U256,
    token_b: &Address,
    amount_b: &U256,
) -> Bytes {
    let mut out = Vec::with_capacity(SWAP_TERMS_LEN);
    out.extend_from_slice(&address_word(token_a));
    out.extend_from_slice(&amount_a.to_be_bytes::<32>());
    out.extend_from_slice(&address_word(token_b));
    out.extend_from_slice(&amount_b.to_be_bytes::<32>());
    Bytes::from(out)
}

impl SwapTerms {
    pub fn encode(&self) -> Bytes {
        encode_swap_terms(&self.token_a, &self.amount_a, &self.token_b, &self.amount_b)
    }
}

/// Inverse of [`encode_swap_terms`]
pub fn decode_swap_terms(data: &[u8]) -> CoordinationResult<SwapTerms> {
    if data.len() != SWAP_TERMS_LEN {
        return Err(CoordinationError::MalformedPayload {
            expected: SWAP_TERMS_LEN,
            actual: data.len(),
        });
    }

    let word = |i: usize| &data[i * 32..(i + 1) * 32];

    Ok(SwapTerms {
        token_a: address_from_word(word(0)),
        amount_a: U256::from_be_slice(word(1)),
        token_b: address_from_word(word(2)),
        amount_b: U256::from_be_slice(word(3)),
    })
}

/// Decode swap terms from hex text, with or without a `0x` prefix
pub fn decode_swap_terms_hex(data: &str) -> CoordinationResult<SwapTerms> {
    decode_swap_terms(&parse_hex_bytes(data)?)
}

// The upper 12 bytes are ignored, as the verifier does when it casts the word.
fn address_from_word(word: &[u8]) -> Address {
    Address::from_slice(&word[12..])
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Decode a hex byte string
pub fn parse_hex_bytes(value: &str) -> CoordinationResult<Bytes> {
    Ok(Bytes::from(hex::decode(strip_hex_prefix(value.trim()))?))
}

/// Parse a 20-byte address. Checksums are not enforced.
pub fn parse_address(value: &str) -> CoordinationResult<Address> {
    let bytes = parse_hex_bytes(value)?;
    if bytes.len() != 20 {
        return Err(CoordinationError::InvalidAddress {
            value: value.to_string(),
            reason: format!("expected 20 bytes, got {}", bytes.len()),
        });
    }
    Ok(Address::from_slice(&bytes))
}

/// Parse a 32-byte digest or tag
pub fn parse_b256(value: &str) -> CoordinationResult<B256> {
    let bytes = parse_hex_bytes(value)?;
    if bytes.len() != 32 {
        return Err(CoordinationError::Decode(format!(
            "expected 32 bytes, got {} in {}",
            bytes.len(),
            value
        )));
    }
    Ok(B256::from_slice(&bytes))
}

/// Largest decimals count whose scale `10^decimals` fits in 256 bits
pub const MAX_TOKEN_DECIMALS: u8 = 77;

fn decimal_scale(decimals: u8) -> CoordinationResult<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| {
            CoordinationError::Decode(format!(
                "token decimals {} exceed {}",
                decimals, MAX_TOKEN_DECIMALS
            ))
        })
}

/// Render a base-unit amount as a decimal string, dropping trailing zeros
///
/// `format_token_amount(U256::from(100_000000u64), 6)? == "100"`
pub fn format_token_amount(amount: U256, decimals: u8) -> CoordinationResult<String> {
    let divisor = decimal_scale(decimals)?;
    let whole = amount / divisor;
    let fraction = amount % divisor;

    if decimals == 0 || fraction.is_zero() {
        return Ok(whole.to_string());
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    Ok(format!("{}.{}", whole, digits.trim_end_matches('0')))
}

/// Parse a decimal string into base units
///
/// Fraction digits beyond `decimals` are truncated; an empty whole part
/// reads as zero.
pub fn parse_token_amount(text: &str, decimals: u8) -> CoordinationResult<U256> {
    decimal_scale(decimals)?;
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(CoordinationError::Decode(format!(
            "invalid token amount: {:?}",
            text
        )));
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(&fraction[..fraction.len().min(decimals)]);
    for _ in fraction.len()..decimals {
        digits.push('0');
    }

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    digits.parse::<U256>().map_err(|e| {
        CoordinationError::Decode(format!("invalid token amount {:?}: {}", text, e))
    })
}
