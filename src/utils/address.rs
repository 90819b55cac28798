//! Address validation and display helpers

use super::constants::{
    is_known_program, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN, PROGRAM_SUFFIXES, PUBKEY_BYTES,
    REPEATED_CHAR_RUN,
};

/// Base58 string that decodes to exactly 32 bytes
pub fn is_valid_address(address: &str) -> bool {
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address.len()) {
        return false;
    }
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == PUBKEY_BYTES)
}

/// Indices of entries failing `is_valid_address`
pub fn invalid_indices<S: AsRef<str>>(addresses: &[S]) -> Vec<usize> {
    addresses
        .iter()
        .enumerate()
        .filter(|(_, a)| !is_valid_address(a.as_ref().trim()))
        .map(|(i, _)| i)
        .collect()
}

/// Program-owned or vanity address heuristic
pub fn looks_like_contract(address: &str) -> bool {
    if is_known_program(address) {
        return true;
    }
    if PROGRAM_SUFFIXES.iter().any(|s| address.ends_with(s)) {
        return true;
    }
    has_repeated_run(address, REPEATED_CHAR_RUN)
}

fn has_repeated_run(s: &str, run: usize) -> bool {
    let mut prev = None;
    let mut count = 0usize;
    for c in s.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

/// `EPjF...Dt1v` style short form for logs
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Hide everything after the host of a provider URL (keys often live in the path/query)
pub fn masked_url(url: &str) -> String {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find(['/', '?']).unwrap_or(rest.len());
            if host_end == rest.len() {
                url.to_string()
            } else {
                format!("{}://{}/***", &url[..scheme_end], &rest[..host_end])
            }
        }
        None => "***".to_string(),
    }
}
