//! Output descriptor helpers: BIP-380 checksums, the `importdescriptors`
//! request body, and the escaping the minter's probe shell needs.

use serde::Serialize;
use thiserror::Error;

const INPUT_CHARSET: &str =
    "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";

const CHECKSUM_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const CHECKSUM_LEN: usize = 8;

/// Characters the probe's `/bin/sh -c` line would otherwise split or group on.
const SHELL_SPECIAL: [char; 5] = ['"', ' ', '(', ')', ','];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("character {0:?} is not valid in an output descriptor")]
    InvalidCharacter(char),
    #[error("failed to encode descriptor import request: {0}")]
    Encode(String),
}

fn polymod(mut c: u64, val: u64) -> u64 {
    let c0 = c >> 35;
    c = ((c & 0x7_ffff_ffff) << 5) ^ val;
    if c0 & 1 != 0 {
        c ^= 0xf5_dee5_1989;
    }
    if c0 & 2 != 0 {
        c ^= 0xa9_fdca_3312;
    }
    if c0 & 4 != 0 {
        c ^= 0x1b_ab10_e32d;
    }
    if c0 & 8 != 0 {
        c ^= 0x37_06b1_677a;
    }
    if c0 & 16 != 0 {
        c ^= 0x64_4d62_6ffd;
    }
    c
}

/// Compute the 8-character BIP-380 checksum of a descriptor body.
pub fn descriptor_checksum(desc: &str) -> Result<String, DescriptorError> {
    let mut c = 1u64;
    let mut cls = 0u64;
    let mut clscount = 0;

    for ch in desc.chars() {
        let pos = INPUT_CHARSET
            .find(ch)
            .ok_or(DescriptorError::InvalidCharacter(ch))? as u64;
        c = polymod(c, pos & 31);
        cls = cls * 3 + (pos >> 5);
        clscount += 1;
        if clscount == 3 {
            c = polymod(c, cls);
            cls = 0;
            clscount = 0;
        }
    }
    if clscount > 0 {
        c = polymod(c, cls);
    }
    for _ in 0..CHECKSUM_LEN {
        c = polymod(c, 0);
    }
    c ^= 1;

    let checksum = (0..CHECKSUM_LEN)
        .map(|i| CHECKSUM_CHARSET[((c >> (5 * (7 - i))) & 31) as usize] as char)
        .collect();
    Ok(checksum)
}

/// Append `#<checksum>` to a descriptor body.
pub fn with_checksum(desc: &str) -> Result<String, DescriptorError> {
    let checksum = descriptor_checksum(desc)?;
    Ok(format!("{desc}#{checksum}"))
}

#[derive(Serialize)]
struct ImportRequest<'a> {
    desc: &'a str,
    timestamp: u64,
}

/// Render the JSON array `bitcoin-cli importdescriptors` expects for a single
/// descriptor rescanned from genesis.
pub fn import_request_json(checksummed_desc: &str) -> Result<String, DescriptorError> {
    let request = [ImportRequest {
        desc: checksummed_desc,
        timestamp: 0,
    }];
    serde_json::to_string(&request).map_err(|err| DescriptorError::Encode(err.to_string()))
}

/// Backslash-escape `"`, space, `(`, `)` and `,` so the string survives being
/// spliced into a `/bin/sh -c` command line as a single argument.
#[must_use]
pub fn escape_for_shell(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() * 2);
    for ch in raw.chars() {
        if SHELL_SPECIAL.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
