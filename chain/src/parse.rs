//! Text formats printed by the chain node.

use crate::MasternodeEntry;

const VIN_PREFIX: &str = "CTxIn(COutPoint(";
const ENABLED: &str = "ENABLED";

/// Turn `CTxIn(COutPoint(<txid>, <n>), ...)` into `<txid>-<n>`.
pub fn parse_vin(vin: &str) -> Option<String> {
    let rest = vin.trim_start().strip_prefix(VIN_PREFIX)?;
    let (txid, rest) = rest.split_once(',')?;
    let txid = txid.trim();
    if txid.is_empty() || !txid.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rest = rest.trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !rest[digits..].trim_start().starts_with(')') {
        return None;
    }
    Some(format!("{}-{}", txid, &rest[..digits]))
}

/// Build a roster entry from a `masternodelist full` line.
///
/// The first whitespace-separated field is the status; only `ENABLED`
/// nodes take part in elections.
pub fn parse_masternode(identity: &str, line: &str) -> MasternodeEntry {
    MasternodeEntry {
        identity: identity.trim().to_string(),
        enabled: line.split_whitespace().next() == Some(ENABLED),
    }
}

/// Value of a `"testnet": <bool>` entry in a `getinfo` text dump.
pub fn testnet_flag(info: &str) -> Option<bool> {
    info.lines()
        .filter(|line| line.contains("testnet"))
        .find_map(|line| {
            let (_, value) = line.split_once(':')?;
            let value = value.trim().trim_end_matches(',').trim();
            match value.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }
        })
}
