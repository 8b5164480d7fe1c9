// Copyright 2025 Evermark
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mapping of well-known contract and transport failures to operator-readable
//! messages.

/// Translate a raw RPC/contract error message into friendlier text where the
/// failure mode is recognized. Returns `None` when the message should be shown
/// as-is.
pub fn friendly_error_text(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    if lower.contains("insufficient funds") {
        return Some("Insufficient funds to cover the transaction cost");
    }
    if lower.contains("user rejected") || lower.contains("user denied") {
        return Some("Transaction was rejected by the signer");
    }
    if lower.contains("execution reverted") {
        return Some("Transaction reverted by the contract");
    }
    if lower.contains("nonce too low") {
        return Some("Transaction nonce too low; a competing transaction may be pending");
    }
    None
}

/// Format an error chain for display, substituting friendlier text for
/// recognized failure modes.
pub fn display_error(err: &anyhow::Error) -> String {
    let raw = format!("{err:#}");
    match friendly_error_text(&raw) {
        Some(friendly) => format!("{friendly} ({raw})"),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_known_substrings() {
        assert_eq!(
            friendly_error_text("server returned an error response: insufficient funds for gas"),
            Some("Insufficient funds to cover the transaction cost")
        );
        assert_eq!(
            friendly_error_text("Error: User rejected the request."),
            Some("Transaction was rejected by the signer")
        );
        assert_eq!(
            friendly_error_text("execution reverted: UnbondingPeriodActive()"),
            Some("Transaction reverted by the contract")
        );
    }

    #[test]
    fn test_passes_through_unknown_errors() {
        assert_eq!(friendly_error_text("connection refused"), None);
    }

    #[test]
    fn test_display_error_appends_raw_message() {
        let err = anyhow::anyhow!("execution reverted: NoRewards()");
        let text = display_error(&err);
        assert!(text.starts_with("Transaction reverted by the contract"));
        assert!(text.contains("NoRewards"));
    }
}
