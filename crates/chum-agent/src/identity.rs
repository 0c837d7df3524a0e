use std::path::Path;

use anyhow::Context as _;
use solana_sdk::signature::Keypair;

/// Load a keypair from the JSON byte-array file the standard Solana
/// tooling writes.
pub fn load_keypair(path: &Path) -> anyhow::Result<Keypair> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading keypair file {}", path.display()))?;
    let bytes: Vec<u8> = serde_json::from_str(&data)
        .with_context(|| format!("parsing keypair file {}", path.display()))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| anyhow::anyhow!("invalid keypair in {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Signer;

    #[test]
    fn round_trips_the_json_byte_array_format() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join(format!("chum-agent-test-{}.json", keypair.pubkey()));
        std::fs::write(&path, json).unwrap();

        let loaded = load_keypair(&path).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_keypair(Path::new("/nonexistent/agent.json")).is_err());
    }
}
