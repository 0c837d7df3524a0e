//! Agent-id → display-name mapping. Cosmetic only: identifiers are what
//! travel on the wire, names never do.

const KNOWN_AGENTS: &[(u16, &str)] = &[
    (1, "CHUM-PRIME"),
    (2, "KAREN-BOT"),
    (3, "PLANKTON-JR"),
];

/// Display name for an agent id. Unmapped ids get a generic label.
pub fn agent_name(agent_id: u16) -> String {
    KNOWN_AGENTS
        .iter()
        .find(|(id, _)| *id == agent_id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("AGENT-{agent_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_agents() {
        assert_eq!(agent_name(1), "CHUM-PRIME");
        assert_eq!(agent_name(3), "PLANKTON-JR");
        assert_eq!(agent_name(42), "AGENT-42");
    }
}
