//! Protocol profile loading.
//!
//! Files ending in `.json` are parsed as JSON; anything else as YAML.

use std::path::Path;

use anyhow::{Context, Result};

use idstate_protocol::ProtocolProfile;

/// Load and validate the profile at `path`, or the default profile.
pub fn load_profile(path: Option<&Path>) -> Result<ProtocolProfile> {
    let Some(path) = path else {
        return Ok(ProtocolProfile::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let profile: ProtocolProfile = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON profile: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML profile: {}", path.display()))?
    };
    profile
        .validate()
        .with_context(|| format!("invalid tree depth in profile: {}", path.display()))?;
    tracing::debug!(?profile, "loaded protocol profile");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_path() {
        assert_eq!(load_profile(None).unwrap(), ProtocolProfile::default());
    }

    #[test]
    fn yaml_profile_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        std::fs::write(&path, "claimsDepth: 4\nrevocationDepth: 4\nrootsDepth: 4\n").unwrap();
        assert_eq!(load_profile(Some(&path)).unwrap(), ProtocolProfile::testing());
    }

    #[test]
    fn json_profile_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"idType": 258}"#).unwrap();
        let profile = load_profile(Some(&path)).unwrap();
        assert_eq!(profile.id_type_bytes(), [1, 2]);
        assert_eq!(profile.claims_depth, 32);
    }

    #[test]
    fn zero_depth_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        std::fs::write(&path, "rootsDepth: 0\n").unwrap();
        assert!(load_profile(Some(&path)).is_err());
    }

    #[test]
    fn missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profile(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read profile"));
    }
}
