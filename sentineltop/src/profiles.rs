//! Connection profiles: load/save simple JSON mapping of profile name -> { url, tls_ca }
//! Stored under XDG config dir: $XDG_CONFIG_HOME/sentineltop/profiles.json (fallback ~/.config/sentineltop/profiles.json)

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    /// Base URL of the monitoring API, e.g. http://monitor.lan:8000
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("sentineltop")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentineltop")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing file is an empty set; a malformed one is an error for the caller to report.
pub fn load_profiles() -> Result<ProfilesFile, serde_json::Error> {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s),
        Err(_) => Ok(ProfilesFile::default()),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> std::io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)
}

#[derive(Debug, PartialEq)]
pub enum ResolveProfile {
    /// Use the provided runtime inputs (not persisted). (url, tls_ca)
    Direct(String, Option<String>),
    /// Loaded from existing profile entry (url, tls_ca)
    Loaded(String, Option<String>),
    /// Should prompt user to select among profile names
    PromptSelect(Vec<String>),
    /// Should prompt user to create a new profile (name)
    PromptCreate(String),
    /// No profile could be resolved (e.g., missing arguments)
    None,
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.profile_name, self.url) {
            // Only a name: load it or offer to create it
            (Some(name), None) => match pf.profiles.get(&name) {
                Some(entry) => ResolveProfile::Loaded(entry.url.clone(), entry.tls_ca.clone()),
                None => ResolveProfile::PromptCreate(name),
            },
            // URL given -> direct (maybe later saved by caller)
            (_, Some(u)) => ResolveProfile::Direct(u, self.tls_ca),
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

/// What to do with an explicit `--profile NAME URL` pair.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveDecision {
    /// New name: write it.
    Create,
    /// Existing name with identical values: leave the file alone.
    Unchanged,
    /// Existing name with different values: overwrite only if confirmed.
    Changed,
}

pub fn save_decision(pf: &ProfilesFile, name: &str, entry: &ProfileEntry) -> SaveDecision {
    match pf.profiles.get(name) {
        None => SaveDecision::Create,
        Some(existing) if existing == entry => SaveDecision::Unchanged,
        Some(_) => SaveDecision::Changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.into(),
            ProfileEntry {
                url: url.into(),
                tls_ca: None,
            },
        );
        pf
    }

    #[test]
    fn name_only_loads_or_prompts_create() {
        let pf = file_with("lab", "http://lab:8000");
        let req = ProfileRequest {
            profile_name: Some("lab".into()),
            url: None,
            tls_ca: None,
        };
        assert_eq!(
            req.resolve(&pf),
            ResolveProfile::Loaded("http://lab:8000".into(), None)
        );
        let req = ProfileRequest {
            profile_name: Some("prod".into()),
            url: None,
            tls_ca: None,
        };
        assert_eq!(req.resolve(&pf), ResolveProfile::PromptCreate("prod".into()));
    }

    #[test]
    fn nothing_given() {
        let empty = ProfilesFile::default();
        let req = || ProfileRequest {
            profile_name: None,
            url: None,
            tls_ca: None,
        };
        assert_eq!(req().resolve(&empty), ResolveProfile::None);
        let pf = file_with("lab", "http://lab:8000");
        assert_eq!(
            req().resolve(&pf),
            ResolveProfile::PromptSelect(vec!["lab".into()])
        );
    }

    #[test]
    fn decisions() {
        let pf = file_with("lab", "http://lab:8000");
        let same = ProfileEntry {
            url: "http://lab:8000".into(),
            tls_ca: None,
        };
        let other = ProfileEntry {
            url: "http://lab:9000".into(),
            tls_ca: None,
        };
        assert_eq!(save_decision(&pf, "lab", &same), SaveDecision::Unchanged);
        assert_eq!(save_decision(&pf, "lab", &other), SaveDecision::Changed);
        assert_eq!(save_decision(&pf, "new", &other), SaveDecision::Create);
    }
}
