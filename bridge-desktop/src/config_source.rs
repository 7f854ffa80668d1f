//! File-backed client configuration.

use async_trait::async_trait;
use bridge_traits::{
    config::{ConfigSource, RawClientConfig},
    error::{BridgeError, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// File names tried in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["msal_config.json", "auth_config.json"];

const DEFAULT_CLOUD_HOST: &str = "https://login.microsoftonline.com";

/// Loads client settings from an MSAL-format JSON file in a resource directory.
///
/// The first of [`CONFIG_FILE_NAMES`] that exists wins. A missing directory (no
/// resolvable config location on this machine) is reported as
/// [`BridgeError::NotAvailable`]; a directory with neither file as
/// [`BridgeError::NotFound`].
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    resource_dir: Option<PathBuf>,
}

impl FileConfigSource {
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: Some(resource_dir.into()),
        }
    }

    /// `<user config dir>/identity-bridge`, when the platform has one.
    pub fn default_location() -> Self {
        Self {
            resource_dir: dirs::config_dir().map(|dir| dir.join("identity-bridge")),
        }
    }

    pub fn resource_dir(&self) -> Option<&Path> {
        self.resource_dir.as_deref()
    }

    async fn find_config_file(&self, dir: &Path) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
            debug!(file = name, "Config file not present");
        }
        None
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<RawClientConfig> {
        let dir = self.resource_dir.as_deref().ok_or_else(|| {
            BridgeError::NotAvailable("No resource directory available".to_string())
        })?;

        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Err(BridgeError::NotAvailable(format!(
                "Resource directory {} does not exist",
                dir.display()
            )));
        }

        let path = self.find_config_file(dir).await.ok_or_else(|| {
            BridgeError::NotFound(format!(
                "MSAL config not found. Expected {} or {} in {}",
                CONFIG_FILE_NAMES[0],
                CONFIG_FILE_NAMES[1],
                dir.display()
            ))
        })?;

        let contents = fs::read_to_string(&path).await?;
        let file: MsalConfigFile = serde_json::from_str(&contents).map_err(|e| {
            warn!(error = %e, "Config file is not valid MSAL JSON");
            BridgeError::InvalidData(format!("Invalid config file: {}", e))
        })?;

        debug!(path = %path.display(), "Loaded client configuration");
        Ok(file.into_raw())
    }

    fn describe(&self) -> String {
        match &self.resource_dir {
            Some(dir) => format!("file:{}", dir.display()),
            None => "file:<unavailable>".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MsalConfigFile {
    client_id: Option<String>,
    redirect_uri: Option<String>,
    authority: Option<String>,
    tenant_id: Option<String>,
    #[serde(default)]
    authorities: Vec<AuthorityEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthorityEntry {
    authority_url: Option<String>,
    audience: Option<Audience>,
}

#[derive(Debug, Deserialize)]
struct Audience {
    #[serde(rename = "type")]
    kind: Option<String>,
    tenant_id: Option<String>,
}

impl AuthorityEntry {
    /// Explicit URL first, else one derived from the audience.
    fn resolve_url(&self) -> Option<String> {
        if let Some(url) = self.authority_url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Some(url.clone());
        }

        let audience = self.audience.as_ref()?;
        let tenant = match (audience.tenant_id.as_deref(), audience.kind.as_deref()) {
            (Some(tenant), _) if !tenant.trim().is_empty() => tenant,
            (_, Some("AzureADMultipleOrgs")) => "organizations",
            (_, Some("PersonalMicrosoftAccount")) => "consumers",
            (_, Some("AzureADandPersonalMicrosoftAccount")) => "common",
            _ => return None,
        };
        Some(format!("{}/{}", DEFAULT_CLOUD_HOST, tenant))
    }
}

impl MsalConfigFile {
    fn into_raw(self) -> RawClientConfig {
        let authorities: Vec<String> = self
            .authorities
            .iter()
            .filter_map(AuthorityEntry::resolve_url)
            .collect();

        let tenant_id = self.tenant_id.or_else(|| {
            self.authorities
                .iter()
                .filter_map(|entry| entry.audience.as_ref()?.tenant_id.clone())
                .next()
        });

        RawClientConfig {
            client_id: self.client_id,
            authority: self.authority.or_else(|| authorities.first().cloned()),
            redirect_uri: self.redirect_uri,
            tenant_id,
            authorities,
        }
    }
}
