// src/fetch/mod.rs
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use tracing::info;
use url::Url;

use crate::process::{load_rank_csv, RawTable};

/// Which tab of the sheet to read. Each platform keeps its ranks on its own
/// tab.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Platform → tab `gid` inside the spreadsheet.
    pub platform_gids: BTreeMap<Platform, String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            platform_gids: BTreeMap::from([
                (Platform::Android, "0".to_string()),
                (Platform::Ios, "1".to_string()),
            ]),
        }
    }
}

/// One tab of one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSource {
    pub sheet_id: String,
    pub gid: String,
}

impl SheetSource {
    /// Pull the spreadsheet id out of a share/edit URL such as
    /// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`.
    pub fn from_url(sheet_url: &str, platform: Platform, config: &SheetConfig) -> Result<Self> {
        let url = Url::parse(sheet_url.trim())
            .with_context(|| format!("parsing sheet URL {}", sheet_url))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        let sheet_id = segments
            .windows(3)
            .find(|w| w[0] == "spreadsheets" && w[1] == "d")
            .map(|w| w[2].to_string())
            .ok_or_else(|| anyhow!("no spreadsheet id in {}", sheet_url))?;

        let gid = match config.platform_gids.get(&platform) {
            Some(gid) => gid.clone(),
            None => bail!("no tab gid configured for platform {}", platform),
        };

        Ok(Self { sheet_id, gid })
    }

    /// CSV export endpoint for this tab.
    pub fn csv_export_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&gid={}",
            self.sheet_id, self.gid
        )
    }
}

/// Download the tab as CSV text. One attempt; a failed request or non-success
/// status is returned as an error.
pub async fn fetch_sheet_csv(client: &Client, source: &SheetSource) -> Result<String> {
    let url = source.csv_export_url();
    let body = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    info!(sheet = %source.sheet_id, gid = %source.gid, bytes = body.len(), "fetched sheet");
    Ok(body)
}

/// [`fetch_sheet_csv`] parsed into a [`RawTable`].
pub async fn fetch_rank_table(client: &Client, source: &SheetSource) -> Result<RawTable> {
    let text = fetch_sheet_csv(client, source).await?;
    load_rank_csv(text.as_bytes())
        .with_context(|| format!("parsing CSV export of sheet {}", source.sheet_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_and_platform_tab() -> Result<()> {
        let config = SheetConfig::default();
        let url = "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=0";

        let android = SheetSource::from_url(url, Platform::Android, &config)?;
        assert_eq!(android.sheet_id, "1AbC-xyz_9");
        assert_eq!(android.gid, "0");

        let ios = SheetSource::from_url(url, Platform::Ios, &config)?;
        assert_eq!(
            ios.csv_export_url(),
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/gviz/tq?tqx=out:csv&gid=1"
        );
        Ok(())
    }

    #[test]
    fn rejects_urls_without_an_id() {
        let config = SheetConfig::default();
        for bad in [
            "not a url",
            "https://docs.google.com/document/d/abc/edit",
            "https://docs.google.com/spreadsheets/",
        ] {
            assert!(SheetSource::from_url(bad, Platform::Android, &config).is_err(), "{bad}");
        }
    }

    #[test]
    fn missing_platform_mapping_is_an_error() {
        let config = SheetConfig {
            platform_gids: BTreeMap::new(),
        };
        let url = "https://docs.google.com/spreadsheets/d/abc/edit";
        assert!(SheetSource::from_url(url, Platform::Ios, &config).is_err());
    }

    #[test]
    fn platform_gids_from_yaml() -> Result<()> {
        let config: SheetConfig = serde_yaml::from_str("platform_gids: { ios: \"12345\" }")?;
        assert_eq!(config.platform_gids.get(&Platform::Ios).map(String::as_str), Some("12345"));
        assert_eq!(config.platform_gids.get(&Platform::Android), None);
        Ok(())
    }
}
