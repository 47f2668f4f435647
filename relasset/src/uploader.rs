use crate::{
    github::{AssetUpload, GitHub},
    release::Release,
};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt, fs, path::PathBuf};

const DUPLICATE_ASSET_REMINDER: &str =
    "Did you remember to delete any existing assets with the same name before uploading?";

/// `Uploader` uploads one file to one release. Use the [`UploaderBuilder`](crate::UploaderBuilder)
/// struct to create a new `Uploader` instance.
#[derive(Debug)]
pub struct Uploader {
    github: GitHub,
    tag: String,
    file: PathBuf,
    asset_name: String,
    label: Option<String>,
    media_type: String,
    reqwest_client: Client,
}

/// What happened to an upload request once it was sent. Use its `Display` implementation to get a
/// message for humans.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// GitHub accepted the file and it can be downloaded from `download_url`.
    Uploaded { download_url: String },
    /// GitHub responded with a status other than `201 Created`.
    Rejected { status: StatusCode, body: String },
    /// No usable response was received.
    Failed { reason: String },
}

#[derive(Debug, Deserialize)]
struct UploadedAsset {
    #[serde(default)]
    browser_download_url: Option<String>,
}

impl Uploader {
    pub(crate) fn new(
        github: GitHub,
        tag: String,
        file: PathBuf,
        asset_name: String,
        label: Option<String>,
        media_type: String,
        reqwest_client: Client,
    ) -> Uploader {
        Uploader {
            github,
            tag,
            file,
            asset_name,
            label,
            media_type,
            reqwest_client,
        }
    }

    /// Looks up the release for the configured tag without uploading anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the release list can't be fetched or no release has the tag. See
    /// [`UploadError`](crate::UploadError).
    pub async fn find_release(&self) -> Result<Release> {
        self.github.find_release(&self.reqwest_client, &self.tag).await
    }

    /// Finds the release for the configured tag and uploads the file to it.
    ///
    /// # Errors
    ///
    /// Everything that can go wrong before the upload request is sent is returned as an error:
    ///
    /// * The release list could not be fetched.
    /// * No release has the requested tag. The error lists the tags that do exist.
    /// * The release's upload URL is invalid.
    /// * The file could not be read.
    ///
    /// After the request is sent, failures are reported in the returned [`UploadOutcome`] rather
    /// than as an error. That includes GitHub rejecting the upload because an asset with the same
    /// name already exists.
    pub async fn upload_asset(&self) -> Result<UploadOutcome> {
        let release = self.find_release().await?;
        let endpoint = release.upload_endpoint()?;

        let contents = fs::read(&self.file)
            .with_context(|| format!("could not read {}", self.file.display()))?;

        info!(
            "Uploading {} to {endpoint} as {} ({} bytes, {})",
            self.file.display(),
            self.asset_name,
            contents.len(),
            self.media_type,
        );
        let req = self
            .github
            .upload_request(
                &self.reqwest_client,
                AssetUpload {
                    endpoint: endpoint.clone(),
                    name: &self.asset_name,
                    label: self.label.as_deref(),
                    media_type: &self.media_type,
                    contents,
                },
            )?
            .build()
            .with_context(|| format!("failed to build HTTP request for {endpoint}"))?;

        let resp = match self.reqwest_client.execute(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Upload request to {endpoint} failed: {e}");
                return Ok(UploadOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        let status = resp.status();
        debug!("Upload response status is {status}");
        if status != StatusCode::CREATED {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("(could not read the response body: {e})"));
            return Ok(UploadOutcome::Rejected { status, body });
        }

        // The download URL is reported exactly as GitHub sent it.
        Ok(match resp.json::<UploadedAsset>().await {
            Ok(UploadedAsset {
                browser_download_url: Some(download_url),
            }) if !download_url.is_empty() => UploadOutcome::Uploaded { download_url },
            Ok(_) => UploadOutcome::Failed {
                reason: "the upload response did not include a browser_download_url".to_string(),
            },
            Err(e) => UploadOutcome::Failed {
                reason: format!("could not parse the upload response: {e}"),
            },
        })
    }
}

impl UploadOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Uploaded { download_url } => {
                write!(f, "Upload complete. Download URL: {download_url}")
            }
            UploadOutcome::Rejected { status, body } => write!(
                f,
                "Error while uploading file: {status}\n{body}\n{DUPLICATE_ASSET_REMINDER}"
            ),
            UploadOutcome::Failed { reason } => write!(
                f,
                "Error while uploading file: {reason}\n{DUPLICATE_ASSET_REMINDER}"
            ),
        }
    }
}
