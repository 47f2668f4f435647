use crate::error::UploadError;
use lazy_regex::regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// A release as returned by the GitHub release list API. Only the fields needed to upload an asset
/// are kept.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// This is a URI template like
    /// `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`.
    pub upload_url: String,
}

impl Release {
    /// Returns the URL to post assets to, which is the `upload_url` with its template expressions
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidUploadUrl`] if what's left isn't a valid URL.
    pub fn upload_endpoint(&self) -> Result<Url, UploadError> {
        let endpoint = regex!(r"\{[^}]*\}").replace_all(&self.upload_url, "");
        Url::parse(&endpoint).map_err(|source| UploadError::InvalidUploadUrl {
            tag: self.tag_name.clone(),
            upload_url: self.upload_url.clone(),
            source,
        })
    }
}

/// Scans the releases in order and returns the first one whose tag is exactly `tag`. If none
/// match, the tags of all the releases are returned instead, in the same order.
pub(crate) fn first_match(releases: Vec<Release>, tag: &str) -> Result<Release, Vec<String>> {
    let mut tags = Vec::with_capacity(releases.len());
    for release in releases {
        if release.tag_name == tag {
            return Ok(release);
        }
        tags.push(release.tag_name);
    }
    Err(tags)
}
