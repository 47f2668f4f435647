use crate::token::TOKEN_ENV_VAR;
use itertools::Itertools;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// The errors that stop an upload before the file is sent. Once the upload request itself has been
/// sent, the result is reported as an [`UploadOutcome`](crate::UploadOutcome) instead.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum UploadError {
    #[error(
        "could not find a GitHub token, either pass one in or set the {} env var",
        TOKEN_ENV_VAR,
    )]
    MissingToken,

    #[error("unknown media type for {}", path.display())]
    UnknownMediaType { path: PathBuf },

    #[error("could not get release info from {url}: {status}\n{body}")]
    ReleaseListRequest {
        url: Url,
        status: StatusCode,
        body: String,
    },

    #[error(
        "could not find release `{tag}` in the {project} GitHub repository.\nReleases:{}",
        tag_list(.available),
    )]
    ReleaseNotFound {
        tag: String,
        project: String,
        available: Vec<String>,
    },

    #[error("release `{tag}` has an invalid upload URL `{upload_url}`: {source}")]
    InvalidUploadUrl {
        tag: String,
        upload_url: String,
        source: url::ParseError,
    },
}

fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        return " (none)".to_string();
    }
    format!("\n\t{}", tags.iter().join("\n\t"))
}
