/// The `builder` module contains the `UploaderBuilder` struct which is used to create an `Uploader`
/// instance.
use crate::{
    error::UploadError,
    github::{GitHub, DEFAULT_API_BASE_URL},
    media_type::media_type_for,
    token::token_from_env,
    uploader::Uploader,
};
use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// The repository owner used when none is set.
pub const DEFAULT_OWNER: &str = "baagaard-usgs";

/// The repository name used when none is set.
pub const DEFAULT_PACKAGE: &str = "geomodelgrids";

/// `UploaderBuilder` is used to create an [`Uploader`] instance.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct UploaderBuilder<'a> {
    owner: Option<&'a str>,
    package: Option<&'a str>,
    tag: Option<&'a str>,
    file: Option<PathBuf>,
    asset_name: Option<&'a str>,
    label: Option<&'a str>,
    token: Option<&'a str>,
    api_base_url: Option<&'a str>,
}

impl<'a> UploaderBuilder<'a> {
    /// Returns a new empty `UploaderBuilder`.
    #[must_use]
    pub fn new() -> Self {
        UploaderBuilder::default()
    }

    /// Set the owner of the repository, a GitHub user or organization. Defaults to
    /// [`DEFAULT_OWNER`].
    #[must_use]
    pub fn owner(mut self, owner: &'a str) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the name of the repository to upload to. Defaults to [`DEFAULT_PACKAGE`].
    #[must_use]
    pub fn package(mut self, package: &'a str) -> Self {
        self.package = Some(package);
        self
    }

    /// Set the tag of the release to upload to. This must match the release's tag exactly. You must
    /// set this.
    #[must_use]
    pub fn tag(mut self, tag: &'a str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Set the file to upload. You must set this.
    #[must_use]
    pub fn file<P: AsRef<Path>>(mut self, file: P) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }

    /// Set the name the asset will have in the release. By default this is the file name of the
    /// uploaded file, without any directories.
    #[must_use]
    pub fn asset_name(mut self, name: &'a str) -> Self {
        self.asset_name = Some(name);
        self
    }

    /// Set a label for the asset. GitHub shows this instead of the asset name on the release page.
    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the token to use for API requests. If this is not set, then the token is taken from the
    /// `GITHUB_TOKEN` env var.
    #[must_use]
    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the base URL for the GitHub API. This is useful for testing or if you want to operate
    /// against GitHub Enterprise. This should be something like
    /// `https://github.my-corp.example.com/api/v3`.
    #[must_use]
    pub fn api_base_url(mut self, api_base_url: &'a str) -> Self {
        self.api_base_url = Some(api_base_url);
        self
    }

    /// Builds a new [`Uploader`] instance and returns it. Nothing is sent over the network.
    ///
    /// # Errors
    ///
    /// This returns an error if:
    ///
    /// * The tag or file were not set.
    /// * The owner or package is not a valid name.
    /// * There is no token, see [`UploadError::MissingToken`].
    /// * The file's media type can't be guessed from its extension, see
    ///   [`UploadError::UnknownMediaType`].
    /// * The file does not exist or is not a regular file.
    /// * The API base URL is invalid.
    pub fn build(self) -> Result<Uploader> {
        let Some(tag) = self.tag else {
            return Err(anyhow!("You must set a tag"));
        };
        let Some(file) = self.file.as_deref() else {
            return Err(anyhow!("You must set a file to upload"));
        };

        let project_name = project_name(
            self.owner.unwrap_or(DEFAULT_OWNER),
            self.package.unwrap_or(DEFAULT_PACKAGE),
        )?;
        let token = self.resolve_token()?;
        let media_type = media_type_for(file)?;
        check_is_file(file)?;
        let asset_name = asset_name(self.asset_name, file)?;
        let api_base_url = api_base_url(self.api_base_url)?;

        Ok(Uploader::new(
            GitHub::new(project_name, api_base_url, token),
            tag.to_string(),
            file.to_path_buf(),
            asset_name,
            self.label.map(String::from),
            media_type,
            reqwest_client()?,
        ))
    }

    fn resolve_token(&self) -> Result<String, UploadError> {
        if let Some(token) = self.token.filter(|t| !t.trim().is_empty()) {
            debug!("Using the GitHub token that was passed in.");
            return Ok(token.trim().to_string());
        }
        token_from_env().ok_or(UploadError::MissingToken)
    }
}

fn project_name(owner: &str, package: &str) -> Result<String> {
    for (what, name) in [("owner", owner), ("package", package)] {
        if name.is_empty() || name.contains('/') {
            return Err(anyhow!("`{name}` is not a valid repository {what} name"));
        }
    }
    let project_name = format!("{owner}/{package}");
    debug!("project name = {project_name}");
    Ok(project_name)
}

fn check_is_file(file: &Path) -> Result<()> {
    let meta =
        fs::metadata(file).with_context(|| format!("could not read {}", file.display()))?;
    if !meta.is_file() {
        return Err(anyhow!("{} is not a file", file.display()));
    }
    Ok(())
}

fn asset_name(explicit: Option<&str>, file: &Path) -> Result<String> {
    let name = if let Some(name) = explicit {
        name.to_string()
    } else {
        file.file_name()
            .ok_or_else(|| anyhow!("{} does not have a file name", file.display()))?
            .to_string_lossy()
            .into_owned()
    };
    debug!("asset name = {name}");
    Ok(name)
}

fn api_base_url(api_base_url: Option<&str>) -> Result<Url> {
    let api_base_url = api_base_url.unwrap_or(DEFAULT_API_BASE_URL);
    let url = Url::parse(api_base_url)
        .with_context(|| format!("`{api_base_url}` is not a valid API base URL"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("`{api_base_url}` cannot be used as an API base URL"));
    }
    Ok(url)
}

fn reqwest_client() -> Result<Client> {
    let builder = Client::builder().gzip(true);

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("relasset version {}", super::VERSION))?,
    );
    Ok(builder.default_headers(headers).build()?)
}
