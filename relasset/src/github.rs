use crate::{
    error::UploadError,
    release::{self, Release},
};
use anyhow::{Context, Result};
use itertools::Itertools;
use lazy_regex::regex_captures;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LINK},
    Client, RequestBuilder, Response,
};
use std::collections::HashSet;
use url::Url;

/// The base URL for the public GitHub API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github+json";

// This is the largest page size the release list API allows.
const RELEASES_PER_PAGE: &str = "100";

#[derive(Debug)]
pub(crate) struct GitHub {
    project_name: String,
    api_base_url: Url,
    token: String,
}

/// An asset to be posted to a release's upload endpoint.
#[derive(Debug)]
pub(crate) struct AssetUpload<'a> {
    pub(crate) endpoint: Url,
    pub(crate) name: &'a str,
    pub(crate) label: Option<&'a str>,
    pub(crate) media_type: &'a str,
    pub(crate) contents: Vec<u8>,
}

impl GitHub {
    pub(crate) fn new(project_name: String, api_base_url: Url, token: String) -> Self {
        Self {
            project_name,
            api_base_url,
            token,
        }
    }

    /// Walks the release list one page at a time, in the order the API returns it, and returns the
    /// first release tagged `tag`. Pages after the one containing a match are never fetched.
    pub(crate) async fn find_release(&self, client: &Client, tag: &str) -> Result<Release> {
        let mut seen_tags = vec![];
        let mut visited = HashSet::new();
        let mut next = Some(self.release_list_url());
        let mut page = 1;

        while let Some(url) = next {
            if !visited.insert(url.clone()) {
                warn!("The release list links back to `{url}`, which was already fetched");
                break;
            }
            debug!("Getting page {page} of the release list from `{url}`");
            let resp = self.make_release_list_request(client, url.clone()).await?;
            next = next_page_url(resp.headers());
            let releases = resp
                .json::<Vec<Release>>()
                .await
                .with_context(|| format!("could not parse the release list from {url}"))?;
            debug!("Page {page} has {} releases", releases.len());

            match release::first_match(releases, tag) {
                Ok(release) => {
                    debug!("Found release `{tag}` with id {}", release.id);
                    return Ok(release);
                }
                Err(tags) => seen_tags.extend(tags),
            }
            page += 1;
        }

        Err(UploadError::ReleaseNotFound {
            tag: tag.to_string(),
            project: self.project_name.clone(),
            available: seen_tags.into_iter().unique().collect(),
        }
        .into())
    }

    async fn make_release_list_request(&self, client: &Client, url: Url) -> Result<Response> {
        let req_builder = client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        let req = self
            .add_token_header(req_builder)?
            .build()
            .with_context(|| format!("failed to build HTTP request for {url}"))?;
        let resp = client
            .execute(req)
            .await
            .with_context(|| format!("failed to execute HTTP request to {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("(could not read the response body: {e})"));
            return Err(UploadError::ReleaseListRequest { url, status, body }.into());
        }

        Ok(resp)
    }

    pub(crate) fn upload_request(
        &self,
        client: &Client,
        upload: AssetUpload<'_>,
    ) -> Result<RequestBuilder> {
        let mut query = vec![("name", upload.name)];
        if let Some(label) = upload.label {
            query.push(("label", label));
        }

        let req_builder = client
            .post(upload.endpoint)
            .query(&query)
            .header(ACCEPT, HeaderValue::from_static(GITHUB_JSON))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_str(upload.media_type)
                    .context("failed to create header value for Content-Type header")?,
            )
            .body(upload.contents);
        self.add_token_header(req_builder)
    }

    fn add_token_header(&self, req_builder: RequestBuilder) -> Result<RequestBuilder> {
        debug!("Adding token to GitHub request.");
        let bearer = format!("Bearer {}", self.token);
        let mut auth_val =
            HeaderValue::from_str(&bearer).context("the GitHub token is not a valid header value")?;
        auth_val.set_sensitive(true);
        Ok(req_builder.header(AUTHORIZATION, auth_val))
    }

    fn release_list_url(&self) -> Url {
        let mut url = self.api_base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("could not get path segments for url");
            segments.pop_if_empty().push("repos");
            for part in self.project_name.split('/') {
                segments.push(part);
            }
            segments.push("releases");
        }
        url.query_pairs_mut()
            .append_pair("per_page", RELEASES_PER_PAGE);
        url
    }
}

/// Finds the `rel="next"` target in a `Link` header, as GitHub sends for paginated lists.
fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (_, target) = regex_captures!(r#"^\s*<([^>]+)>\s*;.*\brel="?next"?"#, part)?;
        Url::parse(target).ok()
    })
}
