//! A library for uploading files as assets to a GitHub release.
//!
//! Given a release tag and a repository, `relasset` looks up the release with that tag, works out
//! where its assets are uploaded to, and sends a local file there with the right `Content-Type`.
//!
//! This project also ships a CLI tool named `relasset`. See [the project's GitHub
//! repo](https://github.com/baagaard-usgs/relasset) for more details on using this tool.
//!
//! The main entry point for programmatic use is the [`UploaderBuilder`] struct. Here is an example
//! of its usage:
//!
//! ```ignore
//! use relasset::UploaderBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let uploader = UploaderBuilder::new()
//!         .owner("baagaard-usgs")
//!         .package("geomodelgrids")
//!         .tag("v1.0.0")
//!         .file("geomodelgrids-1.0.0.tar.gz")
//!         .build()?;
//!
//!     let outcome = uploader.upload_asset().await?;
//!     println!("{outcome}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Credentials
//!
//! Every request is authenticated with a GitHub token. You can pass one to
//! [`UploaderBuilder::token`], for example one obtained from [`prompt_for_token`]. If you don't,
//! the token is taken from the `GITHUB_TOKEN` env var. If neither is available,
//! [`UploaderBuilder::build`] fails before anything is sent over the network.
//!
//! ## How the Upload Works
//!
//! First, the release list for the repository is fetched, following pagination links until a
//! release whose tag is exactly the requested tag is found. The first such release wins. If no
//! release matches, the error lists every tag that was seen.
//!
//! Next, the release's `upload_url` is stripped of its URI template suffix and the file is posted
//! there. Once the upload request has been sent, problems are no longer returned as errors.
//! Instead, [`Uploader::upload_asset`] returns an [`UploadOutcome`] describing what happened.
//! GitHub does not overwrite assets, so if an asset with the same name already exists, you must
//! delete it before uploading again.
//!
//! ## Features
//!
//! This crate offers several features to control the TLS dependency used by `reqwest`:
//!
#![doc = document_features::document_features!()]

mod builder;
mod error;
mod github;
mod media_type;
mod release;
mod token;
mod uploader;

pub use crate::{
    builder::{UploaderBuilder, DEFAULT_OWNER, DEFAULT_PACKAGE},
    error::UploadError,
    github::DEFAULT_API_BASE_URL,
    release::Release,
    token::{prompt_for_token, TOKEN_ENV_VAR},
    uploader::{UploadOutcome, Uploader},
};

// The version of the `relasset` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "logging")]
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};

/// This function initializes logging for the application. It's public for the sake of the
/// `relasset` binary, but it lives in the library crate so that test code can also enable logging.
///
/// # Errors
///
/// This can return a `log::SetLoggerError` error.
#[cfg(feature = "logging")]
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let line_colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::BrightBlack)
        .debug(Color::BrightBlack)
        .trace(Color::BrightBlack);
    let level_colors = line_colors.info(Color::Green).debug(Color::Black);

    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{color_line}[{target}][{level}{color_line}] {message}\x1B[0m",
                color_line = format_args!(
                    "\x1B[{}m",
                    line_colors.get_color(&record.level()).to_fg_str()
                ),
                target = record.target(),
                level = level_colors.color(record.level()),
                message = message,
            ));
        })
        .level(level)
        // This is very noisy.
        .level_for("hyper", log::LevelFilter::Error)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
}
