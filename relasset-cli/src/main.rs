use anyhow::{Error, Result};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::{debug, error};
use relasset::{
    prompt_for_token, Uploader, UploaderBuilder, DEFAULT_API_BASE_URL, DEFAULT_OWNER,
    DEFAULT_PACKAGE, TOKEN_ENV_VAR,
};
use thiserror::Error;

#[derive(Debug, Error)]
enum RelassetError {
    #[error("{0:}")]
    InvalidArgsError(String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cmd = cmd();
    let matches = cmd.get_matches();
    let res = init_logger_from_matches(&matches);
    if let Err(e) = res {
        eprintln!("Error creating logger: {e}");
        std::process::exit(126);
    }

    let status = match make_uploader(&matches) {
        Ok(u) => match u.upload_asset().await {
            // Once the upload has been attempted, the outcome is reported but never turned into a
            // failing exit status.
            Ok(outcome) => {
                debug!("upload outcome: {outcome:?}");
                println!("{outcome}");
                0
            }
            Err(e) => {
                print_err(&e);
                1
            }
        },
        Err(e) => {
            print_err(&e);
            127
        }
    };
    std::process::exit(status);
}

const MAX_TERM_WIDTH: usize = 100;

fn cmd() -> Command {
    Command::new("relasset")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Brad Aagaard <baagaard@usgs.gov>")
        .about("Upload a file as an asset to a GitHub release")
        .arg(
            Arg::new("set-token")
                .long("set-token")
                .action(ArgAction::SetTrue)
                .help(concat!(
                    "Prompt for a GitHub personal access token instead of reading it from the",
                    " GITHUB_TOKEN env var. What you type is not echoed, and the token is only",
                    " used for this run.",
                )),
        )
        .arg(
            Arg::new("upload")
                .long("upload")
                .short('u')
                .help("The file to upload."),
        )
        .arg(
            Arg::new("release")
                .long("release")
                .short('r')
                .help("The tag of the release to upload to. This must match the tag exactly."),
        )
        .arg(
            Arg::new("package")
                .long("package")
                .short('p')
                .default_value(DEFAULT_PACKAGE)
                .help("The name of the repository that the release belongs to."),
        )
        .arg(
            Arg::new("owner")
                .long("owner")
                .short('o')
                .default_value(DEFAULT_OWNER)
                .help("The user or organization that owns the repository."),
        )
        .arg(Arg::new("name").long("name").help(concat!(
            "The name to give the asset in the release. Defaults to the file name of the file",
            " being uploaded, without any directories.",
        )))
        .arg(
            Arg::new("label")
                .long("label")
                .help("A label for the asset, shown instead of its name on the release page."),
        )
        .arg(
            Arg::new("api-base-url")
                .long("api-base-url")
                .default_value(DEFAULT_API_BASE_URL)
                .help(concat!(
                    "The base URL for the GitHub API. This is useful for testing or if you want to",
                    " operate against GitHub Enterprise. This should be something like",
                    " `https://github.my-corp.example.com/api/v3`.",
                )),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output."),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debugging output."),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppresses most output."),
        )
        .group(ArgGroup::new("log-level").args(["verbose", "debug", "quiet"]))
        .max_term_width(MAX_TERM_WIDTH)
}

pub(crate) fn init_logger_from_matches(matches: &ArgMatches) -> Result<(), log::SetLoggerError> {
    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else if matches.get_flag("verbose") {
        log::LevelFilter::Info
    } else if matches.get_flag("quiet") {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };

    relasset::init_logger(level)
}

fn make_uploader(matches: &ArgMatches) -> Result<Uploader> {
    validate_args(matches)?;

    let token = if matches.get_flag("set-token") {
        Some(prompt_for_token()?)
    } else {
        debug!("reading the token from the {TOKEN_ENV_VAR} env var");
        None
    };

    let mut builder = UploaderBuilder::new();
    if let Some(f) = matches.get_one::<String>("upload") {
        builder = builder.file(f);
    }
    if let Some(r) = matches.get_one::<String>("release") {
        builder = builder.tag(r);
    }
    if let Some(p) = matches.get_one::<String>("package") {
        builder = builder.package(p);
    }
    if let Some(o) = matches.get_one::<String>("owner") {
        builder = builder.owner(o);
    }
    if let Some(n) = matches.get_one::<String>("name") {
        builder = builder.asset_name(n);
    }
    if let Some(l) = matches.get_one::<String>("label") {
        builder = builder.label(l);
    }
    if let Some(url) = matches.get_one::<String>("api-base-url") {
        builder = builder.api_base_url(url);
    }
    if let Some(t) = token.as_deref() {
        builder = builder.token(t);
    }

    builder.build()
}

fn validate_args(matches: &ArgMatches) -> Result<()> {
    for (a, what) in [("upload", "a file"), ("release", "a release tag")] {
        if !matches.contains_id(a) {
            return Err(RelassetError::InvalidArgsError(format!(
                "You must pass {what} with --{a}."
            ))
            .into());
        }
    }

    Ok(())
}

fn print_err(e: &Error) {
    error!("{e}");
    if let Some(re) = e.downcast_ref::<RelassetError>() {
        match re {
            RelassetError::InvalidArgsError(_) => {
                println!();
                let _ = cmd().print_help();
            }
        }
    }
}
