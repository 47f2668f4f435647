use anyhow::Result;
use mockito::{Matcher, Server, ServerGuard};
use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};
use tempfile::TempDir;

const TOKEN: &str = "ghp_fakeToken";

const REMINDER: &str =
    "Did you remember to delete any existing assets with the same name before uploading?";

struct Fixture {
    server: ServerGuard,
    td: TempDir,
}

impl Fixture {
    fn new() -> Result<Self> {
        Ok(Fixture {
            server: Server::new(),
            td: TempDir::new()?,
        })
    }

    fn asset(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.td.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    fn mock_release_list(&mut self) -> mockito::Mock {
        let url = self.server.url();
        let body = format!(
            r#"[
                {{"id": 1, "tag_name": "v1.0", "upload_url": "{url}/uploads/1/assets{{?name,label}}"}},
                {{"id": 2, "tag_name": "v2.0", "upload_url": "{url}/uploads/2/assets{{?name,label}}"}}
            ]"#,
        );
        self.server
            .mock("GET", "/repos/baagaard-usgs/geomodelgrids/releases")
            .match_query(Matcher::Any)
            .match_header("Authorization", format!("Bearer {TOKEN}").as_str())
            .with_status(200)
            .with_body(body)
            .create()
    }

    fn run(&self, args: &[&str], token: Option<&str>) -> Result<Output> {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_relasset"));
        cmd.args(args)
            .args(["--api-base-url", &self.server.url()])
            .current_dir(self.td.path())
            .env_remove("GITHUB_TOKEN");
        if let Some(token) = token {
            cmd.env("GITHUB_TOKEN", token);
        }
        Ok(cmd.output()?)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn upload_prints_download_url() -> Result<()> {
    let mut fixture = Fixture::new()?;
    let asset = fixture.asset("notes.txt", "release notes")?;
    let list = fixture.mock_release_list();
    let download_url =
        "https://github.com/baagaard-usgs/geomodelgrids/releases/download/v2.0/notes.txt";
    let upload = fixture
        .server
        .mock("POST", "/uploads/2/assets")
        .match_query(Matcher::UrlEncoded("name".into(), "notes.txt".into()))
        .match_header("Content-Type", "text/plain")
        .match_body("release notes")
        .with_status(201)
        .with_body(format!(r#"{{"browser_download_url": "{download_url}"}}"#))
        .create();

    let output = fixture.run(
        &["--upload", &path_arg(&asset), "--release", "v2.0"],
        Some(TOKEN),
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert_eq!(
        stdout.trim_end(),
        format!("Upload complete. Download URL: {download_url}"),
    );

    list.assert();
    upload.assert();
    Ok(())
}

#[test]
fn rejected_upload_still_exits_zero() -> Result<()> {
    let mut fixture = Fixture::new()?;
    let asset = fixture.asset("notes.txt", "release notes")?;
    let _list = fixture.mock_release_list();
    let _upload = fixture
        .server
        .mock("POST", "/uploads/1/assets")
        .match_query(Matcher::Any)
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create();

    let output = fixture.run(
        &["--upload", &path_arg(&asset), "--release", "v1.0"],
        Some(TOKEN),
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Validation Failed"), "stdout: {stdout}");
    assert!(stdout.contains(REMINDER), "stdout: {stdout}");
    Ok(())
}

#[test]
fn unknown_release_lists_available_tags() -> Result<()> {
    let mut fixture = Fixture::new()?;
    let asset = fixture.asset("notes.txt", "release notes")?;
    let _list = fixture.mock_release_list();
    let upload = fixture.server.mock("POST", Matcher::Any).expect(0).create();

    let output = fixture.run(
        &["--upload", &path_arg(&asset), "--release", "v9.9"],
        Some(TOKEN),
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("v9.9"), "stderr: {stderr}");
    assert!(stderr.contains("\tv1.0"), "stderr: {stderr}");
    assert!(stderr.contains("\tv2.0"), "stderr: {stderr}");

    upload.assert();
    Ok(())
}

#[test]
fn missing_token_fails_without_requests() -> Result<()> {
    let mut fixture = Fixture::new()?;
    let asset = fixture.asset("notes.txt", "release notes")?;
    let list = fixture.server.mock("GET", Matcher::Any).expect(0).create();

    let output = fixture.run(&["--upload", &path_arg(&asset), "--release", "v1.0"], None)?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(127), "stderr: {stderr}");
    assert!(stderr.contains("GITHUB_TOKEN"), "stderr: {stderr}");

    list.assert();
    Ok(())
}

#[test]
fn unknown_media_type_fails_without_requests() -> Result<()> {
    let mut fixture = Fixture::new()?;
    let asset = fixture.asset("asset.unknownext", "???")?;
    let list = fixture.server.mock("GET", Matcher::Any).expect(0).create();

    let output = fixture.run(
        &["--upload", &path_arg(&asset), "--release", "v1.0"],
        Some(TOKEN),
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(127), "stderr: {stderr}");
    assert!(stderr.contains("unknown media type"), "stderr: {stderr}");

    list.assert();
    Ok(())
}

#[test]
fn missing_release_arg_prints_help() -> Result<()> {
    let fixture = Fixture::new()?;
    let output = fixture.run(&["--upload", "notes.txt"], Some(TOKEN))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr.contains("--release"), "stderr: {stderr}");
    assert!(stdout.contains("Usage:"), "stdout: {stdout}");
    Ok(())
}
