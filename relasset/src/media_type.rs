use crate::error::UploadError;
use log::debug;
use std::path::Path;

/// Guesses the media type of a file from its extension. GitHub requires a `Content-Type` on every
/// asset upload, so a file we can't classify is an error rather than `application/octet-stream`.
pub(crate) fn media_type_for(path: &Path) -> Result<String, UploadError> {
    let Some(mime) = mime_guess::from_path(path).first() else {
        return Err(UploadError::UnknownMediaType {
            path: path.to_path_buf(),
        });
    };
    debug!("media type for {} is {mime}", path.display());
    Ok(mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::image("figure.png", "image/png")]
    #[case::zip("docs.zip", "application/zip")]
    #[case::text("README.txt", "text/plain")]
    #[case::pdf("manual.pdf", "application/pdf")]
    #[case::uppercase_extension("NOTES.TXT", "text/plain")]
    #[case::with_directories("dist/some/dir/asset.json", "application/json")]
    fn known_media_types(#[case] path: &str, #[case] expect: &str) -> anyhow::Result<()> {
        assert_eq!(media_type_for(Path::new(path))?, expect);
        Ok(())
    }

    #[rstest]
    #[case::unknown_extension("asset.unknownext")]
    #[case::no_extension("LICENSE")]
    fn unknown_media_types(#[case] path: &str) {
        let res = media_type_for(Path::new(path));
        assert!(
            matches!(res, Err(UploadError::UnknownMediaType { .. })),
            "{path} has no known media type",
        );
    }
}
