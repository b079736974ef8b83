//! OpenAPI documentation.
//! Paths in handler annotations use the placeholder `/files`; they are rewritten at
//! runtime to the configured storage URL segment.

use utoipa::OpenApi;

use crate::handlers;
use skinstore_core::models;

/// Segment used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/files";

/// Rewrites path keys from the placeholder segment to the configured one.
fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, segment: &str) {
    let replacement = format!("/{}", segment);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with file paths under `segment`.
pub fn get_openapi_spec(segment: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, segment);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SkinStore",
        description = "Stores PNG and JPEG files in a flat directory and serves them back by name. Names are lowercased on upload; lookups may omit the extension."
    ),
    paths(
        handlers::files::upload_file,
        handlers::files::list_files,
        handlers::files::get_file,
        handlers::files::update_file,
        handlers::files::delete_file,
    ),
    components(
        schemas(
            models::MessageResponse,
            models::UrlResponse,
            models::FileEntry,
            handlers::files::FileUpload,
        )
    ),
    tags(
        (name = "files", description = "Upload, list, download, replace and delete files")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segment_keeps_paths() {
        let spec = get_openapi_spec("files");
        assert!(spec.paths.paths.contains_key("/files"));
        assert!(spec.paths.paths.contains_key("/files/{identifier}"));
        assert_eq!(spec.info.title, "SkinStore");
    }

    #[test]
    fn test_custom_segment_rewrites_paths() {
        let spec = get_openapi_spec("skins");
        assert!(spec.paths.paths.contains_key("/skins"));
        assert!(spec.paths.paths.contains_key("/skins/{identifier}"));
        assert!(!spec.paths.paths.contains_key("/files"));
    }
}
