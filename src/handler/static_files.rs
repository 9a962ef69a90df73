//! Static file serving module
//!
//! Loads files from the configured directory and builds cacheable responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::StaticConfig;
use crate::http::{self, cache, mime};
use crate::logger;

/// Static asset directory with its cache directives
#[derive(Debug, Clone)]
pub struct StaticAssets {
    dir: PathBuf,
    index_files: Vec<String>,
    cache_control: Option<String>,
    /// Subdirectory that is never served, relative to `dir`
    reserved: Option<String>,
}

impl StaticAssets {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            index_files: config.index_files.clone(),
            cache_control: config.cache_control.clone(),
            reserved: None,
        }
    }

    /// Refuse files under the URL prefix `public_path`, "/" reserves nothing
    #[must_use]
    pub fn reserving(mut self, public_path: &str) -> Self {
        let prefix = public_path.trim_matches('/');
        self.reserved = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// Serve `path` if it names a file inside the directory
    ///
    /// Returns `None` when there is nothing to serve, so the caller can
    /// fall through to page rendering.
    pub async fn serve(
        &self,
        path: &str,
        if_none_match: Option<&str>,
        is_head: bool,
    ) -> Option<Response<Full<Bytes>>> {
        let (content, content_type) = self.load(path).await?;
        let etag = cache::generate_etag(&content);

        if cache::check_etag_match(if_none_match, &etag) {
            return Some(http::build_304_response(&etag));
        }

        Some(http::build_static_response(
            Bytes::from(content),
            content_type,
            &etag,
            self.cache_control.as_deref(),
            is_head,
        ))
    }

    /// Load a file with index file support
    pub async fn load(&self, path: &str) -> Option<(Vec<u8>, &'static str)> {
        // Security: ensure file_path is within the static dir
        let Ok(dir_canonical) = self.dir.canonicalize() else {
            // No static dir configured on disk is a normal setup
            return None;
        };

        let relative_path = path.trim_start_matches('/');
        let mut file_path = dir_canonical.join(relative_path);

        // Check if path is a directory, try index files
        if file_path.is_dir() {
            file_path = self
                .index_files
                .iter()
                .map(|index| file_path.join(index))
                .find(|candidate| candidate.is_file())?;
        }

        // File not found is common (fall through), no need to log
        let file_path_canonical = file_path.canonicalize().ok()?;
        if !file_path_canonical.starts_with(&dir_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                file_path_canonical.display()
            ));
            return None;
        }
        if let Some(reserved) = &self.reserved {
            if file_path_canonical.starts_with(dir_canonical.join(reserved)) {
                logger::log_warning(&format!("Reserved asset path refused: {path}"));
                return None;
            }
        }
        if !file_path_canonical.is_file() {
            return None;
        }

        let content = match fs::read(&file_path_canonical).await {
            Ok(c) => c,
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {}",
                    file_path_canonical.display(),
                    e
                ));
                return None;
            }
        };

        let content_type = mime::get_content_type(extension(&file_path_canonical));
        Some((content, content_type))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
