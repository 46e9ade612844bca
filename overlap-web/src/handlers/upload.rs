//! Reading multipart upload forms.

use crate::{Error, Result};
use actix_multipart::Multipart;
use futures::TryStreamExt;
use std::collections::HashMap;

const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct UploadConfig {
    pub max_file_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub contents: Vec<u8>,
    /// set when the file was refused while reading, contents are then empty
    pub error: Option<String>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, contents: Vec<u8>) -> Self {
        UploadedFile {
            filename: filename.into(),
            contents,
            error: None,
        }
    }

    pub fn refused(filename: impl Into<String>, error: String) -> Self {
        UploadedFile {
            filename: filename.into(),
            contents: Vec::new(),
            error: Some(error),
        }
    }
}

/// Files and plain text fields of a multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

fn limit_message(name: &str, max_bytes: usize) -> String {
    format!("{} exceeds the upload limit of {} bytes", name, max_bytes)
}

/// Drain a multipart payload. Parts carrying a filename are files, the
/// others are text fields.
///
/// A file larger than the limit is drained and kept as refused so its
/// siblings still go through; an oversized text field fails the request.
pub async fn read_form(mut payload: Multipart, cfg: &UploadConfig) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_owned();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_owned());
        let mut buf = Vec::new();
        let mut oversize = false;
        while let Some(chunk) = field.try_next().await? {
            if oversize {
                continue;
            }
            if buf.len() + chunk.len() > cfg.max_file_bytes {
                oversize = true;
                buf = Vec::new();
                continue;
            }
            buf.extend_from_slice(&chunk);
        }
        match filename {
            Some(filename) if oversize => {
                log::warn!("{}: refused, larger than {} bytes", filename, cfg.max_file_bytes);
                let error = limit_message(&filename, cfg.max_file_bytes);
                form.files.push(UploadedFile::refused(filename, error));
            }
            Some(filename) => form.files.push(UploadedFile::new(filename, buf)),
            None if oversize => {
                return Err(Error::bad_request(limit_message(&name, cfg.max_file_bytes)));
            }
            None => {
                let value = String::from_utf8(buf)
                    .map_err(|_| Error::bad_request(format!("field {} is not utf-8", name)))?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_message_in_bytes() {
        assert_eq!(
            "big.csv exceeds the upload limit of 16 bytes",
            limit_message("big.csv", 16)
        );
    }
}
