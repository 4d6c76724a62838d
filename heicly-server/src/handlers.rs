//! HTTP handlers for the upload form and conversion endpoint.

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use heicly::{Converter, UploadName};
use tempfile::Builder;
use tracing::instrument;
use uuid::Uuid;

use std::fs;
use std::io::Write;

use crate::config::ServerConfig;
use crate::errors::{Error, Result};
use crate::AppState;

const UPLOAD_FORM: &str = include_str!("../templates/index.html");

pub async fn home() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        // a field named `file` without a filename is a plain form value, not a file part
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let name = UploadName::parse(&file_name)?;
        let data = field.bytes().await?;

        tracing::info!(filename = %name.original(), size = data.len(), "Received upload");
        upload = Some((name, data));
        break;
    }

    let (name, data) = upload.ok_or(Error::MissingFilePart)?;

    let config = state.config.clone();
    let converter = state.converter;
    let (name, jpeg) = tokio::task::spawn_blocking(move || {
        convert_upload(&config, &converter, &name, &data).map(|jpeg| (name, jpeg))
    })
    .await
    .context("Conversion task panicked")??;

    let disposition = format!("attachment; filename=\"{}\"", name.converted_name());
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        jpeg,
    )
        .into_response())
}

/// Round-trip one upload through the scratch directories.
///
/// The upload is saved to `upload_dir`, converted from disk into `converted_dir`
/// and the JPEG read back for the response. Both scratch files are private to
/// this request and removed on return. Their names are random; the client's name
/// only appears in the response header.
fn convert_upload(
    config: &ServerConfig,
    converter: &Converter,
    name: &UploadName,
    data: &[u8],
) -> Result<Vec<u8>> {
    let mut uploaded = Builder::new()
        .suffix(".heic")
        .tempfile_in(&config.upload_dir)
        .context("Failed to create upload file")?;
    uploaded.write_all(data).context("Failed to save upload")?;

    let converted = Builder::new()
        .suffix(".jpg")
        .tempfile_in(&config.converted_dir)
        .context("Failed to create converted file")?;

    converter
        .convert_file(uploaded.path(), converted.path())
        .map_err(|source| Error::Conversion {
            filename: name.sanitized().to_string(),
            source,
        })?;

    let jpeg = fs::read(converted.path()).context("Failed to read converted file")?;

    tracing::debug!(filename = %name.sanitized(), size = jpeg.len(), "Read back converted file");
    Ok(jpeg)
}
