//! Multipart form readers for the upload endpoints

use argonaut_core::constants::DEFAULT_CONTENT_TYPE;
use argonaut_core::models::FileInfo;
use argonaut_core::AppError;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use bytes::BytesMut;

use crate::constants::{ALBUM_ID_FIELD, FILES_FIELD, FILE_FIELD, INFOS_FIELD, IS_PUBLIC_FIELD, NAME_FIELD};
use crate::services::{UploadPart, UploadRequest};

fn multipart_error(e: MultipartError) -> AppError {
    AppError::InvalidInput(format!("Failed to read multipart: {}", e))
}

/// Read a file field into memory, failing as soon as it exceeds `max_size`.
async fn read_part(mut field: Field<'_>, max_size: u64) -> Result<UploadPart, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = match field.content_type().map(str::trim) {
        Some(content_type) if !content_type.is_empty() => content_type.to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    };

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        let size = (data.len() + chunk.len()) as u64;
        if size > max_size {
            return Err(AppError::FileTooLarge {
                file_name,
                size,
                max: max_size,
            });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(UploadPart::from_bytes(file_name, content_type, data.freeze()))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

fn parse_album_id(raw: &str) -> Result<Option<i32>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("albumId must be an integer, got '{}'", raw)))
}

fn parse_bool(field: &str, raw: &str) -> Result<Option<bool>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else if raw.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(AppError::InvalidInput(format!(
            "{} must be true or false, got '{}'",
            field, raw
        )))
    }
}

/// Read the multi-file form: repeated `files` parts, optional `infos` JSON
/// array and optional `albumId`. Empty file inputs (no filename, no bytes)
/// are skipped. Unknown fields are ignored.
pub async fn read_batch_form(
    mut multipart: Multipart,
    max_file_size: u64,
) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            FILES_FIELD => {
                let part = read_part(field, max_file_size).await?;
                if part.file_name.is_empty() && part.len == 0 {
                    continue;
                }
                request.parts.push(part);
            }
            INFOS_FIELD => {
                let raw = read_text(field).await?;
                if !raw.trim().is_empty() {
                    request.infos = Some(FileInfo::parse_list(&raw)?);
                }
            }
            ALBUM_ID_FIELD => {
                request.album_id = parse_album_id(&read_text(field).await?)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Fields of the single-file form
#[derive(Debug, Default)]
pub struct SingleUploadForm {
    pub part: Option<UploadPart>,
    pub info: FileInfo,
    pub album_id: Option<i32>,
}

/// Read the single-file form: one `file` part plus optional `isPublic`
/// (default true), `name` and `albumId`.
pub async fn read_single_form(
    mut multipart: Multipart,
    max_file_size: u64,
) -> Result<SingleUploadForm, AppError> {
    let mut form = SingleUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            FILE_FIELD => {
                if form.part.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                form.part = Some(read_part(field, max_file_size).await?);
            }
            IS_PUBLIC_FIELD => {
                if let Some(flag) = parse_bool(IS_PUBLIC_FIELD, &read_text(field).await?)? {
                    form.info.is_public = flag;
                }
            }
            NAME_FIELD => {
                let name = read_text(field).await?;
                form.info.name = Some(name).filter(|n| !n.trim().is_empty());
            }
            ALBUM_ID_FIELD => {
                form.album_id = parse_album_id(&read_text(field).await?)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_id_parsing() {
        assert_eq!(parse_album_id("").unwrap(), None);
        assert_eq!(parse_album_id(" 42 ").unwrap(), Some(42));
        assert!(matches!(
            parse_album_id("forty-two"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn bool_parsing_is_case_insensitive() {
        assert_eq!(parse_bool("isPublic", "TRUE").unwrap(), Some(true));
        assert_eq!(parse_bool("isPublic", "False").unwrap(), Some(false));
        assert_eq!(parse_bool("isPublic", "").unwrap(), None);
        assert!(parse_bool("isPublic", "yes").is_err());
    }
}
