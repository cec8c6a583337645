// src/media.rs
//! Avatar files: local validation, upload to the media host, delivery URLs

use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};

use crate::core::ServiceClient;
use crate::error::ClientError;
use crate::types::response::UploadedImage;
use crate::utils::{get_file_extension, image_mime_type};

pub const MAX_AVATAR_BYTES: u64 = 10 * 1024 * 1024;
pub const EMPTY_AVATAR: &str = "assets/empty-avatar.png";
const MEDIA_DELIVERY_HOST: &str = "https://res.cloudinary.com";

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Error)]
#[error("{message} ({})", .error_type.code())]
pub struct ImageValidationError {
    pub path: PathBuf,
    pub error_type: ImageErrorType,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageErrorType {
    FileNotFound,
    CorruptedFile,
    WrongFormat,
    EmptyFile,
    TooLarge,
    UnreadableFile,
}

impl ImageErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound => "IMAGE_NOT_FOUND",
            Self::CorruptedFile => "IMAGE_CORRUPTED",
            Self::WrongFormat => "IMAGE_WRONG_FORMAT",
            Self::EmptyFile => "IMAGE_EMPTY",
            Self::TooLarge => "IMAGE_TOO_LARGE",
            Self::UnreadableFile => "IMAGE_UNREADABLE",
        }
    }
}

impl ImageValidationError {
    fn new(path: &Path, error_type: ImageErrorType, message: impl Into<String>, suggestion: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            error_type,
            message: message.into(),
            suggestion: suggestion.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid avatar: {0}")]
    Invalid(#[from] ImageValidationError),

    #[error("upload failed: {0}")]
    Upload(#[from] ClientError),
}

/// An avatar that passed validation, ready to be sent
#[derive(Debug, Clone)]
pub struct AvatarFile {
    pub file_name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    pub fn mime_type(&self) -> &'static str {
        image_mime_type(&self.extension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(PNG_SIGNATURE) {
            Some(Self::Png)
        } else if header.starts_with(JPEG_SIGNATURE) {
            Some(Self::Jpeg)
        } else if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if header.len() >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Webp => "WEBP",
        }
    }
}

/// Check an avatar file before upload and return its contents
pub async fn validate_avatar_file(path: &Path) -> Result<AvatarFile, ImageValidationError> {
    if !path.exists() {
        return Err(ImageValidationError::new(
            path,
            ImageErrorType::FileNotFound,
            format!("Image file not found: {}", path.display()),
            "Check the path and try again",
        ));
    }

    let metadata = fs::metadata(path).await.map_err(|_| {
        ImageValidationError::new(
            path,
            ImageErrorType::UnreadableFile,
            "Cannot read image file metadata",
            "Check file permissions",
        )
    })?;

    if metadata.len() == 0 {
        return Err(ImageValidationError::new(
            path,
            ImageErrorType::EmptyFile,
            "Image file is empty",
            "Please choose a valid image file",
        ));
    }

    if metadata.len() > MAX_AVATAR_BYTES {
        return Err(ImageValidationError::new(
            path,
            ImageErrorType::TooLarge,
            format!(
                "Image file too large: {:.1}MB (max 10MB)",
                metadata.len() as f64 / 1024.0 / 1024.0
            ),
            "Please resize or compress your image and try again",
        ));
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let extension = get_file_extension(&file_name).unwrap_or_default();
    let Some(expected) = ImageFormat::from_extension(&extension) else {
        return Err(ImageValidationError::new(
            path,
            ImageErrorType::WrongFormat,
            "Unsupported image format",
            "Please use PNG, JPEG, GIF or WEBP",
        ));
    };

    let bytes = fs::read(path).await.map_err(|e| {
        ImageValidationError::new(
            path,
            ImageErrorType::UnreadableFile,
            format!("Cannot read image file: {}", e),
            "Check file permissions",
        )
    })?;

    if bytes.len() < 8 {
        return Err(ImageValidationError::new(
            path,
            ImageErrorType::CorruptedFile,
            "Image file too small or corrupted",
            "Please choose a valid image file",
        ));
    }

    match ImageFormat::sniff(&bytes) {
        Some(actual) if actual == expected => Ok(AvatarFile {
            file_name,
            extension,
            bytes,
        }),
        Some(actual) => Err(ImageValidationError::new(
            path,
            ImageErrorType::WrongFormat,
            format!(
                "File is {} but has .{} extension",
                actual.name(),
                extension
            ),
            "Rename the file to match its format",
        )),
        None => Err(ImageValidationError::new(
            path,
            ImageErrorType::CorruptedFile,
            format!("Invalid {} file - corrupted or wrong format", expected.name()),
            "Please choose a valid image file",
        )),
    }
}

/// Rewrite a hosted avatar URL into an optimized delivery URL.
///
/// Empty URLs map to the placeholder avatar and URLs from other hosts pass
/// through untouched.
pub fn optimize_avatar_url(url: &str, cloud_name: &str) -> String {
    if url.is_empty() {
        return EMPTY_AVATAR.to_string();
    }
    if !url.contains(MEDIA_DELIVERY_HOST) {
        return url.to_string();
    }

    let upload_prefix = format!("{}/{}/image/upload/", MEDIA_DELIVERY_HOST, cloud_name);
    let mut public_id = url.replacen(&upload_prefix, "", 1);

    if let Some(rest) = strip_version(&public_id) {
        public_id = rest.to_string();
    }
    if let Some(dot) = public_id.rfind('.') {
        public_id.truncate(dot);
    }

    format!(
        "{}/{}/image/upload/f_auto/q_auto:best/{}",
        MEDIA_DELIVERY_HOST, cloud_name, public_id
    )
}

/// Drop a leading `v<digits>` version segment
fn strip_version(public_id: &str) -> Option<&str> {
    let rest = public_id.strip_prefix('v')?;
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &rest[digits..];
    Some(rest.strip_prefix('/').unwrap_or(rest))
}

pub struct MediaClient {
    api: Arc<ServiceClient>,
    upload_url: String,
    upload_preset: String,
}

impl MediaClient {
    pub fn new(api: Arc<ServiceClient>, upload_url: &str, upload_preset: &str) -> Self {
        Self {
            api,
            upload_url: upload_url.to_string(),
            upload_preset: upload_preset.to_string(),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Validate and upload an avatar; returns the hosted image
    pub async fn upload_avatar(&self, path: &Path) -> Result<UploadedImage, MediaError> {
        let avatar = validate_avatar_file(path).await.map_err(|e| {
            error!("Avatar validation failed: {}", e);
            e
        })?;

        info!(
            "Uploading avatar {} ({} bytes)",
            avatar.file_name,
            avatar.bytes.len()
        );

        let mime = avatar.mime_type();
        let part = Part::bytes(avatar.bytes)
            .file_name(avatar.file_name)
            .mime_str(mime)
            .map_err(ClientError::Transport)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let uploaded: UploadedImage = self.api.post_multipart(&self.upload_url, form).await?;
        info!("Avatar uploaded: {}", uploaded.secure_url);
        Ok(uploaded)
    }
}
