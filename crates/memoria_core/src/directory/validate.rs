//! Request validation shared by create and update.

use crate::error::AppError;
use crate::models::paste::{CreatePasteRequest, Privacy, UpdatePasteRequest};

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_content(content: &str, max_paste_size: usize) -> Result<(), AppError> {
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    if content.len() > max_paste_size {
        return Err(AppError::Validation(format!(
            "Paste size exceeds maximum of {} bytes",
            max_paste_size
        )));
    }
    Ok(())
}

/// Treat an empty password as absent.
pub(super) fn supplied_password(password: Option<&str>) -> Option<&str> {
    password.filter(|pw| !pw.is_empty())
}

/// Validate a create request.
///
/// # Returns
/// The parsed privacy tier.
///
/// # Errors
/// Returns [`AppError::Validation`] for missing fields, oversized content, an
/// unknown tier, or a password tier without a password.
pub(super) fn validate_create(
    req: &CreatePasteRequest,
    max_paste_size: usize,
) -> Result<Privacy, AppError> {
    require_text("title", &req.title)?;
    check_content(&req.content, max_paste_size)?;
    require_text("syntax_highlight", &req.syntax_highlight)?;
    let privacy: Privacy = req.privacy.parse()?;

    if privacy == Privacy::Password && supplied_password(req.password.as_deref()).is_none() {
        return Err(AppError::Validation(
            "password privacy requires a password".to_string(),
        ));
    }
    Ok(privacy)
}

/// Validate the shape of an update request before anything is loaded.
///
/// # Returns
/// The parsed privacy tier, when one was supplied.
///
/// # Errors
/// Returns [`AppError::Validation`] for blank replacement fields, oversized
/// content, an unknown tier, or a request that both sets and clears a password.
pub(super) fn validate_update(
    req: &UpdatePasteRequest,
    max_paste_size: usize,
) -> Result<Option<Privacy>, AppError> {
    if let Some(title) = &req.title {
        require_text("title", title)?;
    }
    if let Some(content) = &req.content {
        check_content(content, max_paste_size)?;
    }
    if let Some(syntax) = &req.syntax_highlight {
        require_text("syntax_highlight", syntax)?;
    }
    if req.clear_password && supplied_password(req.password.as_deref()).is_some() {
        return Err(AppError::Validation(
            "cannot set and clear a password in the same update".to_string(),
        ));
    }
    req.privacy.as_deref().map(str::parse).transpose()
}
