//! Request guards applied before any tool sees a call.

use crate::errors::AppError;
use axum::http::{header, HeaderMap};

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub fn require_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

pub fn origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|v| v.to_str().ok())
}

pub fn check_origin(headers: &HeaderMap, allowed: &[String]) -> Result<(), AppError> {
    let origin = origin(headers).ok_or(AppError::OriginDenied)?;
    if allowed.iter().any(|o| o == origin) {
        Ok(())
    } else {
        Err(AppError::OriginDenied)
    }
}

/// Rejects early on a declared length; the body limit layer covers the rest.
pub fn content_length_ok(headers: &HeaderMap, max_kb: usize) -> Result<(), AppError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok());
    match declared {
        Some(len) if len > max_kb * 1024 => Err(AppError::RequestTooLarge),
        _ => Ok(()),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
