//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use serde::{Deserialize, Serialize};

/// API 응답 래퍼
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// 사용자 ID 타입
///
/// 외부 인증 제공자(Firebase Auth)가 발급한 불투명 문자열 -
/// 형식은 검증하지 않고 비어있거나 비정상적으로 긴 값만 거름
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub const MAX_LEN: usize = 128;

    pub fn new(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("User id must not be empty".to_string());
        }
        if raw.len() > Self::MAX_LEN {
            return Err("User id is too long".to_string());
        }
        if raw.chars().any(char::is_whitespace) {
            return Err("User id must not contain whitespace".to_string());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
