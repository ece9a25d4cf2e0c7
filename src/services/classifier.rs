//! 텀블러 이미지 분류 서비스
//!
//! # Design Decision
//!
//! 외부 YOLO 분류 서버(/predict)는 지연·장애가 흔한 협력자라서:
//! - 요청마다 고정 타임아웃을 걸어 UI가 무한 대기하지 않게 함
//! - 네트워크 오류/타임아웃/비2xx는 "검증 불가"로 보고, 명시적으로
//!   표시된(mocked) 목업 결과로 대체함 - "인증 실패"와는 다른 상태지만
//!   둘 다 통계를 바꾸지 않음 (검증 불가가 하루 슬롯을 소비하면 안 됨)
//! - 서버가 응답했지만 success 필드가 없는 변형 응답은
//!   confidence/detected에서 성공 여부를 유도 (원 클라이언트와 동일)

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// 분류 결과
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// 텀블러로 판정됐는지
    pub success: bool,
    /// 사용자에게 보여줄 메시지
    pub message: String,
    /// 신뢰도 (0..1, 서버가 주지 않으면 None)
    pub confidence: Option<f64>,
    /// 탐지된 객체 라벨
    pub detected: Vec<String>,
    /// 분류 서버 불가로 목업 결과가 반환됐는지
    pub mocked: bool,
}

/// YOLO 서버 응답 (필드 구성이 배포 버전마다 조금씩 다름)
#[derive(Debug, Deserialize)]
struct PredictResponse {
    success: Option<bool>,
    message: Option<String>,
    confidence: Option<f64>,
    score: Option<f64>,
    detected: Option<Vec<String>>,
    error: Option<String>,
}

/// 텀블러 분류 클라이언트
pub struct CupClassifier {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl CupClassifier {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(timeout_ms),
            client: reqwest::Client::new(),
        }
    }

    /// 이미지 분류
    ///
    /// 절대 실패하지 않음: 분류 서버에 닿지 못하면 목업 결과로 대체하고
    /// `mocked = true`로 표시함. 호출자는 이 플래그를 응답에 그대로 노출.
    /// 목업 결과는 항상 `success = false` - "검증 불가"는 기록만 남고
    /// 통계(LP, 스트릭, 하루 1회 슬롯)를 절대 소비하지 않음.
    pub async fn classify(&self, image: Vec<u8>, filename: &str) -> Classification {
        match tokio::time::timeout(self.timeout, self.call_predict(image, filename)).await {
            Ok(Ok(classification)) => classification,
            Ok(Err(err)) => {
                tracing::warn!("분류 서버 호출 실패, 목업 결과로 대체: {:?}", err);
                Self::mock_result()
            }
            Err(_) => {
                tracing::warn!(
                    "분류 서버 응답 없음 ({}ms 초과), 목업 결과로 대체",
                    self.timeout.as_millis()
                );
                Self::mock_result()
            }
        }
    }

    async fn call_predict(&self, image: Vec<u8>, filename: &str) -> Result<Classification> {
        let part = reqwest::multipart::Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("YOLO 서버 응답 오류: {}", response.status());
        }

        let prediction: PredictResponse = response.json().await?;
        Ok(interpret_prediction(prediction))
    }

    fn mock_result() -> Classification {
        Classification {
            success: false,
            message: "목업 텀블러 인증 결과입니다. 분류 서버에 연결할 수 없어 이번 시도는 집계되지 않았어요.".to_string(),
            confidence: None,
            detected: Vec::new(),
            mocked: true,
        }
    }
}

/// 서버 응답을 분류 결과로 해석
///
/// success 필드가 없으면 confidence >= 0.5, 그것도 없으면
/// detected에 "tumbler"가 있는지로 판정
fn interpret_prediction(prediction: PredictResponse) -> Classification {
    let confidence = prediction.confidence.or(prediction.score);
    let detected = prediction.detected.unwrap_or_default();

    let success = prediction.success.unwrap_or_else(|| match confidence {
        Some(c) => c >= 0.5,
        None => detected.iter().any(|label| label == "tumbler"),
    });

    let message = prediction
        .message
        .or(prediction.error)
        .unwrap_or_else(|| {
            if success {
                "텀블러 인증을 완료했어요!".to_string()
            } else {
                "텀블러로 인식되지 않았어요.".to_string()
            }
        });

    Classification {
        success,
        message,
        confidence,
        detected,
        mocked: false,
    }
}
