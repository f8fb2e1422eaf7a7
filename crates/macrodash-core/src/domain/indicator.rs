//! 매크로 지표 데이터 타입 및 구조체.
//!
//! 이 모듈은 지표 데이터 관련 타입을 정의합니다:
//! - `TimeSeriesPoint` - 날짜가 부여된 시계열 관측치 (SGS, 가격 히스토리)
//! - `QuotePoint` - 실시간 시세 스냅샷 (BRAPI)
//! - `ExpectationPoint` - 시장 기대치 관측치 (BCB Olinda)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 시각을 초 단위 정밀도 ISO-8601 UTC 문자열로 포맷합니다.
///
/// 서비스의 모든 타임스탬프는 이 형식(`2026-08-25T14:03:07Z`)을 씁니다.
pub fn format_iso_seconds(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// 현재 시각의 ISO-8601 UTC 문자열을 반환합니다.
pub fn iso_now() -> String {
    format_iso_seconds(Utc::now())
}

/// 날짜가 부여된 시계열 관측치.
///
/// SGS 시계열과 BRAPI 가격 히스토리 모두 이 형태로 정규화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 관측 날짜
    pub date: NaiveDate,
    /// 관측값
    pub value: f64,
}

impl TimeSeriesPoint {
    /// 새 관측치를 생성합니다.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// 관측 날짜를 자정 기준 ISO-8601 UTC 타임스탬프로 반환합니다.
    ///
    /// 일 단위 시계열에는 시각 정보가 없으므로 `T00:00:00Z`를 붙입니다.
    pub fn iso_midnight(&self) -> String {
        format!("{}T00:00:00Z", self.date.format("%Y-%m-%d"))
    }
}

/// 실시간 시세 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePoint {
    /// 현재가
    pub value: f64,
    /// 전일 대비 변동 (절대값)
    pub change_abs: Option<f64>,
    /// 전일 대비 변동률 (%)
    pub change_pct: Option<f64>,
    /// 시세 타임스탬프 (ISO-8601 UTC)
    pub last_update: String,
}

/// 시장 기대치 관측치.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationPoint {
    /// 기대치 값 (중위값)
    pub value: f64,
    /// 관측 타임스탬프 (ISO-8601 UTC)
    pub last_update: String,
    /// 선택된 원본 행 (디버깅/표시용)
    pub raw: serde_json::Value,
}

/// 시계열의 마지막 관측치와 직전 관측치를 반환합니다.
///
/// # 반환
///
/// 관측치가 2개 미만이면 `(None, None)`. 직전 값 없이 마지막 값만으로는
/// 변동을 계산할 수 없으므로 단일 관측치도 `(None, None)`으로 처리합니다.
pub fn last_and_prev(points: &[TimeSeriesPoint]) -> (Option<&TimeSeriesPoint>, Option<&TimeSeriesPoint>) {
    if points.len() < 2 {
        return (None, None);
    }
    (points.last(), points.get(points.len() - 2))
}

/// 시계열에서 관측값만 추출합니다.
pub fn series_values(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            value,
        )
    }

    #[test]
    fn test_last_and_prev() {
        let points = vec![point(1, 10.0), point(2, 11.0), point(3, 12.0)];
        let (last, prev) = last_and_prev(&points);
        assert_eq!(last.unwrap().value, 12.0);
        assert_eq!(prev.unwrap().value, 11.0);
    }

    #[test]
    fn test_last_and_prev_too_short() {
        let single = [point(1, 10.0)];
        let (last, prev) = last_and_prev(&single);
        assert!(last.is_none());
        assert!(prev.is_none());

        let (last, prev) = last_and_prev(&[]);
        assert!(last.is_none());
        assert!(prev.is_none());
    }

    #[test]
    fn test_iso_midnight() {
        assert_eq!(point(5, 1.0).iso_midnight(), "2024-01-05T00:00:00Z");
    }

    #[test]
    fn test_series_values() {
        let points = vec![point(1, 10.0), point(2, 11.5)];
        assert_eq!(series_values(&points), vec![10.0, 11.5]);
    }

    #[test]
    fn test_format_iso_seconds() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(14, 3, 7)
            .unwrap()
            .and_utc();
        assert_eq!(format_iso_seconds(at), "2024-06-01T14:03:07Z");
    }
}
