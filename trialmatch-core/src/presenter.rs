//! Ánh xạ điểm số và lý do ghép sang dạng hiển thị.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Ngưỡng dưới (bao gồm) của hạng Excellent.
pub const EXCELLENT_THRESHOLD: f64 = 70.0;
/// Ngưỡng dưới (bao gồm) của hạng Good.
pub const GOOD_THRESHOLD: f64 = 50.0;

pub const POSITIVE_MARKER: char = '✓';
pub const NEGATIVE_MARKER: char = '✗';

/// Số mục tối đa hiển thị cho danh sách bệnh lý/thuốc ở trang chi tiết.
pub const DETAIL_LIST_LIMIT: usize = 5;
/// Độ dài tối đa tiêu đề thử nghiệm trên thẻ kết quả.
pub const TITLE_EXCERPT_CHARS: usize = 80;
/// Độ dài tối đa đoạn tiêu chí tuyển chọn.
pub const CRITERIA_EXCERPT_CHARS: usize = 400;

const TRIAL_REGISTRY_URL: &str = "https://clinicaltrials.gov/study";

/// Hạng chất lượng của một kết quả ghép.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
}

impl ScoreTier {
    /// Điểm ngoài [0, 100] hoặc NaN vẫn được xếp hạng, NaN rơi vào `Fair`.
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            ScoreTier::Excellent
        } else if score >= GOOD_THRESHOLD {
            ScoreTier::Good
        } else {
            ScoreTier::Fair
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
        }
    }

    pub fn color_class(self) -> ColorClass {
        match self {
            ScoreTier::Excellent => ColorClass {
                background: "score-bg-excellent",
                text: "score-text-excellent",
            },
            ScoreTier::Good => ColorClass {
                background: "score-bg-good",
                text: "score-text-good",
            },
            ScoreTier::Fair => ColorClass {
                background: "score-bg-fair",
                text: "score-text-fair",
            },
        }
    }
}

/// Cặp lớp CSS (nền, chữ) cho huy hiệu điểm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorClass {
    pub background: &'static str,
    pub text: &'static str,
}

impl ColorClass {
    pub fn classes(&self) -> String {
        format!("{} {}", self.background, self.text)
    }
}

pub fn tier(score: f64) -> &'static str {
    ScoreTier::from_score(score).label()
}

pub fn color_class(score: f64) -> ColorClass {
    ScoreTier::from_score(score).color_class()
}

/// Lý do đã bỏ ký hiệu cực tính.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecodedReason {
    pub is_positive: bool,
    pub text: String,
}

/// Lý do không có ký hiệu nào được coi là chưa xác nhận (`is_positive = false`).
pub fn decode_reason(reason: &str) -> DecodedReason {
    let is_positive = reason.contains(POSITIVE_MARKER);
    let text = reason
        .chars()
        .filter(|c| *c != POSITIVE_MARKER && *c != NEGATIVE_MARKER)
        .collect::<String>()
        .trim()
        .to_string();

    DecodedReason { is_positive, text }
}

pub fn trial_url(nct_id: &str) -> String {
    format!("{TRIAL_REGISTRY_URL}/{nct_id}")
}

/// Cắt `text` còn `max_chars` ký tự và thêm `...` khi bị cắt.
pub fn excerpt(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Số liệu vắng mặt hiển thị là `0`; số nguyên không kèm phần thập phân.
pub fn format_metric(value: Option<f64>) -> String {
    let value = value.unwrap_or(0.0);
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Phần đầu danh sách được hiển thị và số mục còn ẩn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated<'a> {
    pub shown: &'a [String],
    pub hidden: usize,
}

impl Truncated<'_> {
    pub fn more_label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("and {} more", self.hidden))
    }
}

pub fn truncate_list(items: &[String], limit: usize) -> Truncated<'_> {
    let shown = &items[..items.len().min(limit)];
    Truncated {
        shown,
        hidden: items.len() - shown.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_at_lower_bound() {
        assert_eq!(tier(70.0), "Excellent");
        assert_eq!(tier(69.0), "Good");
        assert_eq!(tier(50.0), "Good");
        assert_eq!(tier(49.0), "Fair");
        assert_eq!(tier(100.0), "Excellent");
        assert_eq!(tier(0.0), "Fair");
        assert_eq!(tier(69.99), "Good");
    }

    #[test]
    fn out_of_range_scores_are_best_effort() {
        assert_eq!(tier(150.0), "Excellent");
        assert_eq!(tier(-5.0), "Fair");
        assert_eq!(tier(f64::NAN), "Fair");
    }

    #[test]
    fn color_class_tracks_tier() {
        for score in [0.0, 49.0, 50.0, 69.0, 70.0, 100.0] {
            assert_eq!(
                color_class(score),
                ScoreTier::from_score(score).color_class()
            );
        }
        assert_eq!(
            color_class(85.0).classes(),
            "score-bg-excellent score-text-excellent"
        );
        assert_ne!(color_class(55.0), color_class(45.0));
    }

    #[test]
    fn decode_reason_classifies_markers() {
        assert_eq!(
            decode_reason("✓ Age within range"),
            DecodedReason {
                is_positive: true,
                text: "Age within range".into()
            }
        );
        assert_eq!(
            decode_reason("✗ Gender mismatch"),
            DecodedReason {
                is_positive: false,
                text: "Gender mismatch".into()
            }
        );
        assert_eq!(
            decode_reason("No marker present"),
            DecodedReason {
                is_positive: false,
                text: "No marker present".into()
            }
        );
    }

    #[test]
    fn decode_reason_strips_every_marker() {
        let decoded = decode_reason("  ✓ 3 matching keywords ✓ ");
        assert!(decoded.is_positive);
        assert_eq!(decoded.text, "3 matching keywords");
    }

    #[test]
    fn trial_url_points_at_registry() {
        assert_eq!(
            trial_url("NCT01234567"),
            "https://clinicaltrials.gov/study/NCT01234567"
        );
    }

    #[test]
    fn truncation_reports_hidden_count() {
        let items: Vec<String> = (1..=7).map(|i| format!("Condition {i}")).collect();
        let truncated = truncate_list(&items, DETAIL_LIST_LIMIT);
        assert_eq!(truncated.shown.len(), 5);
        assert_eq!(truncated.more_label().as_deref(), Some("and 2 more"));

        let short = truncate_list(&items[..3], DETAIL_LIST_LIMIT);
        assert_eq!(short.shown.len(), 3);
        assert_eq!(short.more_label(), None);
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("short", 80), "short");
        assert_eq!(excerpt("Điều trị tiểu đường", 8), "Điều trị...");
    }

    #[test]
    fn metrics_render_whole_numbers_without_decimals() {
        assert_eq!(format_metric(Some(1200.0)), "1200");
        assert_eq!(format_metric(Some(66.4)), "66.4");
        assert_eq!(format_metric(None), "0");
    }
}
