//! Chuẩn hóa trường danh sách (bệnh lý, thuốc) từ nhiều kiểu tuần tự hóa khác nhau.
//!
//! Backend có thể trả về mảng JSON, chuỗi dạng literal Python (`"['A', 'B']"`), chuỗi JSON
//! (`"[\"A\", \"B\"]"`) hoặc chuỗi phân tách bằng dấu phẩy. Tên chứa dấu phẩy không thể
//! phân biệt với dấu phân tách khi rơi vào nhánh tách theo dấu phẩy.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Hình dạng đầu vào của một trường danh sách.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListField {
    Sequence(Vec<String>),
    RawString(String),
    Absent,
}

impl ListField {
    /// Chuẩn hóa thành danh sách có thứ tự. Không bao giờ thất bại.
    pub fn parse(self) -> Vec<String> {
        match self {
            ListField::Sequence(items) => items,
            ListField::RawString(raw) => match decode_literal(&raw) {
                Some(items) => items,
                None => {
                    log::debug!("Trường danh sách không phải literal, tách theo dấu phẩy: {raw:?}");
                    split_comma_list(&raw)
                }
            },
            ListField::Absent => Vec::new(),
        }
    }
}

impl From<Option<Value>> for ListField {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => {
                ListField::Sequence(items.into_iter().map(value_to_string).collect())
            }
            Some(Value::String(raw)) => ListField::RawString(raw),
            _ => ListField::Absent,
        }
    }
}

impl From<Value> for ListField {
    fn from(value: Value) -> Self {
        ListField::from(Some(value))
    }
}

/// Hàm tiện ích tương đương `field.parse()`.
pub fn parse_list_field(field: ListField) -> Vec<String> {
    field.parse()
}

/// Tách chuỗi theo dấu phẩy, cắt khoảng trắng và bỏ phần rỗng.
pub fn split_comma_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Dùng với `#[serde(deserialize_with = ...)]` cho các trường danh sách của backend.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_list_field(ListField::from(value)))
}

fn decode_literal(raw: &str) -> Option<Vec<String>> {
    let normalized = raw.replace('\'', "\"");
    serde_json::from_str::<Vec<Value>>(&normalized)
        .ok()
        .map(|items| items.into_iter().map(value_to_string).collect())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
