use anyhow::{anyhow, Result};
use log::warn;
use serde_json::Value;

/// A single cell of a raw result row
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Number(f64),
    Text(String),
}

impl Scalar {
    fn from_json(value: &Value) -> Scalar {
        match value {
            Value::Null => Scalar::Null,
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Null),
            Value::String(s) => Scalar::Text(s.clone()),
            Value::Bool(b) => Scalar::Text(b.to_string()),
            // Nested values are kept as their JSON text
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// One row of the raw result set: column name -> scalar, in column order.
/// A key that is absent is distinct from a key holding `Scalar::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: Vec<(String, Scalar)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing cell in place
    pub fn with(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: Scalar) {
        match self.cells.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }
}

/// The ordered raw result set handed to the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub records: Vec<RawRecord>,
}

impl RawDataset {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Create a dataset from CSV contents; every cell is kept as text
    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        let records = csv
            .rows
            .into_iter()
            .map(|row| {
                let mut record = RawRecord::new();
                for (header, cell) in csv.headers.iter().zip(row) {
                    record.insert(header, Scalar::Text(cell));
                }
                record
            })
            .collect();
        Self { records }
    }

    /// Create a dataset from a JSON array of flat objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut records = Vec::with_capacity(array.len());
        for (i, item) in array.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Item {} in data array is not an object", i))?;

            let mut record = RawRecord::new();
            for (key, val) in obj {
                record.insert(key, Scalar::from_json(val));
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names in order of first appearance across all rows
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Keep only the first `limit` rows
    pub fn truncate_to(&mut self, limit: usize) {
        if self.records.len() > limit {
            warn!(
                "Dataset has {} rows, keeping the first {}",
                self.records.len(),
                limit
            );
            self.records.truncate(limit);
        }
    }
}

/// Coerce a cell to a number. Unparsable, null and missing cells become 0.
pub fn numeric_coerce(value: Option<&Scalar>) -> f64 {
    match value {
        Some(Scalar::Number(n)) if n.is_nan() => 0.0,
        Some(Scalar::Number(n)) => *n,
        Some(Scalar::Text(s)) => parse_float_prefix(s),
        Some(Scalar::Null) | None => 0.0,
    }
}

/// Stringified form of a cell, used as the grouping key
pub fn group_key(value: Option<&Scalar>) -> String {
    match value {
        Some(Scalar::Text(s)) => s.clone(),
        Some(Scalar::Number(n)) => format_number(*n),
        Some(Scalar::Null) => "null".to_string(),
        None => "undefined".to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign, e.g. 1e+21 and 1.5e-7
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        n.to_string()
    }
}

/// Parse the longest leading decimal number in `s`, ignoring leading whitespace
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let unsigned = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let bytes = s.as_bytes();
    let mut end = s.len() - unsigned.len();
    let mut digits = 0;

    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_coerce() {
        assert_eq!(numeric_coerce(Some(&Scalar::Number(4.5))), 4.5);
        assert_eq!(numeric_coerce(Some(&Scalar::from("12"))), 12.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from(" 3.5 "))), 3.5);
        assert_eq!(numeric_coerce(Some(&Scalar::from("12abc"))), 12.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from("-1e3"))), -1000.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from("2e"))), 2.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from(".5"))), 0.5);
        assert_eq!(numeric_coerce(Some(&Scalar::from("abc"))), 0.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from(""))), 0.0);
        assert_eq!(numeric_coerce(Some(&Scalar::from("-"))), 0.0);
        assert_eq!(numeric_coerce(Some(&Scalar::Null)), 0.0);
        assert_eq!(numeric_coerce(Some(&Scalar::Number(f64::NAN))), 0.0);
        assert_eq!(numeric_coerce(None), 0.0);
    }

    #[test]
    fn test_numeric_coerce_infinity() {
        assert_eq!(numeric_coerce(Some(&Scalar::from("Infinity"))), f64::INFINITY);
        assert_eq!(numeric_coerce(Some(&Scalar::from("-Infinity"))), f64::NEG_INFINITY);
    }

    #[test]
    fn test_group_key() {
        assert_eq!(group_key(Some(&Scalar::from("West"))), "West");
        assert_eq!(group_key(Some(&Scalar::Number(130.0))), "130");
        assert_eq!(group_key(Some(&Scalar::Number(1.5))), "1.5");
        assert_eq!(group_key(Some(&Scalar::Number(-0.0))), "0");
        assert_eq!(group_key(Some(&Scalar::Null)), "null");
        assert_eq!(group_key(Some(&Scalar::from(""))), "");
        assert_eq!(group_key(None), "undefined");
    }

    #[test]
    fn test_group_key_exponent_form() {
        assert_eq!(group_key(Some(&Scalar::Number(1e21))), "1e+21");
        assert_eq!(group_key(Some(&Scalar::Number(-1.25e22))), "-1.25e+22");
        assert_eq!(group_key(Some(&Scalar::Number(1e-7))), "1e-7");
        assert_eq!(group_key(Some(&Scalar::Number(1.5e-7))), "1.5e-7");
        assert_eq!(group_key(Some(&Scalar::Number(1e20))), "100000000000000000000");
        assert_eq!(group_key(Some(&Scalar::Number(1e-6))), "0.000001");
        // Text and number spellings of the same value share a key
        assert_eq!(group_key(Some(&Scalar::from("1e+21"))), group_key(Some(&Scalar::Number(1e21))));
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"region": "West", "sales": 100, "flag": true, "note": null},
            {"region": "East", "sales": "50"}
        ]);
        let data = RawDataset::from_json(&value).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.records[0].get("sales"), Some(&Scalar::Number(100.0)));
        assert_eq!(data.records[0].get("flag"), Some(&Scalar::from("true")));
        assert_eq!(data.records[0].get("note"), Some(&Scalar::Null));
        assert_eq!(data.records[1].get("note"), None);
        assert_eq!(data.columns(), vec!["region", "sales", "flag", "note"]);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(RawDataset::from_json(&json!({"a": 1})).is_err());
        assert!(RawDataset::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_json_empty_array() {
        let data = RawDataset::from_json(&json!([])).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_from_csv() {
        let csv = crate::csv_reader::read_csv_from_str("region,sales\nWest,100\n").unwrap();
        let data = RawDataset::from_csv(csv);
        assert_eq!(data.records[0].get("region"), Some(&Scalar::from("West")));
        assert_eq!(data.records[0].get("sales"), Some(&Scalar::from("100")));
    }

    #[test]
    fn test_truncate_to() {
        let mut data = RawDataset::new(vec![RawRecord::new(); 5]);
        data.truncate_to(3);
        assert_eq!(data.len(), 3);
        data.truncate_to(10);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_record_insert_replaces() {
        let record = RawRecord::new().with("a", 1.0).with("a", "x");
        assert_eq!(record.get("a"), Some(&Scalar::from("x")));
        assert_eq!(record.keys().count(), 1);
    }
}
