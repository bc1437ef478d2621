//! Column type inference.

use super::type_row::is_sql_type;
use crate::model::TypeSource;
use crate::vocabulary::Vocabulary;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const FALLBACK_TYPE: &str = "VARCHAR(255)";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Infer a column type: declared type, then name rules, then sampled content.
pub fn infer_type(
    name: &str,
    declared: Option<&str>,
    samples: &[&str],
    vocabulary: &Vocabulary,
) -> (String, TypeSource) {
    if let Some(declared) = declared.map(str::trim).filter(|d| is_sql_type(d)) {
        return (declared.to_uppercase(), TypeSource::Declared);
    }

    if let Some(sql_type) = vocabulary.type_for_name(&name.to_lowercase()) {
        return (sql_type.to_string(), TypeSource::Name);
    }

    match infer_from_content(samples) {
        Some(sql_type) => (sql_type, TypeSource::Content),
        None => (FALLBACK_TYPE.to_string(), TypeSource::Fallback),
    }
}

fn infer_from_content(samples: &[&str]) -> Option<String> {
    if samples.is_empty() {
        return None;
    }

    if samples.iter().all(|v| is_number(v)) {
        let decimal = samples.iter().any(|v| v.contains('.'));
        return Some(if decimal { "DECIMAL(10,2)" } else { "INTEGER" }.to_string());
    }

    if samples.iter().all(|v| is_date(v)) {
        return Some("DATE".to_string());
    }

    let max_len = samples.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let sql_type = match max_len {
        0..=50 => "VARCHAR(50)",
        51..=100 => "VARCHAR(100)",
        101..=255 => "VARCHAR(255)",
        _ => "TEXT",
    };
    Some(sql_type.to_string())
}

fn is_number(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_date(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(name: &str, samples: &[&str]) -> (String, TypeSource) {
        infer_type(name, None, samples, &Vocabulary::default())
    }

    #[test]
    fn test_declared_type_wins() {
        let v = Vocabulary::default();
        let (t, source) = infer_type("id", Some("varchar(10)"), &["1"], &v);
        assert_eq!(t, "VARCHAR(10)");
        assert_eq!(source, TypeSource::Declared);
    }

    #[test]
    fn test_invalid_declared_type_is_ignored() {
        let v = Vocabulary::default();
        let (t, source) = infer_type("precio", Some("money"), &["1.5"], &v);
        assert_eq!(t, "DECIMAL(10,2)");
        assert_eq!(source, TypeSource::Name);
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(infer("id_cliente", &["a"]).0, "INTEGER");
        assert_eq!(infer("salario", &[]).0, "DECIMAL(10,2)");
        assert_eq!(infer("fecha_alta", &[]).0, "DATE");
        assert_eq!(infer("correo", &[]).0, "VARCHAR(255)");
        assert_eq!(infer("phone", &[]).0, "VARCHAR(20)");
        assert_eq!(infer("nombre", &[]).0, "VARCHAR(100)");
    }

    #[test]
    fn test_numeric_content() {
        assert_eq!(infer("total", &["10", "20"]), ("INTEGER".to_string(), TypeSource::Content));
        assert_eq!(infer("total", &["10", "20.5"]).0, "DECIMAL(10,2)");
        assert_eq!(infer("total", &["10", "NaN"]).0, "VARCHAR(50)");
    }

    #[test]
    fn test_date_content() {
        assert_eq!(infer("alta", &["2024-01-05", "05/02/2024"]).0, "DATE");
        assert_eq!(infer("alta", &["2024-01-05T10:00:00Z"]).0, "DATE");
        assert_eq!(infer("alta", &["2024-01-05", "mañana"]).0, "VARCHAR(50)");
    }

    #[test]
    fn test_varchar_buckets() {
        let long = "x".repeat(80);
        let longer = "x".repeat(200);
        let huge = "x".repeat(300);
        assert_eq!(infer("notas", &["corto"]).0, "VARCHAR(50)");
        assert_eq!(infer("notas", &[long.as_str()]).0, "VARCHAR(100)");
        assert_eq!(infer("notas", &[longer.as_str()]).0, "VARCHAR(255)");
        assert_eq!(infer("notas", &[huge.as_str()]).0, "TEXT");
    }

    #[test]
    fn test_fallback_without_samples() {
        assert_eq!(
            infer("notas", &[]),
            (FALLBACK_TYPE.to_string(), TypeSource::Fallback)
        );
    }
}
