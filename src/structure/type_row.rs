//! Declared-type row detection.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SQL_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(INT|INTEGER|BIGINT|VARCHAR\(\d+\)|CHAR\(\d+\)|DECIMAL\(\d+,\d+\)|NUMERIC\(\d+,\d+\)|FLOAT|DOUBLE|DATE|DATETIME|TIMESTAMP|BOOLEAN|BOOL|TEXT|LONGTEXT)$",
    )
    .expect("SQL type pattern is valid")
});

/// Where the header, the optional type row and the data live in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvLayout {
    pub type_row: Option<usize>,
    pub header_row: usize,
    pub data_start: usize,
}

pub fn is_sql_type(cell: &str) -> bool {
    SQL_TYPE.is_match(cell.trim())
}

/// A row is a type row when more than half of its cells are SQL type names.
pub fn is_type_row(cells: &[String]) -> bool {
    if cells.is_empty() {
        return false;
    }
    let matches = cells.iter().filter(|c| is_sql_type(c)).count();
    matches as f64 > cells.len() as f64 * 0.5
}

pub fn detect_layout(records: &[Vec<String>]) -> CsvLayout {
    let first = records.first().is_some_and(|r| is_type_row(r));
    let second = records.get(1).is_some_and(|r| is_type_row(r));

    if first {
        CsvLayout {
            type_row: Some(0),
            header_row: 1,
            data_start: 2,
        }
    } else if second {
        CsvLayout {
            type_row: Some(1),
            header_row: 0,
            data_start: 2,
        }
    } else {
        CsvLayout {
            type_row: None,
            header_row: 0,
            data_start: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_sql_type_patterns() {
        assert!(is_sql_type("INT"));
        assert!(is_sql_type("varchar(100)"));
        assert!(is_sql_type("DECIMAL(10,2)"));
        assert!(is_sql_type("LongText"));
        assert!(!is_sql_type("VARCHAR"));
        assert!(!is_sql_type("DECIMAL(10, 2)"));
        assert!(!is_sql_type("nombre"));
    }

    #[test]
    fn test_type_row_needs_majority() {
        assert!(is_type_row(&row(&["INT", "VARCHAR(100)", "DATE"])));
        assert!(is_type_row(&row(&["INT", "VARCHAR(100)", "nombre"])));
        assert!(!is_type_row(&row(&["INT", "nombre"])));
        assert!(!is_type_row(&[]));
    }

    #[test]
    fn test_layout_type_row_first() {
        let records = vec![
            row(&["INT", "VARCHAR(100)", "DATE"]),
            row(&["id", "nombre", "fecha"]),
            row(&["1", "Ana", "2024-01-01"]),
        ];
        assert_eq!(
            detect_layout(&records),
            CsvLayout {
                type_row: Some(0),
                header_row: 1,
                data_start: 2
            }
        );
    }

    #[test]
    fn test_layout_type_row_second() {
        let records = vec![
            row(&["id", "nombre", "fecha"]),
            row(&["INT", "VARCHAR(100)", "DATE"]),
            row(&["1", "Ana", "2024-01-01"]),
        ];
        let layout = detect_layout(&records);
        assert_eq!(layout.type_row, Some(1));
        assert_eq!(layout.header_row, 0);
        assert_eq!(layout.data_start, 2);
    }

    #[test]
    fn test_layout_without_type_row() {
        let records = vec![row(&["id", "nombre"]), row(&["1", "Ana"])];
        let layout = detect_layout(&records);
        assert_eq!(layout.type_row, None);
        assert_eq!(layout.header_row, 0);
        assert_eq!(layout.data_start, 1);
    }
}
