use unicode_width::UnicodeWidthStr;

/// Column widths for a plain-text grid, measured in terminal cells.
pub struct TextGrid {
    pub gap: usize,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Pad `text` with spaces up to `width` display cells.
pub fn pad_right(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}

impl TextGrid {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            gap: 2,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = display_width(cell);
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let line = |cells: &[String]| {
            let last = cells.len().saturating_sub(1);
            let mut out = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i == last {
                    out.push_str(cell);
                } else {
                    out.push_str(&pad_right(cell, widths[i] + self.gap));
                }
            }
            out.trim_end().to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&line(&rule));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(display_width("CLIENTES"), 8);
    }

    #[test]
    fn test_accented_width() {
        // precomposed accents occupy one cell
        assert_eq!(display_width("Dirección"), 9);
    }

    #[test]
    fn test_wide_width() {
        assert_eq!(display_width("顧客"), 4);
        assert_eq!(pad_right("顧客", 6), "顧客  ");
    }

    #[test]
    fn test_grid_alignment() {
        let mut grid = TextGrid::new(&["Entity", "Score"]);
        grid.push(vec!["UBICACIÓN".to_string(), "80.0".to_string()]);
        grid.push(vec!["A".to_string(), "100.0".to_string()]);
        assert_eq!(grid.widths(), vec![9, 5]);
        assert_eq!(
            grid.render(),
            "Entity     Score\n---------  -----\nUBICACIÓN  80.0\nA          100.0\n"
        );
    }
}
