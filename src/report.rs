//! Plain-text rendering of a normalization result.

use crate::measure::{TextGrid, pad_right};
use crate::model::Issue;
use crate::normalizer::NormalizationResult;

const LABEL_WIDTH: usize = 22;

fn metric(out: &mut String, label: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("{}{value}\n", pad_right(&format!("{label}:"), LABEL_WIDTH)));
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("\n{title}\n{}\n", "=".repeat(title.len())));
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn issue_line(issue: &Issue) -> String {
    let mut line = format!(
        "[{}/{}] {}",
        issue.kind.as_str(),
        issue.severity.as_str(),
        issue.description
    );
    if !issue.solution.is_empty() {
        line.push_str(&format!("\n    fix: {}", issue.solution));
    }
    line
}

pub fn render_text(result: &NormalizationResult) -> String {
    let analysis = &result.analysis;
    let mut out = String::new();

    heading(&mut out, "Summary");
    metric(&mut out, "Rows", analysis.total_rows);
    metric(&mut out, "Unique rows", analysis.unique_rows);
    metric(&mut out, "Redundancy score", format!("{:.2}", analysis.redundancy_score));
    metric(
        &mut out,
        "Normalization score",
        format!("{:.2}", analysis.normalization_score),
    );
    let forms = &analysis.normal_forms;
    metric(
        &mut out,
        "Normal forms",
        format!(
            "1NF {} / 2NF {} / 3NF {} / BCNF {}",
            yes_no(forms.first),
            yes_no(forms.second),
            yes_no(forms.third),
            yes_no(forms.bcnf)
        ),
    );

    heading(&mut out, "Entities");
    let mut grid = TextGrid::new(&["Entity", "Columns", "Primary key", "References", "Score"]);
    for entity in &result.normalized_entities {
        let references = entity
            .relationships
            .iter()
            .map(|r| r.references.table.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        grid.push(vec![
            entity.name.clone(),
            entity.columns.len().to_string(),
            entity.primary_key.clone().unwrap_or_else(|| "-".to_string()),
            if references.is_empty() { "-".to_string() } else { references },
            format!("{:.1}", entity.normalization_score),
        ]);
    }
    out.push_str(&grid.render());

    heading(&mut out, "Normalization steps");
    for step in &result.normalization_steps {
        out.push_str(&format!("{}. {}: {}\n", step.step, step.description, step.result));
    }

    heading(&mut out, "Issues");
    if analysis.issues.is_empty() {
        out.push_str("none\n");
    }
    for issue in &analysis.issues {
        out.push_str(&format!("- {}\n", issue_line(issue)));
    }

    heading(&mut out, "Recommendations");
    for recommendation in &result.recommendations {
        out.push_str(&format!("- {recommendation}\n"));
    }
    out
}
