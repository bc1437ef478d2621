use serde::Serialize;

/// Round to two decimals, the precision redundancy figures are exposed with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `(total - unique) / total * 100`, or 0 for an empty column.
pub fn redundancy_percentage(unique: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2((total - unique.min(total)) as f64 / total as f64 * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeSource {
    /// Taken from a declared type row.
    Declared,
    /// Matched a column-name rule.
    Name,
    /// Inferred from observed values.
    Content,
    /// No usable evidence; VARCHAR(255).
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReference {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub type_source: TypeSource,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_required: bool,
    pub reference: Option<ColumnReference>,
    pub values: Vec<String>,
    pub unique_value_count: usize,
    pub total_value_count: usize,
    pub redundancy_percentage: f64,
}

impl Column {
    /// Build a column from observed values and compute its redundancy figures.
    pub fn observed(name: &str, sql_type: String, type_source: TypeSource, values: Vec<String>) -> Self {
        let mut column = Self {
            name: name.to_string(),
            sql_type,
            type_source,
            is_primary_key: false,
            is_foreign_key: false,
            is_required: false,
            reference: None,
            values,
            unique_value_count: 0,
            total_value_count: 0,
            redundancy_percentage: 0.0,
        };
        column.refresh_statistics();
        column
    }

    /// A column with no observed data, used for synthesized entities.
    pub fn synthetic(name: &str, sql_type: &str) -> Self {
        Self::observed(name, sql_type.to_string(), TypeSource::Name, Vec::new())
    }

    pub fn refresh_statistics(&mut self) {
        let non_empty: Vec<&str> = self
            .values
            .iter()
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .collect();
        let unique: indexmap::IndexSet<&str> = non_empty.iter().copied().collect();
        self.total_value_count = non_empty.len();
        self.unique_value_count = unique.len();
        self.redundancy_percentage =
            redundancy_percentage(self.unique_value_count, self.total_value_count);
    }

    pub fn lower_name(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_numeric(&self) -> bool {
        let t = self.sql_type.to_uppercase();
        ["INT", "DECIMAL", "NUMERIC", "FLOAT", "DOUBLE"]
            .iter()
            .any(|k| t.contains(k))
    }

    pub fn is_integer_like(&self) -> bool {
        self.sql_type.to_uppercase().contains("INT")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Main,
    Lookup,
    Transaction,
    Audit,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizationLevel {
    None,
    #[serde(rename = "FIRST_NF")]
    FirstNf,
    #[serde(rename = "SECOND_NF")]
    SecondNf,
    #[serde(rename = "THIRD_NF")]
    ThirdNf,
    Bcnf,
}

/// Raw grouping of the ingested sheet, before entity detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub purpose: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<String>,
    pub foreign_keys: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub type_row: Option<Vec<String>>,
    /// 1-based data rows whose cell count differs from the header's.
    pub ragged_rows: Vec<usize>,
    pub entity_type: EntityType,
    pub normalization_level: NormalizationLevel,
}

impl Table {
    /// Rows as downstream consumers expect them: the declared type row, when
    /// present, comes first.
    pub fn raw_rows(&self) -> Vec<&[String]> {
        self.type_row
            .iter()
            .map(|r| r.as_slice())
            .chain(self.rows.iter().map(|r| r.as_slice()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    ForeignKey,
    ManyToMany,
    OneToOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Strong,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub column: String,
    pub references: ColumnReference,
    pub kind: RelationshipKind,
    pub strength: Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    Functional,
    Partial,
    Transitive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub determinant: Vec<String>,
    pub dependent: Vec<String>,
    pub kind: DependencyKind,
    pub confidence: f64,
}

impl Dependency {
    pub fn single(from: &str, to: &str, kind: DependencyKind, confidence: f64) -> Self {
        Self {
            determinant: vec![from.to_string()],
            dependent: vec![to.to_string()],
            kind,
            confidence,
        }
    }
}

/// Unit the normalization pipeline operates on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub purpose: String,
    pub columns: Vec<Column>,
    pub relationships: Vec<Relationship>,
    pub dependencies: Vec<Dependency>,
    pub primary_key: Option<String>,
    pub normalization_score: f64,
}

impl Entity {
    pub fn new(name: &str, purpose: String, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            purpose,
            columns,
            relationships: Vec::new(),
            dependencies: Vec::new(),
            primary_key: None,
            normalization_score: 0.0,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Mean redundancy over columns that observed at least one value.
    pub fn average_redundancy(&self) -> f64 {
        let observed: Vec<f64> = self
            .columns
            .iter()
            .filter(|c| c.total_value_count > 0)
            .map(|c| c.redundancy_percentage)
            .collect();
        if observed.is_empty() {
            0.0
        } else {
            observed.iter().sum::<f64>() / observed.len() as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationStep {
    pub step: usize,
    pub description: String,
    pub action: String,
    pub result: String,
    pub tables_created: Vec<String>,
    pub tables_modified: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalForms {
    #[serde(rename = "1NF")]
    pub first: bool,
    #[serde(rename = "2NF")]
    pub second: bool,
    #[serde(rename = "3NF")]
    pub third: bool,
    #[serde(rename = "BCNF")]
    pub bcnf: bool,
}

impl NormalForms {
    pub fn from_score(score: f64) -> Self {
        Self {
            first: true,
            second: score >= 70.0,
            third: score >= 85.0,
            bcnf: score >= 95.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    Redundancy,
    Dependency,
    Structure,
    DataType,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Redundancy => "REDUNDANCY",
            IssueKind::Dependency => "DEPENDENCY",
            IssueKind::Structure => "STRUCTURE",
            IssueKind::DataType => "DATA_TYPE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub affected_columns: Vec<String>,
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub total_rows: usize,
    pub unique_rows: usize,
    pub redundancy_score: f64,
    pub normalization_score: f64,
    pub normal_forms: NormalForms,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
}
