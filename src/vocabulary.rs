//! Keyword tables driving every name-based heuristic.
//!
//! Each table is an ordered list of `(keywords, result)` rules evaluated
//! first-match-wins against a lower-cased column name. The defaults carry the
//! Spanish business vocabulary the engine was tuned on; callers can replace any
//! table through [`crate::config::NormalizerConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category used to cluster columns into candidate entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Orders,
    Customers,
    Products,
    Categories,
    Suppliers,
    Employees,
    Locations,
    Transactions,
    Financial,
    Temporal,
    Identifiers,
    Text,
    Contact,
    General,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Domain::Orders => "ORDERS",
            Domain::Customers => "CUSTOMERS",
            Domain::Products => "PRODUCTS",
            Domain::Categories => "CATEGORIES",
            Domain::Suppliers => "SUPPLIERS",
            Domain::Employees => "EMPLOYEES",
            Domain::Locations => "LOCATIONS",
            Domain::Transactions => "TRANSACTIONS",
            Domain::Financial => "FINANCIAL",
            Domain::Temporal => "TEMPORAL",
            Domain::Identifiers => "IDENTIFIERS",
            Domain::Text => "TEXT",
            Domain::Contact => "CONTACT",
            Domain::General => "GENERAL",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule<T> {
    pub keywords: Vec<String>,
    pub result: T,
}

impl<T> KeywordRule<T> {
    fn new(keywords: &[&str], result: T) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            result,
        }
    }

    pub fn matches(&self, lower_name: &str) -> bool {
        contains_any(lower_name, &self.keywords)
    }
}

/// First rule whose keywords occur in `lower_name`.
pub fn first_match<'a, T>(rules: &'a [KeywordRule<T>], lower_name: &str) -> Option<&'a T> {
    rules
        .iter()
        .find(|rule| rule.matches(lower_name))
        .map(|rule| &rule.result)
}

pub fn contains_any<S: AsRef<str>>(lower_name: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| lower_name.contains(k.as_ref()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLabel {
    pub domain: Domain,
    pub entity_name: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSynonym {
    pub base: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedColumns {
    pub identifier: String,
    pub related: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitivePair {
    pub determinant: String,
    pub dependent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vocabulary {
    pub type_rules: Vec<KeywordRule<String>>,
    pub domain_rules: Vec<KeywordRule<Domain>>,
    pub domain_labels: Vec<DomainLabel>,
    pub name_like: Vec<String>,
    pub name_hints: Vec<KeywordRule<String>>,
    pub table_synonyms: Vec<TableSynonym>,
    pub identifier_keywords: Vec<String>,
    pub key_tokens: Vec<String>,
    pub required_keywords: Vec<String>,
    pub partial_keywords: Vec<String>,
    pub related_columns: Vec<RelatedColumns>,
    pub transitive_pairs: Vec<TransitivePair>,
    pub table_purposes: Vec<KeywordRule<String>>,
    pub index_keywords: Vec<String>,
    pub positive_keywords: Vec<String>,
    pub non_negative_keywords: Vec<String>,
    pub email_keywords: Vec<String>,
    pub date_keywords: Vec<String>,
    pub code_keywords: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        use Domain::*;

        let label = |domain, entity_name: &str, purpose: &str| DomainLabel {
            domain,
            entity_name: entity_name.to_string(),
            purpose: purpose.to_string(),
        };
        let synonym = |base: &str, table: &str| TableSynonym {
            base: base.to_string(),
            table: table.to_string(),
        };
        let related = |identifier: &str, related: &[&str]| RelatedColumns {
            identifier: identifier.to_string(),
            related: words(related),
        };
        let pair = |determinant: &str, dependent: &str| TransitivePair {
            determinant: determinant.to_string(),
            dependent: dependent.to_string(),
        };

        Self {
            type_rules: vec![
                KeywordRule::new(&["id"], "INTEGER".to_string()),
                KeywordRule::new(&["precio", "costo", "salario", "valor"], "DECIMAL(10,2)".to_string()),
                KeywordRule::new(&["cantidad", "stock", "edad"], "INTEGER".to_string()),
                KeywordRule::new(&["fecha", "date"], "DATE".to_string()),
                KeywordRule::new(&["email", "correo"], "VARCHAR(255)".to_string()),
                KeywordRule::new(&["telefono", "phone"], "VARCHAR(20)".to_string()),
                KeywordRule::new(&["nombre", "name"], "VARCHAR(100)".to_string()),
                KeywordRule::new(&["descripcion", "description"], "TEXT".to_string()),
            ],
            domain_rules: vec![
                KeywordRule::new(&["orden", "order", "pedido"], Orders),
                KeywordRule::new(&["cliente", "customer", "usuario"], Customers),
                KeywordRule::new(&["articulo", "producto", "product", "item"], Products),
                KeywordRule::new(&["categoria", "category", "tipo"], Categories),
                KeywordRule::new(&["proveedor", "supplier", "vendor"], Suppliers),
                KeywordRule::new(&["empleado", "employee", "staff"], Employees),
                KeywordRule::new(
                    &["ciudad", "city", "pais", "country", "direccion", "address"],
                    Locations,
                ),
                KeywordRule::new(&["cantidad", "cant", "stock", "inventario"], Transactions),
                KeywordRule::new(&["precio", "costo", "valor", "salario"], Financial),
                KeywordRule::new(&["fecha", "date", "tiempo", "time"], Temporal),
                KeywordRule::new(&["id", "codigo", "numero"], Identifiers),
                KeywordRule::new(&["nombre", "name", "descripcion", "description"], Text),
                KeywordRule::new(&["email", "correo", "telefono", "phone"], Contact),
            ],
            domain_labels: vec![
                label(Orders, "ORDENES", "Stores orders and purchase requests"),
                label(Customers, "CLIENTES", "Stores customer and user information"),
                label(Products, "PRODUCTOS", "Stores product and item information"),
                label(Categories, "CATEGORIAS", "Stores classification categories"),
                label(Suppliers, "PROVEEDORES", "Stores supplier information"),
                label(Employees, "EMPLEADOS", "Stores employee information"),
                label(Locations, "UBICACIONES", "Stores geographic location information"),
                label(Transactions, "TRANSACCIONES", "Stores transactions and stock movements"),
                label(Financial, "FINANZAS", "Stores financial and pricing information"),
                label(Temporal, "TIEMPO", "Stores temporal information and dates"),
                label(Identifiers, "IDENTIFICADORES", "Stores unique identifiers"),
                label(Text, "TEXTO", "Stores textual and descriptive information"),
                label(Contact, "CONTACTO", "Stores contact information"),
            ],
            name_like: words(&["nombre", "name", "descripcion"]),
            name_hints: vec![
                KeywordRule::new(&["cliente"], "CLIENTES".to_string()),
                KeywordRule::new(&["producto", "articulo"], "PRODUCTOS".to_string()),
                KeywordRule::new(&["categoria"], "CATEGORIAS".to_string()),
                KeywordRule::new(&["proveedor"], "PROVEEDORES".to_string()),
                KeywordRule::new(&["empleado"], "EMPLEADOS".to_string()),
                KeywordRule::new(&["ciudad"], "CIUDADES".to_string()),
            ],
            table_synonyms: vec![
                synonym("cliente", "CLIENTES"),
                synonym("producto", "PRODUCTOS"),
                synonym("factura", "FACTURAS"),
                synonym("empleado", "EMPLEADOS"),
                synonym("departamento", "DEPARTAMENTOS"),
                synonym("cargo", "CARGOS"),
                synonym("categoria", "CATEGORIAS"),
                synonym("proveedor", "PROVEEDORES"),
            ],
            identifier_keywords: words(&["id", "codigo", "numero"]),
            key_tokens: words(&["id", "codigo", "numero", "num", "code", "key"]),
            required_keywords: words(&["nombre", "name"]),
            partial_keywords: words(&["nombre", "descripcion"]),
            related_columns: vec![
                related("compania", &["nombre", "direccion", "telefono", "email", "contacto"]),
                related("departamento", &["nombre", "descripcion", "jefe"]),
                related("categoria", &["nombre", "descripcion", "tipo"]),
                related("producto", &["nombre", "descripcion", "precio"]),
                related("empleado", &["nombre", "apellido", "email", "telefono"]),
            ],
            transitive_pairs: vec![
                pair("ciudad", "cliente"),
                pair("categoria", "producto"),
                pair("departamento", "empleado"),
            ],
            table_purposes: vec![
                KeywordRule::new(&["producto", "product", "articulo"], "Stores product and item information".to_string()),
                KeywordRule::new(&["cliente", "customer"], "Stores customer information".to_string()),
                KeywordRule::new(&["empleado", "employee"], "Stores employee information".to_string()),
                KeywordRule::new(&["categoria", "category"], "Stores classification categories".to_string()),
                KeywordRule::new(&["proveedor", "supplier"], "Stores supplier information".to_string()),
                KeywordRule::new(&["venta", "sale", "orden"], "Stores sales and order information".to_string()),
                KeywordRule::new(&["factura", "invoice"], "Stores invoice information".to_string()),
            ],
            index_keywords: words(&["nombre", "name", "email", "correo", "codigo", "code", "fecha", "date"]),
            positive_keywords: words(&["precio", "costo", "valor", "salario"]),
            non_negative_keywords: words(&["cantidad", "stock"]),
            email_keywords: words(&["email", "correo"]),
            date_keywords: words(&["fecha", "date"]),
            code_keywords: words(&["codigo", "code"]),
        }
    }
}

impl Vocabulary {
    pub fn type_for_name(&self, lower_name: &str) -> Option<&str> {
        first_match(&self.type_rules, lower_name).map(|s| s.as_str())
    }

    pub fn classify_domain(&self, lower_name: &str) -> Domain {
        first_match(&self.domain_rules, lower_name)
            .copied()
            .unwrap_or(Domain::General)
    }

    fn label(&self, domain: Domain) -> Option<&DomainLabel> {
        self.domain_labels.iter().find(|l| l.domain == domain)
    }

    pub fn entity_name(&self, domain: Domain) -> String {
        self.label(domain)
            .map(|l| l.entity_name.clone())
            .unwrap_or_else(|| domain.to_string())
    }

    pub fn purpose(&self, domain: Domain) -> String {
        self.label(domain)
            .map(|l| l.purpose.clone())
            .unwrap_or_else(|| format!("Stores information of the {domain} domain"))
    }

    pub fn hinted_name(&self, lower_name: &str) -> Option<&str> {
        first_match(&self.name_hints, lower_name).map(|s| s.as_str())
    }

    /// Table a foreign-key base name refers to: synonym table, else `<BASE>S`.
    pub fn resolve_table(&self, base: &str) -> String {
        let lower = base.to_lowercase();
        self.table_synonyms
            .iter()
            .find(|s| s.base == lower)
            .map(|s| s.table.clone())
            .unwrap_or_else(|| format!("{}S", base.to_uppercase()))
    }

    /// Related-column keywords for an identifier's base name.
    pub fn related_keywords(&self, base: &str) -> Vec<&str> {
        if base.is_empty() {
            return Vec::new();
        }
        self.related_columns
            .iter()
            .filter(|r| base.contains(&r.identifier) || r.identifier.contains(base))
            .flat_map(|r| r.related.iter().map(|s| s.as_str()))
            .collect()
    }

    pub fn is_transitive_pair(&self, determinant: &str, dependent: &str) -> bool {
        self.transitive_pairs
            .iter()
            .any(|p| determinant.contains(&p.determinant) && dependent.contains(&p.dependent))
    }

    /// True when a `_`-separated token of the name is a key token.
    pub fn has_key_token(&self, lower_name: &str) -> bool {
        lower_name
            .split('_')
            .any(|token| self.key_tokens.iter().any(|k| k == token))
    }
}
