//! SQL text builders for the table data gateway.
//!
//! Values never appear in the generated text, only `:name` placeholders, so
//! two calls with the same column shape produce byte-identical SQL and share
//! one cached statement. Identifiers must already be validated.

/// Suffix appended to WHERE-clause placeholders in UPDATE statements so a
/// criterion never collides with a SET column of the same name.
pub const CRITERION_SUFFIX: &str = "_CRITERION";

/// `SELECT * FROM <table> WHERE <id>=:<id>`
pub fn select_by_id(table: &str, id_column: &str) -> String {
    format!("SELECT * FROM {} WHERE {}", table, assignment(id_column, ""))
}

/// `SELECT * FROM <table> WHERE c1=:c1 AND c2=:c2`
pub fn select_where<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> String {
    format!(
        "SELECT * FROM {} WHERE {}",
        table,
        assignments(columns, "", " AND ")
    )
}

/// `SELECT * FROM <table>`
pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", table)
}

/// `INSERT INTO <table> (c1,c2) VALUES (:c1,:c2)`
pub fn insert<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> String {
    let columns: Vec<&str> = columns.into_iter().collect();
    let placeholders = columns
        .iter()
        .map(|c| format!(":{}", c))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(","),
        placeholders
    )
}

/// `UPDATE <table> SET c1=:c1,c2=:c2 WHERE k1=:k1_CRITERION AND k2=:k2_CRITERION`
pub fn update<'a, 'b>(
    table: &str,
    set_columns: impl IntoIterator<Item = &'a str>,
    criteria_columns: impl IntoIterator<Item = &'b str>,
) -> String {
    format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments(set_columns, "", ","),
        assignments(criteria_columns, CRITERION_SUFFIX, " AND ")
    )
}

/// `DELETE FROM <table> WHERE <id>=:<id>`
pub fn delete_by_id(table: &str, id_column: &str) -> String {
    format!("DELETE FROM {} WHERE {}", table, assignment(id_column, ""))
}

/// Placeholder name for `column`, with an optional suffix: `:<column><suffix>`.
pub fn placeholder(column: &str, suffix: &str) -> String {
    format!(":{}{}", column, suffix)
}

/// Strip the criterion suffix from a placeholder-derived name.
pub fn strip_criterion_suffix(name: &str) -> &str {
    name.strip_suffix(CRITERION_SUFFIX).unwrap_or(name)
}

fn assignment(column: &str, suffix: &str) -> String {
    format!("{}={}", column, placeholder(column, suffix))
}

fn assignments<'a>(columns: impl IntoIterator<Item = &'a str>, suffix: &str, sep: &str) -> String {
    columns
        .into_iter()
        .map(|c| assignment(c, suffix))
        .collect::<Vec<_>>()
        .join(sep)
}
