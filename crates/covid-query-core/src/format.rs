//! User-facing text for query outcomes.

use crate::store::{RowSet, Value};

pub const NOT_UNDERSTOOD: &str = "No pude interpretar tu consulta. ¿Podrías reformularla?";
pub const PROCESSING_ERROR: &str = "Ocurrió un error al procesar tu consulta";
pub const NO_RESULTS: &str = "No se encontraron resultados para tu consulta";
pub const EMPTY_INPUT: &str = "Por favor ingrese una consulta";

const RESULTS_HEADER: &str = "Resultados de la consulta:";

fn cell(value: &Value) -> String {
  match value {
    Value::Null => "sin datos".to_owned(),
    Value::Real(x) if x.fract() == 0.0 => format!("{x:.0}"),
    Value::Real(x) => format!("{x:.2}"),
    other => other.to_string(),
  }
}

/// Render `rows` as a header followed by one `column: value` line per row.
pub fn format_rows(rows: &RowSet) -> String {
  if rows.is_empty() {
    return NO_RESULTS.to_owned();
  }

  let mut out = format!("{RESULTS_HEADER}\n\n");
  for row in &rows.rows {
    let line = rows
      .columns
      .iter()
      .zip(row)
      .map(|(column, value)| format!("{column}: {}", cell(value)))
      .collect::<Vec<_>>()
      .join(", ");
    out.push_str(&line);
    out.push('\n');
  }
  out
}
