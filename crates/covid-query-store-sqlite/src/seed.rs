//! The fixed seed dataset: four locations and four rows per fact table.

use rusqlite::Transaction;

// (pais, ciudad)
pub const LOCATIONS: &[(&str, &str)] = &[
  ("México", "Ciudad de México"),
  ("México", "Guadalajara"),
  ("Estados Unidos", "Nueva York"),
  ("Estados Unidos", "Los Ángeles"),
];

// (fecha, ubicacion_id, confirmados, muertes, activos, recuperados)
const CASES: &[(&str, i64, i64, i64, i64, i64)] = &[
  ("2023-01-01", 1, 150, 5, 80, 65),
  ("2023-02-01", 2, 200, 8, 90, 95),
  ("2023-01-01", 3, 300, 10, 180, 110),
  ("2023-02-01", 4, 400, 15, 220, 165),
];

// (ubicacion_id, fecha, disponibles, ocupadas)
const HOSPITAL: &[(i64, &str, i64, i64)] = &[
  (1, "2023-01-01", 100, 30),
  (2, "2023-02-01", 120, 45),
  (3, "2023-01-01", 80, 50),
  (4, "2023-02-01", 90, 60),
];

// (ubicacion_id, fecha, personas, dosis, tipo_vacuna)
const VACCINATIONS: &[(i64, &str, i64, i64, &str)] = &[
  (1, "2023-01-01", 1000, 1500, "Pfizer"),
  (2, "2023-02-01", 800, 1200, "Moderna"),
  (3, "2023-01-01", 1500, 2000, "Johnson"),
  (4, "2023-02-01", 1100, 1700, "AstraZeneca"),
];

// (ubicacion_id, fecha, total, tipo_prueba, positivas)
const TESTS: &[(i64, &str, i64, &str, i64)] = &[
  (1, "2023-01-01", 500, "PCR", 150),
  (2, "2023-02-01", 600, "Antígenos", 200),
  (3, "2023-01-01", 450, "PCR", 120),
  (4, "2023-02-01", 550, "Antígenos", 180),
];

/// Insert the dataset inside `tx`. Location ids are assigned 1..=4 in order.
pub fn insert_all(tx: &Transaction<'_>) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare("INSERT INTO ubicaciones (id, pais, ciudad) VALUES (?1, ?2, ?3)")?;
  for (id, (pais, ciudad)) in (1_i64..).zip(LOCATIONS) {
    stmt.execute(rusqlite::params![id, pais, ciudad])?;
  }

  let mut stmt = tx.prepare(
    "INSERT INTO casos_covid
       (fecha, ubicacion_id, casos_confirmados, muertes, casos_activos, casos_recuperados)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for (fecha, ubicacion, confirmados, muertes, activos, recuperados) in CASES {
    stmt.execute(rusqlite::params![fecha, ubicacion, confirmados, muertes, activos, recuperados])?;
  }

  let mut stmt = tx.prepare(
    "INSERT INTO hospitalizaciones (ubicacion_id, fecha, camas_disponibles, camas_ocupadas)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for (ubicacion, fecha, disponibles, ocupadas) in HOSPITAL {
    stmt.execute(rusqlite::params![ubicacion, fecha, disponibles, ocupadas])?;
  }

  let mut stmt = tx.prepare(
    "INSERT INTO vacunaciones
       (ubicacion_id, fecha, personas_vacunadas, dosis_administradas, tipo_vacuna)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for (ubicacion, fecha, personas, dosis, tipo) in VACCINATIONS {
    stmt.execute(rusqlite::params![ubicacion, fecha, personas, dosis, tipo])?;
  }

  let mut stmt = tx.prepare(
    "INSERT INTO pruebas (ubicacion_id, fecha, total_pruebas, tipo_prueba, pruebas_positivas)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for (ubicacion, fecha, total, tipo, positivas) in TESTS {
    stmt.execute(rusqlite::params![ubicacion, fecha, total, tipo, positivas])?;
  }

  Ok(())
}
