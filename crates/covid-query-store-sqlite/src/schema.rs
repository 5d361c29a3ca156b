//! SQL schema for the COVID-19 statistics store.
//!
//! Executed on every new connection. Dates are `YYYY-MM-DD` text.

/// Per-connection settings; foreign keys are off by default in SQLite.
pub const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ubicaciones (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    pais   TEXT NOT NULL,
    ciudad TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS casos_covid (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha             TEXT NOT NULL,
    ubicacion_id      INTEGER NOT NULL REFERENCES ubicaciones(id),
    casos_confirmados INTEGER NOT NULL DEFAULT 0,
    muertes           INTEGER NOT NULL DEFAULT 0,
    casos_activos     INTEGER NOT NULL DEFAULT 0,
    casos_recuperados INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS hospitalizaciones (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    ubicacion_id      INTEGER NOT NULL REFERENCES ubicaciones(id),
    fecha             TEXT NOT NULL,
    camas_disponibles INTEGER NOT NULL DEFAULT 0,
    camas_ocupadas    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS vacunaciones (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    ubicacion_id        INTEGER NOT NULL REFERENCES ubicaciones(id),
    fecha               TEXT NOT NULL,
    personas_vacunadas  INTEGER NOT NULL DEFAULT 0,
    dosis_administradas INTEGER NOT NULL DEFAULT 0,
    tipo_vacuna         TEXT NOT NULL    -- 'Pfizer' | 'Moderna' | 'Johnson' | 'AstraZeneca'
);

CREATE TABLE IF NOT EXISTS pruebas (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    ubicacion_id      INTEGER NOT NULL REFERENCES ubicaciones(id),
    fecha             TEXT NOT NULL,
    total_pruebas     INTEGER NOT NULL DEFAULT 0,
    tipo_prueba       TEXT NOT NULL,   -- 'PCR' | 'Antígenos'
    pruebas_positivas INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS casos_ubicacion_idx     ON casos_covid(ubicacion_id);
CREATE INDEX IF NOT EXISTS hospital_ubicacion_idx  ON hospitalizaciones(ubicacion_id);
CREATE INDEX IF NOT EXISTS vacunas_ubicacion_idx   ON vacunaciones(ubicacion_id);
CREATE INDEX IF NOT EXISTS pruebas_ubicacion_idx   ON pruebas(ubicacion_id);

PRAGMA user_version = 1;
";
