//! Relational schema for the lab-check database (SQLite dialect)
//!
//! Tables: labs, lab_techs, plots, lab_checks, plot_checks.
//! View: data_record_view, the human-readable join used for listing.
//!
//! CHECK constraints are named so a violation can be reported by name.
//! SQLite does not name foreign keys in its errors; the sink resolves those
//! references itself and reports the names below.

/// Foreign key from lab_checks to labs
pub const FK_LAB_CHECK_LAB: &str = "lab_checks_lab_id_fkey";
/// Foreign key from lab_checks to lab_techs
pub const FK_LAB_CHECK_TECH: &str = "lab_checks_lab_tech_id_fkey";
/// Foreign key from plot_checks to plots
pub const FK_PLOT_CHECK_PLOT: &str = "plot_checks_lab_id_plot_fkey";
/// Foreign key from plot_checks to lab_checks
pub const FK_PLOT_CHECK_LAB_CHECK: &str = "plot_checks_lab_check_fkey";

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS labs (
    id TEXT PRIMARY KEY NOT NULL,
    CONSTRAINT valid_lab_id CHECK (length(id) = 1)
);

CREATE TABLE IF NOT EXISTS lab_techs (
    id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS plots (
    lab_id TEXT NOT NULL REFERENCES labs(id),
    plot INTEGER NOT NULL,
    current_seed_sample TEXT,
    PRIMARY KEY (lab_id, plot),
    CONSTRAINT valid_plot CHECK (plot BETWEEN 1 AND 20),
    CONSTRAINT valid_current_seed_sample
        CHECK (current_seed_sample IS NULL OR length(current_seed_sample) = 6)
);

CREATE TABLE IF NOT EXISTS lab_checks (
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    lab_id TEXT NOT NULL REFERENCES labs(id),
    lab_tech_id INTEGER NOT NULL REFERENCES lab_techs(id),
    PRIMARY KEY (date, time, lab_id)
);

CREATE TABLE IF NOT EXISTS plot_checks (
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    lab_id TEXT NOT NULL REFERENCES labs(id),
    plot INTEGER NOT NULL,
    seed_sample TEXT NOT NULL,
    humidity NUMERIC,
    light NUMERIC,
    temperature NUMERIC,
    equipment_fault INTEGER NOT NULL,
    blossoms INTEGER NOT NULL,
    plants INTEGER NOT NULL,
    fruit INTEGER NOT NULL,
    max_height NUMERIC NOT NULL,
    min_height NUMERIC NOT NULL,
    median_height NUMERIC NOT NULL,
    notes TEXT,
    PRIMARY KEY (date, time, lab_id, plot),
    FOREIGN KEY (date, time, lab_id) REFERENCES lab_checks(date, time, lab_id),
    FOREIGN KEY (lab_id, plot) REFERENCES plots(lab_id, plot),
    CONSTRAINT valid_seed_sample CHECK (length(seed_sample) = 6),
    CONSTRAINT valid_humidity CHECK (humidity BETWEEN 0.5 AND 52.0),
    CONSTRAINT valid_light CHECK (light BETWEEN 0 AND 100),
    CONSTRAINT valid_temperature CHECK (temperature BETWEEN 4 AND 40),
    CONSTRAINT valid_equipment_fault CHECK (equipment_fault IN (0, 1)),
    CONSTRAINT valid_blossoms CHECK (blossoms BETWEEN 0 AND 1000),
    CONSTRAINT valid_plants CHECK (plants BETWEEN 0 AND 20),
    CONSTRAINT valid_fruit CHECK (fruit BETWEEN 0 AND 1000),
    CONSTRAINT valid_max_height CHECK (max_height BETWEEN 0 AND 1000),
    CONSTRAINT valid_min_height CHECK (min_height BETWEEN 0 AND 1000),
    CONSTRAINT valid_median_height CHECK (median_height BETWEEN min_height AND max_height)
);

CREATE VIEW IF NOT EXISTS data_record_view AS
SELECT
    pc.date AS "Date",
    pc.time AS "Time",
    lt.name AS "Technician",
    pc.lab_id AS "Lab",
    pc.plot AS "Plot",
    pc.seed_sample AS "Seed sample",
    pc.humidity AS "Humidity",
    pc.light AS "Light",
    pc.temperature AS "Temperature",
    pc.plants AS "Plants",
    pc.blossoms AS "Blossoms",
    pc.fruit AS "Fruit",
    pc.max_height AS "Max Height",
    pc.min_height AS "Min Height",
    pc.median_height AS "Median Height",
    pc.notes AS "Notes"
FROM plot_checks AS pc
JOIN lab_checks AS lc
    ON pc.lab_id = lc.lab_id AND pc.date = lc.date AND pc.time = lc.time
JOIN lab_techs AS lt
    ON lc.lab_tech_id = lt.id;
"#;

/// Lists one day's rows from the view with numerics at two places
pub const SELECT_RECORDS_ON_DATE: &str = r#"
SELECT
    "Date",
    "Time",
    "Technician",
    "Lab",
    CAST("Plot" AS TEXT),
    "Seed sample",
    CASE WHEN "Humidity" IS NULL THEN '' ELSE printf('%.2f', "Humidity") END,
    CASE WHEN "Light" IS NULL THEN '' ELSE printf('%.2f', "Light") END,
    CASE WHEN "Temperature" IS NULL THEN '' ELSE printf('%.2f', "Temperature") END,
    CAST("Plants" AS TEXT),
    CAST("Blossoms" AS TEXT),
    CAST("Fruit" AS TEXT),
    printf('%.2f', "Max Height"),
    printf('%.2f', "Min Height"),
    printf('%.2f', "Median Height"),
    COALESCE("Notes", '')
FROM data_record_view
WHERE "Date" = ?1
ORDER BY "Time", "Lab", "Plot"
"#;
