//! The fixed catalog of asteroid analysis queries.
//!
//! Twenty named queries (fifteen numbered plus five bonus) grouped into six
//! sidebar categories. Names double as stable identifiers: the CLI, config
//! file and headless `select:` command all refer to queries by name.

use crate::db::DatabaseBackend;

/// A named SQL query shown in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    /// MySQL/TiDB dialect.
    pub sql: &'static str,
    /// Replacement for SQLite where the MySQL text uses functions it lacks.
    pub sqlite_sql: Option<&'static str>,
}

impl CatalogEntry {
    /// The statement to run against `backend`.
    pub fn sql_for(&self, backend: DatabaseBackend) -> &'static str {
        match (backend, self.sqlite_sql) {
            (DatabaseBackend::Sqlite, Some(sql)) => sql,
            _ => self.sql,
        }
    }
}

/// A sidebar category grouping several queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub title: &'static str,
    pub entries: &'static [&'static str],
}

/// Query selected when nothing (or an unknown name) is selected.
pub const DEFAULT_QUERY: &str = "1. Count asteroid approaches";

pub const TOTAL_ASTEROIDS_SQL: &str = "SELECT COUNT(DISTINCT id) AS count FROM asteroids";
pub const TOTAL_APPROACHES_SQL: &str = "SELECT COUNT(*) AS count FROM close_approach";
pub const HAZARDOUS_COUNT_SQL: &str =
    "SELECT COUNT(*) AS count FROM asteroids WHERE is_potentially_hazardous_asteroid = 1";

const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "1. Count asteroid approaches",
        sql: "SELECT neo_reference_id, COUNT(*) AS approach_count \
              FROM close_approach \
              GROUP BY neo_reference_id \
              ORDER BY approach_count DESC",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "2. Average velocity per asteroid",
        sql: "SELECT neo_reference_id, AVG(relative_velocity_km_per_hour) AS avg_velocity \
              FROM close_approach \
              GROUP BY neo_reference_id \
              ORDER BY avg_velocity DESC",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "3. Top 10 fastest asteroids",
        sql: "SELECT neo_reference_id, MAX(relative_velocity_km_per_hour) AS max_velocity \
              FROM close_approach \
              GROUP BY neo_reference_id \
              ORDER BY max_velocity DESC \
              LIMIT 10",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "4. Hazardous asteroids > 3 approaches",
        sql: "SELECT ca.neo_reference_id, COUNT(*) AS approach_count \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              WHERE a.is_potentially_hazardous_asteroid = 1 \
              GROUP BY ca.neo_reference_id \
              HAVING COUNT(*) > 3",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "5. Month with most approaches",
        sql: "SELECT DATE_FORMAT(close_approach_date, '%Y-%m') AS month, COUNT(*) AS count \
              FROM close_approach \
              GROUP BY month \
              ORDER BY count DESC \
              LIMIT 1",
        sqlite_sql: Some(
            "SELECT strftime('%Y-%m', close_approach_date) AS month, COUNT(*) AS count \
             FROM close_approach \
             GROUP BY month \
             ORDER BY count DESC \
             LIMIT 1",
        ),
    },
    CatalogEntry {
        name: "6. Fastest ever approach",
        sql: "SELECT neo_reference_id, MAX(relative_velocity_km_per_hour) AS fastest_speed \
              FROM close_approach \
              GROUP BY neo_reference_id \
              ORDER BY fastest_speed DESC \
              LIMIT 1",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "7. Sort by max estimated diameter",
        sql: "SELECT id, name, estimated_diameter_max_km \
              FROM asteroids \
              ORDER BY estimated_diameter_max_km DESC",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "8. Closest approach getting nearer over time",
        sql: "SELECT * \
              FROM close_approach \
              ORDER BY neo_reference_id, close_approach_date",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "9. Closest approach date & distance",
        sql: "SELECT a.name, ca.close_approach_date, MIN(ca.miss_distance_km) AS closest_approach \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              GROUP BY a.id, a.name, ca.close_approach_date \
              ORDER BY closest_approach ASC",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "10. Velocity > 50,000 km/h",
        sql: "SELECT DISTINCT a.name, ca.relative_velocity_km_per_hour \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              WHERE ca.relative_velocity_km_per_hour > 50000",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "11. Approaches per month",
        sql: "SELECT DATE_FORMAT(close_approach_date, '%Y-%m') AS month, COUNT(*) AS total \
              FROM close_approach \
              GROUP BY month \
              ORDER BY total DESC",
        sqlite_sql: Some(
            "SELECT strftime('%Y-%m', close_approach_date) AS month, COUNT(*) AS total \
             FROM close_approach \
             GROUP BY month \
             ORDER BY total DESC",
        ),
    },
    CatalogEntry {
        name: "12. Brightest asteroid (lowest magnitude)",
        sql: "SELECT id, name, absolute_magnitude_h \
              FROM asteroids \
              ORDER BY absolute_magnitude_h ASC \
              LIMIT 1",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "13. Hazardous vs Non-hazardous count",
        sql: "SELECT is_potentially_hazardous_asteroid, COUNT(*) AS count \
              FROM asteroids \
              GROUP BY is_potentially_hazardous_asteroid",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "14. Asteroids < 1 LD",
        sql: "SELECT a.name, ca.close_approach_date, ca.miss_distance_lunar \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              WHERE ca.miss_distance_lunar < 1 \
              ORDER BY ca.miss_distance_lunar",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "15. Asteroids < 0.05 AU",
        sql: "SELECT a.name, ca.close_approach_date, ca.astronomical \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              WHERE ca.astronomical < 0.05 \
              ORDER BY ca.astronomical",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "Bonus 1: Orbiting bodies (non-Earth)",
        sql: "SELECT orbiting_body, COUNT(*) AS count \
              FROM close_approach \
              WHERE orbiting_body != 'Earth' \
              GROUP BY orbiting_body \
              ORDER BY count DESC",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "Bonus 2: Avg miss distance by hazard type",
        sql: "SELECT a.is_potentially_hazardous_asteroid, AVG(ca.miss_distance_km) AS avg_miss_distance \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              GROUP BY a.is_potentially_hazardous_asteroid",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "Bonus 3: Top 5 closest approaches",
        sql: "SELECT a.name, ca.close_approach_date, ca.miss_distance_km \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              ORDER BY ca.miss_distance_km ASC \
              LIMIT 5",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "Bonus 4: Count of hazardous asteroids",
        sql: "SELECT COUNT(DISTINCT id) AS hazardous_asteroid_count \
              FROM asteroids \
              WHERE is_potentially_hazardous_asteroid = 1",
        sqlite_sql: None,
    },
    CatalogEntry {
        name: "Bonus 5: Frequent <1 LD asteroids",
        sql: "SELECT ca.neo_reference_id, a.name, COUNT(*) AS close_pass_count \
              FROM close_approach ca \
              JOIN asteroids a ON ca.neo_reference_id = a.id \
              WHERE ca.miss_distance_lunar < 1 \
              GROUP BY ca.neo_reference_id, a.name \
              HAVING COUNT(*) > 1 \
              ORDER BY close_pass_count DESC",
        sqlite_sql: None,
    },
];

const CATEGORIES: &[Category] = &[
    Category {
        title: "Statistical Analysis",
        entries: &[
            "1. Count asteroid approaches",
            "2. Average velocity per asteroid",
            "3. Top 10 fastest asteroids",
            "11. Approaches per month",
        ],
    },
    Category {
        title: "Hazard Assessment",
        entries: &[
            "4. Hazardous asteroids > 3 approaches",
            "13. Hazardous vs Non-hazardous count",
            "Bonus 4: Count of hazardous asteroids",
            "Bonus 2: Avg miss distance by hazard type",
        ],
    },
    Category {
        title: "Speed & Motion",
        entries: &["6. Fastest ever approach", "10. Velocity > 50,000 km/h"],
    },
    Category {
        title: "Distance & Size",
        entries: &[
            "7. Sort by max estimated diameter",
            "9. Closest approach date & distance",
            "14. Asteroids < 1 LD",
            "15. Asteroids < 0.05 AU",
            "Bonus 3: Top 5 closest approaches",
        ],
    },
    Category {
        title: "Temporal Analysis",
        entries: &[
            "5. Month with most approaches",
            "8. Closest approach getting nearer over time",
        ],
    },
    Category {
        title: "Special Queries",
        entries: &[
            "12. Brightest asteroid (lowest magnitude)",
            "Bonus 1: Orbiting bodies (non-Earth)",
            "Bonus 5: Frequent <1 LD asteroids",
        ],
    },
];

/// All queries in catalog order.
pub fn entries() -> &'static [CatalogEntry] {
    ENTRIES
}

/// All sidebar categories in display order.
pub fn categories() -> &'static [Category] {
    CATEGORIES
}

/// Looks up a query by its exact name.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    ENTRIES.iter().find(|entry| entry.name == name)
}

/// Looks up a query by name, falling back to [`DEFAULT_QUERY`].
pub fn resolve(name: &str) -> &'static CatalogEntry {
    find(name).unwrap_or(&ENTRIES[0])
}

/// Index of the category containing `name`, if any.
pub fn category_of(name: &str) -> Option<usize> {
    CATEGORIES
        .iter()
        .position(|category| category.entries.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_twenty_queries() {
        assert_eq!(entries().len(), 20);
        let names: HashSet<&str> = entries().iter().map(|e| e.name).collect();
        assert_eq!(names.len(), 20, "query names must be unique");
    }

    #[test]
    fn test_every_query_is_in_exactly_one_category() {
        assert_eq!(categories().len(), 6);
        let mut seen = HashSet::new();
        for category in categories() {
            for name in category.entries {
                assert!(find(name).is_some(), "unknown query in category: {name}");
                assert!(seen.insert(*name), "query listed twice: {name}");
            }
        }
        assert_eq!(seen.len(), entries().len());
    }

    #[test]
    fn test_default_query_resolves() {
        assert_eq!(resolve(DEFAULT_QUERY).name, DEFAULT_QUERY);
        assert_eq!(resolve("99. Comets").name, DEFAULT_QUERY);
    }

    #[test]
    fn test_find_brightest() {
        let entry = find("12. Brightest asteroid (lowest magnitude)").unwrap();
        assert_eq!(
            entry.sql,
            "SELECT id, name, absolute_magnitude_h FROM asteroids ORDER BY absolute_magnitude_h ASC LIMIT 1"
        );
    }

    #[test]
    fn test_sql_for_backend() {
        let monthly = find("11. Approaches per month").unwrap();
        assert!(monthly.sql_for(DatabaseBackend::MySql).contains("DATE_FORMAT"));
        assert!(monthly.sql_for(DatabaseBackend::Sqlite).contains("strftime('%Y-%m'"));

        let brightest = find("12. Brightest asteroid (lowest magnitude)").unwrap();
        assert_eq!(brightest.sql_for(DatabaseBackend::Sqlite), brightest.sql);
    }

    #[test]
    fn test_only_mysql_specific_queries_have_sqlite_variants() {
        for entry in entries() {
            assert_eq!(
                entry.sqlite_sql.is_some(),
                entry.sql.contains("DATE_FORMAT"),
                "{}",
                entry.name
            );
        }
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category_of("14. Asteroids < 1 LD"), Some(3));
        assert_eq!(category_of("not a query"), None);
    }
}
