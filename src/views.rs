//! View adapter rules: which parquet columns get reshaped, and how.
//!
//! The upstream parquet files encode list-valued columns as `", "`
//! joined VARCHAR and struct-valued columns as JSON text. The adapter
//! decisions live here as data tables plus pure SQL-synthesis
//! functions; [`crate::engine::Engine`] introspects each parquet
//! footer and feeds the `(column, type)` pairs through them.

/// Known list columns whose names do not end in `s`, per view.
/// Always converted to arrays regardless of the name heuristic.
pub(crate) const BASELINE_LIST_COLUMNS: &[(&str, &[&str])] = &[
    (
        "cards",
        &[
            "artistIds",
            "attractionLights",
            "availability",
            "boosterTypes",
            "cardParts",
            "colorIdentity",
            "colorIndicator",
            "colors",
            "finishes",
            "frameEffects",
            "keywords",
            "originalPrintings",
            "otherFaceIds",
            "printings",
            "producedMana",
            "promoTypes",
            "rebalancedPrintings",
            "subsets",
            "subtypes",
            "supertypes",
            "types",
            "variations",
        ],
    ),
    (
        "tokens",
        &[
            "artistIds",
            "availability",
            "boosterTypes",
            "colorIdentity",
            "colorIndicator",
            "colors",
            "finishes",
            "frameEffects",
            "keywords",
            "otherFaceIds",
            "producedMana",
            "promoTypes",
            "reverseRelated",
            "subtypes",
            "supertypes",
            "types",
        ],
    ),
];

/// VARCHAR columns that are scalar text even when the plural-name
/// heuristic matches. Splitting these would corrupt rules text,
/// JSON payloads, and `*/*` stat strings.
pub(crate) const SCALAR_BLOCKLIST: &[&str] = &[
    "text",
    "originalText",
    "flavorText",
    "printedText",
    "identifiers",
    "legalities",
    "leadershipSkills",
    "purchaseUrls",
    "relatedCards",
    "rulings",
    "sourceProducts",
    "foreignData",
    "translations",
    "toughness",
    "status",
    "format",
    "uris",
    "scryfallUri",
];

/// VARCHAR columns holding JSON text, cast to DuckDB's JSON type so
/// callers can navigate them with `->>` / `json_extract`.
///
/// This is a closed list; a new struct-in-string upstream column will
/// not be detected until it is added here.
pub(crate) const JSON_COLUMNS: &[&str] = &[
    "identifiers",
    "legalities",
    "leadershipSkills",
    "purchaseUrls",
    "relatedCards",
    "rulings",
    "sourceProducts",
    "foreignData",
    "translations",
];

fn baseline_for(view: &str) -> &'static [&'static str] {
    BASELINE_LIST_COLUMNS
        .iter()
        .find(|(v, _)| *v == view)
        .map(|(_, cols)| *cols)
        .unwrap_or(&[])
}

/// Whether a `(column, type)` pair should be split into a string array.
///
/// Requires VARCHAR, not blocklisted, and either in the view's
/// baseline set or plural-named.
fn is_list_column(view: &str, column: &str, dtype: &str) -> bool {
    dtype == "VARCHAR"
        && !SCALAR_BLOCKLIST.contains(&column)
        && (baseline_for(view).contains(&column) || column.ends_with('s'))
}

/// Build the `REPLACE (...)` projection for a view over `schema`
/// (`(column, type)` pairs from DESCRIBE). Empty string when no
/// column needs transforming.
///
/// List columns become `[]` when NULL or blank, else the `", "`
/// split; JSON columns are TRY-cast so malformed payloads degrade to
/// NULL rather than failing the view.
pub(crate) fn replace_projection(view: &str, schema: &[(String, String)]) -> String {
    let mut list_cols: Vec<&str> = schema
        .iter()
        .filter(|(col, dtype)| is_list_column(view, col, dtype))
        .map(|(col, _)| col.as_str())
        .collect();
    list_cols.sort_unstable();

    let mut exprs: Vec<String> = list_cols
        .iter()
        .map(|col| {
            format!(
                "CASE WHEN \"{col}\" IS NULL OR TRIM(\"{col}\") = '' \
                 THEN []::VARCHAR[] \
                 ELSE string_split(\"{col}\", ', ') END AS \"{col}\""
            )
        })
        .collect();

    for col in JSON_COLUMNS {
        let is_varchar = schema
            .iter()
            .any(|(c, t)| c == col && t == "VARCHAR");
        if is_varchar {
            exprs.push(format!("TRY_CAST(\"{col}\" AS JSON) AS \"{col}\""));
        }
    }

    if exprs.is_empty() {
        String::new()
    } else {
        format!(" REPLACE ({})", exprs.join(", "))
    }
}

/// View SQL for an ordinary parquet source.
pub(crate) fn parquet_view_sql(view: &str, path: &str, schema: &[(String, String)]) -> String {
    format!(
        "CREATE OR REPLACE VIEW {view} AS SELECT *{} FROM read_parquet('{path}')",
        replace_projection(view, schema)
    )
}

/// View SQL for `card_legalities`: UNPIVOT every non-uuid column of
/// the wide parquet into `(uuid, format, status)` rows, dropping null
/// statuses. Falls back to a direct passthrough when no format
/// columns are present (fixtures already in the tall shape).
pub(crate) fn legalities_view_sql(path: &str, columns: &[String]) -> String {
    let format_cols: Vec<String> = columns
        .iter()
        .filter(|c| c.as_str() != "uuid")
        .map(|c| format!("\"{c}\""))
        .collect();

    if format_cols.is_empty() {
        return format!(
            "CREATE OR REPLACE VIEW card_legalities AS SELECT * FROM read_parquet('{path}')"
        );
    }

    format!(
        "CREATE OR REPLACE VIEW card_legalities AS \
         SELECT uuid, format, status FROM (\
           UNPIVOT (SELECT * FROM read_parquet('{path}')) \
           ON {} \
           INTO NAME format VALUE status\
         ) WHERE status IS NOT NULL",
        format_cols.join(", ")
    )
}
