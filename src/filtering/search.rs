use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, SimpleExpr};

// Upper bound on needle length before it reaches the database
const MAX_SEARCH_QUERY_LENGTH: usize = 1_000;

/// Escape character used for LIKE patterns. `!` needs no quoting in any
/// supported backend, unlike backslash.
pub const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so user input only ever matches literally.
/// Escapes the escape character itself, `%` and `_`.
pub fn escape_like_wildcards(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `LOWER(column) LIKE '%needle%' ESCAPE '!'` with the needle lower-cased,
/// trimmed, truncated and wildcard-escaped.
#[must_use]
pub fn build_like_condition(column: SimpleExpr, needle: &str) -> SimpleExpr {
    let trimmed: String = needle.trim().chars().take(MAX_SEARCH_QUERY_LENGTH).collect();
    let pattern = format!("%{}%", escape_like_wildcards(&trimmed.to_lowercase()));

    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// OR of case-insensitive substring matches over `columns`.
#[must_use]
pub fn build_search_condition(columns: Vec<SimpleExpr>, term: &str) -> Condition {
    columns
        .into_iter()
        .fold(Condition::any(), |condition, column| {
            condition.add(build_like_condition(column, term))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, PostgresQueryBuilder, Query, SqliteQueryBuilder};

    fn render_sqlite(condition: SimpleExpr) -> String {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("corporates"))
            .and_where(condition)
            .to_string(SqliteQueryBuilder)
    }

    fn column(name: &str) -> SimpleExpr {
        Expr::col((Alias::new("corporates"), Alias::new(name))).into()
    }

    #[test]
    fn test_wildcard_escaping() {
        assert_eq!(escape_like_wildcards("test"), "test");
        assert_eq!(escape_like_wildcards("100%"), "100!%");
        assert_eq!(escape_like_wildcards("test_value"), "test!_value");
        assert_eq!(escape_like_wildcards("wow!"), "wow!!");
        assert_eq!(escape_like_wildcards("%_"), "!%!_");
    }

    #[test]
    fn test_like_condition_is_lowercased() {
        let sql = render_sqlite(build_like_condition(column("company_name"), "  TeCh "));
        assert!(sql.contains(r#"LOWER("corporates"."company_name") LIKE '%tech%'"#), "{sql}");
        assert!(sql.contains("ESCAPE '!'"), "{sql}");
    }

    #[test]
    fn test_like_condition_prevents_wildcard_injection() {
        let sql = render_sqlite(build_like_condition(column("company_name"), "50%_off"));
        assert!(sql.contains("'%50!%!_off%'"), "{sql}");
    }

    #[test]
    fn test_value_is_parameterized() {
        let (sql, values) = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("corporates"))
            .and_where(build_like_condition(column("company_name"), "'; DROP TABLE x; --"))
            .build(PostgresQueryBuilder);
        assert!(!sql.contains("DROP"), "{sql}");
        assert_eq!(values.0.len(), 1);
    }

    #[test]
    fn test_search_condition_ors_columns() {
        let mut stmt = Query::select();
        stmt.column(Alias::new("id"))
            .from(Alias::new("colleges"))
            .cond_where(build_search_condition(
                vec![
                    Expr::col((Alias::new("colleges"), Alias::new("college_name"))).into(),
                    Expr::col((Alias::new("colleges"), Alias::new("location"))).into(),
                ],
                "pune",
            ));
        let sql = stmt.to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#"LOWER("colleges"."college_name") LIKE '%pune%'"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(r#"LOWER("colleges"."location") LIKE '%pune%'"#), "{sql}");
    }

    #[test]
    fn test_long_needle_truncated() {
        let long = "a".repeat(5_000);
        let sql = render_sqlite(build_like_condition(column("company_name"), &long));
        assert!(sql.len() < 5_000);
    }
}
