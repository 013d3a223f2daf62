//! Predicate descriptors that make up a [`FilterPlan`](super::FilterPlan).
//!
//! Each variant describes one filter without touching a statement; the plan
//! renders them onto a `SelectStatement` in stage order.

use sea_orm::{
    DbBackend, Value,
    sea_query::{Alias, Condition, Expr, Func, IntoColumnRef, SimpleExpr},
};

use super::{ranges::RangeSet, search::build_like_condition};

/// A column qualified by the table (or join alias) that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub table: &'static str,
    pub column: &'static str,
}

impl Field {
    #[must_use]
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }

    pub(crate) fn expr(self) -> Expr {
        Expr::col((Alias::new(self.table), Alias::new(self.column)))
    }

    pub(crate) fn simple(self) -> SimpleExpr {
        SimpleExpr::Column((Alias::new(self.table), Alias::new(self.column)).into_column_ref())
    }

    /// `"table"."column"` quoted for custom SQL fragments.
    fn quoted(self, backend: DbBackend) -> String {
        let q = match backend {
            DbBackend::MySql => '`',
            _ => '"',
        };
        format!("{q}{}{q}.{q}{}{q}", self.table, self.column)
    }
}

/// An inner join of `table AS alias ON alias.column = references`,
/// optionally restricted to rows whose `latest_flag` column is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    pub table: &'static str,
    pub alias: &'static str,
    pub column: &'static str,
    pub references: Field,
    pub latest_flag: Option<&'static str>,
}

impl Join {
    #[must_use]
    pub const fn new(
        table: &'static str,
        alias: &'static str,
        column: &'static str,
        references: Field,
    ) -> Self {
        Self {
            table,
            alias,
            column,
            references,
            latest_flag: None,
        }
    }

    /// Restrict the join to the row flagged latest.
    #[must_use]
    pub const fn latest(mut self, flag: &'static str) -> Self {
        self.latest_flag = Some(flag);
        self
    }

    /// A column of the joined table, addressed through the alias.
    #[must_use]
    pub const fn field(&self, column: &'static str) -> Field {
        Field::new(self.alias, column)
    }

    pub(crate) fn condition(&self) -> Condition {
        let alias = Alias::new(self.alias);
        Condition::all()
            .add(
                Expr::col((alias.clone(), Alias::new(self.column)))
                    .equals((Alias::new(self.references.table), Alias::new(self.references.column))),
            )
            .add_option(
                self.latest_flag
                    .map(|flag| Expr::col((alias, Alias::new(flag))).eq(true)),
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    AtLeast,
    AtMost,
}

/// How a many-to-many name filter combines the requested values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetSemantics {
    /// The root must be linked to every requested name.
    All,
    /// The root must be linked to at least one requested name.
    Any,
}

/// Application order of predicates within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Scalar,
    Scoped,
    Set,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IsNull {
        field: Field,
    },
    /// Case-insensitive substring match.
    Contains {
        field: Field,
        needle: String,
    },
    EqualsIgnoreCase {
        field: Field,
        value: String,
    },
    Equals {
        field: Field,
        value: Value,
    },
    Compare {
        field: Field,
        bound: Bound,
        value: Value,
    },
    /// OR of closed intervals plus an exclusive lower bound.
    InRanges {
        field: Field,
        intervals: Vec<(Value, Value)>,
        above: Option<Value>,
    },
    /// JSON array column must contain every value.
    ContainsAll {
        field: Field,
        values: Vec<String>,
    },
    /// Joins applied only when at least one inner predicate is present.
    Scoped {
        joins: Vec<Join>,
        predicates: Vec<Predicate>,
    },
    /// Many-to-many membership on lower-cased names.
    MatchesNames {
        joins: Vec<Join>,
        name: Field,
        values: Vec<String>,
        semantics: SetSemantics,
    },
    Search {
        joins: Vec<Join>,
        fields: Vec<Field>,
        term: String,
    },
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl Predicate {
    #[must_use]
    pub fn is_null(field: Field) -> Option<Self> {
        Some(Self::IsNull { field })
    }

    #[must_use]
    pub fn contains(field: Field, needle: Option<&str>) -> Option<Self> {
        present(needle).map(|needle| Self::Contains { field, needle })
    }

    #[must_use]
    pub fn equals_ignore_case(field: Field, value: Option<&str>) -> Option<Self> {
        present(value).map(|value| Self::EqualsIgnoreCase { field, value })
    }

    pub fn equals<V: Into<Value>>(field: Field, value: Option<V>) -> Option<Self> {
        value.map(|value| Self::Equals {
            field,
            value: value.into(),
        })
    }

    pub fn compare<V: Into<Value>>(field: Field, bound: Bound, value: Option<V>) -> Option<Self> {
        value.map(|value| Self::Compare {
            field,
            bound,
            value: value.into(),
        })
    }

    /// `None` when the set has no usable segment.
    pub fn in_ranges<T>(field: Field, ranges: RangeSet<T>) -> Option<Self>
    where
        T: Into<Value>,
    {
        if ranges.is_empty() {
            return None;
        }
        Some(Self::InRanges {
            field,
            intervals: ranges
                .intervals
                .into_iter()
                .map(|(min, max)| (min.into(), max.into()))
                .collect(),
            above: ranges.above.map(Into::into),
        })
    }

    #[must_use]
    pub fn contains_all(field: Field, values: &[String]) -> Option<Self> {
        (!values.is_empty()).then(|| Self::ContainsAll {
            field,
            values: values.to_vec(),
        })
    }

    /// Skipped entirely when no inner predicate is present.
    #[must_use]
    pub fn scoped(joins: Vec<Join>, predicates: Vec<Option<Self>>) -> Option<Self> {
        let predicates: Vec<Self> = predicates.into_iter().flatten().collect();
        (!predicates.is_empty()).then_some(Self::Scoped { joins, predicates })
    }

    /// Values are lower-cased and de-duplicated, keeping first occurrence order.
    #[must_use]
    pub fn matches_names(
        joins: Vec<Join>,
        name: Field,
        values: &[String],
        semantics: SetSemantics,
    ) -> Option<Self> {
        let mut lowered: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim().to_lowercase();
            if !value.is_empty() && !lowered.contains(&value) {
                lowered.push(value);
            }
        }
        (!lowered.is_empty()).then_some(Self::MatchesNames {
            joins,
            name,
            values: lowered,
            semantics,
        })
    }

    #[must_use]
    pub fn search(joins: Vec<Join>, fields: Vec<Field>, term: Option<&str>) -> Option<Self> {
        present(term).map(|term| Self::Search { joins, fields, term })
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Scoped { .. } => Stage::Scoped,
            Self::MatchesNames { .. } => Stage::Set,
            Self::Search { .. } => Stage::Search,
            _ => Stage::Scalar,
        }
    }

    /// WHERE condition for scalar predicates; `None` for joined variants.
    pub(crate) fn condition(&self, backend: DbBackend) -> Option<Condition> {
        let condition = match self {
            Self::IsNull { field } => Condition::all().add(field.expr().is_null()),
            Self::Contains { field, needle } => {
                Condition::all().add(build_like_condition(field.simple(), needle))
            }
            Self::EqualsIgnoreCase { field, value } => Condition::all()
                .add(Expr::expr(Func::lower(field.simple())).eq(value.to_lowercase())),
            Self::Equals { field, value } => Condition::all().add(field.expr().eq(value.clone())),
            Self::Compare {
                field,
                bound,
                value,
            } => Condition::all().add(match bound {
                Bound::AtLeast => field.expr().gte(value.clone()),
                Bound::AtMost => field.expr().lte(value.clone()),
            }),
            Self::InRanges {
                field,
                intervals,
                above,
            } => {
                let any = intervals
                    .iter()
                    .fold(Condition::any(), |any, (min, max)| {
                        any.add(field.expr().between(min.clone(), max.clone()))
                    });
                any.add_option(above.clone().map(|bound| field.expr().gt(bound)))
            }
            Self::ContainsAll { field, values } => contains_all_condition(*field, values, backend),
            Self::Scoped { .. } | Self::MatchesNames { .. } | Self::Search { .. } => return None,
        };
        Some(condition)
    }
}

/// Positional placeholder understood by sea-query custom expressions.
pub(crate) fn placeholder(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Postgres => "$1",
        _ => "?",
    }
}

fn contains_all_condition(field: Field, values: &[String], backend: DbBackend) -> Condition {
    let column = field.quoted(backend);
    let p = placeholder(backend);
    match backend {
        DbBackend::Postgres => {
            let json = serde_json::Value::from(values.to_vec()).to_string();
            Condition::all().add(Expr::cust_with_values(
                format!("{column} @> CAST({p} AS jsonb)"),
                [json],
            ))
        }
        DbBackend::MySql => {
            let json = serde_json::Value::from(values.to_vec()).to_string();
            Condition::all().add(Expr::cust_with_values(
                format!("JSON_CONTAINS({column}, {p})"),
                [json],
            ))
        }
        DbBackend::Sqlite => values.iter().fold(Condition::all(), |all, value| {
            all.add(Expr::cust_with_values(
                format!("EXISTS (SELECT 1 FROM json_each({column}) WHERE json_each.value = {p})"),
                [value.clone()],
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Field = Field::new("skill_masters", "name");

    #[test]
    fn test_empty_inputs_produce_no_predicate() {
        assert!(Predicate::contains(NAME, None).is_none());
        assert!(Predicate::contains(NAME, Some("   ")).is_none());
        assert!(Predicate::contains_all(NAME, &[]).is_none());
        assert!(Predicate::in_ranges(NAME, RangeSet::<i64>::parse(&["abc-500"])).is_none());
        assert!(Predicate::scoped(vec![], vec![None, None]).is_none());
        assert!(Predicate::search(vec![], vec![NAME], Some("")).is_none());
    }

    #[test]
    fn test_matches_names_lowercases_and_dedupes() {
        let predicate = Predicate::matches_names(
            vec![],
            NAME,
            &["Java".into(), "java".into(), " Go ".into()],
            SetSemantics::All,
        );
        match predicate {
            Some(Predicate::MatchesNames { values, .. }) => assert_eq!(values, vec!["java", "go"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Scalar < Stage::Scoped);
        assert!(Stage::Scoped < Stage::Set);
        assert!(Stage::Set < Stage::Search);
        assert_eq!(
            Predicate::search(vec![], vec![NAME], Some("x")).map(|p| p.stage()),
            Some(Stage::Search)
        );
    }

    #[test]
    fn test_join_condition_carries_latest_flag() {
        let join = Join::new("experiences", "latest_experience", "user_id", Field::new("students", "user_id"))
            .latest("is_latest");
        assert_eq!(join.field("title"), Field::new("latest_experience", "title"));
        let rendered = format!("{:?}", join.condition());
        assert!(rendered.contains("is_latest"), "{rendered}");
    }

    #[test]
    fn test_placeholder_per_backend() {
        assert_eq!(placeholder(DbBackend::Postgres), "$1");
        assert_eq!(placeholder(DbBackend::Sqlite), "?");
        assert_eq!(placeholder(DbBackend::MySql), "?");
    }
}
