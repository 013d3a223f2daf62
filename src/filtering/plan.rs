use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryTrait, Select,
    sea_query::{Alias, Condition, Expr, Func, JoinType, Order, Query, SelectStatement},
};

use super::{
    predicate::{Field, Join, Predicate, SetSemantics, placeholder},
    search::build_search_condition,
};

/// Ordered set of predicates for one root table.
///
/// Built from a filter struct without touching the database; [`count`] and
/// [`fetch`] derive their statements from the same plan.
///
/// [`count`]: FilterPlan::count
/// [`fetch`]: FilterPlan::fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    root: Field,
    predicates: Vec<Predicate>,
}

impl FilterPlan {
    /// `root` is the root table's primary key column.
    #[must_use]
    pub fn new(root: Field) -> Self {
        Self {
            root,
            predicates: Vec::new(),
        }
    }

    /// Append a predicate if present.
    #[must_use]
    pub fn with(mut self, predicate: Option<Predicate>) -> Self {
        self.predicates.extend(predicate);
        self
    }

    /// Predicates in application order: scalars, scoped joins, set joins, search.
    /// Within a stage the push order is kept.
    pub fn ordered(&self) -> Vec<&Predicate> {
        let mut ordered: Vec<&Predicate> = self.predicates.iter().collect();
        ordered.sort_by_key(|predicate| predicate.stage());
        ordered
    }

    /// Whether applying the plan groups rows by the root id.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        self.predicates
            .iter()
            .any(|predicate| matches!(predicate, Predicate::MatchesNames { .. }))
    }

    /// Render every predicate onto `stmt`.
    pub fn apply(&self, stmt: &mut SelectStatement, backend: DbBackend) {
        let mut grouped = false;
        for predicate in self.ordered() {
            self.apply_predicate(predicate, stmt, backend, &mut grouped);
        }
    }

    fn apply_predicate(
        &self,
        predicate: &Predicate,
        stmt: &mut SelectStatement,
        backend: DbBackend,
        grouped: &mut bool,
    ) {
        match predicate {
            Predicate::Scoped { joins, predicates } => {
                if predicates.is_empty() {
                    return;
                }
                join_all(stmt, joins);
                for inner in predicates {
                    self.apply_predicate(inner, stmt, backend, grouped);
                }
            }
            Predicate::MatchesNames {
                joins,
                name,
                values,
                semantics,
            } => {
                join_all(stmt, joins);
                stmt.cond_where(
                    Condition::all()
                        .add(Expr::expr(Func::lower(name.simple())).is_in(values.clone())),
                );
                if !*grouped {
                    stmt.group_by_col((Alias::new(self.root.table), Alias::new(self.root.column)));
                    *grouped = true;
                }
                if *semantics == SetSemantics::All {
                    let wanted = i64::try_from(values.len()).unwrap_or(i64::MAX);
                    stmt.and_having(
                        Expr::expr(Expr::cust_with_expr(
                            format!("COUNT(DISTINCT {})", placeholder(backend)),
                            Func::lower(name.simple()),
                        ))
                        .eq(wanted),
                    );
                }
            }
            Predicate::Search {
                joins,
                fields,
                term,
            } => {
                join_all(stmt, joins);
                stmt.cond_where(build_search_condition(
                    fields.iter().map(|field| field.simple()).collect(),
                    term,
                ));
            }
            scalar => {
                if let Some(condition) = scalar.condition(backend) {
                    stmt.cond_where(condition);
                }
            }
        }
    }

    /// Statement selecting the distinct root ids that match.
    #[must_use]
    pub fn matching_ids(&self, backend: DbBackend) -> SelectStatement {
        let mut ids = Query::select();
        ids.distinct()
            .column((Alias::new(self.root.table), Alias::new(self.root.column)))
            .from(Alias::new(self.root.table));
        self.apply(&mut ids, backend);
        ids
    }

    /// `SELECT COUNT(*) AS total FROM (<matching ids>) matched`
    #[must_use]
    pub fn count_statement(&self, backend: DbBackend) -> SelectStatement {
        Query::select()
            .expr_as(Expr::cust("COUNT(*)"), Alias::new("total"))
            .from_subquery(self.matching_ids(backend), Alias::new("matched"))
            .to_owned()
    }

    /// Number of distinct roots matching the plan.
    pub async fn count<C>(&self, db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let backend = db.get_database_backend();
        let statement = backend.build(&self.count_statement(backend));
        let total: i64 = match db.query_one(statement).await? {
            Some(row) => row.try_get("", "total")?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// One page of root models ordered by id.
    pub async fn fetch<E, C>(
        &self,
        db: &C,
        select: Select<E>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<E::Model>, DbErr>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let mut select = select;
        let stmt = QueryTrait::query(&mut select);
        self.apply(stmt, db.get_database_backend());
        stmt.order_by((Alias::new(self.root.table), Alias::new(self.root.column)), Order::Asc)
            .offset(offset)
            .limit(limit);

        select.all(db).await
    }
}

fn join_all(stmt: &mut SelectStatement, joins: &[Join]) {
    for join in joins {
        stmt.join_as(
            JoinType::InnerJoin,
            Alias::new(join.table),
            Alias::new(join.alias),
            join.condition(),
        );
    }
}
