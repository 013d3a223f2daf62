//! Student directory: filters over the latest education and experience,
//! skill intersection and name search.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use super::{reload, users_by_id};
use crate::{
    core::{
        DirectoryResource,
        records::{Dated, latest_flags, months_between, total_years},
    },
    entities::{college_master, company_master, education, experience, skill, student, student_skill, user},
    filtering::{Bound, Field, FilterPlan, Join, Predicate, RangeSet, SetSemantics, multi_value},
    pagination::{DataEnvelope, ListEnvelope, Paginated},
};

const ID: Field = Field::new("students", "id");
const USER_ID: Field = Field::new("students", "user_id");
const DELETED_AT: Field = Field::new("students", "deleted_at");
const TOTAL_EXPERIENCE_YEARS: Field = Field::new("students", "total_experience_years");

const LATEST_EDUCATION: Join =
    Join::new("educations", "latest_education", "user_id", USER_ID).latest("is_latest");
const LATEST_COLLEGE: Join = Join::new(
    "college_masters",
    "latest_college",
    "id",
    LATEST_EDUCATION.field("college_id"),
);
const LATEST_EXPERIENCE: Join =
    Join::new("experiences", "latest_experience", "user_id", USER_ID).latest("is_latest");
const LATEST_COMPANY: Join = Join::new(
    "company_masters",
    "latest_company",
    "id",
    LATEST_EXPERIENCE.field("company_id"),
);
const SKILL_LINK: Join = Join::new("student_skills", "skill_link", "student_id", ID);
const SKILL: Join = Join::new("skill_masters", "skill", "id", SKILL_LINK.field("skill_master_id"));
const SEARCH_USER: Join = Join::new("users", "search_user", "id", USER_ID);

/// Query parameters for `GET /students`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentFilter {
    /// Substring of the latest education's college name
    pub college_name: Option<String>,
    /// Degree of the latest education
    pub level: Option<String>,
    /// CGPA ranges such as `7-8,9+`
    #[serde(default, deserialize_with = "multi_value")]
    pub cgpa_ranges: Vec<String>,
    pub min_cgpa: Option<f64>,
    pub year_of_study: Option<i32>,
    pub field_of_study: Option<String>,
    /// Substring of the latest experience's company name
    pub company: Option<String>,
    /// Substring of the latest experience's title
    pub title: Option<String>,
    pub min_exp_years: Option<i32>,
    pub max_exp_years: Option<i32>,
    /// Skill names; a student must have all of them
    #[serde(default, deserialize_with = "multi_value")]
    pub skills: Vec<String>,
    /// Matches first or last name
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Paginated for StudentFilter {
    fn page(&self) -> Option<i64> {
        self.page
    }

    fn page_size(&self) -> Option<i64> {
        self.page_size
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    pub college_id: i32,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cgpa: f64,
    pub year_of_study: i32,
    /// Computed from the dates when omitted
    pub duration_months: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    pub company_id: i32,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Computed from the dates when omitted
    pub duration_months: Option<i32>,
}

impl Dated for EducationInput {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
}

impl Dated for ExperienceInput {
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
}

impl EducationInput {
    fn duration(&self) -> i32 {
        self.duration_months
            .unwrap_or_else(|| months_between(self.start_date, self.end_date))
    }
}

impl ExperienceInput {
    fn duration(&self) -> i32 {
        self.duration_months
            .unwrap_or_else(|| months_between(self.start_date, self.end_date))
    }
}

/// Body of `POST /students` and `PUT /students/{id}`.
///
/// When `educations` or `experiences` is present, the user's rows of that
/// kind are replaced and the latest one is flagged. Skill links are always
/// replaced.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub user_id: i32,
    #[serde(default)]
    pub skill_ids: Vec<i32>,
    pub educations: Option<Vec<EducationInput>>,
    pub experiences: Option<Vec<ExperienceInput>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationView {
    #[serde(flatten)]
    pub education: education::Model,
    pub college: Option<college_master::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceView {
    #[serde(flatten)]
    pub experience: experience::Model,
    pub company: Option<company_master::Model>,
}

/// A student with its user, latest education and experience, and skills.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(flatten)]
    pub student: student::Model,
    pub user: Option<user::Model>,
    pub educations: Vec<EducationView>,
    pub experiences: Vec<ExperienceView>,
    pub skills: Vec<skill::Model>,
}

fn experience_years(experiences: &[ExperienceInput]) -> i32 {
    total_years(experiences.iter().map(ExperienceInput::duration))
}

async fn replace_skills(
    txn: &DatabaseTransaction,
    student_id: i32,
    skill_ids: &[i32],
) -> Result<(), DbErr> {
    student_skill::Entity::delete_many()
        .filter(student_skill::Column::StudentId.eq(student_id))
        .exec(txn)
        .await?;

    let mut skill_ids = skill_ids.to_vec();
    skill_ids.sort_unstable();
    skill_ids.dedup();
    if skill_ids.is_empty() {
        return Ok(());
    }

    let links = skill_ids.into_iter().map(|skill_id| student_skill::ActiveModel {
        student_id: Set(student_id),
        skill_master_id: Set(skill_id),
    });
    student_skill::Entity::insert_many(links)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn replace_educations(
    txn: &DatabaseTransaction,
    user_id: i32,
    educations: &[EducationInput],
) -> Result<(), DbErr> {
    education::Entity::delete_many()
        .filter(education::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    for (input, is_latest) in educations.iter().zip(latest_flags(educations)) {
        education::ActiveModel {
            user_id: Set(user_id),
            college_id: Set(input.college_id),
            degree: Set(input.degree.clone()),
            field_of_study: Set(input.field_of_study.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            cgpa: Set(input.cgpa),
            year_of_study: Set(input.year_of_study),
            duration_months: Set(input.duration()),
            is_latest: Set(is_latest),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn replace_experiences(
    txn: &DatabaseTransaction,
    user_id: i32,
    experiences: &[ExperienceInput],
) -> Result<(), DbErr> {
    experience::Entity::delete_many()
        .filter(experience::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    for (input, is_latest) in experiences.iter().zip(latest_flags(experiences)) {
        experience::ActiveModel {
            user_id: Set(user_id),
            company_id: Set(input.company_id),
            title: Set(input.title.clone()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            duration_months: Set(input.duration()),
            is_latest: Set(is_latest),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

async fn write_children(
    txn: &DatabaseTransaction,
    row: &student::Model,
    payload: &StudentPayload,
) -> Result<(), DbErr> {
    replace_skills(txn, row.id, &payload.skill_ids).await?;
    if let Some(educations) = &payload.educations {
        replace_educations(txn, row.user_id, educations).await?;
    }
    if let Some(experiences) = &payload.experiences {
        replace_experiences(txn, row.user_id, experiences).await?;
    }
    Ok(())
}

#[async_trait]
impl DirectoryResource for Student {
    type EntityType = student::Entity;
    type Filter = StudentFilter;
    type Payload = StudentPayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "student";
    const RESOURCE_NAME_PLURAL: &'static str = "students";
    const ID: Field = ID;
    const DELETED_AT: Field = DELETED_AT;

    fn filter_plan(filter: &StudentFilter) -> FilterPlan {
        Self::base_plan()
            .with(Predicate::scoped(
                vec![LATEST_EDUCATION],
                vec![
                    Predicate::scoped(
                        vec![LATEST_COLLEGE],
                        vec![Predicate::contains(
                            LATEST_COLLEGE.field("name"),
                            filter.college_name.as_deref(),
                        )],
                    ),
                    Predicate::equals_ignore_case(
                        LATEST_EDUCATION.field("degree"),
                        filter.level.as_deref(),
                    ),
                    Predicate::in_ranges(
                        LATEST_EDUCATION.field("cgpa"),
                        RangeSet::<f64>::parse(&filter.cgpa_ranges),
                    ),
                    Predicate::compare(LATEST_EDUCATION.field("cgpa"), Bound::AtLeast, filter.min_cgpa),
                    Predicate::equals(LATEST_EDUCATION.field("year_of_study"), filter.year_of_study),
                    Predicate::contains(
                        LATEST_EDUCATION.field("field_of_study"),
                        filter.field_of_study.as_deref(),
                    ),
                ],
            ))
            .with(Predicate::scoped(
                vec![LATEST_EXPERIENCE],
                vec![
                    Predicate::scoped(
                        vec![LATEST_COMPANY],
                        vec![Predicate::contains(
                            LATEST_COMPANY.field("name"),
                            filter.company.as_deref(),
                        )],
                    ),
                    Predicate::contains(LATEST_EXPERIENCE.field("title"), filter.title.as_deref()),
                    Predicate::compare(TOTAL_EXPERIENCE_YEARS, Bound::AtLeast, filter.min_exp_years),
                    Predicate::compare(TOTAL_EXPERIENCE_YEARS, Bound::AtMost, filter.max_exp_years),
                ],
            ))
            .with(Predicate::matches_names(
                vec![SKILL_LINK, SKILL],
                SKILL.field("name"),
                &filter.skills,
                SetSemantics::All,
            ))
            .with(Predicate::search(
                vec![SEARCH_USER],
                vec![SEARCH_USER.field("first_name"), SEARCH_USER.field("last_name")],
                filter.search.as_deref(),
            ))
    }

    /// Hydration profile: user, latest education with college, latest
    /// experience with company, skills. One query per association.
    async fn hydrate(
        db: &DatabaseConnection,
        models: Vec<student::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let user_ids: Vec<i32> = models.iter().map(|m| m.user_id).collect();

        let users = users_by_id(db, user_ids.iter().copied()).await?;

        let mut educations: HashMap<i32, Vec<EducationView>> = HashMap::new();
        for (education, college) in education::Entity::find()
            .find_also_related(college_master::Entity)
            .filter(education::Column::UserId.is_in(user_ids.clone()))
            .filter(education::Column::IsLatest.eq(true))
            .order_by_asc(education::Column::Id)
            .all(db)
            .await?
        {
            educations
                .entry(education.user_id)
                .or_default()
                .push(EducationView { education, college });
        }

        let mut experiences: HashMap<i32, Vec<ExperienceView>> = HashMap::new();
        for (experience, company) in experience::Entity::find()
            .find_also_related(company_master::Entity)
            .filter(experience::Column::UserId.is_in(user_ids))
            .filter(experience::Column::IsLatest.eq(true))
            .order_by_asc(experience::Column::Id)
            .all(db)
            .await?
        {
            experiences
                .entry(experience.user_id)
                .or_default()
                .push(ExperienceView { experience, company });
        }

        let mut skills: HashMap<i32, Vec<skill::Model>> = HashMap::new();
        for (link, skill) in student_skill::Entity::find()
            .find_also_related(skill::Entity)
            .filter(student_skill::Column::StudentId.is_in(ids))
            .order_by_asc(student_skill::Column::SkillMasterId)
            .all(db)
            .await?
        {
            if let Some(skill) = skill {
                skills.entry(link.student_id).or_default().push(skill);
            }
        }

        Ok(models
            .into_iter()
            .map(|student| {
                let (id, user_id) = (student.id, student.user_id);
                Self {
                    user: users.get(&user_id).cloned(),
                    educations: educations.remove(&user_id).unwrap_or_default(),
                    experiences: experiences.remove(&user_id).unwrap_or_default(),
                    skills: skills.remove(&id).unwrap_or_default(),
                    student,
                }
            })
            .collect())
    }

    async fn create(db: &DatabaseConnection, payload: StudentPayload) -> Result<Self, DbErr> {
        let now = Utc::now();
        let txn = db.begin().await?;

        let row = student::ActiveModel {
            user_id: Set(payload.user_id),
            total_experience_years: Set(payload
                .experiences
                .as_deref()
                .map_or(0, experience_years)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        write_children(&txn, &row, &payload).await?;
        txn.commit().await?;

        tracing::info!(student_id = row.id, user_id = row.user_id, "student created");
        reload(db, row.id).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        payload: StudentPayload,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        let mut changes = student::ActiveModel {
            id: Set(id),
            user_id: Set(payload.user_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(experiences) = payload.experiences.as_deref() {
            changes.total_experience_years = Set(experience_years(experiences));
        }
        let row = student::Entity::update(changes)
            .filter(student::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;
        write_children(&txn, &row, &payload).await?;
        txn.commit().await?;

        reload(db, row.id).await
    }
}

crate::directory_router!(Student, StudentFilter, StudentPayload);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, sea_query::SqliteQueryBuilder};

    fn render(filter: &StudentFilter) -> String {
        Student::filter_plan(filter)
            .matching_ids(DbBackend::Sqlite)
            .to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_no_filters_only_hides_deleted() {
        let sql = render(&StudentFilter::default());
        assert!(sql.contains(r#""students"."deleted_at" IS NULL"#), "{sql}");
        assert!(!sql.contains("JOIN"), "{sql}");
    }

    #[test]
    fn test_college_name_joins_latest_education_then_college() {
        let sql = render(&StudentFilter {
            college_name: Some("IIT".into()),
            ..Default::default()
        });
        let education = sql.find(r#""educations" AS "latest_education""#).unwrap_or(usize::MAX);
        let college = sql.find(r#""college_masters" AS "latest_college""#).unwrap_or(usize::MAX);
        assert!(education < college && college != usize::MAX, "{sql}");
        assert!(sql.contains(r#"LOWER("latest_college"."name") LIKE '%iit%'"#), "{sql}");
    }

    #[test]
    fn test_level_without_college_skips_college_join() {
        let sql = render(&StudentFilter {
            level: Some("B.Tech".into()),
            ..Default::default()
        });
        assert!(sql.contains(r#""educations" AS "latest_education""#), "{sql}");
        assert!(!sql.contains("college_masters"), "{sql}");
    }

    #[test]
    fn test_experience_years_trigger_latest_experience_join() {
        let sql = render(&StudentFilter {
            min_exp_years: Some(2),
            max_exp_years: Some(5),
            ..Default::default()
        });
        assert!(sql.contains(r#""experiences" AS "latest_experience""#), "{sql}");
        assert!(sql.contains(r#""students"."total_experience_years" >= 2"#), "{sql}");
        assert!(sql.contains(r#""students"."total_experience_years" <= 5"#), "{sql}");
        assert!(!sql.contains("company_masters"), "{sql}");
    }

    #[test]
    fn test_skills_use_intersection() {
        let sql = render(&StudentFilter {
            skills: vec!["Java".into(), "Go".into()],
            ..Default::default()
        });
        assert!(sql.contains("HAVING"), "{sql}");
        assert!(sql.contains("COUNT(DISTINCT"), "{sql}");
        assert!(sql.ends_with("= 2"), "{sql}");
    }

    #[test]
    fn test_search_covers_first_and_last_name() {
        let sql = render(&StudentFilter {
            search: Some("ann".into()),
            ..Default::default()
        });
        assert!(sql.contains(r#"LOWER("search_user"."first_name") LIKE '%ann%'"#), "{sql}");
        assert!(sql.contains(r#"LOWER("search_user"."last_name") LIKE '%ann%'"#), "{sql}");
    }

    #[test]
    fn test_cgpa_ranges_and_minimum() {
        let sql = render(&StudentFilter {
            cgpa_ranges: vec!["7-8".into(), "9+".into()],
            min_cgpa: Some(6.5),
            ..Default::default()
        });
        assert!(sql.contains(r#""latest_education"."cgpa" BETWEEN 7"#), "{sql}");
        assert!(sql.contains(r#""latest_education"."cgpa" > 9"#), "{sql}");
        assert!(sql.contains(r#""latest_education"."cgpa" >= 6.5"#), "{sql}");
    }

    fn experience(start: (i32, u32, u32), end: (i32, u32, u32), months: Option<i32>) -> ExperienceInput {
        ExperienceInput {
            company_id: 1,
            title: "Engineer".into(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            duration_months: months,
        }
    }

    #[test]
    fn test_experience_years_sum_whole_years() {
        let experiences = [
            experience((2019, 1, 1), (2021, 1, 1), Some(24)),
            experience((2022, 1, 1), (2023, 7, 1), None),
        ];
        // 24/12 + 18/12
        assert_eq!(experience_years(&experiences), 3);
        assert_eq!(latest_flags(&experiences), vec![false, true]);
    }
}
