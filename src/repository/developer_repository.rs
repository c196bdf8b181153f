use sqlx::{query, query_as, query_scalar, FromRow, Pool, Sqlite};

use crate::{
    models::{Developer, DeveloperId, NewDeveloper},
    repository::conversion::DBConvertible,
};

use super::conversion::{DBFromConversionError, DBToConversionError};

#[derive(Debug)]
pub struct DeveloperRepository {
    pool: Pool<Sqlite>,
}

impl DeveloperRepository {
    pub fn new(pool: Pool<Sqlite>) -> DeveloperRepository {
        DeveloperRepository { pool }
    }

    pub async fn add_developer(&self, new: &NewDeveloper) -> Result<Developer, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let added = {
            let max_projects = new.max_projects.to_db()?;

            query_as::<_, SqlDeveloper>(
                r#"
                INSERT INTO developers (
                    name, specialty, experience_years, rating,
                    completed_games, current_projects, max_projects)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(&new.name)
            .bind(&new.specialty)
            .bind(new.experience_years as i64)
            .bind(new.rating as f64)
            .bind(new.completed_games as i64)
            .bind(new.current_projects as i64)
            .bind(max_projects)
            .fetch_one(&mut *transaction)
            .await?
        };

        transaction.commit().await?;

        Ok(Developer::from_db(&added)?)
    }

    pub async fn get_developer(
        &self,
        id: DeveloperId,
    ) -> Result<Option<Developer>, anyhow::Error> {
        let row = query_as::<_, SqlDeveloper>(r#"SELECT * FROM developers WHERE id = $1"#)
            .bind(id.to_db()?)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Developer::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_developers(&self) -> Result<Vec<Developer>, anyhow::Error> {
        let rows = query_as::<_, SqlDeveloper>(r#"SELECT * FROM developers ORDER BY id"#)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| Ok(Developer::from_db(row)?)).collect()
    }

    /// Developers with spare capacity, the roster the assignment stage shows.
    pub async fn get_available_developers(&self) -> Result<Vec<Developer>, anyhow::Error> {
        let rows = query_as::<_, SqlDeveloper>(
            r#"SELECT * FROM developers WHERE current_projects < max_projects ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(Developer::from_db(row)?)).collect()
    }

    pub async fn update_project_count(
        &self,
        id: DeveloperId,
        current_projects: u8,
    ) -> Result<(), anyhow::Error> {
        query(r#"UPDATE developers SET current_projects = $2 WHERE id = $1"#)
            .bind(id.to_db()?)
            .bind(current_projects as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, anyhow::Error> {
        let count: i64 = query_scalar(r#"SELECT COUNT(*) FROM developers"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[derive(Debug, FromRow)]
pub struct SqlDeveloper {
    id: i64,
    name: String,
    specialty: String,
    experience_years: i64,
    rating: f64,
    completed_games: i64,
    current_projects: i64,
    max_projects: i64,
}

impl DBConvertible for Developer {
    type DBType = SqlDeveloper;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlDeveloper {
            id: self.id.to_db()?,
            name: self.name.clone(),
            specialty: self.specialty.clone(),
            experience_years: self.experience_years as i64,
            rating: self.rating as f64,
            completed_games: self.completed_games as i64,
            current_projects: self.current_projects as i64,
            max_projects: self.max_projects.to_db()?,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        let current_projects = u8::try_from(value.current_projects)
            .map_err(|_| DBFromConversionError::InvalidNumber(value.current_projects))?;
        let experience_years = u8::try_from(value.experience_years)
            .map_err(|_| DBFromConversionError::InvalidNumber(value.experience_years))?;
        let completed_games = u32::try_from(value.completed_games)
            .map_err(|_| DBFromConversionError::InvalidNumber(value.completed_games))?;

        Ok(Developer {
            id: DeveloperId::from_db(&value.id)?,
            name: value.name.clone(),
            specialty: value.specialty.clone(),
            experience_years,
            rating: value.rating as f32,
            completed_games,
            current_projects,
            max_projects: DBConvertible::from_db(&value.max_projects)?,
        })
    }
}
