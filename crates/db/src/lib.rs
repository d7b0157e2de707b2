use sqlx_migrator::{Info, Migrator};

/// Declares a migration operation running one sea-query statement up and
/// one down.
macro_rules! sqlite_operation {
    ($name:ident, $up:expr, $down:expr) => {
        pub struct $name;

        #[async_trait::async_trait]
        impl sqlx_migrator::Operation<sqlx::Sqlite> for $name {
            async fn up(
                &self,
                connection: &mut sqlx::SqliteConnection,
            ) -> Result<(), sqlx_migrator::Error> {
                let statement = $up.to_string(sea_query::SqliteQueryBuilder);
                sqlx::query(&statement).execute(connection).await?;

                Ok(())
            }

            async fn down(
                &self,
                connection: &mut sqlx::SqliteConnection,
            ) -> Result<(), sqlx_migrator::Error> {
                let statement = $down.to_string(sea_query::SqliteQueryBuilder);
                sqlx::query(&statement).execute(connection).await?;

                Ok(())
            }
        }
    };
}

mod m0_1;
mod m0_2;
pub mod table;

pub fn migrator<DB: sqlx::Database>() -> Result<Migrator<DB>, sqlx_migrator::Error>
where
    m0_1::Migration: sqlx_migrator::Migration<DB>,
    m0_2::Migration: sqlx_migrator::Migration<DB>,
{
    let mut migrator = Migrator::<DB>::default();
    migrator.add_migrations(vec![Box::new(m0_1::Migration), Box::new(m0_2::Migration)])?;

    Ok(migrator)
}
