use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::InstrumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::instruments::dsl;
use marketsync_core::instruments::{Instrument, InstrumentStore};
use marketsync_core::{Error, Result};

pub struct InstrumentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn to_domain(row: InstrumentDB) -> Result<Instrument> {
    Instrument::try_from(row).map_err(Error::from)
}

#[async_trait]
impl InstrumentStore for InstrumentRepository {
    async fn upsert(&self, instrument: Instrument) -> Result<Instrument> {
        let row = InstrumentDB::from(&instrument);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(dsl::instruments)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;
                Ok(())
            })
            .await?;

        Ok(instrument)
    }

    fn find_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::instruments
            .find(symbol)
            .select(InstrumentDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(to_domain)
            .transpose()
    }

    fn find_all(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::instruments
            .select(InstrumentDB::as_select())
            .order(dsl::symbol.asc())
            .load::<InstrumentDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}
