//! Open event repository implementation backed by Diesel.
//!
//! Provides [`OpenReader`] and [`OpenWriter`] trait implementations for
//! [`DieselRepository`].

use diesel::prelude::*;

use crate::domain::{NewOpenEvent as DomainNewOpenEvent, OpenEvent as DomainOpenEvent};
use crate::errors::RepositoryResult;
use crate::models::{NewOpenEvent as DbNewOpenEvent, OpenEvent as DbOpenEvent};
use crate::repository::{DieselRepository, OpenReader, OpenWriter};

impl OpenReader for DieselRepository {
    fn count_opens(&self) -> RepositoryResult<i64> {
        use crate::schema::email_opens;
        let mut conn = self.conn()?;

        let count = email_opens::table.count().get_result::<i64>(&mut conn)?;
        Ok(count)
    }
}

impl OpenWriter for DieselRepository {
    fn record_open(&self, event: &DomainNewOpenEvent) -> RepositoryResult<DomainOpenEvent> {
        use crate::schema::email_opens;
        let mut conn = self.conn()?;

        let new_event: DbNewOpenEvent = event.into();
        let inserted: DbOpenEvent = diesel::insert_into(email_opens::table)
            .values(&new_event)
            .returning(DbOpenEvent::as_returning())
            .get_result(&mut conn)?;

        Ok(inserted.into())
    }
}
