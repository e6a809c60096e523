use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{NewOpenEvent as DomainNewOpenEvent, OpenEvent as DomainOpenEvent};

#[derive(Queryable, Selectable)]
#[diesel(table_name = crate::schema::email_opens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OpenEvent {
    pub id: i32,
    pub email: Option<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::email_opens)]
pub struct NewOpenEvent<'a> {
    pub email: Option<&'a str>,
    pub timestamp: NaiveDateTime,
}

impl From<OpenEvent> for DomainOpenEvent {
    fn from(event: OpenEvent) -> Self {
        Self {
            id: event.id,
            email: event.email,
            timestamp: event.timestamp,
        }
    }
}

impl<'a> From<&DomainNewOpenEvent<'a>> for NewOpenEvent<'a> {
    fn from(event: &DomainNewOpenEvent<'a>) -> Self {
        Self {
            email: event.email,
            timestamp: event.timestamp,
        }
    }
}
