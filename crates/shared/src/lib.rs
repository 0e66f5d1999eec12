//! Types shared by every academicplot front end: domain model, `/process` wire
//! protocol, error taxonomy and the localized text table.

pub mod domain;
pub mod error;
pub mod i18n;
pub mod protocol;
