use chrono::{Datelike, NaiveDate};

use crate::repository::{ExceptionKind, Repository, Service, ServiceException};

/// Decides whether a service runs on a date.
///
/// A dated exception for exactly that date overrides the weekly verdict
/// outright: an added date activates the service even outside its
/// [start, end] window, a removed date deactivates it even when the
/// weekday flag says it runs. Without an exception the weekly pattern
/// and the date range decide.
pub fn is_active(service: &Service, exceptions: &[ServiceException], date: NaiveDate) -> bool {
    for exception in exceptions {
        if exception.date == date {
            return exception.kind == ExceptionKind::Added;
        }
    }
    date >= service.start && date <= service.end && service.runs_on(date.weekday())
}

/// Resolves every service for one date, indexed by service index.
pub fn active_services(repository: &Repository, date: NaiveDate) -> Vec<bool> {
    repository
        .services
        .iter()
        .map(|service| is_active(service, repository.exceptions_for(service), date))
        .collect()
}
