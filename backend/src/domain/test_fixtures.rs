//! Shared fixtures for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::income_range::IncomeRangeCatalogue;
use super::signup_validation::{SignupFields, ValidatedSignup};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn ada_fields() -> SignupFields {
    SignupFields {
        full_name: "Ada Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        phone_number: "08012345678".to_owned(),
        income_range: "50000-100000".to_owned(),
    }
}

pub(crate) fn grace_fields() -> SignupFields {
    SignupFields {
        full_name: "Grace Hopper".to_owned(),
        email: "grace@example.com".to_owned(),
        phone_number: "+234 802 345 6789".to_owned(),
        income_range: "250000-500000".to_owned(),
    }
}

pub(crate) fn validated(fields: &SignupFields) -> ValidatedSignup {
    ValidatedSignup::try_from_fields(fields, &IncomeRangeCatalogue::default())
        .expect("fixture fields are valid")
}
