use std::num::NonZeroU8;

use thiserror::Error;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::{
    languages::Language,
    models::{
        DeveloperId, DistributionChannel, SubmissionId, SubmissionStatus, TranslationRequestId,
        TranslationStatus, types::UtcDateTime,
    },
    pipeline::PipelineError,
};

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Failed to parse datetime: {0}")]
    DateTime(#[from] time::error::Parse),
    #[error("Failed to parse enum variant: {0}")]
    NoSuchVariant(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
    #[error("Inconsistent stage columns: {0}")]
    InconsistentStage(&'static str),
    #[error("Stored stage data no longer validates: {0}")]
    InvalidStageData(#[from] PipelineError),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {
    #[error("Failed to format datetime")]
    DateTime(#[from] time::error::Format),
}

impl DBConvertible for UtcDateTime {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let string = OffsetDateTime::from(*self).format(&Iso8601::DEFAULT)?;
        Ok(string)
    }

    fn from_db(db_value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        let datetime = OffsetDateTime::parse(db_value, &Iso8601::DEFAULT)?;
        Ok(UtcDateTime::from(datetime))
    }
}

impl DBConvertible for SubmissionId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(SubmissionId(*value as _))
    }
}

impl DBConvertible for DeveloperId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(DeveloperId(*value as _))
    }
}

impl DBConvertible for TranslationRequestId {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(TranslationRequestId(*value as _))
    }
}

impl DBConvertible for SubmissionStatus {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        value
            .parse()
            .map_err(|_| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DBConvertible for TranslationStatus {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        value
            .parse()
            .map_err(|_| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DBConvertible for Language {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.code().to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Language::from_code(value).ok_or_else(|| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DBConvertible for DistributionChannel {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        value
            .parse()
            .map_err(|_| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DBConvertible for NonZeroU8 {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.get() as _)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        if *value >= NonZeroU8::MIN.get() as _ && *value <= NonZeroU8::MAX.get() as _ {
            Ok(NonZeroU8::new(*value as _).expect("Checked by the guard"))
        } else {
            Err(DBFromConversionError::InvalidNumber(*value))
        }
    }
}

// Lists round-trip as newline-joined text. None of the elements can contain a
// newline: component names are single-line by construction and channel ids
// are fixed tokens.
impl DBConvertible for Vec<String> {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.join("\n"))
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        if value.is_empty() {
            return Ok(Vec::new());
        }

        Ok(value.split('\n').map(str::to_string).collect())
    }
}

impl DBConvertible for Vec<DistributionChannel> {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let ids: Vec<String> = self.iter().map(|channel| channel.to_string()).collect();
        Ok(ids.join("\n"))
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        if value.is_empty() {
            return Ok(Vec::new());
        }

        value
            .split('\n')
            .map(|id| DistributionChannel::from_db(&id.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        languages::Language,
        models::{DistributionChannel, SubmissionStatus, TranslationStatus},
        repository::conversion::{DBConvertible, DBFromConversionError},
    };

    #[test]
    fn submission_statuses_round_trip() {
        use SubmissionStatus::*;

        for status in [
            Submitted,
            Approved,
            Rejected,
            DeveloperAssigned,
            TranslationApproved,
            PricingCompleted,
            FinalApproved,
            FinalRejected,
        ] {
            let stored = status.to_db().unwrap();
            assert_eq!(SubmissionStatus::from_db(&stored).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_an_error() {
        let result = SubmissionStatus::from_db(&"Shipped".to_string());
        assert!(matches!(
            result,
            Err(DBFromConversionError::NoSuchVariant(_))
        ));
    }

    #[test]
    fn translation_statuses_round_trip() {
        use TranslationStatus::*;

        for status in [Pending, InProgress, Completed] {
            let stored = status.to_db().unwrap();
            assert_eq!(TranslationStatus::from_db(&stored).unwrap(), status);
        }
    }

    #[test]
    fn languages_are_stored_as_codes() {
        assert_eq!(Language::Japanese.to_db().unwrap(), "ja");
        assert_eq!(
            Language::from_db(&"ja".to_string()).unwrap(),
            Language::Japanese
        );
    }

    #[test]
    fn channel_lists_round_trip() {
        let channels = vec![
            DistributionChannel::Steam,
            DistributionChannel::GooglePlay,
            DistributionChannel::RetailStores,
        ];

        let stored = channels.to_db().unwrap();
        assert_eq!(stored, "steam\ngoogle-play\nretail-stores");
        assert_eq!(Vec::<DistributionChannel>::from_db(&stored).unwrap(), channels);
    }

    #[test]
    fn empty_lists_round_trip() {
        let stored = Vec::<String>::new().to_db().unwrap();
        assert_eq!(Vec::<String>::from_db(&stored).unwrap(), Vec::<String>::new());
    }
}
