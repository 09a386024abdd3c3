use chrono::NaiveDateTime;
use derive_more::{Display, Error};
use strum_macros::{Display as KindDisplay, EnumString};
use teloxide::types::UserId;

/// The moderation reference: shown to the moderator in the preview and echoed
/// back in the approval button. Assigned by the store, strictly increasing,
/// never reused.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, KindDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionKind {
    Text,
    Photo,
    Video,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub author_id: UserId,
    pub kind: SubmissionKind,
    pub media_ref: String,
    pub body: String,
    pub submitted_at: NaiveDateTime,
}

/// A not-yet-persisted submission as received from the user.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub kind: SubmissionKind,
    pub media_ref: String,
    pub body: String,
}

#[derive(Debug, Display, Error)]
pub enum InvalidSubmission {
    #[display("a {_0} submission with no media reference")]
    MissingMediaRef(#[error(not(source))] SubmissionKind),
    #[display("a text submission with a media reference attached")]
    UnexpectedMediaRef,
}

impl NewSubmission {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: SubmissionKind::Text,
            media_ref: String::new(),
            body: body.into(),
        }
    }

    pub fn with_media(kind: SubmissionKind, media_ref: String, caption: Option<&str>) -> Self {
        Self {
            kind,
            media_ref,
            body: caption.unwrap_or_default().to_owned(),
        }
    }

    pub fn validate(&self) -> Result<(), InvalidSubmission> {
        match self.kind {
            SubmissionKind::Text if !self.media_ref.is_empty() => Err(InvalidSubmission::UnexpectedMediaRef),
            SubmissionKind::Photo | SubmissionKind::Video if self.media_ref.is_empty() =>
                Err(InvalidSubmission::MissingMediaRef(self.kind)),
            _ => Ok(())
        }
    }
}
