//! Submission entity <-> model mapper

use league_core::entities::{Submission, Track};
use league_core::value_objects::Snowflake;

use crate::models::SubmissionModel;

impl From<SubmissionModel> for Submission {
    fn from(model: SubmissionModel) -> Self {
        Submission {
            id: Snowflake::new(model.id),
            round_id: Snowflake::new(model.round_id),
            league_id: Snowflake::new(model.league_id),
            user_id: Snowflake::new(model.user_id),
            track: Track {
                title: model.title,
                artist: model.artist,
                album: model.album,
                external_id: model.external_id,
                genre: model.genre,
            },
            submitted_at: model.submitted_at,
        }
    }
}

/// Submission columns ready for binding
pub struct SubmissionInsert<'a> {
    pub id: i64,
    pub round_id: i64,
    pub league_id: i64,
    pub user_id: i64,
    pub title: &'a str,
    pub artist: &'a str,
    pub album: Option<&'a str>,
    pub external_id: Option<&'a str>,
    pub genre: Option<&'a str>,
}

impl<'a> SubmissionInsert<'a> {
    pub fn new(submission: &'a Submission) -> Self {
        let track = &submission.track;
        Self {
            id: submission.id.into_inner(),
            round_id: submission.round_id.into_inner(),
            league_id: submission.league_id.into_inner(),
            user_id: submission.user_id.into_inner(),
            title: &track.title,
            artist: &track.artist,
            album: track.album.as_deref(),
            external_id: track.external_id.as_deref(),
            genre: track.genre.as_deref(),
        }
    }
}
