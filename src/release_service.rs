use std::{sync::Arc, thread};

use indoc::formatdoc;
use time::{Duration, OffsetDateTime};
use tokio::{runtime::Handle, select, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};

use crate::{
    models::{SubmissionStatus, types::UtcDateTime},
    pipeline::derive_translation_status,
    repository::{SubmissionRepository, SubmissionStoreEvent, TranslationRepository},
    utils::formatting::{format_krw, format_utc},
};

/// Background housekeeping for the pipeline: keeps each project's coarse
/// translation status in sync with its per-language requests, and announces
/// approved games whose release date has arrived.
pub struct ReleaseService {
    submission_repository: Arc<SubmissionRepository>,
    translation_repository: Arc<TranslationRepository>,
}

const DEFAULT_SLEEP_DURATION: Duration = Duration::seconds(60 * 60 /* One hour */);
const RELEASE_MISSED_THRESHOLD: Duration = Duration::seconds(60 * 60 /* One hour */);

impl ReleaseService {
    pub fn create_and_start(
        shutdown: Arc<Notify>,
        submission_repository: Arc<SubmissionRepository>,
        translation_repository: Arc<TranslationRepository>,
    ) {
        let service = ReleaseService {
            submission_repository,
            translation_repository,
        };

        service.start(shutdown);
    }

    fn start(self, shutdown: Arc<Notify>) {
        // Keep the loop off the main runtime threads; a large backlog of
        // submissions can make a tick slow.
        let rt_handle = Handle::current();
        thread::spawn(move || {
            rt_handle.block_on(
                async move {
                    let mut next_release_time = Some(OffsetDateTime::now_utc());

                    let mut submission_events = self.submission_repository.subscribe();

                    loop {
                        let sleep_duration = {
                            let duration = next_release_time
                                .map(|time| {
                                    Duration::max(Duration::ZERO, time - OffsetDateTime::now_utc())
                                })
                                .unwrap_or(DEFAULT_SLEEP_DURATION);

                            std::time::Duration::from_millis(duration.whole_milliseconds() as _)
                        };

                        info!(
                            "Next release tick scheduled at {:?} (in {:?})",
                            OffsetDateTime::now_utc() + sleep_duration,
                            sleep_duration
                        );

                        select! {
                            _ = tokio::time::sleep(sleep_duration) => {
                                if let Err(err) = self.sync_translation_statuses().await {
                                    error!("Could not sync translation statuses: {err}");
                                }

                                if let Err(err) = self.announce_due_releases().await {
                                    error!("Could not announce due releases: {err}");
                                }

                                next_release_time = match self.reschedule().await {
                                    Ok(time) => time,
                                    Err(err) => {
                                        error!("Could not reschedule after a release tick: {err}");
                                        None
                                    }
                                };
                            }

                            evt = submission_events.recv() => {
                                match evt {
                                    Ok(SubmissionStoreEvent::SubmissionsUpdated) => {
                                        next_release_time = match self.reschedule().await {
                                            Ok(time) => time,
                                            Err(err) => {
                                                error!("Could not reschedule after a submissions update: {err}");
                                                None
                                            }
                                        };
                                    },
                                    Err(err) => error!("Error while receiving a submission event: {err:?}"),
                                }
                            }

                            _ = shutdown.notified() => {
                                info!("Shutting the release service down");
                                break;
                            }
                        }
                    }
                }
                .instrument(info_span!("release_loop")),
            );
        });
    }

    /// Recomputes the coarse translation status of every project with open
    /// translation work and persists the ones that drifted.
    #[tracing::instrument(skip(self))]
    async fn sync_translation_statuses(&self) -> Result<(), anyhow::Error> {
        let open = self
            .submission_repository
            .get_submissions_by_status(SubmissionStatus::DeveloperAssigned)
            .await?;

        for submission in open {
            let requests = self
                .translation_repository
                .get_requests_for(submission.id)
                .await?;

            let derived = derive_translation_status(&requests);
            if derived != submission.translation_status {
                info!(
                    "Translation status of {} drifted: {} -> {}",
                    submission.slug, submission.translation_status, derived
                );
                self.submission_repository
                    .update_translation_status(submission.id, derived)
                    .await?;
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn announce_due_releases(&self) -> Result<(), anyhow::Error> {
        let now = OffsetDateTime::now_utc();
        let due_releases = self
            .submission_repository
            .get_due_releases(UtcDateTime::from(now))
            .await?;

        for submission in due_releases {
            let Some(approval) = submission.approval.as_ref() else {
                warn!(
                    "Submission {} is due for release but has no approval record",
                    submission.slug
                );
                continue;
            };

            let late_period = now - OffsetDateTime::from(approval.release_date);

            if late_period > RELEASE_MISSED_THRESHOLD {
                warn!(
                    "The release window of {} was missed by {}",
                    submission.slug, late_period
                );
            } else {
                let channels = approval
                    .distribution_channels
                    .iter()
                    .map(|channel| channel.display_name())
                    .collect::<Vec<_>>()
                    .join(", ");

                let message = formatdoc! {
                    r#"
                        # {title} is released today!

                        Final price: {price}. Channels: {channels}.

                        The release was scheduled for {date} UTC.
                    "#,
                    title = submission.title,
                    price = format_krw(approval.final_price),
                    channels = channels,
                    date = format_utc(approval.release_date),
                };
                info!("{message}");
            }

            if let Err(err) = self
                .submission_repository
                .mark_release_announced(submission.id, UtcDateTime::from(now))
                .await
            {
                warn!(
                    "Could not mark the release of {} as announced: {}",
                    submission.slug, err
                );
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn reschedule(&self) -> Result<Option<OffsetDateTime>, anyhow::Error> {
        let now = UtcDateTime::from(OffsetDateTime::now_utc());

        match self.submission_repository.get_next_release_date(now).await {
            Ok(Some(date)) => Ok(Some(date.into())),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
