pub mod locks;

use chrono::{FixedOffset, Utc};
use derive_more::{Display, Error};
use futures::future::join_all;
use serde::Serialize;
use teloxide::types::ChatId;
use tinytemplate::TinyTemplate;
use crate::config::AppConfig;
use crate::domain::{Submission, SubmissionId, SubmissionKind};
use crate::gateway::{MessagingGateway, TransportFault};
use crate::repo::Repositories;
use self::locks::ApprovalLocks;

// The decorative frame every broadcast is wrapped into.
const BROADCAST_TEMPLATE: &str = "💌 NEW CONFESSION\n\n{body}\n\n🕒 {time}";

#[derive(Serialize)]
struct BroadcastContext {
    body: String,
    time: String,
}

#[derive(Debug, Display, Error)]
pub enum ApproveError {
    #[display("no pending submission with id = {_0}")]
    NotFound(#[error(not(source))] SubmissionId),
    #[display("storage failure during the approval: {_0}")]
    Store(#[error(not(source))] anyhow::Error),
}

/// Per-destination outcomes of one approval, collected instead of swallowed so
/// the moderator can see which groups missed the broadcast.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<(ChatId, TransportFault)>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("✅ Sent and pinned in {} group(s).", self.delivered.len())
        } else {
            let failures = self.failed.iter()
                .map(|(dest, fault)| format!("{dest}: {fault}"))
                .collect::<Vec<String>>()
                .join("\n");
            format!("⚠️ Sent to {} of {} group(s).\nFailed:\n{failures}",
                    self.delivered.len(), self.attempted())
        }
    }
}

/// Delivery side of the pipeline: turns one approved submission into a broadcast
/// to every registered destination, then retires it and counts the delivery.
pub struct BroadcastEngine<'a, G: MessagingGateway> {
    gateway: &'a G,
    repos: &'a Repositories,
    locks: &'a ApprovalLocks,
    time_zone: FixedOffset,
    time_zone_label: String,
}

impl<'a, G: MessagingGateway> BroadcastEngine<'a, G> {
    pub fn new(gateway: &'a G, repos: &'a Repositories, locks: &'a ApprovalLocks, config: &AppConfig) -> Self {
        Self {
            gateway,
            repos,
            locks,
            time_zone: config.time_zone,
            time_zone_label: config.time_zone_label.clone(),
        }
    }

    pub async fn approve(&self, id: SubmissionId) -> Result<DeliveryReport, ApproveError> {
        let _guard = self.locks.try_acquire(id).ok_or(ApproveError::NotFound(id))?;
        let submission = self.repos.submissions.get(id).await
            .map_err(ApproveError::Store)?
            .ok_or(ApproveError::NotFound(id))?;
        let text = render_broadcast(&submission, &self.time_zone_label)
            .map_err(ApproveError::Store)?;

        // Snapshot: destinations registered mid-broadcast wait for the next approval.
        let destinations = self.repos.destinations.list().await
            .map_err(ApproveError::Store)?;
        let attempts = join_all(destinations.into_iter()
            .map(|dest| self.deliver(dest, &submission, &text)))
            .await;

        let mut report = DeliveryReport::default();
        for (dest, outcome) in attempts {
            match outcome {
                Ok(()) => report.delivered.push(dest),
                Err(fault) => {
                    log::warn!("broadcast of submission {id} to {dest} failed: {fault}");
                    report.failed.push((dest, fault));
                }
            }
        }

        // Approval is the terminal transition no matter how many sends made it
        // through; the report is the place where partial failure shows up.
        let day = Utc::now().with_timezone(&self.time_zone).date_naive();
        let retired = self.repos.submissions.retire_and_record_delivery(id, day).await
            .map_err(ApproveError::Store)?;
        if !retired {
            // unreachable while the guard is held, unless the row vanished out of band
            return Err(ApproveError::NotFound(id));
        }
        Ok(report)
    }

    async fn deliver(&self, dest: ChatId, submission: &Submission, text: &str) -> (ChatId, Result<(), TransportFault>) {
        // The previous pin may be missing, or the bot may lack rights; neither
        // makes this destination's broadcast a failure.
        if let Err(fault) = self.gateway.unpin_all(dest).await {
            log::debug!("couldn't unpin the previous broadcast in {dest}: {fault}");
        }

        let sent = match submission.kind {
            SubmissionKind::Text => self.gateway.send_text(dest, text).await,
            SubmissionKind::Photo => self.gateway.send_photo(dest, &submission.media_ref, text).await,
            SubmissionKind::Video => self.gateway.send_video(dest, &submission.media_ref, text).await,
        };
        let message = match sent {
            Ok(message) => message,
            Err(fault) => return (dest, Err(fault)),
        };

        if let Err(fault) = self.gateway.pin(dest, message).await {
            log::warn!("the broadcast reached {dest} but couldn't be pinned: {fault}");
        }
        (dest, Ok(()))
    }
}

fn render_broadcast(submission: &Submission, time_zone_label: &str) -> anyhow::Result<String> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("broadcast", BROADCAST_TEMPLATE)?;
    let context = BroadcastContext {
        body: submission.body.clone(),
        time: format!("{} {time_zone_label}", submission.submitted_at.format("%Y-%m-%d %H:%M")),
    };
    Ok(tt.render("broadcast", &context)?)
}

#[cfg(test)]
mod test {
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
    use teloxide::types::{ChatId, UserId};
    use crate::config::AppConfig;
    use crate::domain::{NewSubmission, SubmissionId, SubmissionKind};
    use crate::gateway::test::{GatewayCall, MockGateway};
    use crate::repo;
    use crate::repo::test::{start_database, AUTHOR_ID};
    use super::locks::ApprovalLocks;
    use super::{ApproveError, BroadcastEngine};

    const D1: ChatId = ChatId(-100_1);
    const D2: ChatId = ChatId(-100_2);

    fn config() -> AppConfig {
        AppConfig {
            moderator_id: UserId(1),
            time_zone: FixedOffset::east_opt(7 * 3600).expect("valid offset"),
            time_zone_label: "WIB".to_owned(),
        }
    }

    fn submitted_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 4).expect("valid date")
            .and_hms_opt(10, 0, 0).expect("valid time")
    }

    async fn queue_submission(repos: &repo::Repositories, submission: NewSubmission) -> SubmissionId {
        repos.submissions.create(UserId(AUTHOR_ID), &submission, submitted_at())
            .await.expect("couldn't create a submission")
    }

    async fn register_destinations(repos: &repo::Repositories, dests: &[ChatId]) {
        for dest in dests {
            repos.destinations.register(*dest).await.expect("couldn't register a destination");
        }
    }

    #[tokio::test]
    async fn approval_broadcasts_to_every_destination_and_retires() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1, D2]).await;
        let id = queue_submission(&repos, NewSubmission::text("hello")).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let report = engine.approve(id).await.expect("the approval must succeed");

        assert_eq!(report.delivered, vec![D1, D2]);
        assert!(report.failed.is_empty());
        assert_eq!(gateway.send_attempts(), 2);
        for dest in [D1, D2] {
            let text = gateway.calls().iter()
                .find_map(|call| match call {
                    GatewayCall::SendText { dest: d, text } if *d == dest => Some(text.clone()),
                    _ => None,
                })
                .expect("every destination must receive the broadcast");
            assert!(text.contains("NEW CONFESSION"));
            assert!(text.contains("hello"));
            assert!(text.contains("2026-08-04 10:00 WIB"));
        }

        assert!(repos.submissions.get(id)
            .await.expect("couldn't query the submission")
            .is_none());
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 1);
    }

    #[tokio::test]
    async fn each_destination_is_unpinned_sent_then_pinned() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1]).await;
        let id = queue_submission(&repos, NewSubmission::text("ordered")).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        engine.approve(id).await.expect("the approval must succeed");

        let kinds: Vec<&'static str> = gateway.calls().iter()
            .map(|call| match call {
                GatewayCall::UnpinAll { .. } => "unpin",
                GatewayCall::SendText { .. } => "send",
                GatewayCall::Pin { .. } => "pin",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["unpin", "send", "pin"]);
    }

    #[tokio::test]
    async fn media_submissions_use_the_matching_modality() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1]).await;
        let photo = NewSubmission::with_media(SubmissionKind::Photo, "file-abc".to_owned(), Some("caption"));
        let id = queue_submission(&repos, photo).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        engine.approve(id).await.expect("the approval must succeed");

        let (media_ref, caption) = gateway.calls().iter()
            .find_map(|call| match call {
                GatewayCall::SendPhoto { media_ref, caption, .. } => Some((media_ref.clone(), caption.clone())),
                _ => None,
            })
            .expect("a photo submission must go out as a photo");
        assert_eq!(media_ref, "file-abc");
        assert!(caption.contains("caption"));
    }

    #[tokio::test]
    async fn one_failing_destination_does_not_stop_the_others() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1, D2]).await;
        let id = queue_submission(&repos, NewSubmission::text("resilient")).await;
        let gateway = MockGateway::default().with_failing_sends(&[D1]);
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let report = engine.approve(id).await.expect("the approval must still succeed");

        assert_eq!(gateway.send_attempts(), 2);
        assert_eq!(report.delivered, vec![D2]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, D1);
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 1);
    }

    #[tokio::test]
    async fn pin_and_unpin_failures_are_tolerated() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1]).await;
        let id = queue_submission(&repos, NewSubmission::text("tolerant")).await;
        let gateway = MockGateway::default()
            .with_failing_pins(&[D1])
            .with_failing_unpins(&[D1]);
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let report = engine.approve(id).await.expect("the approval must succeed");

        assert_eq!(report.delivered, vec![D1]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn failing_every_destination_still_retires_and_counts_once() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1, D2]).await;
        let id = queue_submission(&repos, NewSubmission::text("doomed")).await;
        let gateway = MockGateway::default().with_failing_sends(&[D1, D2]);
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let report = engine.approve(id).await.expect("the approval must still complete");

        assert!(report.delivered.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(repos.submissions.get(id)
            .await.expect("couldn't query the submission")
            .is_none());
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 1);
    }

    #[tokio::test]
    async fn a_second_approval_reports_not_found_without_side_effects() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1, D2]).await;
        let id = queue_submission(&repos, NewSubmission::text("only once")).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        engine.approve(id).await.expect("the first approval must succeed");
        let err = engine.approve(id).await.expect_err("the second approval must fail");

        assert!(matches!(err, ApproveError::NotFound(found) if found == id));
        assert_eq!(gateway.send_attempts(), 2);
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 1);
    }

    #[tokio::test]
    async fn approving_an_unknown_reference_does_nothing() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        register_destinations(&repos, &[D1]).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let err = engine.approve(SubmissionId(99)).await.expect_err("an unknown reference must fail");

        assert!(matches!(err, ApproveError::NotFound(found) if found == SubmissionId(99)));
        assert!(gateway.calls().is_empty());
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 0);
    }

    #[tokio::test]
    async fn no_destinations_is_a_complete_empty_broadcast() {
        let db = start_database().await;
        let repos = repo::Repositories::new(&db);
        let id = queue_submission(&repos, NewSubmission::text("to nobody")).await;
        let gateway = MockGateway::default();
        let locks = ApprovalLocks::default();
        let engine = BroadcastEngine::new(&gateway, &repos, &locks, &config());

        let report = engine.approve(id).await.expect("an empty fan-out must succeed");

        assert_eq!(report.attempted(), 0);
        assert_eq!(repos.deliveries.total().await.expect("couldn't count the deliveries"), 1);
    }
}
