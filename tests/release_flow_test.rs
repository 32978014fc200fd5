mod common;

use chrono::{DateTime, FixedOffset};
use common::Fixture;
use git_deploy::boundary::BoundaryWarning;
use git_deploy::changelog::{ChangelogGenerator, ChangelogTemplate};
use git_deploy::git::{MockRepository, RepoCall, Repository};
use git_deploy::publish::RecordingPublisher;
use git_deploy::release::{ReleaseDriver, ReleaseOptions, ReleaseOutcome, ReleaseSettings};
use git_deploy::ui::ScriptedConfirm;
use git_deploy::DeployError;

fn fixed_clock() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-16T10:00:00+02:00").unwrap()
}

fn driver<'a, G: Repository>(
    repo: G,
    publisher: &'a RecordingPublisher,
    confirm: &'a ScriptedConfirm,
) -> ReleaseDriver<G, &'a RecordingPublisher, &'a ScriptedConfirm> {
    ReleaseDriver::new(
        repo,
        publisher,
        confirm,
        ChangelogGenerator::new(ChangelogTemplate::standard().unwrap()),
        ReleaseSettings::default(),
    )
    .unwrap()
    .with_clock(fixed_clock)
}

fn options(bump: &str, namespace: Option<&str>) -> ReleaseOptions {
    ReleaseOptions::parse(bump, namespace).unwrap()
}

/// Repository with `v1.0.0` tagged and two commits on top
fn released_history() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_commit("initial", "Ana Lima");
    repo.add_commit("feat: billing api", "Ana Lima");
    repo.tag_head("v1.0.0");
    repo.add_commit("fix: rounding", "Bo Chen");
    repo.add_commit("feat: invoices", "Cy Diaz");
    repo
}

// ============================================================================
// Happy paths
// ============================================================================

#[test]
fn test_first_release_declined_leaves_no_tag() {
    let mut repo = MockRepository::new();
    repo.add_commit("initial", "Ana Lima");
    repo.add_commit("feat: first feature", "Ana Lima");
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([false]);

    let driver = driver(&repo, &publisher, &confirm);
    let request = driver.prepare(&options("patch", None)).unwrap();
    assert_eq!(request.latest.tag.to_string(), "v0.0.0");
    assert_eq!(request.next.to_string(), "v0.0.1");
    assert_eq!(request.changelog.commits.len(), 2);

    let outcome = driver.run(&options("patch", None)).unwrap();
    assert_eq!(
        outcome,
        ReleaseOutcome::Declined {
            tag: "v0.0.1".to_string()
        }
    );
    assert_eq!(confirm.prompts(), vec!["Do you want to deploy: v0.0.1 ?"]);
    assert!(!repo.has_tag("v0.0.1"));
    assert!(!repo
        .calls()
        .iter()
        .any(|call| matches!(call, RepoCall::CreateTag(_) | RepoCall::PushTag { .. })));
    assert!(publisher.releases().is_empty());
}

#[test]
fn test_first_release_on_real_repository() {
    let mut fixture = Fixture::new();
    fixture.commit("a.txt", "initial");
    fixture.commit("b.txt", "feat: first feature");
    let repo = fixture.open();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([false]);

    let driver = driver(&repo, &publisher, &confirm);
    let request = driver.prepare(&options("patch", None)).unwrap();
    assert_eq!(request.next.to_string(), "v0.0.1");
    let subjects: Vec<_> = request
        .changelog
        .commits
        .iter()
        .map(|c| c.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["feat: first feature", "initial"]);

    let outcome = driver.run(&options("patch", None)).unwrap();
    assert!(matches!(outcome, ReleaseOutcome::Declined { .. }));
    assert!(repo.list_tags().unwrap().is_empty());

    // Only the tag fetch reached the remote, once per run
    let calls = repo.runner().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls
        .iter()
        .all(|call| call == &vec!["git", "fetch", "origin", "--tags", "--force"]));
}

#[test]
fn test_approved_release_tags_pushes_and_publishes() {
    let repo = released_history();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([true]);

    let driver = driver(&repo, &publisher, &confirm);
    let request = driver.prepare(&options("minor", None)).unwrap();
    let expected_body = ChangelogGenerator::new(ChangelogTemplate::standard().unwrap())
        .render(&request.changelog);

    let outcome = driver.run(&options("minor", None)).unwrap();

    assert_eq!(
        outcome,
        ReleaseOutcome::Released {
            tag: "v1.1.0".to_string(),
            published: true
        }
    );

    let calls = repo.calls();
    let create = calls
        .iter()
        .position(|c| *c == RepoCall::CreateTag("v1.1.0".to_string()))
        .unwrap();
    let push = calls
        .iter()
        .position(|c| {
            *c == RepoCall::PushTag {
                remote: "origin".to_string(),
                name: "v1.1.0".to_string(),
            }
        })
        .unwrap();
    assert!(create < push);

    let releases = publisher.releases();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].tag, "v1.1.0");
    assert_eq!(releases[0].title, "v1.1.0");
    assert_eq!(releases[0].body, expected_body);
    assert!(releases[0].body.starts_with("## v1.1.0 16.10.2026\n"));
    assert!(releases[0].body.contains(") fix: rounding (Bo Chen, "));
    assert!(!releases[0].body.contains("feat: billing api"));
}

#[test]
fn test_namespace_falls_back_to_plain_tag() {
    let repo = released_history();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([true]);

    let driver = driver(&repo, &publisher, &confirm);
    let request = driver.prepare(&options("patch", Some("svc"))).unwrap();

    assert_eq!(request.latest.tag.to_string(), "v1.0.0");
    assert_eq!(request.next.to_string(), "v1.0.1+svc");
    assert_eq!(
        request.warnings,
        vec![BoundaryWarning::NamespaceFallback {
            namespace: "svc".to_string(),
            fallback_tag: "v1.0.0".to_string(),
        }]
    );
    assert_eq!(request.changelog.commits.len(), 2);

    let outcome = driver.run(&options("patch", Some("svc"))).unwrap();
    assert!(matches!(outcome, ReleaseOutcome::Released { ref tag, .. } if tag == "v1.0.1+svc"));
    assert!(repo.has_tag("v1.0.1+svc"));
}

#[test]
fn test_namespace_family_is_independent() {
    let mut repo = released_history();
    repo.tag_head("v2.3.0+svc");
    repo.add_commit("fix: svc only", "Ana Lima");
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();

    let request = driver(&repo, &publisher, &confirm)
        .prepare(&options("major", Some("svc")))
        .unwrap();

    assert_eq!(request.latest.tag.to_string(), "v2.3.0+svc");
    assert_eq!(request.next.to_string(), "v3.0.0+svc");
    assert!(request.warnings.is_empty());
    let subjects: Vec<_> = request
        .changelog
        .commits
        .iter()
        .map(|c| c.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["fix: svc only"]);
}

#[test]
fn test_dry_run_stops_before_confirmation() {
    let repo = released_history();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();

    let outcome = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None).dry_run(true))
        .unwrap();

    assert_eq!(
        outcome,
        ReleaseOutcome::DryRun {
            tag: "v1.0.1".to_string()
        }
    );
    assert!(confirm.prompts().is_empty());
    assert!(!repo.has_tag("v1.0.1"));
    assert!(publisher.releases().is_empty());
}

#[test]
fn test_render_is_deterministic() {
    let repo = released_history();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();
    let driver = driver(&repo, &publisher, &confirm);
    let generator = ChangelogGenerator::new(ChangelogTemplate::standard().unwrap());

    let first = driver.prepare(&options("patch", None)).unwrap();
    let second = driver.prepare(&options("patch", None)).unwrap();

    assert_eq!(first.changelog, second.changelog);
    assert_eq!(
        generator.render(&first.changelog),
        generator.render(&second.changelog)
    );
}

// ============================================================================
// Aborts and failures
// ============================================================================

#[test]
fn test_dirty_tree_aborts_before_any_side_effect() {
    let mut repo = released_history();
    repo.set_clean(false);
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    assert!(err.is_precondition());
    assert_eq!(err.to_string(), "Please make sure there are no changes");
    assert_eq!(repo.calls(), vec![RepoCall::IsClean]);
    assert!(!repo.has_side_effects());
    assert!(publisher.releases().is_empty());
}

#[test]
fn test_wrong_branch_aborts() {
    let mut repo = released_history();
    repo.set_branch(Some("feature/login"));
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Releases are allowed to tag from master/main branch"
    );
    assert!(!repo.has_side_effects());
}

#[test]
fn test_detached_head_aborts() {
    let mut repo = released_history();
    repo.set_branch(None);
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::default();

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    assert!(err.is_precondition());
    assert!(confirm.prompts().is_empty());
}

#[test]
fn test_fetch_failure_aborts_without_tag() {
    let mut repo = released_history();
    repo.fail_fetch();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([true]);

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    assert!(matches!(err, DeployError::Command { .. }));
    assert!(!repo.has_tag("v1.0.1"));
    assert!(confirm.prompts().is_empty());
}

#[test]
fn test_push_failure_skips_publish() {
    let mut repo = released_history();
    repo.fail_push();
    let publisher = RecordingPublisher::new();
    let confirm = ScriptedConfirm::new([true]);

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    assert!(matches!(err, DeployError::Command { .. }));
    assert!(publisher.releases().is_empty());
}

#[test]
fn test_publish_failure_after_push_is_partial_release() {
    let repo = released_history();
    let publisher = RecordingPublisher::failing();
    let confirm = ScriptedConfirm::new([true]);

    let err = driver(&repo, &publisher, &confirm)
        .run(&options("patch", None))
        .unwrap_err();

    match err {
        DeployError::PartialRelease { tag, source } => {
            assert_eq!(tag, "v1.0.1");
            assert!(matches!(*source, DeployError::Publish(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo.has_tag("v1.0.1"));
    assert!(repo.calls().contains(&RepoCall::PushTag {
        remote: "origin".to_string(),
        name: "v1.0.1".to_string(),
    }));
}
