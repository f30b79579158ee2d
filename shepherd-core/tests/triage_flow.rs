//! End-to-end flow through config parsing, ownership resolution, and
//! reconciliation, without any platform I/O.

use std::collections::BTreeSet;

use shepherd_core::{
    reconcile, resolve_owners, ChangedFile, Config, FileStatus, Owner, ReviewSnapshot,
    TriageFlags,
};

const BOTH_FLAGS: TriageFlags = TriageFlags {
    assign_owners: true,
    request_owner_reviews: true,
};

fn changed(paths: &[&str]) -> Vec<ChangedFile> {
    paths
        .iter()
        .map(|path| ChangedFile {
            path: path.to_string(),
            status: FileStatus::Modified,
        })
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn author_owned_component_assigns_but_does_not_request_author() {
    let config = Config::parse(
        "components:\n  api/:\n    - alice\n    - /team-x\nignored-authors: []\n",
    )
    .unwrap();

    let owners = resolve_owners(&config, &changed(&["api/server.py"]));
    let expected: BTreeSet<Owner> = [
        Owner::User("alice".to_string()),
        Owner::Team("team-x".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(owners, expected);

    let plan = reconcile(
        &owners,
        "alice",
        &config.ignored_authors.0,
        &ReviewSnapshot::default(),
        BOTH_FLAGS,
    );

    assert_eq!(plan.assignees, set(&["alice"]));
    assert!(plan.review_users.is_empty());
    assert_eq!(plan.review_teams, set(&["team-x"]));
    assert!(plan.should_dispatch_assignment());
    assert!(plan.should_dispatch_review_request());
}

#[test]
fn pending_team_request_is_not_repeated() {
    let config = Config::parse("components:\n  api/: \"alice /team-x\"\n").unwrap();

    let owners = resolve_owners(&config, &changed(&["api/server.py"]));

    let snapshot = ReviewSnapshot {
        requested_teams: set(&["team-x"]),
        ..ReviewSnapshot::default()
    };
    let plan = reconcile(&owners, "bob", &config.ignored_authors.0, &snapshot, BOTH_FLAGS);

    assert_eq!(plan.review_users, set(&["alice"]));
    assert!(plan.review_teams.is_empty());
}

#[test]
fn ignored_author_means_no_side_effects_at_all() {
    let config = Config::parse(
        "components:\n  /: \"alice /team-x\"\nignored-authors: dependabot\n",
    )
    .unwrap();

    let owners = resolve_owners(&config, &changed(&["anything.txt"]));
    assert!(!owners.is_empty());

    let plan = reconcile(
        &owners,
        "dependabot",
        &config.ignored_authors.0,
        &ReviewSnapshot::default(),
        BOTH_FLAGS,
    );

    assert!(plan.short_circuited);
    assert!(!plan.should_dispatch_assignment());
    assert!(!plan.should_dispatch_review_request());
}
