use std::collections::BTreeSet;

use crate::owner::Owner;

/// Pending and submitted review state for a pull request.
///
/// Fetched fresh from the platform on every invocation, never cached across
/// runs. Reconciling against the platform's current state rather than any
/// local memory of earlier requests is what makes the pipeline idempotent.
#[derive(Debug, Clone, Default)]
pub struct ReviewSnapshot {
    pub requested_users: BTreeSet<String>,
    pub requested_teams: BTreeSet<String>,
    pub reviews: Vec<SubmittedReview>,
}

/// A review that has already been submitted.
///
/// `reviewer` is `None` when the platform could not resolve the reviewing
/// account, e.g. because it has since been deleted.
#[derive(Debug, Clone)]
pub struct SubmittedReview {
    pub reviewer: Option<String>,
    pub state: String,
}

/// Invocation-level switches gating the two dispatch calls. Both are
/// required inputs; the core infers no defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageFlags {
    pub assign_owners: bool,
    pub request_owner_reviews: bool,
}

/// The final assignment and review-request sets for one invocation,
/// consumed immediately by the dispatch calls and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriagePlan {
    pub assignees: BTreeSet<String>,
    pub review_users: BTreeSet<String>,
    pub review_teams: BTreeSet<String>,
    /// True when the author is in `ignored-authors`; the run ends here with
    /// no side effects at all.
    pub short_circuited: bool,
    pub flags: TriageFlags,
}

impl TriagePlan {
    fn empty(flags: TriageFlags, short_circuited: bool) -> Self {
        TriagePlan {
            assignees: BTreeSet::new(),
            review_users: BTreeSet::new(),
            review_teams: BTreeSet::new(),
            short_circuited,
            flags,
        }
    }

    /// Whether the assignment call should be made at all.
    pub fn should_dispatch_assignment(&self) -> bool {
        self.flags.assign_owners && !self.assignees.is_empty()
    }

    /// Whether the review-request call should be made at all.
    pub fn should_dispatch_review_request(&self) -> bool {
        self.flags.request_owner_reviews
            && (!self.review_users.is_empty() || !self.review_teams.is_empty())
    }
}

/// Turn raw ownership matches into a minimal, non-redundant triage plan
/// given the platform's current review state.
///
/// The author never survives into `review_users` (compared both literally
/// and lower-cased, since identifier casing is not consistent across
/// sources), already-requested reviewers are not re-requested, and owners
/// who already submitted a review are not asked again. Assignees are the
/// user owners exactly; the author stays assignable, and teams are never
/// assignable.
pub fn reconcile(
    owners: &BTreeSet<Owner>,
    author: &str,
    ignored_authors: &[String],
    snapshot: &ReviewSnapshot,
    flags: TriageFlags,
) -> TriagePlan {
    if ignored_authors.iter().any(|ignored| ignored == author) {
        return TriagePlan::empty(flags, true);
    }

    let mut user_owners = BTreeSet::new();
    let mut team_owners = BTreeSet::new();
    for owner in owners {
        match owner {
            Owner::User(login) => {
                user_owners.insert(login.clone());
            }
            Owner::Team(slug) => {
                team_owners.insert(slug.clone());
            }
        }
    }

    let assignees = user_owners.clone();

    let mut review_users = user_owners;
    review_users.remove(author);
    review_users.remove(&author.to_lowercase());

    let mut review_teams = team_owners;

    for login in &snapshot.requested_users {
        review_users.remove(login);
    }
    for slug in &snapshot.requested_teams {
        review_teams.remove(slug);
    }
    for review in &snapshot.reviews {
        if let Some(login) = &review.reviewer {
            review_users.remove(login);
        }
    }

    TriagePlan {
        assignees,
        review_users,
        review_teams,
        short_circuited: false,
        flags,
    }
}
