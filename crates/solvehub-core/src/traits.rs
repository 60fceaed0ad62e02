//! Repository trait definitions.
//!
//! These traits define the persistence boundary. PostgreSQL implementations
//! live in `solvehub-db`; tests substitute in-memory doubles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::dispatch::NewNotification;
use crate::error::Result;
use crate::models::{
    Answer, AnswerOrder, CreateAnswerRequest, CreateExerciseRequest, CreateSubjectRequest,
    ExerciseFull, ListExercisesRequest, ListExercisesResponse, ListNotificationsRequest,
    Notification, NotificationPreferences, Report, ReportReason, ReportStatus, ReportTargetKind,
    Subject, Tag, UpdateProfileRequest, User, VoteKind, VoteSummary,
};

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Insert payload for a new user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

/// Repository for user accounts and their saved/completed collections.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with the default role.
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Fetch a user by ID. Returns `Ok(None)` when absent.
    async fn fetch(&self, id: Uuid) -> Result<Option<User>>;

    /// Fetch by username or email (case-insensitive), for login.
    async fn fetch_by_login(&self, username_or_email: &str) -> Result<Option<User>>;

    /// Fetch by exact username (case-insensitive), for public profiles.
    async fn fetch_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Apply a partial profile update.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User>;

    /// Activate or deactivate an account (moderation).
    async fn set_active(&self, id: Uuid, active: bool) -> Result<()>;

    /// Add/remove an exercise from the user's saved collection.
    async fn set_saved(&self, user_id: Uuid, exercise_id: Uuid, saved: bool) -> Result<()>;

    /// Add/remove an exercise from the user's completed collection.
    async fn set_completed(&self, user_id: Uuid, exercise_id: Uuid, completed: bool) -> Result<()>;
}

// =============================================================================
// PREFERENCE REPOSITORY
// =============================================================================

/// Repository for per-user notification preference flags.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Effective preferences for a user: the stored row, or the compiled-in
    /// defaults when the user never saved explicit preferences.
    async fn effective_for(&self, user_id: Uuid) -> Result<NotificationPreferences>;

    /// Store explicit preferences, replacing any previous row.
    async fn upsert(&self, user_id: Uuid, prefs: NotificationPreferences) -> Result<()>;
}

// =============================================================================
// SUBJECT AND TAG REPOSITORIES
// =============================================================================

/// Repository for canonical subjects.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Create a subject, deriving the slug from the name when absent.
    async fn insert(&self, req: CreateSubjectRequest) -> Result<Subject>;

    /// Exact-name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Subject>>;

    /// Slug lookup.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Subject>>;

    /// Look up by exact name, creating the subject when absent. Falls back
    /// to the lookup when creation loses a uniqueness race.
    async fn find_or_create(&self, name: &str) -> Result<Subject>;

    /// List subjects ordered by name; optionally only popular ones.
    async fn list(&self, popular_only: bool) -> Result<Vec<Subject>>;
}

/// Repository for free-form tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a tag if it does not already exist.
    async fn ensure(&self, name: &str) -> Result<()>;

    /// List all tags with exercise counts, ordered by name.
    async fn list(&self) -> Result<Vec<Tag>>;
}

// =============================================================================
// EXERCISE REPOSITORY
// =============================================================================

/// Outcome of a vote toggle.
#[derive(Debug, Clone)]
pub struct VoteResult {
    /// Counts after the toggle, including the caller's own vote.
    pub summary: VoteSummary,
    /// True when this call newly added a like (used to trigger a `like`
    /// notification; removals and switches away from like never notify).
    pub added_like: bool,
}

/// Repository for exercises, their tags, and their vote sets.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Insert a new exercise with its tags (tags auto-created).
    async fn insert(&self, author_id: Uuid, req: CreateExerciseRequest) -> Result<Uuid>;

    /// Fetch the full detail view. `viewer` fills in `own_vote`.
    async fn fetch(&self, id: Uuid, viewer: Option<Uuid>) -> Result<ExerciseFull>;

    /// List exercise summaries with filters and pagination.
    async fn list(
        &self,
        req: ListExercisesRequest,
        viewer: Option<Uuid>,
    ) -> Result<ListExercisesResponse>;

    /// Author of an exercise, for ownership checks and notification routing.
    async fn author_of(&self, id: Uuid) -> Result<Option<Uuid>>;

    /// Delete an exercise and everything hanging off it.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Toggle a vote: same vote twice removes it, the opposite vote
    /// replaces it.
    async fn vote(&self, id: Uuid, user_id: Uuid, kind: VoteKind) -> Result<VoteResult>;

    /// Exercises still carrying only a legacy free-text subject name.
    /// Used by the subject backfill tool.
    async fn list_unmigrated_subjects(&self, limit: i64) -> Result<Vec<(Uuid, String)>>;

    /// Point an exercise at its canonical subject.
    async fn set_subject(&self, id: Uuid, subject_id: Uuid) -> Result<()>;
}

// =============================================================================
// ANSWER REPOSITORY
// =============================================================================

/// Repository for answers and their vote sets.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert an answer and bump the exercise's denormalized answer count
    /// in the same transaction. Validates that a parent answer, when given,
    /// belongs to the same exercise.
    async fn insert(
        &self,
        exercise_id: Uuid,
        author_id: Uuid,
        req: CreateAnswerRequest,
    ) -> Result<Uuid>;

    /// Fetch a single answer. `viewer` fills in `own_vote`.
    async fn fetch(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Answer>;

    /// All answers for an exercise in the requested order.
    async fn list_for_exercise(
        &self,
        exercise_id: Uuid,
        order: AnswerOrder,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Answer>>;

    /// Author of an answer, for ownership checks and notification routing.
    async fn author_of(&self, id: Uuid) -> Result<Option<Uuid>>;

    /// Parent exercise of an answer, for report denormalization.
    async fn exercise_of(&self, id: Uuid) -> Result<Option<Uuid>>;

    /// Delete an answer (and its replies, via cascade).
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Toggle a vote, same semantics as exercise votes.
    async fn vote(&self, id: Uuid, user_id: Uuid, kind: VoteKind) -> Result<VoteResult>;
}

// =============================================================================
// NOTIFICATION REPOSITORY
// =============================================================================

/// Repository for persisted notification records.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new notification and return the stored record.
    async fn insert(&self, req: &NewNotification) -> Result<Notification>;

    /// Recipient's notifications, newest first.
    async fn list_for(
        &self,
        recipient_id: Uuid,
        req: ListNotificationsRequest,
    ) -> Result<Vec<Notification>>;

    /// Count of unread notifications for a recipient.
    async fn unread_count(&self, recipient_id: Uuid) -> Result<i64>;

    /// Set the read flag on one notification. Returns false when the
    /// notification does not exist or belongs to someone else.
    async fn set_read(&self, id: Uuid, recipient_id: Uuid, read: bool) -> Result<bool>;

    /// Mark all of a recipient's notifications read; returns how many changed.
    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64>;
}

// =============================================================================
// REPORT REPOSITORY
// =============================================================================

/// Insert payload for a validated report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub target_kind: ReportTargetKind,
    pub target_id: Uuid,
    /// Denormalized at intake: the target exercise, or the answer's parent.
    pub exercise_id: Option<Uuid>,
    pub reason: ReportReason,
    pub details: Option<String>,
}

/// Repository for moderation reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a validated report with status `pending`.
    async fn insert(&self, report: NewReport) -> Result<Report>;

    /// Fetch a report by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Report>>;

    /// List reports, optionally filtered by status, newest first.
    async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>>;

    /// Mark a report resolved by the given administrator.
    async fn resolve(&self, id: Uuid, admin_id: Uuid) -> Result<Report>;
}
