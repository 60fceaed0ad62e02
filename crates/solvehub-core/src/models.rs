//! Core data models for SolveHub.
//!
//! These types are shared across all SolveHub crates and represent the
//! core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USER TYPES
// =============================================================================

/// Capability tier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Moderators and admins may moderate content; only admins manage
    /// subjects, reports, and accounts.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

/// A registered user account.
///
/// `password_hash` never leaves the persistence layer boundary; wire-facing
/// responses use [`UserProfile`] or [`UserSummary`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

impl User {
    /// Public view of the account (no email).
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
        }
    }

    /// Private view of the account (own profile and settings pages).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at_utc: self.created_at_utc,
        }
    }
}

/// Compact author attribution embedded in exercises and answers.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

/// Full own-account view.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at_utc: DateTime<Utc>,
}

/// Request for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

// =============================================================================
// NOTIFICATION PREFERENCES
// =============================================================================

/// Per-user flags controlling which event types produce a notification.
///
/// Users with no stored row get [`NotificationPreferences::default`]:
/// reply notifications on, like notifications off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotificationPreferences {
    /// Notify when someone answers one of my exercises.
    pub reply_to_exercise: bool,
    /// Notify when someone replies to one of my answers.
    pub reply_to_answer: bool,
    /// Notify when someone likes one of my exercises.
    pub like_on_exercise: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            reply_to_exercise: true,
            reply_to_answer: true,
            like_on_exercise: false,
        }
    }
}

impl NotificationPreferences {
    /// The flag controlling the given event type.
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Comment => self.reply_to_exercise,
            NotificationKind::Reply => self.reply_to_answer,
            NotificationKind::Like => self.like_on_exercise,
        }
    }
}

// =============================================================================
// SUBJECT AND TAG TYPES
// =============================================================================

/// A canonical subject (e.g. "Cálculo II").
///
/// The slug is derived once at creation when absent; name uniqueness is
/// enforced by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_popular: bool,
    pub created_at_utc: DateTime<Utc>,
}

/// Request for creating a subject.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    /// Explicit slug override; derived from the name when absent.
    pub slug: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
}

/// A free-form tag with its usage count.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Tag {
    pub name: String,
    pub created_at_utc: DateTime<Utc>,
    pub exercise_count: i64,
}

// =============================================================================
// EXERCISE TYPES
// =============================================================================

/// A like or dislike on an exercise or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    /// Signed value stored in the vote tables.
    pub fn value(&self) -> i16 {
        match self {
            VoteKind::Like => 1,
            VoteKind::Dislike => -1,
        }
    }

    pub fn from_value(v: i16) -> Option<Self> {
        match v {
            1 => Some(VoteKind::Like),
            -1 => Some(VoteKind::Dislike),
            _ => None,
        }
    }
}

/// Aggregated vote counts plus the requesting user's own vote, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoteSummary {
    pub likes: i64,
    pub dislikes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_vote: Option<VoteKind>,
}

/// Listing view of an exercise.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExerciseSummary {
    pub id: Uuid,
    pub title: String,
    /// Legacy free-text subject name, kept during the migration window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    pub tags: Vec<String>,
    pub author: UserSummary,
    pub answer_count: i32,
    pub votes: VoteSummary,
    pub created_at_utc: DateTime<Utc>,
}

/// Complete exercise with attachments, as served by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExerciseFull {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    pub tags: Vec<String>,
    pub author: UserSummary,
    pub answer_count: i32,
    pub votes: VoteSummary,
    pub attachments: Vec<Attachment>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Request for creating a new exercise.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExerciseRequest {
    pub title: String,
    pub description: String,
    /// Canonical subject reference.
    pub subject_id: Option<Uuid>,
    /// Legacy free-text subject name, accepted during the migration window.
    pub subject_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Filters and pagination for exercise listing.
#[derive(Debug, Clone, Default)]
pub struct ListExercisesRequest {
    pub subject_slug: Option<String>,
    pub tag: Option<String>,
    pub author_id: Option<Uuid>,
    /// Only exercises saved by this user.
    pub saved_by: Option<Uuid>,
    /// Only exercises completed by this user.
    pub completed_by: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Page of exercises plus the total match count.
#[derive(Debug, Clone)]
pub struct ListExercisesResponse {
    pub exercises: Vec<ExerciseSummary>,
    pub total: i64,
}

// =============================================================================
// ANSWER TYPES
// =============================================================================

/// An answer to an exercise, or a reply to another answer.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Answer {
    pub id: Uuid,
    pub exercise_id: Uuid,
    /// `None` means a top-level answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_answer_id: Option<Uuid>,
    pub content: String,
    pub author: UserSummary,
    pub votes: VoteSummary,
    pub attachments: Vec<Attachment>,
    pub created_at_utc: DateTime<Utc>,
}

/// Request for creating an answer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnswerRequest {
    pub content: String,
    /// When set, this answer is a reply; the parent must belong to the
    /// same exercise.
    pub parent_answer_id: Option<Uuid>,
}

/// Ordering for the per-exercise answer listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOrder {
    /// Newest first, flat.
    #[default]
    Recent,
    /// Top-level answers first (newest first), replies grouped under
    /// their parents (oldest first).
    Thread,
}

// =============================================================================
// ATTACHMENT TYPES
// =============================================================================

/// Where an attachment's bytes live.
///
/// The variant is explicit in storage (`storage_kind` column) rather than
/// inferred from URL shape or field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageLocation {
    /// Pre-migration file on local disk, awaiting `attachment-migrate`.
    LocalLegacy { path: String },
    /// Durable object storage.
    Hosted {
        url: String,
        storage_key: String,
        size: i64,
    },
}

impl StorageLocation {
    pub fn kind_str(&self) -> &'static str {
        match self {
            StorageLocation::LocalLegacy { .. } => "local_legacy",
            StorageLocation::Hosted { .. } => "hosted",
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, StorageLocation::Hosted { .. })
    }
}

/// A file attached to an exercise or answer.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Attachment {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<Uuid>,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    #[serde(flatten)]
    pub storage: StorageLocation,
    pub created_at_utc: DateTime<Utc>,
}

/// Owner reference for a new attachment; exactly one side is set.
#[derive(Debug, Clone, Copy)]
pub enum AttachmentOwner {
    Exercise(Uuid),
    Answer(Uuid),
}

// =============================================================================
// NOTIFICATION TYPES
// =============================================================================

/// Fixed set of notification event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone answered my exercise.
    Comment,
    /// Someone replied to my answer.
    Reply,
    /// Someone liked my exercise.
    Like,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Comment => "comment",
            NotificationKind::Reply => "reply",
            NotificationKind::Like => "like",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "comment" => Some(NotificationKind::Comment),
            "reply" => Some(NotificationKind::Reply),
            "like" => Some(NotificationKind::Like),
            _ => None,
        }
    }
}

/// A persisted notification record.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<Uuid>,
    pub created_at_utc: DateTime<Utc>,
}

/// Filters and pagination for the notification listing.
#[derive(Debug, Clone, Default)]
pub struct ListNotificationsRequest {
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}

// =============================================================================
// REPORT TYPES
// =============================================================================

/// What kind of entity a report targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportTargetKind {
    Exercise,
    Answer,
}

impl ReportTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTargetKind::Exercise => "exercise",
            ReportTargetKind::Answer => "answer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exercise" => Some(ReportTargetKind::Exercise),
            "answer" => Some(ReportTargetKind::Answer),
            _ => None,
        }
    }
}

/// Fixed set of report reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    Spam,
    Offensive,
    FalseInfo,
    Other,
}

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Spam => "SPAM",
            ReportReason::Offensive => "OFFENSIVE",
            ReportReason::FalseInfo => "FALSE_INFO",
            ReportReason::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPAM" => Some(ReportReason::Spam),
            "OFFENSIVE" => Some(ReportReason::Offensive),
            "FALSE_INFO" => Some(ReportReason::FalseInfo),
            "OTHER" => Some(ReportReason::Other),
            _ => None,
        }
    }
}

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }
}

/// Maximum length of the free-text details on a report.
pub const REPORT_DETAILS_MAX_LEN: usize = 1000;

/// A persisted moderation report.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_kind: ReportTargetKind,
    pub target_id: Uuid,
    /// The target exercise, or the parent exercise when the target is an
    /// answer. Denormalized at intake.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<Uuid>,
    pub reason: ReportReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<Uuid>,
    pub created_at_utc: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at_utc: Option<DateTime<Utc>>,
}

/// Validated report intake payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportRequest {
    pub target_kind: ReportTargetKind,
    pub target_id: Uuid,
    pub reason: ReportReason,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.reply_to_exercise);
        assert!(prefs.reply_to_answer);
        assert!(!prefs.like_on_exercise);
    }

    #[test]
    fn test_preferences_gate_by_kind() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.allows(NotificationKind::Comment));
        assert!(prefs.allows(NotificationKind::Reply));
        assert!(!prefs.allows(NotificationKind::Like));
    }

    #[test]
    fn test_vote_kind_round_trip() {
        assert_eq!(VoteKind::from_value(VoteKind::Like.value()), Some(VoteKind::Like));
        assert_eq!(
            VoteKind::from_value(VoteKind::Dislike.value()),
            Some(VoteKind::Dislike)
        );
        assert_eq!(VoteKind::from_value(0), None);
    }

    #[test]
    fn test_report_reason_parse_rejects_unknown() {
        assert_eq!(ReportReason::parse("SPAM"), Some(ReportReason::Spam));
        assert_eq!(ReportReason::parse("FALSE_INFO"), Some(ReportReason::FalseInfo));
        assert_eq!(ReportReason::parse("spam"), None);
        assert_eq!(ReportReason::parse("ABUSE"), None);
    }

    #[test]
    fn test_report_reason_serde_screaming_snake() {
        let json = serde_json::to_string(&ReportReason::FalseInfo).unwrap();
        assert_eq!(json, "\"FALSE_INFO\"");
        let parsed: ReportReason = serde_json::from_str("\"OFFENSIVE\"").unwrap();
        assert_eq!(parsed, ReportReason::Offensive);
    }

    #[test]
    fn test_storage_location_tagged_serialization() {
        let hosted = StorageLocation::Hosted {
            url: "https://cdn.example.com/a/b.png".to_string(),
            storage_key: "solvehub/a/b".to_string(),
            size: 1024,
        };
        let json = serde_json::to_value(&hosted).unwrap();
        assert_eq!(json["kind"], "hosted");
        assert_eq!(json["storage_key"], "solvehub/a/b");

        let legacy = StorageLocation::LocalLegacy {
            path: "/uploads/b.png".to_string(),
        };
        let json = serde_json::to_value(&legacy).unwrap();
        assert_eq!(json["kind"], "local_legacy");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
        assert!(Role::Admin.can_moderate());
        assert!(Role::Moderator.can_moderate());
        assert!(!Role::Student.can_moderate());
    }
}
