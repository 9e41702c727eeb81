//! Wire types for the backend API.
//!
//! Shapes mirror the backend JSON (camelCase). The access layer never
//! mutates these records directly; it requests mutations and reflects the
//! results into the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Envelopes
// ============================================================================

/// Acknowledgement-style response for writes that return no entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub page: u32,
  pub limit: u32,
  pub total: u32,
  pub total_pages: u32,
}

/// A page of entity records plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
  pub data: Vec<T>,
  pub pagination: Pagination,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Company,
  Staff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
  pub name: String,
  pub email: String,
  pub password: String,
  pub role: Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
  pub user: User,
  pub token: String,
  pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub email: String,
  pub name: String,
  pub role: Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rating: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub experience: Option<u32>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skills: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hourly_rate: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub portfolio: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub work_experience: Vec<WorkExperience>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub certifications: Vec<Certification>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile_completed: Option<bool>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Partial profile update; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hourly_rate: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub portfolio: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
  pub id: String,
  pub company: String,
  pub position: String,
  pub duration: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skills: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
  pub id: String,
  pub name: String,
  pub issuer: String,
  pub year: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub credential_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification_url: Option<String>,
}

// ============================================================================
// Staff
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
  Available,
  Busy,
  Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
  Verified,
  Pending,
  Unverified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
  #[serde(flatten)]
  pub user: User,
  pub availability: Availability,
  pub completed_projects: u32,
  pub success_rate: f64,
  pub response_time: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub languages: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timezone: Option<String>,
  pub verification_status: VerificationStatus,
}

/// Directory filters. Equality of two filter values determines cache-key
/// equality, so unset fields must be absent from the serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffFilters {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skills: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_rating: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_rate: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_experience: Option<u32>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub availability: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sort_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

impl StaffFilters {
  /// Map sentinel values to unset: zero bounds and empty strings mean "no
  /// filter" at the form boundary and must not reach the cache key or the
  /// query string.
  pub fn normalized(mut self) -> Self {
    if self.min_rating == Some(0.0) {
      self.min_rating = None;
    }
    if self.max_rate == Some(0.0) {
      self.max_rate = None;
    }
    if self.min_experience == Some(0) {
      self.min_experience = None;
    }
    if self.location.as_deref() == Some("") {
      self.location = None;
    }
    if self.sort_by.as_deref() == Some("") {
      self.sort_by = None;
    }
    self
  }

  pub fn with_page(mut self, page: u32) -> Self {
    self.page = Some(page);
    self
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HireRequest {
  pub staff_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
  pub staff_id: String,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject: Option<String>,
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
  FullTime,
  PartTime,
  Contract,
  Freelance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
  Open,
  Closed,
  InProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub id: String,
  pub title: String,
  pub description: String,
  pub company: String,
  pub company_id: String,
  pub budget: String,
  pub duration: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skills: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub requirements: Vec<String>,
  pub location: String,
  pub remote: bool,
  #[serde(rename = "type")]
  pub job_type: JobType,
  pub status: JobStatus,
  pub applicants: u32,
  pub posted_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deadline: Option<DateTime<Utc>>,
}

/// Fields accepted when creating or updating a job posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub budget: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub skills: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub requirements: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub remote: Option<bool>,
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub job_type: Option<JobType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub skills: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remote: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
  pub job_type: Option<JobType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<JobStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sort_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

impl JobFilters {
  pub fn with_page(mut self, page: u32) -> Self {
    self.page = Some(page);
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  Pending,
  Accepted,
  Rejected,
  Withdrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
  pub id: String,
  pub job_id: String,
  pub staff_id: String,
  pub cover_letter: String,
  pub proposed_rate: f64,
  pub estimated_duration: String,
  pub status: ApplicationStatus,
  pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationRequest {
  pub job_id: String,
  pub cover_letter: String,
  pub proposed_rate: f64,
  pub estimated_duration: String,
}

// ============================================================================
// Loans
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
  Pending,
  Approved,
  Rejected,
  Disbursed,
  Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
  pub id: String,
  pub staff_id: String,
  pub amount: f64,
  pub purpose: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Repayment term in months.
  pub term: u32,
  pub status: LoanStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interest_rate: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub monthly_payment: Option<f64>,
  pub applied_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approved_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub disbursed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
  pub amount: f64,
  pub purpose: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub term: u32,
}

/// Partial loan update; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub purpose: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub term: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEligibility {
  pub eligible: bool,
  pub max_amount: f64,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
  pub min_amount: f64,
  pub max_amount: f64,
  /// Available terms in months.
  pub terms: Vec<u32>,
  pub interest_rates: std::collections::BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuoteRequest {
  pub amount: f64,
  pub term: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
  pub monthly_payment: f64,
  pub total_payment: f64,
  pub total_interest: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPaymentRequest {
  pub loan_id: String,
  pub amount: f64,
  pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayment {
  pub id: String,
  pub loan_id: String,
  pub amount: f64,
  pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDocument {
  pub id: String,
  pub loan_id: String,
  pub name: String,
  pub uploaded_at: DateTime<Utc>,
}

// ============================================================================
// Activities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
  Match,
  Application,
  Rating,
  Loan,
  Hire,
  Payment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id: String,
  #[serde(rename = "type")]
  pub activity_type: ActivityType,
  pub title: String,
  pub description: String,
  pub timestamp: DateTime<Utc>,
  pub user_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
  #[serde(rename = "type")]
  pub activity_type: ActivityType,
  pub title: String,
  pub description: String,
  pub user_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilters {
  #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
  pub activity_type: Option<ActivityType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
  pub total: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub this_week: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub by_type: Option<std::collections::BTreeMap<String, u32>>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
  Info,
  Success,
  Warning,
  Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id: String,
  pub user_id: String,
  #[serde(rename = "type")]
  pub kind: NotificationKind,
  pub title: String,
  pub message: String,
  pub read: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilters {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCounts {
  pub total: u32,
  pub unread: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
  pub email: bool,
  pub push: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub muted_types: Vec<String>,
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_earnings: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed_jobs: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_jobs: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub success_rate: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rating: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_hires: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_projects: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pending_applications: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsPoint {
  pub month: String,
  pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
  pub period: String,
  pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDemand {
  pub skill: String,
  pub demand: f64,
}
