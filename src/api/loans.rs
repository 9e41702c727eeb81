//! Loan applications, terms, payments and documents.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::QueryCache;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::upload::ProgressFn;

use super::types::{
  Ack, LoanApplication, LoanDocument, LoanEligibility, LoanPayment, LoanPaymentRequest,
  LoanRequest, LoanTerms, LoanUpdate, PaymentQuote, PaymentQuoteRequest,
};
use super::DEFAULT_STALE;

/// Loan terms change rarely.
const TERMS_STALE: Duration = Duration::from_secs(10 * 60);

/// Flat markup the platform applies to a loan, used for the instant
/// display estimate while the form is being filled in. The authoritative
/// quote comes from [`LoansApi::calculate`].
const LOAN_MARKUP: f64 = 1.035;

/// Monthly payment estimate shown next to the application form:
/// `round(amount * 1.035 / term)`.
pub fn estimate_monthly_payment(amount: f64, term: u32) -> f64 {
  if term == 0 {
    return 0.0;
  }
  (amount * LOAN_MARKUP / f64::from(term)).round()
}

/// Cache-key taxonomy for the loans resource.
pub mod keys {
  use crate::cache::QueryKey;

  pub fn all() -> QueryKey {
    QueryKey::root("loans")
  }

  pub fn lists() -> QueryKey {
    all().push("list")
  }

  pub fn details() -> QueryKey {
    all().push("detail")
  }

  pub fn detail(id: &str) -> QueryKey {
    details().push(id)
  }

  pub fn my_loans(user_id: &str) -> QueryKey {
    all().push("my-loans").push(user_id)
  }

  pub fn eligibility(user_id: &str) -> QueryKey {
    all().push("eligibility").push(user_id)
  }

  pub fn terms() -> QueryKey {
    all().push("terms")
  }

  pub fn payments(loan_id: &str) -> QueryKey {
    all().push("payments").push(loan_id)
  }

  pub fn documents(loan_id: &str) -> QueryKey {
    all().push("documents").push(loan_id)
  }
}

#[derive(Clone)]
pub struct LoansApi {
  client: Arc<ApiClient>,
  cache: Arc<QueryCache>,
}

impl LoansApi {
  pub(crate) fn new(client: Arc<ApiClient>, cache: Arc<QueryCache>) -> Self {
    Self { client, cache }
  }

  /// The caller's loan applications.
  pub async fn my_applications(&self) -> ApiResult<Vec<LoanApplication>> {
    let key = keys::lists();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/loans/my-applications", &[]).await }
      })
      .await
  }

  /// Loan application by id. Gated on a non-empty id.
  pub async fn by_id(&self, id: &str) -> ApiResult<Option<LoanApplication>> {
    if id.is_empty() {
      return Ok(None);
    }

    let key = keys::detail(id);
    let client = self.client.clone();
    let endpoint = format!("/loans/{}", id);

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Whether the current user may borrow, and up to how much.
  pub async fn eligibility(&self) -> ApiResult<LoanEligibility> {
    // The backend scopes eligibility to the bearer token.
    let key = keys::eligibility("current");
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        async move { client.get("/loans/eligibility", &[]).await }
      })
      .await
  }

  /// Platform-wide loan terms: amount bounds, available terms, rates.
  pub async fn terms(&self) -> ApiResult<LoanTerms> {
    let key = keys::terms();
    let client = self.client.clone();

    self
      .cache
      .fetch(&key, TERMS_STALE, move || {
        let client = client.clone();
        async move { client.get("/loans/terms", &[]).await }
      })
      .await
  }

  /// Payment history for one loan. Gated on a non-empty id.
  pub async fn payment_history(&self, loan_id: &str) -> ApiResult<Option<Vec<LoanPayment>>> {
    if loan_id.is_empty() {
      return Ok(None);
    }

    let key = keys::payments(loan_id);
    let client = self.client.clone();
    let endpoint = format!("/loans/{}/payments", loan_id);

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Documents attached to one loan.
  pub async fn documents(&self, loan_id: &str) -> ApiResult<Option<Vec<LoanDocument>>> {
    if loan_id.is_empty() {
      return Ok(None);
    }

    let key = keys::documents(loan_id);
    let client = self.client.clone();
    let endpoint = format!("/loans/{}/documents", loan_id);

    self
      .cache
      .fetch(&key, DEFAULT_STALE, move || {
        let client = client.clone();
        let endpoint = endpoint.clone();
        async move { client.get(&endpoint, &[]).await }
      })
      .await
      .map(Some)
  }

  /// Submit a loan application.
  pub async fn apply(&self, request: &LoanRequest) -> ApiResult<LoanApplication> {
    let application = self.client.post("/loans/apply", request).await?;
    self.cache.invalidate(&keys::lists());
    Ok(application)
  }

  /// Amend a pending application. Targeted invalidation.
  pub async fn update(&self, id: &str, update: &LoanUpdate) -> ApiResult<LoanApplication> {
    let application = self.client.put(&format!("/loans/{}", id), update).await?;
    self.cache.invalidate_many(&[keys::detail(id), keys::lists()]);
    Ok(application)
  }

  /// Cancel a pending application.
  pub async fn cancel(&self, id: &str) -> ApiResult<Ack> {
    let ack = self.client.delete(&format!("/loans/{}", id)).await?;
    self.cache.invalidate(&keys::lists());
    Ok(ack)
  }

  /// Server-side payment quote. No cached state depends on it.
  pub async fn calculate(&self, request: &PaymentQuoteRequest) -> ApiResult<PaymentQuote> {
    self.client.post("/loans/calculate", request).await
  }

  /// Record a repayment. A payment moves balances, statuses and history,
  /// so the whole loans scope is invalidated.
  pub async fn make_payment(&self, request: &LoanPaymentRequest) -> ApiResult<Ack> {
    let ack = self.client.post("/loans/payment", request).await?;
    self.cache.invalidate(&keys::all());
    Ok(ack)
  }

  /// Upload a supporting document for a loan, reporting progress.
  pub async fn upload_document(
    &self,
    loan_id: &str,
    file_name: &str,
    bytes: Vec<u8>,
    on_progress: Option<ProgressFn>,
  ) -> ApiResult<Ack> {
    let ack = self
      .client
      .upload(
        &format!("/loans/{}/documents", loan_id),
        "document",
        file_name,
        bytes,
        on_progress,
      )
      .await?;
    self.cache.invalidate(&keys::documents(loan_id));
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_monthly_estimate_matches_backend_formula() {
    // round(5000 * 1.035 / 12)
    assert_eq!(estimate_monthly_payment(5000.0, 12), 431.0);
    // round(12000 * 1.035 / 24)
    assert_eq!(estimate_monthly_payment(12_000.0, 24), 518.0);
  }

  #[test]
  fn test_monthly_estimate_zero_term_is_zero() {
    assert_eq!(estimate_monthly_payment(5000.0, 0), 0.0);
  }

  #[test]
  fn test_document_and_payment_keys_scope_per_loan() {
    assert!(keys::documents("7").starts_with(&keys::all()));
    assert!(keys::payments("7").starts_with(&keys::all()));
    assert!(keys::my_loans("u1").starts_with(&keys::all()));
    assert!(keys::eligibility("u1").starts_with(&keys::all()));
    assert_ne!(keys::documents("7"), keys::documents("8"));
    assert!(!keys::documents("7").starts_with(&keys::lists()));
  }
}
