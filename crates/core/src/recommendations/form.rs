//! Standalone recommendation form.
//!
//! Submits preferences without a cart and tracks the outcome as a
//! [`FormPhase`]. Only the most recent submission may settle the phase.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::MAX_HOUSEHOLD_SIZE;
use crate::errors::{ServiceError, ValidationError};
use crate::recommendations::recommendations_model::{
    HealthCondition, Preferences, RecommendResponse, SyncRequest,
};
use crate::recommendations::recommendations_traits::RecommendationServiceTrait;

/// Raw form values.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub budget: Decimal,
    pub health_condition: Option<HealthCondition>,
    pub household_size: u32,
}

impl FormInput {
    /// Parses the textual form fields. The health condition accepts `none`.
    pub fn parse(
        budget: &str,
        health_condition: &str,
        household_size: &str,
    ) -> Result<Self, ValidationError> {
        let budget = budget.trim();
        if budget.is_empty() {
            return Err(ValidationError::MissingField("budget".to_string()));
        }
        let household_size = household_size.trim();
        if household_size.is_empty() {
            return Err(ValidationError::MissingField("household_size".to_string()));
        }

        Ok(Self {
            budget: budget.parse::<Decimal>()?,
            health_condition: HealthCondition::parse_filter(health_condition)?,
            household_size: household_size.parse::<u32>()?,
        })
    }

    pub fn validate(&self) -> Result<Preferences, ValidationError> {
        if self.budget <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "Budget must be greater than 0".to_string(),
            ));
        }
        if self.household_size == 0 || self.household_size > MAX_HOUSEHOLD_SIZE {
            return Err(ValidationError::InvalidInput(format!(
                "Household size must be between 1 and {}",
                MAX_HOUSEHOLD_SIZE
            )));
        }
        Ok(Preferences {
            budget: self.budget,
            household_size: self.household_size,
            health_condition: self.health_condition,
        })
    }
}

impl From<&Preferences> for FormInput {
    fn from(preferences: &Preferences) -> Self {
        Self {
            budget: preferences.budget,
            health_condition: preferences.health_condition,
            household_size: preferences.household_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Loading,
    Results(RecommendResponse),
    Failed { message: String, retryable: bool },
}

impl FormPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, FormPhase::Loading)
    }
}

struct FormState {
    phase: FormPhase,
    last_input: Option<FormInput>,
    submission: u64,
}

pub struct RecommendationForm {
    service: Arc<dyn RecommendationServiceTrait>,
    state: Mutex<FormState>,
}

impl RecommendationForm {
    pub fn new(service: Arc<dyn RecommendationServiceTrait>) -> Self {
        Self {
            service,
            state: Mutex::new(FormState {
                phase: FormPhase::Idle,
                last_input: None,
                submission: 0,
            }),
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.lock_state().phase.clone()
    }

    pub fn last_input(&self) -> Option<FormInput> {
        self.lock_state().last_input.clone()
    }

    /// Validates and submits `input`, returning the phase it settled in.
    ///
    /// Invalid input is rejected before any request and leaves the phase as is.
    pub async fn submit(&self, input: FormInput) -> Result<FormPhase, ValidationError> {
        let preferences = input.validate()?;

        let submission = {
            let mut state = self.lock_state();
            state.submission += 1;
            state.last_input = Some(input);
            state.phase = FormPhase::Loading;
            state.submission
        };

        let request = SyncRequest::standalone(&preferences);
        debug!(
            "Submitting standalone recommendation request {} (budget {}, household {})",
            submission, request.budget, request.household_size
        );
        let outcome = self.service.recommend(&request).await;

        let mut state = self.lock_state();
        if state.submission != submission {
            debug!("Discarding superseded form submission {}", submission);
            return Ok(state.phase.clone());
        }

        state.phase = match outcome {
            Ok(response) => FormPhase::Results(response),
            Err(ServiceError::Superseded) => FormPhase::Idle,
            Err(err) => {
                warn!("Recommendation form submission failed: {}", err);
                FormPhase::Failed {
                    message: err.user_message(),
                    retryable: err.is_retryable(),
                }
            }
        };
        Ok(state.phase.clone())
    }

    /// Resubmits the last input. Returns `None` when nothing was submitted yet.
    pub async fn retry(&self) -> Option<FormPhase> {
        let input = self.last_input()?;
        // The stored input already passed validation.
        self.submit(input).await.ok()
    }

    /// Returns to `Idle` and forgets the last input. A submission still in
    /// flight will not settle the phase.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.submission += 1;
        state.last_input = None;
        state.phase = FormPhase::Idle;
    }

    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Recommendation form mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{REJECTED_FALLBACK_MESSAGE, UNREACHABLE_MESSAGE};
    use crate::recommendations::BudgetSummary;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;

    type Reply = Result<RecommendResponse, ServiceError>;

    /// Replies from a queue and records every request.
    #[derive(Default)]
    struct QueuedService {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<SyncRequest>>,
    }

    impl QueuedService {
        fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<SyncRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecommendationServiceTrait for QueuedService {
        async fn recommend(&self, request: &SyncRequest) -> Reply {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::MalformedResponse("no reply".to_string())))
        }
    }

    fn empty_response(budget: Decimal) -> RecommendResponse {
        RecommendResponse {
            recommendations: Vec::new(),
            summary: BudgetSummary {
                total_products: 0,
                total_spent: Decimal::ZERO,
                remaining_budget: budget,
                budget,
                total_calories: 0.0,
                total_protein: 0.0,
                products_considered: 0,
                products_after_filter: 0,
                health_condition: None,
                household_size: 2,
                allocation_method: "lp".to_string(),
            },
        }
    }

    fn input(budget: Decimal) -> FormInput {
        FormInput {
            budget,
            health_condition: Some(HealthCondition::Diabetic),
            household_size: 3,
        }
    }

    #[test]
    fn test_parse_form_fields() {
        let parsed = FormInput::parse("750", "none", "4").unwrap();
        assert_eq!(parsed.budget, dec!(750));
        assert_eq!(parsed.health_condition, None);
        assert_eq!(parsed.household_size, 4);

        assert!(matches!(
            FormInput::parse("", "none", "4"),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            FormInput::parse("abc", "none", "4"),
            Err(ValidationError::NumberParse(_))
        ));
        assert!(matches!(
            FormInput::parse("500", "keto", "4"),
            Err(ValidationError::UnknownHealthCondition(_))
        ));
    }

    #[test]
    fn test_validation_bounds() {
        assert!(input(dec!(0)).validate().is_err());
        assert!(input(dec!(-10)).validate().is_err());
        assert!(input(dec!(0.5)).validate().is_ok());

        let mut household = input(dec!(500));
        household.household_size = 0;
        assert!(household.validate().is_err());
        household.household_size = 20;
        assert!(household.validate().is_ok());
        household.household_size = 21;
        assert!(household.validate().is_err());
    }

    #[tokio::test]
    async fn test_invalid_input_sends_nothing() {
        let service = QueuedService::with_replies(Vec::new());
        let form = RecommendationForm::new(service.clone());

        assert!(form.submit(input(dec!(0))).await.is_err());
        assert!(service.requests().is_empty());
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(form.last_input().is_none());
    }

    #[tokio::test]
    async fn test_successful_submit_sends_cartless_request() {
        let service = QueuedService::with_replies(vec![Ok(empty_response(dec!(800)))]);
        let form = RecommendationForm::new(service.clone());

        let phase = form.submit(input(dec!(800))).await.unwrap();

        assert_eq!(phase, FormPhase::Results(empty_response(dec!(800))));
        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].items.is_none());
        assert_eq!(requests[0].budget, dec!(800));
        assert_eq!(requests[0].household_size, 3);
        assert_eq!(
            requests[0].health_condition,
            Some(HealthCondition::Diabetic)
        );
    }

    #[tokio::test]
    async fn test_rejection_surfaces_detail_and_retry_resubmits() {
        let service = QueuedService::with_replies(vec![
            Err(ServiceError::ServiceRejected {
                status: 400,
                detail: Some("Budget too low for household".to_string()),
            }),
            Ok(empty_response(dec!(100))),
        ]);
        let form = RecommendationForm::new(service.clone());

        let phase = form.submit(input(dec!(100))).await.unwrap();
        assert_eq!(
            phase,
            FormPhase::Failed {
                message: "Budget too low for household".to_string(),
                retryable: true,
            }
        );

        let retried = form.retry().await.unwrap();
        assert!(matches!(retried, FormPhase::Results(_)));
        let requests = service.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_failure_messages() {
        let service = QueuedService::with_replies(vec![
            Err(ServiceError::ServiceRejected {
                status: 500,
                detail: None,
            }),
            Err(ServiceError::NetworkUnreachable("refused".to_string())),
        ]);
        let form = RecommendationForm::new(service);

        let rejected = form.submit(input(dec!(500))).await.unwrap();
        assert_eq!(
            rejected,
            FormPhase::Failed {
                message: REJECTED_FALLBACK_MESSAGE.to_string(),
                retryable: true,
            }
        );

        let unreachable = form.submit(input(dec!(500))).await.unwrap();
        assert_eq!(
            unreachable,
            FormPhase::Failed {
                message: UNREACHABLE_MESSAGE.to_string(),
                retryable: true,
            }
        );
    }

    #[tokio::test]
    async fn test_retry_without_input_is_noop() {
        let service = QueuedService::with_replies(Vec::new());
        let form = RecommendationForm::new(service.clone());

        assert!(form.retry().await.is_none());
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_reset_forgets_last_input() {
        let service = QueuedService::with_replies(vec![Ok(empty_response(dec!(500)))]);
        let form = RecommendationForm::new(service.clone());

        form.submit(input(dec!(500))).await.unwrap();
        form.reset();

        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(form.last_input().is_none());
        assert!(form.retry().await.is_none());
        assert_eq!(service.requests().len(), 1);
    }
}
