//! Booking session controller.
//!
//! One session owns one draft and walks it through payment and persistence:
//!
//! ```text
//! Editing -> AwaitingPayment -> SubmittingBooking -> Done
//!                 |                     |
//!                 v                     v
//!           PaymentFailed        PersistenceFailed
//! ```
//!
//! The pricing snapshot is copied into a [`FrozenBooking`] when payment
//! starts. Later edits only touch the live draft. Every intent gets a new
//! generation; gateway outcomes carry the generation they were issued for and
//! are ignored once a newer intent exists.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::gateway::{
    BillingDetails, PaymentConfirmation, PaymentError, PaymentGateway, PaymentMethodDetails, CURRENCY,
};
use crate::persistence::{BookingAck, BookingApi, BookingPayload, BookingReceipt, PersistenceError};
use crate::pricing::{services, to_minor_units, AppliedDiscount, DiscountState, PricingError, PricingSnapshot};

use super::models::{BookingDraft, CampType, DraftError, FieldUpdate, Location, Plan};
use super::schedule::SeasonCalendar;
use super::validation::{validate_all, ValidationErrors, FIX_ERRORS_MESSAGE};

/// Draft and pricing copied at the moment payment starts
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenBooking {
    pub draft: BookingDraft,
    pub snapshot: PricingSnapshot,
    pub discount: Option<AppliedDiscount>,
}

impl FrozenBooking {
    pub fn payload(&self, payment_id: &str) -> BookingPayload {
        BookingPayload::new(&self.draft, &self.snapshot, self.discount.as_ref(), payment_id)
    }
}

/// The outstanding payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentHandle {
    pub generation: u64,
    pub client_secret: String,
    pub amount_minor_units: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub booking: FrozenBooking,
    pub intent: IntentHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailure {
    pub error: PaymentError,
    pub booking: FrozenBooking,
    /// The intent that failed, `None` when it could not be created
    pub intent: Option<IntentHandle>,
}

/// Money was captured but the booking was not saved
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceFailure {
    pub payment: PaymentConfirmation,
    pub error: PersistenceError,
    pub booking: FrozenBooking,
}

impl PersistenceFailure {
    pub fn message(&self) -> String {
        format!(
            "Your payment was successful, but we failed to save your booking. Please contact support. Error: {}",
            self.error
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Editing,
    AwaitingPayment(Checkout),
    SubmittingBooking {
        booking: FrozenBooking,
        payment: PaymentConfirmation,
    },
    Done(BookingReceipt),
    PaymentFailed(PaymentFailure),
    PersistenceFailed(PersistenceFailure),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Editing => "editing",
            SessionState::AwaitingPayment(_) => "awaitingPayment",
            SessionState::SubmittingBooking { .. } => "submittingBooking",
            SessionState::Done(_) => "done",
            SessionState::PaymentFailed(_) => "paymentFailed",
            SessionState::PersistenceFailed(_) => "persistenceFailed",
        }
    }

    /// Whether the live draft may still change
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            SessionState::Editing | SessionState::AwaitingPayment(_) | SessionState::PaymentFailed(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{}", FIX_ERRORS_MESSAGE)]
    Invalid(ValidationErrors),

    #[error("The booking can no longer be changed ({state})")]
    Locked { state: &'static str },

    #[error("Cannot {action} while the session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Payment cannot be retried: {0}")]
    NotRetryable(PaymentError),

    #[error("Cannot charge a total of {0} AED")]
    InvalidAmount(Decimal),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("{}", .0.error)]
    PaymentFailed(Box<PaymentFailure>),

    #[error("{}", .0.message())]
    BookingNotSaved(Box<PersistenceFailure>),

    #[error("Payment {payment_id} belongs to a superseded payment attempt")]
    SupersededPayment { payment_id: String },

    #[error("Payment {payment_id} was already processed")]
    DuplicatePayment { payment_id: String },

    #[error("Payment attempt {generation} is no longer current")]
    StaleAttempt { generation: u64 },
}

/// Everything needed to confirm the current intent without the session
pub struct PaymentTicket {
    pub generation: u64,
    pub client_secret: String,
    pub details: PaymentMethodDetails,
    pub gateway: Arc<dyn PaymentGateway>,
}

pub struct BookingSession {
    id: Uuid,
    draft: BookingDraft,
    discount: DiscountState,
    errors: ValidationErrors,
    state: SessionState,
    generation: u64,
    /// Checkout left by cancel or resume; a late success for it still counts
    cancelled: Option<Checkout>,
    gateway: Arc<dyn PaymentGateway>,
    bookings: Arc<dyn BookingApi>,
    season: SeasonCalendar,
    today: Option<NaiveDate>,
}

impl BookingSession {
    pub fn new(
        plan: Option<Plan>,
        location: Location,
        camp_type: CampType,
        gateway: Arc<dyn PaymentGateway>,
        bookings: Arc<dyn BookingApi>,
        season: SeasonCalendar,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            draft: BookingDraft::new(plan, location, camp_type),
            discount: DiscountState::new(),
            errors: ValidationErrors::new(),
            state: SessionState::Editing,
            generation: 0,
            cancelled: None,
            gateway,
            bookings,
            season,
            today: None,
        };
        session.reset_draft();
        session
    }

    /// Fix the date ages are checked against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn discount(&self) -> &DiscountState {
        &self.discount
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn season(&self) -> &SeasonCalendar {
        &self.season
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Live pricing of the draft
    pub fn pricing(&self) -> PricingSnapshot {
        services::price_with(
            self.draft.plan_price(),
            self.draft.number_of_children(),
            &self.discount,
        )
    }

    fn reset_draft(&mut self) {
        let plan = self.draft.plan.clone();
        let mut draft = BookingDraft::new(plan, self.draft.location, self.draft.camp_type);
        draft.start_date = draft
            .plan
            .as_ref()
            .map(|p| self.season.default_start_date(p, draft.location));
        self.draft = draft;
        self.discount = DiscountState::new();
        self.errors = ValidationErrors::new();
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.state.is_editable() {
            Ok(())
        } else {
            Err(SessionError::Locked {
                state: self.state.name(),
            })
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Write one field and recheck it if it is checked while typing
    pub fn update_field(&mut self, update: FieldUpdate) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let field = self.draft.apply(update)?;
        let today = self.today();
        self.errors.revalidate(&self.draft, field, today);
        Ok(())
    }

    pub fn set_number_of_children(&mut self, count: usize) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.draft.set_number_of_children(count)?;
        self.errors.retain_children(count);
        Ok(())
    }

    /// Apply a discount code. An unknown code is not an error of the call;
    /// it is recorded on the discount state and pricing falls back to
    /// sibling discounts.
    pub fn apply_discount(&mut self, code: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        match self.discount.apply(code) {
            Ok(applied) => tracing::debug!("Session {}: discount {} applied", self.id, applied.code),
            Err(e) => tracing::debug!("Session {}: discount {:?} rejected: {}", self.id, code, e),
        }
        Ok(())
    }

    pub fn clear_discount(&mut self) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.discount.clear();
        Ok(())
    }

    /// Validate the whole draft, freeze it and open a payment intent.
    pub async fn submit(&mut self) -> Result<IntentHandle, SessionError> {
        if !matches!(self.state, SessionState::Editing) {
            return Err(self.invalid("submit"));
        }

        self.errors = validate_all(&self.draft, self.today());
        if !self.errors.is_empty() {
            tracing::debug!("Session {}: submit blocked by {} field errors", self.id, self.errors.len());
            return Err(SessionError::Invalid(self.errors.clone()));
        }

        let snapshot = self.pricing();
        if snapshot.final_total <= Decimal::ZERO {
            tracing::warn!(
                "Session {}: refusing to charge {} for plan price {:?}",
                self.id,
                snapshot.final_total,
                self.draft.plan_price()
            );
            return Err(SessionError::InvalidAmount(snapshot.final_total));
        }

        let booking = FrozenBooking {
            draft: self.draft.clone(),
            snapshot,
            discount: self.discount.applied().cloned(),
        };
        self.cancelled = None;
        self.open_intent(booking).await
    }

    async fn open_intent(&mut self, booking: FrozenBooking) -> Result<IntentHandle, SessionError> {
        let amount = to_minor_units(booking.snapshot.final_total)?;

        // any outcome of an older intent is stale from here on
        self.generation += 1;
        let generation = self.generation;

        match self.gateway.create_intent(amount, CURRENCY).await {
            Ok(intent) => {
                let handle = IntentHandle {
                    generation,
                    client_secret: intent.client_secret,
                    amount_minor_units: amount,
                    currency: CURRENCY.to_string(),
                };
                tracing::info!(
                    "Session {}: awaiting payment of {} {} (attempt {})",
                    self.id,
                    amount,
                    CURRENCY,
                    generation
                );
                self.state = SessionState::AwaitingPayment(Checkout {
                    booking,
                    intent: handle.clone(),
                });
                Ok(handle)
            }
            Err(error) => {
                tracing::warn!("Session {}: could not open payment intent: {}", self.id, error);
                Err(self.fail_payment(PaymentFailure {
                    error,
                    booking,
                    intent: None,
                }))
            }
        }
    }

    /// The current intent and the guardian's billing details
    pub fn payment_ticket(&self, payment_method: &str) -> Result<PaymentTicket, SessionError> {
        match &self.state {
            SessionState::AwaitingPayment(checkout) => Ok(PaymentTicket {
                generation: checkout.intent.generation,
                client_secret: checkout.intent.client_secret.clone(),
                details: PaymentMethodDetails {
                    payment_method: payment_method.to_string(),
                    billing: BillingDetails::from(&checkout.booking.draft.guardian),
                },
                gateway: Arc::clone(&self.gateway),
            }),
            _ => Err(self.invalid("pay")),
        }
    }

    fn fail_payment(&mut self, failure: PaymentFailure) -> SessionError {
        self.state = SessionState::PaymentFailed(failure.clone());
        SessionError::PaymentFailed(Box::new(failure))
    }

    /// Take the checkout an outcome of `generation` belongs to, if it is
    /// still current or was left without a newer intent.
    ///
    /// A capture also claims a failed checkout of the same intent: two
    /// confirmations of one intent can run at once and the first may fail.
    fn take_checkout(&mut self, generation: u64, captured: bool) -> Option<Checkout> {
        if generation != self.generation {
            return None;
        }
        let owned = match &self.state {
            SessionState::AwaitingPayment(checkout) => checkout.intent.generation == generation,
            SessionState::PaymentFailed(failure) => {
                captured && failure.intent.as_ref().is_some_and(|i| i.generation == generation)
            }
            _ => false,
        };
        if owned {
            return match std::mem::replace(&mut self.state, SessionState::Editing) {
                SessionState::AwaitingPayment(checkout) => Some(checkout),
                SessionState::PaymentFailed(PaymentFailure {
                    booking,
                    intent: Some(intent),
                    ..
                }) => Some(Checkout { booking, intent }),
                other => {
                    self.state = other;
                    None
                }
            };
        }
        match &self.cancelled {
            Some(checkout) if checkout.intent.generation == generation => self.cancelled.take(),
            _ => None,
        }
    }

    /// Apply the gateway's answer for the intent of `generation`.
    ///
    /// A success moves the session to `SubmittingBooking`, even when the
    /// guardian cancelled after confirming or a parallel confirmation of the
    /// same intent failed. Outcomes of superseded intents never change the
    /// session.
    pub fn record_payment_outcome(
        &mut self,
        generation: u64,
        outcome: Result<PaymentConfirmation, PaymentError>,
    ) -> Result<(), SessionError> {
        let was_failed = matches!(self.state, SessionState::PaymentFailed(_));
        let was_cancelled = !was_failed && !matches!(self.state, SessionState::AwaitingPayment(_));
        let Some(Checkout { booking, intent }) = self.take_checkout(generation, outcome.is_ok()) else {
            return Err(match outcome {
                Ok(payment) if generation == self.generation => {
                    tracing::warn!(
                        "Session {}: duplicate confirmation of payment {} for attempt {} ignored",
                        self.id,
                        payment.payment_id,
                        generation
                    );
                    SessionError::DuplicatePayment {
                        payment_id: payment.payment_id,
                    }
                }
                Ok(payment) => {
                    tracing::error!(
                        "Session {}: payment {} for superseded attempt {} was captured; refund manually",
                        self.id,
                        payment.payment_id,
                        generation
                    );
                    SessionError::SupersededPayment {
                        payment_id: payment.payment_id,
                    }
                }
                Err(e) => {
                    tracing::warn!("Session {}: ignoring stale payment outcome {}: {}", self.id, generation, e);
                    SessionError::StaleAttempt { generation }
                }
            });
        };

        let payment = match outcome {
            Ok(payment) => payment,
            Err(error) if was_cancelled => {
                tracing::info!("Session {}: cancelled attempt {} failed: {}", self.id, generation, error);
                return Err(SessionError::StaleAttempt { generation });
            }
            Err(error) => {
                tracing::warn!("Session {}: payment failed [{}]: {}", self.id, error.code(), error);
                return Err(self.fail_payment(PaymentFailure {
                    error,
                    booking,
                    intent: Some(intent),
                }));
            }
        };

        if payment.amount != intent.amount_minor_units || !payment.currency.eq_ignore_ascii_case(&intent.currency) {
            let error = PaymentError::AmountMismatch {
                expected: intent.amount_minor_units,
                received: payment.amount,
                currency: payment.currency.clone(),
            };
            tracing::error!("Session {}: payment {} rejected: {}", self.id, payment.payment_id, error);
            return Err(self.fail_payment(PaymentFailure {
                error,
                booking,
                intent: Some(intent),
            }));
        }

        if was_failed {
            tracing::warn!(
                "Session {}: payment {} captured after attempt {} had failed, completing the booking",
                self.id,
                payment.payment_id,
                generation
            );
        } else if was_cancelled {
            tracing::warn!(
                "Session {}: payment {} arrived after cancel, completing the booking",
                self.id,
                payment.payment_id
            );
        }
        tracing::info!("Session {}: payment {} captured, saving booking", self.id, payment.payment_id);
        self.state = SessionState::SubmittingBooking { booking, payment };
        Ok(())
    }

    /// Save the paid booking.
    pub async fn persist(&mut self) -> Result<BookingReceipt, SessionError> {
        let payload = match &self.state {
            SessionState::SubmittingBooking { booking, payment } => booking.payload(&payment.payment_id),
            _ => return Err(self.invalid("save the booking")),
        };

        let result = self
            .bookings
            .create_booking(&payload)
            .await
            .and_then(BookingAck::into_receipt);

        let (booking, payment) = match std::mem::replace(&mut self.state, SessionState::Editing) {
            SessionState::SubmittingBooking { booking, payment } => (booking, payment),
            other => {
                self.state = other;
                return Err(self.invalid("save the booking"));
            }
        };

        match result {
            Ok(receipt) => {
                tracing::info!("Session {}: booking {} saved", self.id, receipt.booking_id);
                self.state = SessionState::Done(receipt.clone());
                self.cancelled = None;
                self.reset_draft();
                Ok(receipt)
            }
            Err(error) => {
                tracing::error!(
                    "Session {}: payment {} captured but booking not saved: {}",
                    self.id,
                    payment.payment_id,
                    error
                );
                let failure = PersistenceFailure { payment, error, booking };
                self.state = SessionState::PersistenceFailed(failure.clone());
                Err(SessionError::BookingNotSaved(Box::new(failure)))
            }
        }
    }

    /// Confirm and save while holding the session.
    pub async fn confirm_payment(&mut self, payment_method: &str) -> Result<BookingReceipt, SessionError> {
        let ticket = self.payment_ticket(payment_method)?;
        let outcome = ticket.gateway.confirm(&ticket.client_secret, &ticket.details).await;
        self.record_payment_outcome(ticket.generation, outcome)?;
        self.persist().await
    }

    /// Leave the checkout and go back to the form
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::AwaitingPayment(_)) {
            return Err(self.invalid("cancel"));
        }
        if let SessionState::AwaitingPayment(checkout) = std::mem::replace(&mut self.state, SessionState::Editing) {
            tracing::info!("Session {}: checkout {} cancelled", self.id, checkout.intent.generation);
            self.cancelled = Some(checkout);
        }
        Ok(())
    }

    /// Open a new intent for the same frozen booking after a retryable failure
    pub async fn retry_payment(&mut self) -> Result<IntentHandle, SessionError> {
        let failure = match &self.state {
            SessionState::PaymentFailed(failure) => failure,
            _ => return Err(self.invalid("retry payment")),
        };
        if !failure.error.is_retryable() {
            return Err(SessionError::NotRetryable(failure.error.clone()));
        }

        let booking = failure.booking.clone();
        tracing::info!("Session {}: retrying payment", self.id);
        self.open_intent(booking).await
    }

    /// Back to the form after a payment failure, keeping the draft
    pub fn resume_editing(&mut self) -> Result<(), SessionError> {
        match std::mem::replace(&mut self.state, SessionState::Editing) {
            SessionState::PaymentFailed(failure) => {
                if let Some(intent) = failure.intent {
                    self.cancelled = Some(Checkout {
                        booking: failure.booking,
                        intent,
                    });
                }
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("resume editing"))
            }
        }
    }
}

/// Confirm the payment of a shared session.
///
/// The lock is released while the gateway confirms, so a cancel can land in
/// between. Persistence runs under the lock.
pub async fn confirm_shared(
    session: &Mutex<BookingSession>,
    payment_method: &str,
) -> Result<BookingReceipt, SessionError> {
    let ticket = session.lock().await.payment_ticket(payment_method)?;
    let outcome = ticket.gateway.confirm(&ticket.client_secret, &ticket.details).await;

    let mut session = session.lock().await;
    session.record_payment_outcome(ticket.generation, outcome)?;
    session.persist().await
}
