//! Quote lifecycle service.
//!
//! Every operation here is a scoped operation: the caller's
//! [`AuthorizationContext`] is checked against the quote's owning
//! tenant (and, for `Client` principals, the contact email) before
//! anything is revealed or written. Status changes go through the
//! transition table in `worksmith_core::lifecycle` and are persisted
//! as conditional writes, so two racing mutations can never both
//! succeed.

use uuid::Uuid;
use worksmith_core::context::AuthorizationContext;
use worksmith_core::error::WorksmithResult;
use worksmith_core::lifecycle::{self, QuoteStatus};
use worksmith_core::models::quote::{CreateQuote, Quote, UpdateQuote};
use worksmith_core::models::work_order::WorkOrder;
use worksmith_core::repository::{
    Clock, ConversionInput, PaginatedResult, Pagination, QuoteRepository,
};
use worksmith_core::scope::{self, ResourceScope};

use crate::notify::{EventKind, NotificationEvent, NotificationSink};

pub struct QuoteService<Q: QuoteRepository, N: NotificationSink, C: Clock> {
    quote_repo: Q,
    notifier: N,
    clock: C,
}

impl<Q: QuoteRepository, N: NotificationSink, C: Clock> QuoteService<Q, N, C> {
    pub fn new(quote_repo: Q, notifier: N, clock: C) -> Self {
        Self {
            quote_repo,
            notifier,
            clock,
        }
    }

    /// Fetch one quote, enforcing tenant/ownership scope.
    pub async fn get(&self, ctx: &AuthorizationContext, id: Uuid) -> WorksmithResult<Quote> {
        let quote = self.quote_repo.get_by_id(id).await?;
        scope::check_access(ctx, ResourceScope::owned(quote.tenant_id, &quote.contact_email))?;
        Ok(quote)
    }

    /// List quotes visible to this context.
    pub async fn list(
        &self,
        ctx: &AuthorizationContext,
        pagination: Pagination,
    ) -> WorksmithResult<PaginatedResult<Quote>> {
        let filter = scope::list_filter(ctx);
        self.quote_repo.list(&filter, pagination).await
    }

    /// Create a quote in `Draft`.
    ///
    /// The owning tenant is stamped from the context; the creation
    /// payload carries no tenant field and could not supply one.
    pub async fn create(
        &self,
        ctx: &AuthorizationContext,
        input: CreateQuote,
    ) -> WorksmithResult<Quote> {
        let tenant_id = scope::creation_tenant(ctx);
        self.quote_repo.create(tenant_id, input).await
    }

    /// Update descriptive fields (never status).
    pub async fn update(
        &self,
        ctx: &AuthorizationContext,
        id: Uuid,
        input: UpdateQuote,
    ) -> WorksmithResult<Quote> {
        // Scoped write: same access rule as reads.
        let quote = self.get(ctx, id).await?;
        self.quote_repo.update(quote.id, input).await
    }

    /// Move a quote to `target`, if the transition table allows it.
    ///
    /// `Approved` additionally requires an unlapsed validity window
    /// (`QuoteExpired` otherwise). `Converted` is legal only from
    /// `Approved` and routes through the atomic conversion path. A
    /// concurrent writer that gets there first surfaces as `Conflict`.
    pub async fn request_transition(
        &self,
        ctx: &AuthorizationContext,
        id: Uuid,
        target: QuoteStatus,
    ) -> WorksmithResult<Quote> {
        let quote = self.get(ctx, id).await?;

        if target == QuoteStatus::Converted {
            let (quote, _work_order) = self.convert_checked(quote).await?;
            return Ok(quote);
        }

        if target == QuoteStatus::Approved {
            lifecycle::check_approval(&quote, self.clock.now())?;
        } else {
            lifecycle::check_transition(quote.status, target)?;
        }

        // The precondition is re-validated inside the write: the update
        // only applies while the stored status still equals what we
        // just read.
        let updated = self
            .quote_repo
            .update_status_if(quote.id, quote.status, target)
            .await?;

        self.publish(&updated, target);
        Ok(updated)
    }

    /// Convert an `Approved` quote into a work order, exactly once.
    ///
    /// Status flip, `converted_to_work_order_id`, and work-order
    /// creation (inheriting the quote's tenant) land in one
    /// transaction; a repeat call reports `AlreadyConverted`.
    pub async fn convert_to_work_order(
        &self,
        ctx: &AuthorizationContext,
        id: Uuid,
    ) -> WorksmithResult<(Quote, WorkOrder)> {
        let quote = self.get(ctx, id).await?;
        self.convert_checked(quote).await
    }

    async fn convert_checked(&self, quote: Quote) -> WorksmithResult<(Quote, WorkOrder)> {
        lifecycle::check_conversion(&quote)?;

        let (quote, work_order) = self
            .quote_repo
            .convert(ConversionInput {
                quote_id: quote.id,
                authorized_email: quote.contact_email.clone(),
                description: quote.description.clone(),
            })
            .await?;

        self.publish(&quote, QuoteStatus::Converted);
        Ok((quote, work_order))
    }

    fn publish(&self, quote: &Quote, entered: QuoteStatus) {
        if let Some(kind) = EventKind::for_status(entered) {
            self.notifier.publish(NotificationEvent {
                tenant_id: quote.tenant_id,
                quote_id: quote.id,
                kind,
            });
        }
    }
}
