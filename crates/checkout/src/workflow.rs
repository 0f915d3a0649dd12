//! Checkout workflow for turning the cart into an order.
//!
//! The workflow drives a 3-step wizard (shipping → payment → review).
//! Forward moves validate what the buyer entered; backward moves are always
//! allowed. Submit creates the order through the [`OrderStore`] and, only
//! once that succeeded, clears the cart.

use common::OrderId;
use domain::{
    Address, Cart, CustomerInfo, FormSection, Money, OrderDraft, OrderLine, PaymentSelection,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use services::{CartStore, CurrentUser, NotificationSink, OrderStore, SessionProvider, Severity};

use crate::cart_service::CartService;
use crate::error::{CheckoutError, Result};
use crate::step::CheckoutStep;

/// Where the billing address comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "address", rename_all = "snake_case")]
pub enum BillingAddress {
    /// Billing uses a copy of the shipping address.
    #[default]
    SameAsShipping,

    /// The buyer opted to enter a different billing address.
    Separate(Address),
}

/// What the buyer sees after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
    pub total: Money,
}

/// A single buyer's checkout session.
pub struct CheckoutWorkflow<O, N>
where
    O: OrderStore,
    N: NotificationSink,
{
    orders: O,
    notifier: N,
    customer: CurrentUser,
    step: CheckoutStep,
    shipping_address: Address,
    payment: PaymentSelection,
    billing: BillingAddress,
    confirmation: Option<OrderConfirmation>,
}

impl<O, N> CheckoutWorkflow<O, N>
where
    O: OrderStore,
    N: NotificationSink,
{
    /// Starts a checkout for the current user.
    ///
    /// The cart is reloaded from its store and the shipping step is
    /// pre-filled from the user's default address when one is on file.
    #[tracing::instrument(skip_all)]
    pub async fn start<P, C>(
        session: &P,
        cart: &mut CartService<C>,
        orders: O,
        notifier: N,
    ) -> Result<Self>
    where
        P: SessionProvider,
        C: CartStore,
    {
        let customer = session.current_user().await?;
        cart.reload().await?;

        let shipping_address = customer.default_address.clone().unwrap_or_default();
        tracing::info!(
            customer = %customer.email,
            items = cart.cart().item_count(),
            prefilled = customer.default_address.is_some(),
            "Checkout started"
        );

        Ok(Self {
            orders,
            notifier,
            customer,
            step: CheckoutStep::Shipping,
            shipping_address,
            payment: PaymentSelection::default(),
            billing: BillingAddress::SameAsShipping,
            confirmation: None,
        })
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn customer(&self) -> &CurrentUser {
        &self.customer
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn payment(&self) -> &PaymentSelection {
        &self.payment
    }

    pub fn billing(&self) -> &BillingAddress {
        &self.billing
    }

    /// The billing address the order will carry.
    pub fn billing_address(&self) -> &Address {
        match &self.billing {
            BillingAddress::SameAsShipping => &self.shipping_address,
            BillingAddress::Separate(address) => address,
        }
    }

    /// Set once the order has been created.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }
}

// Data entry
//
// Editing a section that was already confirmed reopens its step, so the
// new data is validated again before the order can be submitted.
impl<O, N> CheckoutWorkflow<O, N>
where
    O: OrderStore,
    N: NotificationSink,
{
    pub fn set_shipping_address(&mut self, address: Address) -> Result<()> {
        self.ensure_open()?;
        self.shipping_address = address;
        self.reopen(CheckoutStep::Shipping);
        Ok(())
    }

    pub fn set_payment(&mut self, payment: PaymentSelection) -> Result<()> {
        self.ensure_open()?;
        self.payment = payment;
        self.reopen(CheckoutStep::Payment);
        Ok(())
    }

    /// Opts into a billing address different from the shipping address.
    pub fn use_separate_billing(&mut self, address: Address) -> Result<()> {
        self.ensure_open()?;
        self.billing = BillingAddress::Separate(address);
        self.reopen(CheckoutStep::Payment);
        Ok(())
    }

    /// Goes back to billing with a copy of the shipping address.
    pub fn use_shipping_for_billing(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.billing = BillingAddress::SameAsShipping;
        self.reopen(CheckoutStep::Payment);
        Ok(())
    }

    fn reopen(&mut self, owner: CheckoutStep) {
        if self.step.can_go_to(owner) {
            self.move_to(owner);
        }
    }
}

// Navigation
impl<O, N> CheckoutWorkflow<O, N>
where
    O: OrderStore,
    N: NotificationSink,
{
    /// Shipping → Payment. Every address field must be filled in.
    pub fn continue_to_payment(&mut self) -> Result<()> {
        self.ensure_step(CheckoutStep::Shipping, "continue to payment")?;
        self.shipping_address.validate(FormSection::Shipping)?;
        self.move_to(CheckoutStep::Payment);
        Ok(())
    }

    /// Payment → Review.
    ///
    /// Card fields are required when paying by card. A separately entered
    /// billing address is validated like the shipping address.
    pub fn continue_to_review(&mut self) -> Result<()> {
        self.ensure_step(CheckoutStep::Payment, "continue to review")?;
        self.payment.validate()?;
        if let BillingAddress::Separate(address) = &self.billing {
            address.validate(FormSection::Billing)?;
        }
        self.move_to(CheckoutStep::Review);
        Ok(())
    }

    /// Steps back once and returns the new step.
    pub fn back(&mut self) -> Result<CheckoutStep> {
        self.ensure_open()?;
        let previous = self.step.previous().ok_or(CheckoutError::InvalidStep {
            operation: "go back",
            step: self.step,
        })?;
        self.move_to(previous);
        Ok(previous)
    }

    /// Jumps back to an earlier step. Staying on the current step is a no-op.
    pub fn go_to(&mut self, target: CheckoutStep) -> Result<()> {
        self.ensure_open()?;
        if target == self.step {
            return Ok(());
        }
        if !self.step.can_go_to(target) {
            return Err(CheckoutError::InvalidStep {
                operation: "jump forward",
                step: self.step,
            });
        }
        self.move_to(target);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.step.is_terminal() {
            return Err(CheckoutError::AlreadySubmitted);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: CheckoutStep, operation: &'static str) -> Result<()> {
        self.ensure_open()?;
        if self.step != expected {
            return Err(CheckoutError::InvalidStep {
                operation,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Every check the forward transitions make, run again before submit.
    fn validate_entries(&self) -> Result<()> {
        self.shipping_address.validate(FormSection::Shipping)?;
        self.payment.validate()?;
        if let BillingAddress::Separate(address) = &self.billing {
            address.validate(FormSection::Billing)?;
        }
        Ok(())
    }

    fn move_to(&mut self, step: CheckoutStep) {
        tracing::debug!(from = %self.step, to = %step, "Checkout step changed");
        self.step = step;
    }
}

// Submit
impl<O, N> CheckoutWorkflow<O, N>
where
    O: OrderStore,
    N: NotificationSink,
{
    /// Creates the order from the cart and the entered data.
    ///
    /// On success the cart is cleared and the workflow completes. On failure
    /// nothing changes: the cart, the entered data and the review step stay
    /// as they were, so calling `submit` again retries.
    #[tracing::instrument(skip(self, cart), fields(customer = %self.customer.email))]
    pub async fn submit<C: CartStore>(
        &mut self,
        cart: &mut CartService<C>,
    ) -> Result<OrderConfirmation> {
        self.ensure_step(CheckoutStep::Review, "submit")?;
        if cart.cart().is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        self.validate_entries()?;

        let draft = self.draft(cart.cart());
        let total = draft.totals.total;

        let started = std::time::Instant::now();
        let created = self.orders.create(draft).await;
        metrics::histogram!("checkout_submit_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        let order_ref = match created {
            Ok(order_ref) => order_ref,
            Err(e) => {
                metrics::counter!("checkout_submissions_total", "outcome" => "failed")
                    .increment(1);
                tracing::error!(error = %e, "Order creation failed");
                self.notifier
                    .notify("Order failed", &e.to_string(), Severity::Error)
                    .await;
                return Err(e.into());
            }
        };

        cart.clear_after_order().await;

        let confirmation = OrderConfirmation {
            order_id: order_ref.order_id,
            order_number: order_ref.order_number,
            total,
        };
        self.confirmation = Some(confirmation.clone());
        self.move_to(CheckoutStep::Completed);

        metrics::counter!("checkout_submissions_total", "outcome" => "created").increment(1);
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %confirmation.order_id,
            order_number = %confirmation.order_number,
            total = %confirmation.total,
            "Order created"
        );
        self.notifier
            .notify(
                "Order placed",
                &format!("Order {} confirmed", confirmation.order_number),
                Severity::Success,
            )
            .await;

        Ok(confirmation)
    }

    fn draft(&self, cart: &Cart) -> OrderDraft {
        OrderDraft {
            customer: CustomerInfo {
                id: self.customer.id,
                name: self.customer.name.clone(),
                email: self.customer.email.clone(),
            },
            items: cart.items().iter().map(OrderLine::from).collect(),
            shipping_address: self.shipping_address.clone(),
            billing_address: self.billing_address().clone(),
            payment_method: self.payment.method,
            totals: cart.compute_totals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CustomerId;
    use domain::{CardDetails, PricingPolicy, RequiredField};
    use services::{
        InMemoryCartStore, InMemoryOrderStore, RecordingNotificationSink, StaticSessionProvider,
    };

    type Workflow = CheckoutWorkflow<InMemoryOrderStore, RecordingNotificationSink>;

    fn home() -> Address {
        Address::new("1 Main St", "Springfield", "IL", "62701", "US")
    }

    fn user(default_address: Option<Address>) -> CurrentUser {
        CurrentUser {
            id: CustomerId::new(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            default_address,
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            card_number: "4242424242424242".to_string(),
            card_name: "Ada Lovelace".to_string(),
            expiry_date: "12/30".to_string(),
            cvv: "123".to_string(),
        }
    }

    async fn setup(
        default_address: Option<Address>,
    ) -> (Workflow, CartService<InMemoryCartStore>, InMemoryOrderStore) {
        let mut cart = CartService::load(InMemoryCartStore::new(), PricingPolicy::default())
            .await
            .unwrap();
        cart.add_item("SKU-EBOOK", "E-book", Money::from_cents(4999), 1)
            .await
            .unwrap();
        let orders = InMemoryOrderStore::new();
        let session = StaticSessionProvider::new(user(default_address));
        let workflow = CheckoutWorkflow::start(
            &session,
            &mut cart,
            orders.clone(),
            RecordingNotificationSink::new(),
        )
        .await
        .unwrap();
        (workflow, cart, orders)
    }

    #[tokio::test]
    async fn test_start_prefills_default_address() {
        let (workflow, _, _) = setup(Some(home())).await;
        assert_eq!(workflow.step(), CheckoutStep::Shipping);
        assert_eq!(workflow.shipping_address(), &home());
    }

    #[tokio::test]
    async fn test_start_without_default_address() {
        let (workflow, _, _) = setup(None).await;
        assert_eq!(workflow.shipping_address(), &Address::default());
    }

    #[tokio::test]
    async fn test_shipping_validation_lists_all_missing_fields() {
        let (mut workflow, _, _) = setup(None).await;
        let partial = Address {
            street: "1 Main St".to_string(),
            city: "   ".to_string(),
            ..Address::default()
        };
        workflow.set_shipping_address(partial.clone()).unwrap();

        let err = workflow.continue_to_payment().unwrap_err();
        assert_eq!(
            err,
            CheckoutError::Validation(ValidationError::MissingFields {
                section: FormSection::Shipping,
                fields: vec![
                    RequiredField::City,
                    RequiredField::State,
                    RequiredField::ZipCode,
                    RequiredField::Country,
                ],
            })
        );
        assert_eq!(workflow.step(), CheckoutStep::Shipping);
        assert_eq!(workflow.shipping_address(), &partial);
    }

    #[tokio::test]
    async fn test_card_fields_required_for_card() {
        let (mut workflow, _, _) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();

        let err = workflow.continue_to_review().unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingFields {
                section: FormSection::Payment,
                ..
            })
        ));
        assert_eq!(workflow.step(), CheckoutStep::Payment);

        workflow.set_payment(PaymentSelection::card(card())).unwrap();
        workflow.continue_to_review().unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Review);
    }

    #[tokio::test]
    async fn test_paypal_needs_no_card_fields() {
        let (mut workflow, _, _) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Review);
    }

    #[tokio::test]
    async fn test_billing_defaults_to_shipping_copy() {
        let (mut workflow, _, _) = setup(Some(home())).await;
        assert_eq!(workflow.billing(), &BillingAddress::SameAsShipping);
        assert_eq!(workflow.billing_address(), &home());

        let moved = Address::new("2 Oak Ave", "Shelbyville", "IL", "62565", "US");
        workflow.set_shipping_address(moved.clone()).unwrap();
        assert_eq!(workflow.billing_address(), &moved);
    }

    #[tokio::test]
    async fn test_separate_billing_is_validated() {
        let (mut workflow, _, _) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.use_separate_billing(Address::default()).unwrap();

        let err = workflow.continue_to_review().unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingFields {
                section: FormSection::Billing,
                ..
            })
        ));

        workflow.use_shipping_for_billing().unwrap();
        workflow.continue_to_review().unwrap();
    }

    #[tokio::test]
    async fn test_back_and_go_to() {
        let (mut workflow, _, _) = setup(Some(home())).await;
        assert!(matches!(
            workflow.back(),
            Err(CheckoutError::InvalidStep { .. })
        ));

        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();

        assert_eq!(workflow.back().unwrap(), CheckoutStep::Payment);
        workflow.continue_to_review().unwrap();
        workflow.go_to(CheckoutStep::Shipping).unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Shipping);

        // entered data survives navigation
        assert_eq!(workflow.payment(), &PaymentSelection::paypal());
        assert!(workflow.go_to(CheckoutStep::Review).is_err());
    }

    #[tokio::test]
    async fn test_submit_requires_review_step() {
        let (mut workflow, mut cart, orders) = setup(Some(home())).await;
        let err = workflow.submit(&mut cart).await.unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InvalidStep {
                operation: "submit",
                step: CheckoutStep::Shipping,
            }
        );
        assert_eq!(orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_creates_order_and_clears_cart() {
        let (mut workflow, mut cart, orders) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::card(card())).unwrap();
        workflow.continue_to_review().unwrap();

        let confirmation = workflow.submit(&mut cart).await.unwrap();
        assert_eq!(confirmation.order_number, "ORD-000001");
        // 49.99 + 9.99 shipping + 5.00 tax
        assert_eq!(confirmation.total.cents(), 6498);
        assert_eq!(workflow.step(), CheckoutStep::Completed);
        assert_eq!(workflow.confirmation(), Some(&confirmation));
        assert!(cart.cart().is_empty());

        let order = orders
            .get(confirmation.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.customer().email, "ada@example.com");
        assert_eq!(order.billing_address(), &home());
        assert_eq!(order.total(), confirmation.total);
    }

    #[tokio::test]
    async fn test_second_submit_is_rejected() {
        let (mut workflow, mut cart, orders) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();
        workflow.submit(&mut cart).await.unwrap();

        let err = workflow.submit(&mut cart).await.unwrap_err();
        assert_eq!(err, CheckoutError::AlreadySubmitted);
        assert_eq!(orders.order_count().await, 1);
        assert!(workflow.back().is_err());
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_be_submitted() {
        let (mut workflow, mut cart, orders) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();
        cart.clear().await.unwrap();

        let err = workflow.submit(&mut cart).await.unwrap_err();
        assert_eq!(err, CheckoutError::Validation(ValidationError::EmptyCart));
        assert_eq!(workflow.step(), CheckoutStep::Review);
        assert_eq!(orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_editing_on_review_reopens_the_owning_step() {
        let (mut workflow, mut cart, orders) = setup(Some(home())).await;
        workflow.continue_to_payment().unwrap();
        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();

        workflow.set_shipping_address(Address::default()).unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Shipping);
        assert!(matches!(
            workflow.submit(&mut cart).await,
            Err(CheckoutError::InvalidStep { .. })
        ));
        assert!(workflow.continue_to_payment().is_err());

        workflow.set_shipping_address(home()).unwrap();
        workflow.continue_to_payment().unwrap();
        workflow.continue_to_review().unwrap();
        workflow
            .set_payment(PaymentSelection::card(CardDetails::default()))
            .unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Payment);
        assert!(workflow.submit(&mut cart).await.is_err());

        workflow.set_payment(PaymentSelection::paypal()).unwrap();
        workflow.continue_to_review().unwrap();
        workflow.use_separate_billing(Address::default()).unwrap();
        assert_eq!(workflow.step(), CheckoutStep::Payment);
        assert!(workflow.submit(&mut cart).await.is_err());

        assert_eq!(orders.order_count().await, 0);
        assert_eq!(cart.cart().item_count(), 1);
    }
}
