//! [`Command`] for advancing a [`Transaction`] through its protocol.

use common::{
    operations::{By, Select, Swap},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        product,
        transaction::{self, InvalidTransitionError, Status, Step},
        Product, Transaction,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for advancing a [`Transaction`] to the provided [`Step`] with
/// the provided outcome [`Status`].
///
/// The transition is validated centrally by [`transaction::Stage`] before
/// anything is written, and applied with a compare-and-set on the previous
/// stage, so a concurrent advance cannot be silently overwritten.
#[derive(Clone, Copy, Debug)]
pub struct AdvanceTransactionStep {
    /// ID of the [`Transaction`] to advance.
    pub transaction_id: transaction::Id,

    /// [`Step`] to advance the [`Transaction`] to.
    pub step: Step,

    /// Outcome [`Status`] of the advancement.
    pub outcome: Status,
}

impl<Db, F> Command<AdvanceTransactionStep> for Service<Db, F>
where
    Db: Database<
            Select<By<Option<Transaction>, transaction::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        > + Database<
            Swap<By<Transaction, (transaction::Stage, Transaction)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<
            Swap<By<Product, (product::Status, Product)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AdvanceTransactionStep,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AdvanceTransactionStep {
            transaction_id,
            step,
            outcome,
        } = cmd;

        let transaction = self
            .database()
            .execute(Select(By::<Option<Transaction>, _>::new(
                transaction_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransactionNotExists(transaction_id))
            .map_err(tracerr::wrap!())?;

        let stage = transaction
            .stage
            .advance(step, outcome)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut advanced = transaction.clone();
        advanced.stage = stage;
        advanced.updated_at = DateTime::now().coerce();

        let swapped = self
            .database()
            .execute(Swap(By::new((transaction.stage, advanced.clone()))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::StageOutdated(transaction_id)));
        }

        if stage.is_completed() {
            self.flip_product(advanced.product_id, product::Status::Sold)
                .await?;
        } else if stage.is_cancelled() {
            self.flip_product(advanced.product_id, product::Status::Available)
                .await?;
        }

        Ok(advanced)
    }
}

impl<Db, F> Service<Db, F>
where
    Db: Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<
            Swap<By<Product, (product::Status, Product)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    /// Flips the [`Product`] reserved by an advanced [`Transaction`] into
    /// the provided [`product::Status`].
    async fn flip_product(
        &self,
        product_id: product::Id,
        to: product::Status,
    ) -> Result<(), Traced<ExecutionError>> {
        use ExecutionError as E;

        let product = self
            .database()
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;

        if !product.status.permits(to) {
            return Err(tracerr::new!(E::ProductNotPending(product_id)));
        }

        let expected = product.status;
        let mut flipped = product;
        flipped.status = to;

        let swapped = self
            .database()
            .execute(Swap(By::new((expected, flipped))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::ProductNotPending(product_id)));
        }

        Ok(())
    }
}

/// Error of [`AdvanceTransactionStep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// The requested [`transaction::Stage`] transition is illegal.
    #[display("{_0}")]
    #[from]
    InvalidTransition(InvalidTransitionError),

    /// [`Product`] reserved by the [`Transaction`] does not exist.
    #[display("`Product(id: {_0})` does not exist")]
    ProductNotExists(#[error(not(source))] product::Id),

    /// [`Product`] reserved by the [`Transaction`] is not pending anymore.
    #[display("`Product(id: {_0})` is not pending")]
    ProductNotPending(#[error(not(source))] product::Id),

    /// A concurrent advancement won over this one.
    #[display("`Transaction(id: {_0})` stage is outdated")]
    StageOutdated(#[error(not(source))] transaction::Id),

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] transaction::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Usd,
    };
    use secrecy::SecretBox;

    use crate::{
        command::{CreateProduct, CreateTransaction, CreateUser},
        domain::{
            product,
            rate::Symbol,
            transaction::{Status, Step},
            user::{Email, Password, Role, Username},
            CryptoRate, Product, Transaction, User,
        },
        infra::{Database as _, Feed as _, Fixed, InMemory},
        Command as _, Service,
    };

    use super::{AdvanceTransactionStep, ExecutionError};

    async fn setup() -> (Service<InMemory, Fixed>, Transaction) {
        let (service, _bg) =
            Service::new(crate::test_config(), InMemory::new(), Fixed);

        let rates: Vec<CryptoRate> = service
            .feed()
            .execute(Select(By::new(())))
            .await
            .unwrap();
        for rate in rates {
            service.database().execute(Insert(rate)).await.unwrap();
        }

        let register = |username: &str, role| {
            let username = Username::new(username).unwrap();
            let email =
                Email::new(format!("{username}@example.com")).unwrap();
            service.execute(CreateUser {
                username,
                password: SecretBox::new(Box::new(
                    Password::new("password123").unwrap(),
                )),
                email,
                role,
            })
        };
        let seller: User = register("seller1", Role::Seller).await.unwrap();
        let buyer: User = register("buyer1", Role::Buyer).await.unwrap();

        let product = service
            .execute(CreateProduct {
                title: product::Title::new("Vintage Watch").unwrap(),
                description: product::Description::new(
                    "Classic vintage watch from the 1970s.",
                )
                .unwrap(),
                price: Usd::new("250.00".parse().unwrap()).unwrap(),
                condition: product::Condition::Good,
                seller_id: seller.id,
                category: product::Category::new("Fashion").unwrap(),
                images: vec![],
                accepted_currencies: product::AcceptedCurrencies::new([
                    Symbol::new("ETH").unwrap(),
                ])
                .unwrap(),
                defects: Some(
                    product::Defects::new("Light scratches on crystal.")
                        .unwrap(),
                ),
                original_packaging: false,
            })
            .await
            .unwrap();

        let transaction = service
            .execute(CreateTransaction {
                product_id: product.id,
                buyer_id: buyer.id,
                amount: Usd::new("250.00".parse().unwrap()).unwrap(),
                crypto_currency: Symbol::new("ETH").unwrap(),
            })
            .await
            .unwrap();

        (service, transaction)
    }

    async fn product_status(
        service: &Service<InMemory, Fixed>,
        id: product::Id,
    ) -> product::Status {
        let product: Option<Product> =
            service.database().execute(Select(By::new(id))).await.unwrap();
        product.unwrap().status
    }

    #[tokio::test]
    async fn completion_sells_the_product() {
        let (service, tx) = setup().await;

        let advance = |step, outcome| {
            service.execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                step,
                outcome,
            })
        };

        drop(advance(Step::Verification, Status::Approved).await.unwrap());
        drop(advance(Step::Shipping, Status::Approved).await.unwrap());
        assert_eq!(
            product_status(&service, tx.product_id).await,
            product::Status::Pending,
        );

        let done = advance(Step::Receiving, Status::Approved).await.unwrap();
        assert!(done.stage.is_completed());
        assert_eq!(
            product_status(&service, tx.product_id).await,
            product::Status::Sold,
        );
    }

    #[tokio::test]
    async fn cancellation_releases_the_product() {
        let (service, tx) = setup().await;

        let cancelled = service
            .execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                step: Step::Verification,
                outcome: Status::Cancelled,
            })
            .await
            .unwrap();

        assert!(cancelled.stage.is_cancelled());
        assert_eq!(
            product_status(&service, tx.product_id).await,
            product::Status::Available,
        );
    }

    #[tokio::test]
    async fn terminal_transaction_cannot_be_reopened() {
        let (service, tx) = setup().await;

        drop(
            service
                .execute(AdvanceTransactionStep {
                    transaction_id: tx.id,
                    step: Step::Receiving,
                    outcome: Status::Approved,
                })
                .await
                .unwrap(),
        );

        let err = service
            .execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                step: Step::Receiving,
                outcome: Status::Cancelled,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition(_),
        ));

        // The product stays sold.
        assert_eq!(
            product_status(&service, tx.product_id).await,
            product::Status::Sold,
        );
    }

    #[tokio::test]
    async fn step_cannot_decrease() {
        let (service, tx) = setup().await;

        drop(
            service
                .execute(AdvanceTransactionStep {
                    transaction_id: tx.id,
                    step: Step::Shipping,
                    outcome: Status::Approved,
                })
                .await
                .unwrap(),
        );

        let err = service
            .execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                step: Step::Verification,
                outcome: Status::Negotiated,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition(_),
        ));
    }

    #[tokio::test]
    async fn unknown_transaction_is_reported() {
        let (service, _tx) = setup().await;

        let err = service
            .execute(AdvanceTransactionStep {
                transaction_id: crate::domain::transaction::Id::new(),
                step: Step::Verification,
                outcome: Status::Approved,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TransactionNotExists(_),
        ));
    }
}
