//! [`Command`] for checking out a [`Product`] into a new [`Transaction`].

use common::{
    operations::{By, Insert, Select, Swap},
    DateTime, Usd,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        product,
        rate::{RateNotFoundError, RateTable, Symbol},
        transaction::{self, Stage},
        user, Product, Transaction, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for checking out a [`Product`] into a new [`Transaction`].
///
/// Creation is the only point where the crypto equivalent is computed and
/// the fiat value is locked: both stay frozen on the [`Transaction`] no
/// matter how the exchange rates move afterwards.
#[derive(Clone, Debug)]
pub struct CreateTransaction {
    /// ID of the [`Product`] to check out.
    pub product_id: product::Id,

    /// ID of the buying [`User`].
    pub buyer_id: user::Id,

    /// Fiat total owed by the buyer.
    pub amount: Usd,

    /// [`Symbol`] of the cryptocurrency the buyer pays with.
    pub crypto_currency: Symbol,
}

impl<Db, F> Command<CreateTransaction> for Service<Db, F>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Product>, product::Id>>,
            Ok = Option<Product>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<RateTable, ()>>,
            Ok = RateTable,
            Err = Traced<database::Error>,
        > + Database<
            Swap<By<Product, (product::Status, Product)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTransaction {
            product_id,
            buyer_id,
            amount,
            crypto_currency,
        } = cmd;

        if amount.is_zero() {
            return Err(tracerr::new!(E::ZeroAmount));
        }

        self.database()
            .execute(Select(By::<Option<User>, _>::new(buyer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BuyerNotExists(buyer_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let product = self
            .database()
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;

        if !product.status.permits(product::Status::Pending) {
            return Err(tracerr::new!(E::ProductUnavailable(product_id)));
        }

        if !product.accepted_currencies.contains(&crypto_currency) {
            return Err(tracerr::new!(E::CurrencyNotAccepted(
                crypto_currency
            )));
        }

        // Conversion happens before any mutation, so a missing rate leaves
        // no partial state behind.
        let rates = self
            .database()
            .execute(Select(By::<RateTable, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let crypto_amount = rates
            .fiat_to_crypto(amount, &crypto_currency)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let expected = product.status;
        let mut occupied = product;
        occupied.status = product::Status::Pending;
        let seller_id = occupied.seller_id;

        // Atomic occupation of the `Product`: of two concurrent checkouts
        // exactly one observes `Available` here.
        let swapped = self
            .database()
            .execute(Swap(By::new((expected, occupied))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::ProductUnavailable(product_id)));
        }

        let now = DateTime::now();
        let transaction = Transaction {
            id: transaction::Id::new(),
            product_id,
            buyer_id,
            seller_id,
            amount,
            crypto_currency,
            crypto_amount,
            fiat_locked: amount,
            stage: Stage::INITIAL,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        self.database()
            .execute(Insert(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(transaction)
    }
}

/// Error of [`CreateTransaction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Buying [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    BuyerNotExists(#[error(not(source))] user::Id),

    /// The chosen cryptocurrency is not accepted for the [`Product`].
    #[display("`{_0}` is not accepted for the `Product`")]
    CurrencyNotAccepted(#[error(not(source))] Symbol),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Product`] with the provided ID does not exist.
    #[display("`Product(id: {_0})` does not exist")]
    ProductNotExists(#[error(not(source))] product::Id),

    /// [`Product`] is not open for checkout.
    #[display("`Product(id: {_0})` is not available")]
    ProductUnavailable(#[error(not(source))] product::Id),

    /// No exchange rate for the chosen cryptocurrency.
    #[display("{_0}")]
    #[from]
    RateNotFound(RateNotFoundError),

    /// Zero amount is not checkoutable.
    #[display("`Transaction` amount must be positive")]
    ZeroAmount,
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime, Usd,
    };
    use secrecy::SecretBox;

    use crate::{
        command::{CreateProduct, CreateUser},
        domain::{
            product,
            rate::{CurrencyName, Rate, Symbol},
            user::{Email, Password, Role, Username},
            CryptoRate, Product, User,
        },
        infra::{Database as _, Feed as _, Fixed, InMemory},
        Command as _, Service,
    };

    use super::{CreateTransaction, ExecutionError};

    async fn seed_rates(service: &Service<InMemory, Fixed>) {
        let rates: Vec<CryptoRate> = service
            .feed()
            .execute(Select(By::new(())))
            .await
            .unwrap();
        for rate in rates {
            service.database().execute(Insert(rate)).await.unwrap();
        }
    }

    async fn user(
        service: &Service<InMemory, Fixed>,
        username: &str,
        role: Role,
    ) -> User {
        service
            .execute(CreateUser {
                username: Username::new(username).unwrap(),
                password: SecretBox::new(Box::new(
                    Password::new("password123").unwrap(),
                )),
                email: Email::new(format!("{username}@example.com")).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    async fn listed_product(
        service: &Service<InMemory, Fixed>,
        seller: &User,
    ) -> Product {
        service
            .execute(CreateProduct {
                title: product::Title::new("Wireless Headphones").unwrap(),
                description: product::Description::new(
                    "Premium wireless headphones with noise-cancellation.",
                )
                .unwrap(),
                price: Usd::new("95.00".parse().unwrap()).unwrap(),
                condition: product::Condition::LikeNew,
                seller_id: seller.id,
                category: product::Category::new("Electronics").unwrap(),
                images: vec![],
                accepted_currencies: product::AcceptedCurrencies::new([
                    Symbol::new("BTC").unwrap(),
                    Symbol::new("ETH").unwrap(),
                ])
                .unwrap(),
                defects: None,
                original_packaging: true,
            })
            .await
            .unwrap()
    }

    async fn setup() -> (Service<InMemory, Fixed>, User, Product) {
        let (service, _bg) =
            Service::new(crate::test_config(), InMemory::new(), Fixed);
        seed_rates(&service).await;

        let seller = user(&service, "seller1", Role::Seller).await;
        let buyer = user(&service, "buyer1", Role::Buyer).await;
        let product = listed_product(&service, &seller).await;

        (service, buyer, product)
    }

    fn checkout(
        buyer: &User,
        product: &Product,
        amount: &str,
    ) -> CreateTransaction {
        CreateTransaction {
            product_id: product.id,
            buyer_id: buyer.id,
            amount: Usd::new(amount.parse().unwrap()).unwrap(),
            crypto_currency: Symbol::new("ETH").unwrap(),
        }
    }

    #[tokio::test]
    async fn locks_fiat_and_reserves_the_product() {
        let (service, buyer, product) = setup().await;

        let tx = service
            .execute(checkout(&buyer, &product, "111.75"))
            .await
            .unwrap();

        assert_eq!(tx.fiat_locked, tx.amount);
        assert_eq!(tx.seller_id, product.seller_id);

        let stored: Option<Product> = service
            .database()
            .execute(Select(By::new(product.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().status, product::Status::Pending);
    }

    #[tokio::test]
    async fn locked_amounts_survive_rate_changes() {
        let (service, buyer, product) = setup().await;

        let tx = service
            .execute(checkout(&buyer, &product, "111.75"))
            .await
            .unwrap();
        let locked_crypto = tx.crypto_amount;

        // The ETH rate triples...
        service
            .database()
            .execute(Insert(CryptoRate {
                symbol: Symbol::new("ETH").unwrap(),
                name: CurrencyName::new("Ethereum").unwrap(),
                usd_rate: Rate::new("3000".parse().unwrap()).unwrap(),
                updated_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap();

        // ...but the stored transaction is untouched.
        let stored = service
            .database()
            .execute(Select(By::<Option<_>, _>::new(tx.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.crypto_amount, locked_crypto);
        assert_eq!(
            stored.fiat_locked,
            Usd::new("111.75".parse().unwrap()).unwrap(),
        );
    }

    #[tokio::test]
    async fn fails_without_touching_anything_when_unavailable() {
        let (service, buyer, product) = setup().await;

        drop(
            service
                .execute(checkout(&buyer, &product, "111.75"))
                .await
                .unwrap(),
        );
        let err = service
            .execute(checkout(&buyer, &product, "111.75"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ProductUnavailable(_),
        ));

        // Still exactly one transaction.
        let all: Vec<crate::domain::Transaction> = service
            .database()
            .execute(Select(By::<Vec<crate::domain::Transaction>, _>::new(())))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_checkouts_have_a_single_winner() {
        let (service, buyer, product) = setup().await;
        let rival = user(&service, "buyer2", Role::Buyer).await;

        let (a, b) = tokio::join!(
            service.execute(checkout(&buyer, &product, "111.75")),
            service.execute(checkout(&rival, &product, "111.75")),
        );

        assert_eq!(
            u8::from(a.is_ok()) + u8::from(b.is_ok()),
            1,
            "exactly one checkout must win",
        );
        let lost = if a.is_ok() { b } else { a };
        assert!(matches!(
            lost.unwrap_err().as_ref(),
            ExecutionError::ProductUnavailable(_),
        ));
    }

    #[tokio::test]
    async fn rejects_not_accepted_currency() {
        let (service, buyer, product) = setup().await;

        let err = service
            .execute(CreateTransaction {
                crypto_currency: Symbol::new("DOGE").unwrap(),
                ..checkout(&buyer, &product, "111.75")
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CurrencyNotAccepted(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_rate() {
        // A fresh service without seeded rates: the product accepts `ETH`,
        // but no rate for it is known yet.
        let (service, _bg) =
            Service::new(crate::test_config(), InMemory::new(), Fixed);
        let seller = user(&service, "seller1", Role::Seller).await;
        let buyer = user(&service, "buyer1", Role::Buyer).await;
        let product = listed_product(&service, &seller).await;

        let err = service
            .execute(checkout(&buyer, &product, "10.00"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::RateNotFound(_)));

        // The failed conversion must not have reserved the product.
        let stored: Option<Product> = service
            .database()
            .execute(Select(By::new(product.id)))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().status, product::Status::Available);
    }
}
