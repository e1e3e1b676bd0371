//! [`Command`] for checking out a whole cart.

use common::{
    operations::{By, Delete, Insert, Select, Swap},
    DateTime, Usd,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{
        product,
        rate::{RateNotFoundError, RateTable, Symbol},
        transaction::{self, Stage},
        user, CartItem, Product, Transaction, User,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for checking out a whole cart, converting every line into its
/// own [`Transaction`] and clearing the cart afterwards.
///
/// Every line carries its proportional share of the costs: its own service
/// fee plus an equal split of the flat shipping.
#[derive(Clone, Debug)]
pub struct CheckoutCart {
    /// ID of the [`User`] checking out.
    pub user_id: user::Id,

    /// [`Symbol`] of the cryptocurrency the buyer pays with.
    pub crypto_currency: Symbol,
}

impl<Db, F> Command<CheckoutCart> for Service<Db, F>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<read::cart::Line>, user::Id>>,
            Ok = Vec<read::cart::Line>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<RateTable, ()>>,
            Ok = RateTable,
            Err = Traced<database::Error>,
        > + Database<
            Swap<By<Product, (product::Status, Product)>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Delete<By<Vec<CartItem>, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Transaction>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckoutCart,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckoutCart {
            user_id,
            crypto_currency,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let lines = self
            .database()
            .execute(Select(By::<Vec<read::cart::Line>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if lines.is_empty() {
            return Err(tracerr::new!(E::EmptyCart));
        }

        let rates = self
            .database()
            .execute(Select(By::<RateTable, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Everything is validated and priced before the first mutation.
        let shipping_share =
            read::cart::Summary::SHIPPING / Decimal::from(lines.len());
        let mut planned = Vec::with_capacity(lines.len());
        for line in &lines {
            if !line.product.status.permits(product::Status::Pending) {
                return Err(tracerr::new!(E::ProductUnavailable(
                    line.product.id
                )));
            }
            if !line.product.accepted_currencies.contains(&crypto_currency) {
                return Err(tracerr::new!(E::CurrencyNotAccepted(
                    crypto_currency
                )));
            }

            let cost = line.cost();
            let amount = cost
                + read::cart::Summary::SERVICE_FEE.of(cost)
                + shipping_share;
            let crypto_amount = rates
                .fiat_to_crypto(amount, &crypto_currency)
                .map_err(tracerr::from_and_wrap!(=> E))?;

            planned.push((line.product.clone(), amount, crypto_amount));
        }

        // Occupy all the products. A lost race on any of them releases the
        // already occupied ones back, leaving no partial state behind.
        let mut occupied: Vec<Product> = Vec::with_capacity(planned.len());
        for (product, _, _) in &planned {
            let expected = product.status;
            let mut reserved = product.clone();
            reserved.status = product::Status::Pending;

            let swapped = self
                .database()
                .execute(Swap(By::new((expected, reserved.clone()))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !swapped {
                for taken in &occupied {
                    let mut released = taken.clone();
                    released.status = product::Status::Available;
                    drop(
                        self.database()
                            .execute(Swap(By::new((
                                product::Status::Pending,
                                released,
                            ))))
                            .await
                            .map_err(tracerr::map_from_and_wrap!(=> E))?,
                    );
                }
                return Err(tracerr::new!(E::ProductUnavailable(product.id)));
            }
            occupied.push(reserved);
        }

        let mut transactions = Vec::with_capacity(planned.len());
        let now = DateTime::now();
        for (product, amount, crypto_amount) in planned {
            let transaction = Transaction {
                id: transaction::Id::new(),
                product_id: product.id,
                buyer_id: user_id,
                seller_id: product.seller_id,
                amount,
                crypto_currency: crypto_currency.clone(),
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
            transactions.push(transaction);
        }

        self.database()
            .execute(Delete(By::<Vec<CartItem>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(transactions)
    }
}

/// Error of [`CheckoutCart`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// The chosen cryptocurrency is not accepted for a carted [`Product`].
    #[display("`{_0}` is not accepted for a carted `Product`")]
    CurrencyNotAccepted(#[error(not(source))] Symbol),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Nothing to check out.
    #[display("cart is empty")]
    EmptyCart,

    /// A carted [`Product`] is not open for checkout.
    #[display("`Product(id: {_0})` is not available")]
    ProductUnavailable(#[error(not(source))] product::Id),

    /// No exchange rate for the chosen cryptocurrency.
    #[display("{_0}")]
    #[from]
    RateNotFound(RateNotFoundError),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        Usd,
    };
    use secrecy::SecretBox;

    use crate::{
        command::{AddCartItem, CreateProduct, CreateUser},
        domain::{
            product,
            rate::Symbol,
            user::{Email, Password, Role, Username},
            CryptoRate, Product, User,
        },
        infra::{Database as _, Feed as _, Fixed, InMemory},
        read,
        Command as _, Service,
    };

    use super::{CheckoutCart, ExecutionError};

    async fn setup() -> (Service<InMemory, Fixed>, User, User) {
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

        let seller = service
            .execute(CreateUser {
                username: Username::new("seller1").unwrap(),
                password: SecretBox::new(Box::new(
                    Password::new("password123").unwrap(),
                )),
                email: Email::new("seller1@example.com").unwrap(),
                role: Role::Seller,
            })
            .await
            .unwrap();
        let buyer = service
            .execute(CreateUser {
                username: Username::new("buyer1").unwrap(),
                password: SecretBox::new(Box::new(
                    Password::new("password123").unwrap(),
                )),
                email: Email::new("buyer1@example.com").unwrap(),
                role: Role::Buyer,
            })
            .await
            .unwrap();

        (service, seller, buyer)
    }

    async fn listed(
        service: &Service<InMemory, Fixed>,
        seller: &User,
        title: &str,
        price: &str,
    ) -> Product {
        service
            .execute(CreateProduct {
                title: product::Title::new(title).unwrap(),
                description: product::Description::new("Second-hand.")
                    .unwrap(),
                price: Usd::new(price.parse().unwrap()).unwrap(),
                condition: product::Condition::Good,
                seller_id: seller.id,
                category: product::Category::new("Electronics").unwrap(),
                images: vec![],
                accepted_currencies: product::AcceptedCurrencies::new([
                    Symbol::new("ETH").unwrap(),
                ])
                .unwrap(),
                defects: None,
                original_packaging: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_an_empty_cart() {
        let (service, _seller, buyer) = setup().await;

        let err = service
            .execute(CheckoutCart {
                user_id: buyer.id,
                crypto_currency: Symbol::new("ETH").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmptyCart));
    }

    #[tokio::test]
    async fn single_line_carries_full_shipping() {
        let (service, seller, buyer) = setup().await;
        let product = listed(&service, &seller, "Headphones", "95.00").await;

        drop(
            service
                .execute(AddCartItem {
                    user_id: buyer.id,
                    product_id: product.id,
                })
                .await
                .unwrap(),
        );

        let transactions = service
            .execute(CheckoutCart {
                user_id: buyer.id,
                crypto_currency: Symbol::new("ETH").unwrap(),
            })
            .await
            .unwrap();

        // 95.00 + 4.75 fee + 12.00 shipping.
        assert_eq!(transactions.len(), 1);
        assert_eq!(
            transactions[0].amount,
            Usd::new("111.75".parse().unwrap()).unwrap(),
        );
        assert_eq!(transactions[0].fiat_locked, transactions[0].amount);
    }

    #[tokio::test]
    async fn splits_shipping_between_lines_and_clears_the_cart() {
        let (service, seller, buyer) = setup().await;
        let camera = listed(&service, &seller, "Film Camera", "120.00").await;
        let keyboard = listed(&service, &seller, "Keyboard", "85.00").await;

        for product_id in [camera.id, keyboard.id] {
            drop(
                service
                    .execute(AddCartItem {
                        user_id: buyer.id,
                        product_id,
                    })
                    .await
                    .unwrap(),
            );
        }

        let transactions = service
            .execute(CheckoutCart {
                user_id: buyer.id,
                crypto_currency: Symbol::new("ETH").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(transactions.len(), 2);
        // 120.00 * 1.05 + 6.00 and 85.00 * 1.05 + 6.00.
        let amounts: Vec<_> =
            transactions.iter().map(|t| t.amount).collect();
        assert!(amounts
            .contains(&Usd::new("132.00".parse().unwrap()).unwrap()));
        assert!(amounts
            .contains(&Usd::new("95.25".parse().unwrap()).unwrap()));

        let lines: Vec<read::cart::Line> = service
            .database()
            .execute(Select(By::<Vec<read::cart::Line>, _>::new(buyer.id)))
            .await
            .unwrap();
        assert!(lines.is_empty());

        for id in [camera.id, keyboard.id] {
            let stored: Option<Product> = service
                .database()
                .execute(Select(By::new(id)))
                .await
                .unwrap();
            assert_eq!(stored.unwrap().status, product::Status::Pending);
        }
    }
}
