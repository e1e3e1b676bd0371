//! [`Command`] for adding a [`Product`] to a [`User`]'s cart.

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{cart, product, user, CartItem, Product, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`Product`] to a [`User`]'s cart.
///
/// Adding an already carted [`Product`] merges into the existing line by
/// incrementing its quantity, so a cart never holds duplicates.
#[derive(Clone, Copy, Debug)]
pub struct AddCartItem {
    /// ID of the [`User`] owning the cart.
    pub user_id: user::Id,

    /// ID of the [`Product`] to add.
    pub product_id: product::Id,
}

impl<Db, F> Command<AddCartItem> for Service<Db, F>
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
            Select<By<Option<CartItem>, (user::Id, product::Id)>>,
            Ok = Option<CartItem>,
            Err = Traced<database::Error>,
        > + Database<Insert<CartItem>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<CartItem>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = CartItem;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddCartItem) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddCartItem {
            user_id,
            product_id,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let product = self
            .database()
            .execute(Select(By::<Option<Product>, _>::new(product_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProductNotExists(product_id))
            .map_err(tracerr::wrap!())?;
        if product.status != product::Status::Available {
            return Err(tracerr::new!(E::ProductUnavailable(product_id)));
        }

        let existing = self
            .database()
            .execute(Select(By::<Option<CartItem>, _>::new((
                user_id, product_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let item = if let Some(mut item) = existing {
            item.quantity = item.quantity.incremented();
            self.database()
                .execute(Update(item.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            item
        } else {
            let item = CartItem {
                user_id,
                product_id,
                quantity: cart::Quantity::ONE,
                created_at: DateTime::now().coerce(),
            };
            self.database()
                .execute(Insert(item.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            item
        };

        Ok(item)
    }
}

/// Error of [`AddCartItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Product`] with the provided ID does not exist.
    #[display("`Product(id: {_0})` does not exist")]
    ProductNotExists(#[error(not(source))] product::Id),

    /// [`Product`] is not open for carting.
    #[display("`Product(id: {_0})` is not available")]
    ProductUnavailable(#[error(not(source))] product::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::Usd;
    use secrecy::SecretBox;

    use crate::{
        command::{CreateProduct, CreateUser},
        domain::{
            cart::Quantity,
            product,
            rate::Symbol,
            user::{Email, Password, Role, Username},
            Product, User,
        },
        infra::{Fixed, InMemory},
        Command as _, Service,
    };

    use super::{AddCartItem, ExecutionError};

    async fn setup() -> (Service<InMemory, Fixed>, User, Product) {
        let (service, _bg) =
            Service::new(crate::test_config(), InMemory::new(), Fixed);

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

        let product = service
            .execute(CreateProduct {
                title: product::Title::new("Mechanical Keyboard").unwrap(),
                description: product::Description::new(
                    "Cherry MX Blue switches.",
                )
                .unwrap(),
                price: Usd::new("85.00".parse().unwrap()).unwrap(),
                condition: product::Condition::VeryGood,
                seller_id: seller.id,
                category: product::Category::new("Electronics").unwrap(),
                images: vec![],
                accepted_currencies: product::AcceptedCurrencies::new([
                    Symbol::new("BTC").unwrap(),
                ])
                .unwrap(),
                defects: None,
                original_packaging: true,
            })
            .await
            .unwrap();

        (service, buyer, product)
    }

    #[tokio::test]
    async fn adds_a_fresh_line() {
        let (service, buyer, product) = setup().await;

        let item = service
            .execute(AddCartItem {
                user_id: buyer.id,
                product_id: product.id,
            })
            .await
            .unwrap();

        assert_eq!(item.quantity, Quantity::ONE);
    }

    #[tokio::test]
    async fn merges_duplicates_into_quantity() {
        let (service, buyer, product) = setup().await;

        let add = AddCartItem {
            user_id: buyer.id,
            product_id: product.id,
        };
        drop(service.execute(add).await.unwrap());
        let item = service.execute(add).await.unwrap();

        assert_eq!(item.quantity, Quantity::new(2).unwrap());
    }

    #[tokio::test]
    async fn rejects_unknown_product() {
        let (service, buyer, _product) = setup().await;

        let err = service
            .execute(AddCartItem {
                user_id: buyer.id,
                product_id: product::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ProductNotExists(_)));
    }
}
