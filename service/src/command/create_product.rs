//! [`Command`] for listing a new [`Product`].

use common::{
    operations::{By, Insert, Select},
    DateTime, Usd,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::product::{
    Category, Condition, Defects, Description, ImageUrl, Title,
};
use crate::{
    domain::{product, user, Product, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Product`].
#[derive(Clone, Debug)]
pub struct CreateProduct {
    /// [`Title`] of a new [`Product`].
    pub title: product::Title,

    /// [`Description`] of a new [`Product`].
    pub description: product::Description,

    /// Fiat price of a new [`Product`].
    pub price: Usd,

    /// [`Condition`] of a new [`Product`].
    pub condition: product::Condition,

    /// ID of the [`User`] selling a new [`Product`].
    pub seller_id: user::Id,

    /// [`Category`] of a new [`Product`].
    pub category: product::Category,

    /// Images of a new [`Product`].
    pub images: Vec<product::ImageUrl>,

    /// Cryptocurrencies accepted as payment for a new [`Product`].
    pub accepted_currencies: product::AcceptedCurrencies,

    /// Known [`Defects`] of a new [`Product`], if any.
    pub defects: Option<product::Defects>,

    /// Indicator whether a new [`Product`] comes in its original packaging.
    pub original_packaging: bool,
}

impl<Db, F> Command<CreateProduct> for Service<Db, F>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Product>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Product;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProduct,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProduct {
            title,
            description,
            price,
            condition,
            seller_id,
            category,
            images,
            accepted_currencies,
            defects,
            original_packaging,
        } = cmd;

        if price.is_zero() {
            return Err(tracerr::new!(E::ZeroPrice));
        }

        self.database()
            .execute(Select(By::<Option<User>, _>::new(seller_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SellerNotExists(seller_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let product = Product {
            id: product::Id::new(),
            title,
            description,
            price,
            condition,
            seller_id,
            category,
            images,
            accepted_currencies,
            status: product::Status::Available,
            defects,
            original_packaging,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(product.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(product)
    }
}

/// Error of [`CreateProduct`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Selling [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    SellerNotExists(#[error(not(source))] user::Id),

    /// Zero price is not sellable.
    #[display("`Product` price must be positive")]
    ZeroPrice,
}
