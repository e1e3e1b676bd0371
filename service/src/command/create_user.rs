//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password, Role, Username};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db, F> Command<CreateUser> for Service<Db, F>
where
    Db: for<'u> Database<
            Select<By<Option<User>, &'u user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            password,
            email,
            role,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&username)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::UsernameOccupied(username)));
        }

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            username,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            email,
            role,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`user::Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    UsernameOccupied(#[error(not(source))] user::Username),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user::{Email, Password, Role, Username},
        infra::{Fixed, InMemory},
        Command as _, Service,
    };

    use super::{CreateUser, ExecutionError};

    fn service() -> Service<InMemory, Fixed> {
        let (service, _bg) = Service::new(
            crate::test_config(),
            InMemory::new(),
            Fixed,
        );
        service
    }

    fn cmd(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: Username::new(username).unwrap(),
            password: SecretBox::new(Box::new(Password::new(
                "password123",
            )
            .unwrap())),
            email: Email::new(email).unwrap(),
            role: Role::Buyer,
        }
    }

    #[tokio::test]
    async fn registers_a_user() {
        let service = service();

        let user = service
            .execute(cmd("buyer1", "buyer1@example.com"))
            .await
            .unwrap();

        assert_eq!(AsRef::<str>::as_ref(&user.username), "buyer1");
        assert_eq!(user.role, Role::Buyer);
    }

    #[tokio::test]
    async fn rejects_occupied_username() {
        let service = service();

        drop(
            service
                .execute(cmd("buyer1", "buyer1@example.com"))
                .await
                .unwrap(),
        );
        let err = service
            .execute(cmd("buyer1", "other@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UsernameOccupied(_),
        ));
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let service = service();

        drop(
            service
                .execute(cmd("buyer1", "buyer1@example.com"))
                .await
                .unwrap(),
        );
        let err = service
            .execute(cmd("buyer2", "buyer1@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EmailOccupied(_)));
    }
}
