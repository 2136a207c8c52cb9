pub mod client;
pub mod idp;
pub mod movies;

pub use client::{AccessTokenSource, AuthenticatedClient, StaticToken};
pub use idp::{ClientCredentialsSource, IdpContext};
pub use movies::{MovieApi, MovieApiContext};
