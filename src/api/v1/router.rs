use super::access::OperatorAccess;
use super::handler::{self, LoginForm, MigrationQuery};
use crate::logger::*;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(login_form())
        .and(with(server.auth_service.clone()))
        .and(with(server.login_flow.clone()))
        .and_then(handler::login);

    let list_migrations = warp::get()
        .and(warp::path("migrations"))
        .and(warp::path::end())
        .and(with_operator(server.operator_access.clone()))
        .and(with(server.migrations.clone()))
        .and_then(handler::list_migrations);

    let run_migration = warp::post()
        .and(warp::path("migrations"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::query::<MigrationQuery>())
        .and(with_operator(server.operator_access.clone()))
        .and(with(server.migrations.clone()))
        .and(with(server.schema_evolver.clone()))
        .and_then(handler::run_migration);

    login.or(list_migrations).or(run_migration)
}

/// An unreadable or oversized body counts as an empty form, so the client
/// still gets the login redirect instead of an API error.
fn login_form() -> impl Filter<Extract = (LoginForm,), Error = Infallible> + Clone {
    warp::body::content_length_limit(16 * 1024)
        .and(warp::body::form::<LoginForm>())
        .or(warp::any().map(|| {
            debug!("login body rejected, treating as empty form");
            LoginForm::default()
        }))
        .unify()
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_operator(
    access: Arc<OperatorAccess>,
) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("x-admin-token")
        .and_then(move |token: Option<String>| {
            let access = access.clone();
            async move { access.check(token.as_deref()) }
        })
        .untuple_one()
}
